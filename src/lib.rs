//! Rakit: Resource Agent Toolkit
//!
//! Resolves abbreviated resource agent names to canonical
//! `class:provider:type` keys, loads their metadata documents, and runs their
//! `validate-all` action with caller-supplied parameters, classifying what the
//! agent prints by severity.

pub mod agent;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod process;
pub mod tooling;
