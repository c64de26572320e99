//! Resource Agents
//!
//! Name resolution, metadata loading and validation of resource agents. A
//! user-supplied name is resolved to an [`AgentKey`], its metadata document is
//! loaded through the catalog, and `validate-all` runs as a child process
//! whose output is classified line by line.

pub mod commands;
pub mod key;
pub mod loader;
pub mod metadata;
pub mod render;
pub mod resolver;
pub mod validation;

pub use commands::{
    AgentCommandService, ClassEntry, ClassesResult, InfoResult, ListResult, ProvidersResult,
    ValidateResult,
};
pub use key::{AgentKey, ClassKind};
pub use loader::MetadataLoader;
pub use metadata::{ActionSpec, AgentMetadata, ParameterSpec};
pub use resolver::AgentResolver;
pub use validation::{
    ClassifiedMessage, MessageLevel, ValidationInvoker, ValidationOutcome, ValidationParameter,
};
