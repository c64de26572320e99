//! Merge policy: the base builder every load starts from.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with values that must exist even when no source sets them.
///
/// Struct-level serde defaults cover everything else.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("agents.legacy_provider", "heartbeat")?
        .set_default("output.regression_tests", false)
}
