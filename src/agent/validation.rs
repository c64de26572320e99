//! Validation invocation: run an agent's `validate-all` action and classify
//! what it prints.

use crate::agent::key::AgentKey;
use crate::agent::loader::MetadataLoader;
use crate::error::{ApiError, InvokeError};
use crate::process::{self, ProcessError, StreamMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Environment variable carrying the agent installation root.
pub const OCF_ROOT_VAR: &str = "OCF_ROOT";
/// Prefix of every parameter variable passed to the agent.
pub const PARAMETER_PREFIX: &str = "OCF_RESKEY_";
/// Action name agents expose for parameter self-checks.
pub const VALIDATE_ACTION: &str = "validate-all";

/// Prefixes checked in priority order.
const LEVEL_PREFIXES: &[(&str, MessageLevel)] = &[
    ("ERROR: ", MessageLevel::Error),
    ("WARNING: ", MessageLevel::Warning),
    ("INFO: ", MessageLevel::Info),
    ("DEBUG: ", MessageLevel::Debug),
];

/// A `key=value` pair handed to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationParameter {
    pub key: String,
    pub value: String,
}

impl ValidationParameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Name of the environment variable this parameter maps to.
    pub fn env_name(&self) -> String {
        format!("{}{}", PARAMETER_PREFIX, self.key.to_uppercase())
    }
}

impl FromStr for ValidationParameter {
    type Err = ApiError;

    /// Split at the first `=`; the value may itself contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key, value)),
            _ => Err(ApiError::InvalidParameter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Error,
    Warning,
    Info,
    Debug,
    Raw,
}

impl MessageLevel {
    /// Prefix used when printing a message back out; raw lines have none.
    pub fn prefix(&self) -> &'static str {
        LEVEL_PREFIXES
            .iter()
            .find(|(_, level)| level == self)
            .map(|(prefix, _)| *prefix)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl ClassifiedMessage {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Result of one validation run.
///
/// `success` reflects the exit status only; an agent may print errors and
/// still exit zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub messages: Vec<ClassifiedMessage>,
    pub success: bool,
    pub exit_code: Option<i32>,
}

/// Classify one output line by its severity prefix.
pub fn classify_line(line: &str) -> ClassifiedMessage {
    for (prefix, level) in LEVEL_PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            return ClassifiedMessage::new(*level, rest);
        }
    }
    ClassifiedMessage::new(MessageLevel::Raw, line)
}

/// Split captured output into lines and classify each, keeping order.
pub fn classify_output(output: &str) -> Vec<ClassifiedMessage> {
    output.lines().map(classify_line).collect()
}

/// Parameter variables in application order; later keys overwrite earlier ones.
pub fn parameter_environment(
    root: &Path,
    params: &[ValidationParameter],
) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert(
        OCF_ROOT_VAR.to_string(),
        root.to_string_lossy().into_owned(),
    );
    for param in params {
        env.insert(param.env_name(), param.value.clone());
    }
    env
}

/// Emit classified messages through `tracing` at their own level.
pub fn relay_messages(agent: &AgentKey, messages: &[ClassifiedMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Error => error!(target: "rakit::agent", agent = %agent, "{}", message.text),
            MessageLevel::Warning => warn!(target: "rakit::agent", agent = %agent, "{}", message.text),
            MessageLevel::Info => info!(target: "rakit::agent", agent = %agent, "{}", message.text),
            MessageLevel::Debug | MessageLevel::Raw => {
                debug!(target: "rakit::agent", agent = %agent, "{}", message.text)
            }
        }
    }
}

/// Runs `validate-all` for provider-bearing agents installed under `root`.
pub struct ValidationInvoker {
    loader: MetadataLoader,
    root: PathBuf,
    timeout: Option<Duration>,
}

impl ValidationInvoker {
    pub fn new(loader: MetadataLoader, root: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            root: root.into(),
            timeout: None,
        }
    }

    /// Kill the agent if it has not finished after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// `<root>/resource.d/<provider>/<type>`
    pub fn agent_path(&self, provider: &str, agent_type: &str) -> PathBuf {
        self.root.join("resource.d").join(provider).join(agent_type)
    }

    pub fn validate(
        &self,
        key: &AgentKey,
        params: &[ValidationParameter],
    ) -> Result<ValidationOutcome, InvokeError> {
        let AgentKey::Provider {
            provider,
            agent_type,
            ..
        } = key
        else {
            return Err(InvokeError::UnsupportedClass(key.to_string()));
        };

        let metadata = self.loader.load(key)?;
        if !MetadataLoader::supports_action(&metadata, VALIDATE_ACTION) {
            return Err(InvokeError::UnsupportedAction {
                agent: key.to_string(),
                action: VALIDATE_ACTION.to_string(),
            });
        }

        let path = self.agent_path(provider, agent_type);
        let mut command = Command::new(&path);
        command
            .arg(VALIDATE_ACTION)
            .envs(parameter_environment(&self.root, params));

        info!(agent = %key, path = %path.display(), parameters = params.len(), "Running validate-all");
        let run = process::run_captured(command, StreamMode::Merged, self.timeout).map_err(
            |e| match e {
                ProcessError::Spawn(source) => InvokeError::SpawnFailure {
                    path: path.clone(),
                    source,
                },
                ProcessError::TimedOut(after) => InvokeError::TimedOut {
                    agent: key.to_string(),
                    after,
                },
                ProcessError::Io(source) => InvokeError::Io {
                    agent: key.to_string(),
                    source,
                },
            },
        )?;

        let messages = classify_output(&String::from_utf8_lossy(&run.output));
        let exit_code = run.exit_code();
        let outcome = ValidationOutcome {
            messages,
            success: exit_code == Some(0),
            exit_code,
        };
        info!(
            agent = %key,
            success = outcome.success,
            exit_code = ?outcome.exit_code,
            messages = outcome.messages.len(),
            "validate-all finished"
        );
        Ok(outcome)
    }
}
