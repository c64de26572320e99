//! CLI Tooling
//!
//! Command-line interface for resource agent operations: listing classes,
//! providers and types, showing agent metadata, and running `validate-all`.

use crate::agent::render::{render_metadata, render_type_list};
use crate::agent::validation::relay_messages;
use crate::agent::{
    AgentCommandService, AgentResolver, ClassKind, ClassesResult, InfoResult, ListResult,
    MessageLevel, MetadataLoader, ProvidersResult, ValidateResult, ValidationInvoker,
};
use crate::catalog::{AgentCatalog, FilesystemCatalog};
use crate::config::{ConfigLoader, RakitConfig};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Rakit CLI - inspect and validate resource agents
#[derive(Parser)]
#[command(name = "rakit")]
#[command(about = "Resolve, inspect and validate OCF/LSB resource agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// OCF root directory (overrides configuration)
    #[arg(long, global = true)]
    pub ocf_root: Option<PathBuf>,

    /// Enable verbose logging (info level)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply logging flags on top of the configured logging section.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if self.verbose {
            config.level = "info".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

/// Output format shared by all commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List agent classes (and providers of provider-bearing classes)
    Classes {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List the providers that carry an agent type
    Providers {
        /// Agent type, e.g. IPaddr2
        agent_type: String,
        /// Agent class
        #[arg(default_value = "ocf")]
        class: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List agent types of a class
    List {
        /// Agent class
        class: String,
        /// Restrict to one provider
        provider: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Show agent metadata: [<class>:[<provider>:]]<type>
    #[command(alias = "meta")]
    Info {
        /// Agent name, or the legacy form <type> <class> [<provider>]
        #[arg(required = true, num_args = 1..=3)]
        args: Vec<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Run an agent's validate-all action with the given parameters
    Validate {
        /// Agent name: [<class>:[<provider>:]]<type>
        agent: String,
        /// Agent parameters as <key>=<value>
        params: Vec<String>,
        /// Kill the agent after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

/// What a command produced and whether it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }
}

/// CLI context owning configuration and the agent catalog
pub struct CliContext {
    config: RakitConfig,
    catalog: Arc<dyn AgentCatalog>,
}

impl CliContext {
    /// Create a CLI context backed by the filesystem catalog
    pub fn new(config_path: Option<PathBuf>, ocf_root: Option<PathBuf>) -> Result<Self, ApiError> {
        let mut config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        if let Some(root) = ocf_root {
            config.paths.ocf_root = root;
        }
        let catalog = Arc::new(FilesystemCatalog::new(
            &config.paths,
            &config.agents,
            &config.catalog,
        ));
        Ok(Self::with_catalog(config, catalog))
    }

    /// Create a CLI context over an arbitrary catalog
    pub fn with_catalog(config: RakitConfig, catalog: Arc<dyn AgentCatalog>) -> Self {
        Self { config, catalog }
    }

    /// Turn colored output off, e.g. when stdout is not a terminal.
    pub fn with_color(mut self, color: bool) -> Self {
        self.config.output.color &= color;
        self
    }

    pub fn config(&self) -> &RakitConfig {
        &self.config
    }

    fn resolver(&self) -> AgentResolver {
        AgentResolver::new(Arc::clone(&self.catalog), self.config.agents.clone())
    }

    fn loader(&self) -> MetadataLoader {
        MetadataLoader::new(Arc::clone(&self.catalog))
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        info!(command = command_name(command), "Executing command");
        match command {
            Commands::Classes { format } => {
                let result = AgentCommandService::classes(self.catalog.as_ref())?;
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => to_json(&result),
                    OutputFormat::Text => format_classes_text(&result),
                }))
            }
            Commands::Providers {
                agent_type,
                class,
                format,
            } => {
                let result = AgentCommandService::providers(&self.resolver(), agent_type, class)?;
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => to_json(&result),
                    OutputFormat::Text => format_providers_text(&result),
                }))
            }
            Commands::List {
                class,
                provider,
                format,
            } => {
                let result =
                    AgentCommandService::list(self.catalog.as_ref(), class, provider.as_deref())?;
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => to_json(&result),
                    OutputFormat::Text => {
                        format_list_text(&result, self.config.output.regression_tests)
                    }
                }))
            }
            Commands::Info { args, format } => {
                let result = AgentCommandService::info(&self.resolver(), &self.loader(), args)?;
                Ok(CommandOutput::ok(match format {
                    OutputFormat::Json => to_json(&result),
                    OutputFormat::Text => format_info_text(&result),
                }))
            }
            Commands::Validate {
                agent,
                params,
                timeout,
                format,
            } => self.handle_validate(agent, params, *timeout, *format),
        }
    }

    /// Handle validate command
    fn handle_validate(
        &self,
        agent: &str,
        params: &[String],
        timeout_secs: Option<u64>,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        let timeout = timeout_secs
            .map(Duration::from_secs)
            .or_else(|| self.config.validation.timeout());
        let invoker = ValidationInvoker::new(self.loader(), self.config.paths.ocf_root.clone())
            .with_timeout(timeout);
        let result = AgentCommandService::validate(&self.resolver(), &invoker, agent, params)?;
        relay_messages(&result.key, &result.outcome.messages);
        if !result.outcome.success {
            warn!(
                agent = %result.key,
                exit_code = ?result.outcome.exit_code,
                "Validation failed"
            );
        }

        let text = match format {
            OutputFormat::Json => to_json(&result),
            OutputFormat::Text => format_validate_text(&result, self.config.output.color),
        };
        Ok(CommandOutput {
            text,
            success: result.outcome.success,
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Format classes result as text
fn format_classes_text(result: &ClassesResult) -> String {
    result
        .classes
        .iter()
        .map(|entry| match entry.kind {
            ClassKind::ProviderBearing => {
                format!("{} / {}", entry.class, entry.providers.join(" "))
            }
            ClassKind::Simple => entry.class.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format providers result as text
fn format_providers_text(result: &ProvidersResult) -> String {
    result.providers.join(" ")
}

/// Format list result as text
fn format_list_text(result: &ListResult, regression_mode: bool) -> String {
    render_type_list(result.types.iter().map(String::as_str), regression_mode)
}

/// Format info result as text
fn format_info_text(result: &InfoResult) -> String {
    render_metadata(&result.key, &result.metadata)
}

/// Format validate result as text
fn format_validate_text(result: &ValidateResult, color: bool) -> String {
    let lines: Vec<String> = result
        .outcome
        .messages
        .iter()
        .map(|message| {
            let prefix = message.level.prefix();
            if !color || prefix.is_empty() {
                return format!("{}{}", prefix, message.text);
            }
            let prefix = match message.level {
                MessageLevel::Error => prefix.red().bold().to_string(),
                MessageLevel::Warning => prefix.yellow().to_string(),
                MessageLevel::Info => prefix.green().to_string(),
                MessageLevel::Debug | MessageLevel::Raw => prefix.dimmed().to_string(),
            };
            format!("{}{}", prefix, message.text)
        })
        .collect();

    lines.join("\n")
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Classes { .. } => "classes",
        Commands::Providers { .. } => "providers",
        Commands::List { .. } => "list",
        Commands::Info { .. } => "info",
        Commands::Validate { .. } => "validate",
    }
}
