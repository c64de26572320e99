//! Agent command service: single entry point per CLI command variant.
//!
//! Owns all resource agent workflow logic; the CLI parses, calls one method per
//! variant, and formats output.

use crate::agent::key::{AgentKey, ClassKind};
use crate::agent::loader::MetadataLoader;
use crate::agent::metadata::AgentMetadata;
use crate::agent::resolver::AgentResolver;
use crate::agent::validation::{ValidationInvoker, ValidationOutcome, ValidationParameter};
use crate::catalog::AgentCatalog;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};

pub struct AgentCommandService;

/// One line of the `classes` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    pub class: String,
    pub kind: ClassKind,
    pub providers: Vec<String>,
}

/// Result of the `classes` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassesResult {
    pub classes: Vec<ClassEntry>,
}

/// Result of the `providers` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersResult {
    pub agent_type: String,
    pub class: String,
    pub providers: Vec<String>,
}

/// Result of the `list` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult {
    pub class: String,
    pub provider: Option<String>,
    pub types: Vec<String>,
}

/// Result of the `info` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResult {
    pub key: AgentKey,
    pub metadata: AgentMetadata,
}

/// Result of the `validate` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResult {
    pub key: AgentKey,
    pub outcome: ValidationOutcome,
}

impl AgentCommandService {
    /// Every class; provider-bearing classes without providers are left out.
    pub fn classes(catalog: &dyn AgentCatalog) -> Result<ClassesResult, ApiError> {
        let mut classes = Vec::new();
        for class in catalog.list_classes()? {
            let kind = catalog.class_kind(&class);
            let providers: Vec<String> = match kind {
                ClassKind::ProviderBearing => catalog.list_providers(&class)?.into_iter().collect(),
                ClassKind::Simple => Vec::new(),
            };
            if kind == ClassKind::ProviderBearing && providers.is_empty() {
                continue;
            }
            classes.push(ClassEntry {
                class,
                kind,
                providers,
            });
        }
        Ok(ClassesResult { classes })
    }

    /// Providers of `class` carrying `agent_type`.
    pub fn providers(
        resolver: &AgentResolver,
        agent_type: &str,
        class: &str,
    ) -> Result<ProvidersResult, ApiError> {
        let providers = resolver
            .providers_for_type(agent_type, class)?
            .into_iter()
            .collect();
        Ok(ProvidersResult {
            agent_type: agent_type.to_string(),
            class: class.to_string(),
            providers,
        })
    }

    /// Types of `class`, optionally restricted to one provider.
    pub fn list(
        catalog: &dyn AgentCatalog,
        class: &str,
        provider: Option<&str>,
    ) -> Result<ListResult, ApiError> {
        if !catalog.list_classes()?.contains(class) {
            return Err(ApiError::UnknownClass(class.to_string()));
        }
        if let Some(p) = provider {
            if !catalog.list_providers(class)?.contains(p) {
                return Err(ApiError::UnknownProvider {
                    class: class.to_string(),
                    provider: p.to_string(),
                });
            }
        }
        let types = catalog.list_types(class, provider)?.into_iter().collect();
        Ok(ListResult {
            class: class.to_string(),
            provider: provider.map(str::to_string),
            types,
        })
    }

    /// Resolve and load metadata.
    ///
    /// `args` is either `[name]` or the legacy `[type, class]` / `[type, class, provider]`.
    pub fn info(
        resolver: &AgentResolver,
        loader: &MetadataLoader,
        args: &[String],
    ) -> Result<InfoResult, ApiError> {
        let key = match args {
            [] => {
                return Err(ApiError::InvalidArgument(
                    "Expected [<class>:[<provider>:]]<type>".to_string(),
                ))
            }
            [name] => resolver.resolve(name, None, None)?,
            [agent_type, class] => resolver.resolve(agent_type, Some(class.as_str()), None)?,
            [agent_type, class, provider] => resolver.resolve(
                agent_type,
                Some(class.as_str()),
                Some(provider.as_str()),
            )?,
            _ => {
                return Err(ApiError::InvalidArgument(format!(
                    "Expected at most 3 arguments, got {}",
                    args.len()
                )))
            }
        };
        let metadata = loader.load(&key)?;
        Ok(InfoResult { key, metadata })
    }

    /// Resolve `agent_name`, parse `key=value` parameters and run `validate-all`.
    pub fn validate(
        resolver: &AgentResolver,
        invoker: &ValidationInvoker,
        agent_name: &str,
        params: &[String],
    ) -> Result<ValidateResult, ApiError> {
        let params = params
            .iter()
            .map(|p| p.parse::<ValidationParameter>())
            .collect::<Result<Vec<_>, _>>()?;
        let key = resolver.resolve(agent_name, None, None)?;
        let outcome = invoker.validate(&key, &params)?;
        Ok(ValidateResult { key, outcome })
    }
}
