//! Identifier resolution: `[class:[provider:]]type` to a canonical [`AgentKey`].

use crate::agent::key::{AgentKey, ClassKind};
use crate::catalog::AgentCatalog;
use crate::config::AgentsConfig;
use crate::error::ResolutionError;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

const SEPARATOR: char = ':';

/// Resolves user-supplied agent names against a catalog.
pub struct AgentResolver {
    catalog: Arc<dyn AgentCatalog>,
    settings: AgentsConfig,
}

impl AgentResolver {
    pub fn new(catalog: Arc<dyn AgentCatalog>, settings: AgentsConfig) -> Self {
        Self { catalog, settings }
    }

    /// Resolve `raw_name`, optionally with the legacy explicit class/provider tokens.
    pub fn resolve(
        &self,
        raw_name: &str,
        explicit_class: Option<&str>,
        explicit_provider: Option<&str>,
    ) -> Result<AgentKey, ResolutionError> {
        if let Some(class) = explicit_class {
            return self.resolve_legacy(raw_name, class, explicit_provider);
        }

        if self.settings.is_meta_program(raw_name) {
            debug!(name = raw_name, "Resolved meta program");
            return Ok(AgentKey::meta(raw_name));
        }

        let parts: Vec<&str> = raw_name.split(SEPARATOR).collect();
        if let Some(reason) = structural_problem(&parts) {
            return Err(malformed(raw_name, reason));
        }

        let key = match parts.as_slice() {
            [class, provider, agent_type] => match self.catalog.class_kind(class) {
                ClassKind::ProviderBearing => AgentKey::provider(*class, *provider, *agent_type),
                ClassKind::Simple => {
                    return Err(malformed(
                        raw_name,
                        &format!("class {} does not take a provider", class),
                    ))
                }
            },
            [class, agent_type] => match self.catalog.class_kind(class) {
                ClassKind::Simple => {
                    if !self.catalog.list_classes()?.contains(*class) {
                        return Err(ResolutionError::NotFound(raw_name.to_string()));
                    }
                    AgentKey::simple(*class, *agent_type)
                }
                ClassKind::ProviderBearing => {
                    let candidates = self.provider_candidates(class, agent_type)?;
                    pick_single(raw_name, candidates)?
                }
            },
            [agent_type] => {
                let mut candidates = BTreeSet::new();
                for class in self.catalog.list_classes()? {
                    match self.catalog.class_kind(&class) {
                        ClassKind::ProviderBearing => {
                            candidates.extend(self.provider_candidates(&class, agent_type)?);
                        }
                        ClassKind::Simple => {
                            if self.catalog.list_types(&class, None)?.contains(*agent_type) {
                                candidates.insert(AgentKey::simple(class.as_str(), *agent_type));
                            }
                        }
                    }
                }
                pick_single(raw_name, candidates)?
            }
            _ => return Err(malformed(raw_name, "unexpected number of components")),
        };

        debug!(name = raw_name, key = %key, "Resolved agent name");
        Ok(key)
    }

    /// Providers of `class` that carry `agent_type`.
    pub fn providers_for_type(
        &self,
        agent_type: &str,
        class: &str,
    ) -> Result<BTreeSet<String>, ResolutionError> {
        let mut providers = BTreeSet::new();
        for provider in self.catalog.list_providers(class)? {
            if self
                .catalog
                .list_types(class, Some(&provider))?
                .contains(agent_type)
            {
                providers.insert(provider);
            }
        }
        Ok(providers)
    }

    /// Old `info <type> <class> [<provider>]` form; tokens are taken literally.
    fn resolve_legacy(
        &self,
        agent_type: &str,
        class: &str,
        provider: Option<&str>,
    ) -> Result<AgentKey, ResolutionError> {
        let display = format!("{} {} {}", agent_type, class, provider.unwrap_or(""))
            .trim_end()
            .to_string();
        if agent_type.is_empty() || class.is_empty() || provider.is_some_and(str::is_empty) {
            return Err(malformed(&display, "empty component"));
        }
        if agent_type.contains(SEPARATOR) || class.contains(SEPARATOR) {
            return Err(malformed(&display, "legacy form does not take ':'"));
        }
        let tokens = [Some(agent_type), Some(class), provider];
        if let Some(reason) = tokens.into_iter().flatten().find_map(path_problem) {
            return Err(malformed(&display, reason));
        }
        Ok(match self.catalog.class_kind(class) {
            ClassKind::ProviderBearing => AgentKey::provider(
                class,
                provider.unwrap_or(&self.settings.legacy_provider),
                agent_type,
            ),
            ClassKind::Simple => AgentKey::simple(class, agent_type),
        })
    }

    fn provider_candidates(
        &self,
        class: &str,
        agent_type: &str,
    ) -> Result<BTreeSet<AgentKey>, ResolutionError> {
        Ok(self
            .providers_for_type(agent_type, class)?
            .into_iter()
            .map(|provider| AgentKey::provider(class, provider, agent_type))
            .collect())
    }
}

fn structural_problem(parts: &[&str]) -> Option<&'static str> {
    if parts.len() > 3 {
        return Some("more than three ':'-separated components");
    }
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Some("empty component");
    }
    parts.iter().find_map(|p| path_problem(p))
}

/// Components become path segments under `resource.d`; they must stay there.
fn path_problem(component: &str) -> Option<&'static str> {
    if component.contains('/') || component.contains('\0') {
        return Some("component contains '/' or NUL");
    }
    if component == "." || component == ".." {
        return Some("component is a relative path segment");
    }
    None
}

fn malformed(name: &str, reason: &str) -> ResolutionError {
    ResolutionError::MalformedInput {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn pick_single(
    raw_name: &str,
    candidates: BTreeSet<AgentKey>,
) -> Result<AgentKey, ResolutionError> {
    let mut iter = candidates.into_iter();
    match (iter.next(), iter.next()) {
        (None, _) => Err(ResolutionError::NotFound(raw_name.to_string())),
        (Some(key), None) => Ok(key),
        (Some(first), Some(second)) => {
            let candidates = [first, second]
                .into_iter()
                .chain(iter)
                .map(|k| k.to_string())
                .collect();
            Err(ResolutionError::Ambiguous {
                name: raw_name.to_string(),
                candidates,
            })
        }
    }
}
