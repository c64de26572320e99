//! Parsed resource agent metadata documents.
//!
//! Agents describe themselves with a `<resource-agent>` XML document listing
//! their parameters and supported actions.

use serde::{Deserialize, Serialize};

/// One `<parameter>` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub required: bool,
    pub unique: bool,
    pub content_type: Option<String>,
    pub default: Option<String>,
    pub shortdesc: Option<String>,
    pub longdesc: Option<String>,
}

/// One `<action>` entry with its advisory attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    pub timeout: Option<String>,
    pub interval: Option<String>,
    pub depth: Option<String>,
    pub role: Option<String>,
    pub start_delay: Option<String>,
}

/// Structured form of an agent's metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub shortdesc: Option<String>,
    pub longdesc: Option<String>,
    pub parameters: Vec<ParameterSpec>,
    pub actions: Vec<ActionSpec>,
}

impl AgentMetadata {
    /// Parse raw metadata text. The error string describes why parsing failed.
    pub fn parse(text: &str) -> Result<Self, String> {
        if text.trim().is_empty() {
            return Err("metadata document is empty".to_string());
        }

        // Agents commonly emit a DOCTYPE pointing at ra-api-1.dtd.
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc =
            roxmltree::Document::parse_with_options(text, options).map_err(|e| e.to_string())?;
        let root = doc.root_element();
        if root.tag_name().name() != "resource-agent" {
            return Err(format!(
                "expected <resource-agent> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let version = root
            .attribute("version")
            .map(str::to_string)
            .or_else(|| child_text(root, "version"));

        let parameters = match child(root, "parameters") {
            Some(list) => list
                .children()
                .filter(|n| n.has_tag_name("parameter"))
                .map(parse_parameter)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let actions = match child(root, "actions") {
            Some(list) => list
                .children()
                .filter(|n| n.has_tag_name("action"))
                .map(parse_action)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            name: root.attribute("name").map(str::to_string),
            version,
            shortdesc: child_text(root, "shortdesc"),
            longdesc: child_text(root, "longdesc"),
            parameters,
            actions,
        })
    }

    /// True iff an action with exactly this name is declared.
    pub fn supports_action(&self, action_name: &str) -> bool {
        self.actions.iter().any(|a| a.name == action_name)
    }

    pub fn action(&self, action_name: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.name == action_name)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

fn child<'a, 'i>(node: roxmltree::Node<'a, 'i>, tag: &str) -> Option<roxmltree::Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text(node: roxmltree::Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true") | Some("yes"))
}

fn parse_parameter(node: roxmltree::Node<'_, '_>) -> Result<ParameterSpec, String> {
    let name = node
        .attribute("name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "parameter without a name".to_string())?;
    let content = child(node, "content");
    Ok(ParameterSpec {
        name: name.to_string(),
        required: is_truthy(node.attribute("required")),
        unique: is_truthy(node.attribute("unique")),
        content_type: content.and_then(|c| c.attribute("type")).map(str::to_string),
        default: content
            .and_then(|c| c.attribute("default"))
            .map(str::to_string),
        shortdesc: child_text(node, "shortdesc"),
        longdesc: child_text(node, "longdesc"),
    })
}

fn parse_action(node: roxmltree::Node<'_, '_>) -> Result<ActionSpec, String> {
    let name = node
        .attribute("name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "action without a name".to_string())?;
    let attr = |key: &str| node.attribute(key).map(str::to_string);
    Ok(ActionSpec {
        name: name.to_string(),
        timeout: attr("timeout"),
        interval: attr("interval"),
        depth: attr("depth"),
        role: attr("role"),
        start_delay: attr("start-delay"),
    })
}
