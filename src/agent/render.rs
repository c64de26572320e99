//! Human-readable rendering of metadata documents and type listings.

use crate::agent::key::AgentKey;
use crate::agent::metadata::{ActionSpec, AgentMetadata, ParameterSpec};
use comfy_table::presets::NOTHING;
use comfy_table::{ContentArrangement, Table};

const INDENT: &str = "    ";
const LISTING_WIDTH: u16 = 80;

/// Render `metadata` the way `info` shows it.
pub fn render_metadata(key: &AgentKey, metadata: &AgentMetadata) -> String {
    let title = metadata
        .shortdesc
        .as_deref()
        .or(metadata.name.as_deref())
        .unwrap_or("");
    let mut out = if title.is_empty() {
        format!("{}\n", key)
    } else {
        format!("{} ({})\n", title, key)
    };

    if let Some(longdesc) = metadata.longdesc.as_deref() {
        out.push('\n');
        out.push_str(&reflow(longdesc, ""));
        out.push('\n');
    }

    if !metadata.parameters.is_empty() {
        out.push_str("\nParameters (*: required, []: default):\n");
        for param in &metadata.parameters {
            out.push('\n');
            out.push_str(&render_parameter(param));
        }
    }

    if !metadata.actions.is_empty() {
        out.push_str("\nOperations' defaults (advisory minimum):\n\n");
        let width = metadata
            .actions
            .iter()
            .map(|a| action_label(a).len())
            .max()
            .unwrap_or(0);
        for action in &metadata.actions {
            out.push_str(&render_action(action, width));
        }
    }

    out
}

fn render_parameter(param: &ParameterSpec) -> String {
    let mut head = param.name.clone();
    if param.required {
        head.push('*');
    }
    let content_type = param.content_type.as_deref().unwrap_or("string");
    let default = param.default.as_deref().unwrap_or("");
    let mut out = format!("{} ({}, [{}])", head, content_type, default);
    if let Some(short) = param.shortdesc.as_deref() {
        out.push_str(": ");
        out.push_str(short);
    }
    out.push('\n');
    if let Some(long) = param.longdesc.as_deref() {
        if Some(long) != param.shortdesc.as_deref() {
            out.push_str(&reflow(long, INDENT));
            out.push('\n');
        }
    }
    out
}

fn action_label(action: &ActionSpec) -> String {
    match action.role.as_deref() {
        Some(role) => format!("{}_{}", action.name, role),
        None => action.name.clone(),
    }
}

fn render_action(action: &ActionSpec, width: usize) -> String {
    let attributes: Vec<String> = [
        ("timeout", action.timeout.as_deref()),
        ("interval", action.interval.as_deref()),
        ("depth", action.depth.as_deref()),
        ("start-delay", action.start_delay.as_deref()),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| format!("{}={}", name, v)))
    .collect();
    let line = format!(
        "{}{:<width$} {}",
        INDENT,
        action_label(action),
        attributes.join(" "),
        width = width
    );
    format!("{}\n", line.trim_end())
}

/// Collapse the whitespace of each paragraph and prefix every line with `indent`.
fn reflow(text: &str, indent: &str) -> String {
    text.split("\n\n")
        .map(|paragraph| paragraph.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", indent, p))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render type names one per line (regression mode) or in columns.
pub fn render_type_list<'a>(
    types: impl IntoIterator<Item = &'a str>,
    regression_mode: bool,
) -> String {
    let types: Vec<&str> = types.into_iter().collect();
    if types.is_empty() {
        return String::new();
    }
    if regression_mode {
        return types.join("\n");
    }

    let widest = types.iter().map(|t| t.len()).max().unwrap_or(1) + 2;
    let columns = (LISTING_WIDTH as usize / widest).clamp(1, types.len());
    let rows = types.len().div_ceil(columns);

    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Disabled);
    for row in 0..rows {
        // Column-major, like `ls`.
        let cells: Vec<&str> = (0..columns)
            .filter_map(|col| types.get(col * rows + row).copied())
            .collect();
        table.add_row(cells);
    }
    table
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
