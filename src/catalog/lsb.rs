//! LSB init scripts carry no metadata action; a document is synthesised from
//! the `### BEGIN INIT INFO` comment block.

const BEGIN_MARKER: &str = "### BEGIN INIT INFO";
const END_MARKER: &str = "### END INIT INFO";

const LSB_ACTIONS: &[(&str, &str)] = &[
    ("meta-data", r#"timeout="5s""#),
    ("start", r#"timeout="15s""#),
    ("stop", r#"timeout="15s""#),
    ("status", r#"timeout="15s""#),
    ("restart", r#"timeout="15s""#),
    ("force-reload", r#"timeout="15s""#),
    ("monitor", r#"timeout="15s" interval="15s""#),
];

/// Descriptions pulled out of an init script header.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitInfo {
    pub short_description: Option<String>,
    pub description: Option<String>,
}

/// Extract `Short-Description` and `Description` (with continuation lines).
pub fn parse_init_info(script: &str) -> InitInfo {
    let mut info = InitInfo::default();
    let mut in_block = false;
    let mut in_description = false;

    for line in script.lines() {
        let trimmed = line.trim_end();
        if trimmed == BEGIN_MARKER {
            in_block = true;
            continue;
        }
        if !in_block {
            continue;
        }
        if trimmed == END_MARKER {
            break;
        }

        let Some(body) = trimmed.strip_prefix('#') else {
            in_description = false;
            continue;
        };

        // Continuation lines start with "#" followed by at least two blanks or a tab.
        if in_description && (body.starts_with("  ") || body.starts_with('\t')) {
            if let Some(desc) = info.description.as_mut() {
                desc.push(' ');
                desc.push_str(body.trim());
            }
            continue;
        }
        in_description = false;

        if let Some(value) = body.trim_start().strip_prefix("Short-Description:") {
            info.short_description = Some(value.trim().to_string());
        } else if let Some(value) = body.trim_start().strip_prefix("Description:") {
            info.description = Some(value.trim().to_string());
            in_description = true;
        }
    }

    info
}

/// Build a `<resource-agent>` document for the init script `name`.
pub fn synthesize_metadata(name: &str, script: &str) -> String {
    let info = parse_init_info(script);
    let shortdesc = info
        .short_description
        .clone()
        .unwrap_or_else(|| format!("{} init script", name));
    let longdesc = info.description.unwrap_or_else(|| shortdesc.clone());

    let mut doc = String::from("<?xml version=\"1.0\"?>\n");
    doc.push_str(&format!(
        "<resource-agent name=\"{}\" version=\"0.0\">\n",
        escape(name)
    ));
    doc.push_str("  <version>1.0</version>\n");
    doc.push_str(&format!(
        "  <longdesc lang=\"en\">{}</longdesc>\n",
        escape(&longdesc)
    ));
    doc.push_str(&format!(
        "  <shortdesc lang=\"en\">{}</shortdesc>\n",
        escape(&shortdesc)
    ));
    doc.push_str("  <parameters/>\n  <actions>\n");
    for (action, attrs) in LSB_ACTIONS {
        doc.push_str(&format!("    <action name=\"{}\" {}/>\n", action, attrs));
    }
    doc.push_str("  </actions>\n</resource-agent>\n");
    doc
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
