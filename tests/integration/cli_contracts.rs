use std::fs;

use rakit::error::{ApiError, ResolutionError};
use rakit::tooling::cli::{CliContext, Commands, OutputFormat};
use serial_test::serial;
use tempfile::TempDir;

use crate::support::{with_xdg_env, AgentTree, PLAIN_METADATA, VALIDATING_METADATA};

fn populated_tree() -> AgentTree {
    let tree = AgentTree::new();
    tree.add_ocf_agent(
        "heartbeat",
        "IPaddr2",
        VALIDATING_METADATA,
        "[ -n \"$OCF_RESKEY_IP\" ] || { echo 'ERROR: ip is required'; exit 6; }\necho \"INFO: using $OCF_RESKEY_IP\"\nexit 0",
    );
    tree.add_ocf_agent("pacemaker", "Dummy", PLAIN_METADATA, "exit 0");
    tree.add_lsb_script("nginx", "nginx web server");
    tree
}

fn validate(agent: &str, params: &[&str], format: OutputFormat) -> Commands {
    Commands::Validate {
        agent: agent.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
        timeout: None,
        format,
    }
}

#[test]
fn classes_text_lists_providers() {
    let tree = populated_tree();
    let output = tree
        .context()
        .execute(&Commands::Classes {
            format: OutputFormat::Text,
        })
        .unwrap();
    assert_eq!(output.text, "lsb\nocf / heartbeat pacemaker");
}

#[test]
fn classes_json_contract_has_required_fields() {
    let tree = populated_tree();
    let output = tree
        .context()
        .execute(&Commands::Classes {
            format: OutputFormat::Json,
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    let classes = parsed["classes"].as_array().unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[1]["class"], "ocf");
    assert_eq!(classes[1]["kind"], "provider_bearing");
    assert_eq!(classes[1]["providers"][0], "heartbeat");
}

#[test]
fn list_rejects_unknown_class() {
    let tree = populated_tree();
    let err = tree
        .context()
        .execute(&Commands::List {
            class: "upstart".to_string(),
            provider: None,
            format: OutputFormat::Text,
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::UnknownClass(_)));
}

#[test]
#[serial]
fn info_text_renders_agent_sections() {
    let tree = populated_tree();
    let output = tree
        .context()
        .execute(&Commands::Info {
            args: vec!["ocf:IPaddr2".to_string()],
            format: OutputFormat::Text,
        })
        .unwrap();
    assert!(output.text.starts_with(
        "Manages virtual IPv4 and IPv6 addresses (ocf:heartbeat:IPaddr2)"
    ));
    assert!(output.text.contains("ip* (string, []): IPv4 or IPv6 address"));
    assert!(output.text.contains("Operations' defaults (advisory minimum):"));
}

#[test]
#[serial]
fn info_legacy_form_uses_default_provider() {
    let tree = populated_tree();
    let output = tree
        .context()
        .execute(&Commands::Info {
            args: vec!["IPaddr2".to_string(), "ocf".to_string()],
            format: OutputFormat::Json,
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(parsed["key"]["provider"], "heartbeat");
    assert_eq!(parsed["key"]["agent_type"], "IPaddr2");
}

#[test]
#[serial]
fn validate_json_contract_reports_failure() {
    let tree = populated_tree();
    let output = tree
        .context()
        .execute(&validate("IPaddr2", &[], OutputFormat::Json))
        .unwrap();
    assert!(!output.success);

    let parsed: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(parsed["key"]["kind"], "provider");
    assert_eq!(parsed["outcome"]["success"], false);
    assert_eq!(parsed["outcome"]["exit_code"], 6);
    assert_eq!(parsed["outcome"]["messages"][0]["level"], "error");
    assert_eq!(parsed["outcome"]["messages"][0]["text"], "ip is required");
}

#[test]
#[serial]
fn validate_text_succeeds_with_parameters() {
    let tree = populated_tree();
    let output = tree
        .context()
        .execute(&validate(
            "ocf:heartbeat:IPaddr2",
            &["ip=10.0.0.1"],
            OutputFormat::Text,
        ))
        .unwrap();
    assert!(output.success);
    assert_eq!(output.text, "INFO: using 10.0.0.1");
}

#[test]
#[serial]
fn validate_surfaces_resolution_errors() {
    let tree = AgentTree::new();
    tree.add_ocf_agent("heartbeat", "Dummy", PLAIN_METADATA, "exit 0");
    tree.add_ocf_agent("pacemaker", "Dummy", PLAIN_METADATA, "exit 0");

    let err = tree
        .context()
        .execute(&validate("Dummy", &[], OutputFormat::Text))
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Resolution(ResolutionError::Ambiguous { .. })
    ));
}

#[test]
#[serial]
fn context_from_config_file_and_root_override() {
    let temp_dir = TempDir::new().unwrap();
    let tree = populated_tree();
    with_xdg_env(&temp_dir, || {
        let config_path = temp_dir.path().join("rakit.toml");
        fs::write(
            &config_path,
            format!(
                "[paths]\nocf_root = \"/nonexistent\"\nlsb_dir = \"{}\"\n\n[output]\nregression_tests = true\n",
                tree.lsb_dir().display()
            ),
        )
        .unwrap();

        let context = CliContext::new(Some(config_path), Some(tree.ocf_root())).unwrap();
        assert_eq!(context.config().paths.ocf_root, tree.ocf_root());

        let output = context
            .execute(&Commands::List {
                class: "ocf".to_string(),
                provider: None,
                format: OutputFormat::Text,
            })
            .unwrap();
        assert_eq!(output.text, "Dummy\nIPaddr2");

        let output = context
            .execute(&Commands::List {
                class: "lsb".to_string(),
                provider: None,
                format: OutputFormat::Text,
            })
            .unwrap();
        assert_eq!(output.text, "nginx");
    });
}
