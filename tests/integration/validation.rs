use std::time::Duration;

use rakit::agent::{
    AgentKey, ClassifiedMessage, MessageLevel, MetadataLoader, ValidationInvoker,
    ValidationParameter,
};
use rakit::error::InvokeError;
use serial_test::serial;

use crate::support::{AgentTree, PLAIN_METADATA, VALIDATING_METADATA};

fn invoker(tree: &AgentTree) -> ValidationInvoker {
    ValidationInvoker::new(MetadataLoader::new(tree.catalog()), tree.ocf_root())
}

fn ipaddr2() -> AgentKey {
    AgentKey::provider("ocf", "heartbeat", "IPaddr2")
}

#[test]
#[serial]
fn failing_validation_classifies_lines_in_order() {
    let tree = AgentTree::new();
    tree.add_ocf_agent(
        "heartbeat",
        "IPaddr2",
        VALIDATING_METADATA,
        "echo 'ERROR: bad ip'\necho 'WARNING: deprecated'\necho 'just text'\nexit 1",
    );

    let outcome = invoker(&tree).validate(&ipaddr2(), &[]).unwrap();
    assert_eq!(
        outcome.messages,
        vec![
            ClassifiedMessage::new(MessageLevel::Error, "bad ip"),
            ClassifiedMessage::new(MessageLevel::Warning, "deprecated"),
            ClassifiedMessage::new(MessageLevel::Raw, "just text"),
        ]
    );
    assert!(!outcome.success);
    assert_eq!(outcome.exit_code, Some(1));
}

#[test]
#[serial]
fn stderr_is_merged_with_stdout() {
    let tree = AgentTree::new();
    tree.add_ocf_agent(
        "heartbeat",
        "IPaddr2",
        VALIDATING_METADATA,
        "echo 'INFO: first'\necho 'ERROR: on stderr' >&2\necho 'INFO: last'\nexit 0",
    );

    let outcome = invoker(&tree).validate(&ipaddr2(), &[]).unwrap();
    let texts: Vec<&str> = outcome.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "on stderr", "last"]);
    assert_eq!(outcome.messages[1].level, MessageLevel::Error);
}

#[test]
#[serial]
fn silent_failure_has_no_messages() {
    let tree = AgentTree::new();
    tree.add_ocf_agent("heartbeat", "IPaddr2", VALIDATING_METADATA, "exit 1");

    let outcome = invoker(&tree).validate(&ipaddr2(), &[]).unwrap();
    assert!(outcome.messages.is_empty());
    assert!(!outcome.success);
}

#[test]
#[serial]
fn error_lines_do_not_override_exit_status() {
    let tree = AgentTree::new();
    tree.add_ocf_agent(
        "heartbeat",
        "IPaddr2",
        VALIDATING_METADATA,
        "echo 'ERROR: looks wrong but is fine'\nexit 0",
    );

    let outcome = invoker(&tree).validate(&ipaddr2(), &[]).unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.messages[0].level, MessageLevel::Error);
}

#[test]
#[serial]
fn parameters_reach_the_agent_environment() {
    let tree = AgentTree::new();
    tree.add_ocf_agent(
        "heartbeat",
        "IPaddr2",
        VALIDATING_METADATA,
        "echo \"INFO: ip=$OCF_RESKEY_IP\"\necho \"INFO: root=$OCF_ROOT\"\nexit 0",
    );

    let outcome = invoker(&tree)
        .validate(&ipaddr2(), &[ValidationParameter::new("ip", "10.0.0.1")])
        .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.messages[0].text, "ip=10.0.0.1");
    assert_eq!(
        outcome.messages[1].text,
        format!("root={}", tree.ocf_root().display())
    );
}

#[test]
#[serial]
fn duplicate_parameter_last_value_wins() {
    let tree = AgentTree::new();
    tree.add_ocf_agent(
        "heartbeat",
        "IPaddr2",
        VALIDATING_METADATA,
        "echo \"$OCF_RESKEY_IP\"\nexit 0",
    );

    let outcome = invoker(&tree)
        .validate(
            &ipaddr2(),
            &[
                ValidationParameter::new("ip", "10.0.0.1"),
                ValidationParameter::new("ip", "10.0.0.2"),
            ],
        )
        .unwrap();
    assert_eq!(outcome.messages, vec![ClassifiedMessage::new(MessageLevel::Raw, "10.0.0.2")]);
}

#[test]
#[serial]
fn repeated_validation_is_stable() {
    let tree = AgentTree::new();
    tree.add_ocf_agent(
        "heartbeat",
        "IPaddr2",
        VALIDATING_METADATA,
        "echo 'WARNING: same every time'\nexit 6",
    );

    let invoker = invoker(&tree);
    let params = [ValidationParameter::new("ip", "192.168.1.1")];
    let first = invoker.validate(&ipaddr2(), &params).unwrap();
    let second = invoker.validate(&ipaddr2(), &params).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.exit_code, Some(6));
}

#[test]
#[serial]
fn agent_without_validate_action_is_never_run() {
    let tree = AgentTree::new();
    let marker = tree.path().join("validate-ran");
    tree.add_ocf_agent(
        "heartbeat",
        "Dummy",
        PLAIN_METADATA,
        &format!("touch '{}'\nexit 0", marker.display()),
    );

    let err = invoker(&tree)
        .validate(&AgentKey::provider("ocf", "heartbeat", "Dummy"), &[])
        .unwrap_err();
    assert!(matches!(err, InvokeError::UnsupportedAction { .. }));
    assert!(!marker.exists());
}

#[test]
#[serial]
fn hung_agent_is_killed_after_timeout() {
    let tree = AgentTree::new();
    tree.add_ocf_agent("heartbeat", "IPaddr2", VALIDATING_METADATA, "sleep 10\nexit 0");

    let err = invoker(&tree)
        .with_timeout(Some(Duration::from_millis(300)))
        .validate(&ipaddr2(), &[])
        .unwrap_err();
    assert!(matches!(err, InvokeError::TimedOut { .. }));
}

#[test]
#[serial]
fn background_child_holding_output_still_times_out() {
    let tree = AgentTree::new();
    tree.add_ocf_agent("heartbeat", "IPaddr2", VALIDATING_METADATA, "sleep 5 &\nexit 0");

    let started = std::time::Instant::now();
    let err = invoker(&tree)
        .with_timeout(Some(Duration::from_millis(300)))
        .validate(&ipaddr2(), &[])
        .unwrap_err();
    assert!(matches!(err, InvokeError::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(3));
}
