use rakit::agent::{AgentKey, AgentResolver, MetadataLoader};
use rakit::config::AgentsConfig;
use rakit::error::{LoadError, ResolutionError};
use serial_test::serial;

use crate::support::{AgentTree, PLAIN_METADATA, VALIDATING_METADATA};

fn populated_tree() -> AgentTree {
    let tree = AgentTree::new();
    tree.add_ocf_agent("heartbeat", "IPaddr2", VALIDATING_METADATA, "exit 0");
    tree.add_ocf_agent("heartbeat", "Dummy", PLAIN_METADATA, "exit 0");
    tree.add_ocf_agent("pacemaker", "Dummy", PLAIN_METADATA, "exit 0");
    tree.add_lsb_script("nginx", "nginx web server");
    tree
}

fn resolver(tree: &AgentTree) -> AgentResolver {
    AgentResolver::new(tree.catalog(), AgentsConfig::default())
}

#[test]
fn resolves_every_name_form() {
    let tree = populated_tree();
    let r = resolver(&tree);

    assert_eq!(
        r.resolve("ocf:heartbeat:IPaddr2", None, None).unwrap(),
        AgentKey::provider("ocf", "heartbeat", "IPaddr2")
    );
    assert_eq!(
        r.resolve("ocf:IPaddr2", None, None).unwrap(),
        AgentKey::provider("ocf", "heartbeat", "IPaddr2")
    );
    assert_eq!(
        r.resolve("IPaddr2", None, None).unwrap(),
        AgentKey::provider("ocf", "heartbeat", "IPaddr2")
    );
    assert_eq!(
        r.resolve("lsb:nginx", None, None).unwrap(),
        AgentKey::simple("lsb", "nginx")
    );
    assert_eq!(
        r.resolve("nginx", None, None).unwrap(),
        AgentKey::simple("lsb", "nginx")
    );
}

#[test]
fn ambiguous_type_lists_sorted_candidates() {
    let tree = populated_tree();
    match resolver(&tree).resolve("Dummy", None, None) {
        Err(ResolutionError::Ambiguous { name, candidates }) => {
            assert_eq!(name, "Dummy");
            assert_eq!(candidates, vec!["ocf:heartbeat:Dummy", "ocf:pacemaker:Dummy"]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn unknown_and_malformed_names() {
    let tree = populated_tree();
    let r = resolver(&tree);
    assert!(matches!(
        r.resolve("NoSuchAgent", None, None),
        Err(ResolutionError::NotFound(_))
    ));
    assert!(matches!(
        r.resolve("upstart:nginx", None, None),
        Err(ResolutionError::NotFound(_))
    ));
    assert!(matches!(
        r.resolve("a:b:c:d", None, None),
        Err(ResolutionError::MalformedInput { .. })
    ));
    assert!(matches!(
        r.resolve("lsb:x:nginx", None, None),
        Err(ResolutionError::MalformedInput { .. })
    ));
}

#[test]
fn fully_qualified_name_is_taken_literally() {
    let tree = populated_tree();
    let key = resolver(&tree)
        .resolve("ocf:missing:Ghost", None, None)
        .unwrap();
    assert_eq!(key, AgentKey::provider("ocf", "missing", "Ghost"));

    let err = MetadataLoader::new(tree.catalog()).load(&key).unwrap_err();
    assert!(matches!(err, LoadError::UnknownAgent(_)));
}

#[test]
fn providers_for_type_follows_the_tree() {
    let tree = populated_tree();
    let providers = resolver(&tree).providers_for_type("Dummy", "ocf").unwrap();
    assert_eq!(
        providers.into_iter().collect::<Vec<_>>(),
        vec!["heartbeat", "pacemaker"]
    );
}

#[test]
#[serial]
fn metadata_comes_from_the_agent_itself() {
    let tree = populated_tree();
    let key = AgentKey::provider("ocf", "heartbeat", "IPaddr2");
    let metadata = MetadataLoader::new(tree.catalog()).load(&key).unwrap();
    assert_eq!(
        metadata.shortdesc.as_deref(),
        Some("Manages virtual IPv4 and IPv6 addresses")
    );
    assert!(metadata.supports_action("validate-all"));
    assert!(metadata.parameter("ip").map(|p| p.required).unwrap_or(false));
}

#[test]
#[serial]
fn lsb_metadata_is_synthesised_from_the_script() {
    let tree = populated_tree();
    let metadata = MetadataLoader::new(tree.catalog())
        .load(&AgentKey::simple("lsb", "nginx"))
        .unwrap();
    assert_eq!(metadata.shortdesc.as_deref(), Some("nginx web server"));
    assert!(metadata.supports_action("monitor"));
    assert!(!metadata.supports_action("validate-all"));
}

#[test]
#[serial]
fn daemon_metadata_resolves_as_meta_target() {
    let tree = populated_tree();
    tree.add_daemon(
        "pengine",
        r#"<resource-agent name="pengine"><shortdesc>Policy engine options</shortdesc></resource-agent>"#,
    );
    let key = resolver(&tree).resolve("pengine", None, None).unwrap();
    assert_eq!(key, AgentKey::meta("pengine"));

    let metadata = MetadataLoader::new(tree.catalog()).load(&key).unwrap();
    assert_eq!(metadata.shortdesc.as_deref(), Some("Policy engine options"));
}

#[test]
fn names_cannot_leave_the_resource_directory() {
    let tree = populated_tree();
    let r = resolver(&tree);
    for name in ["ocf:../../../../../bin:sh", "ocf:heartbeat/../heartbeat:IPaddr2"] {
        assert!(
            matches!(
                r.resolve(name, None, None),
                Err(ResolutionError::MalformedInput { .. })
            ),
            "expected malformed for {name:?}"
        );
    }
    assert!(matches!(
        r.resolve("sh", Some("ocf"), Some("../../../../../bin")),
        Err(ResolutionError::MalformedInput { .. })
    ));
}
