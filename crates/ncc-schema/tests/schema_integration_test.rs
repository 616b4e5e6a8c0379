//! Integration tests for schema loading and resolution over the router fixtures

use ncc_schema::{LeafKind, ModelOptions, SchemaError, SchemaLoader, SchemaModel, SchemaSource};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/router")
}

fn load(options: ModelOptions) -> Arc<SchemaModel> {
    SchemaLoader::new(vec![fixture_dir()])
        .with_options(options)
        .load()
        .expect("router fixtures should load")
}

const ROUTER: [&str; 3] = ["config", "authority", "router"];

#[test]
fn test_structure_across_modules() {
    let model = load(ModelOptions::default());

    assert!(model.is_container(&["config"]));
    assert!(model.is_container(&ROUTER));
    assert!(model.is_container(&["config", "authority", "router", "routing", "static-route"]));
    assert!(model.is_leaf(&["config", "authority", "name"]));
    assert!(model.is_leaf(&["config", "authority", "description"]));
    assert!(!model.is_container(&["config", "authority", "name"]));
    assert!(!model.is_leaf(&["config", "authority", "nonexistent"]));

    let stats = model.stats();
    assert_eq!(stats.files, 6);
    assert_eq!(stats.modules, 6);
    assert_eq!(stats.containers, 16);
    assert_eq!(stats.leaves, 31);
    assert_eq!(stats.groupings_inlined, 5);
    assert_eq!(stats.augments_staged, 6);
    assert_eq!(stats.augments_merged, 5);
}

#[test]
fn test_list_keys_in_declaration_order() {
    let model = load(ModelOptions::default());

    assert_eq!(model.container_keys(&ROUTER), ["name"]);
    assert_eq!(
        model.container_keys(&["config", "authority", "router", "routing", "static-route"]),
        ["destination-prefix", "distance"]
    );
    assert_eq!(
        model.container_keys(&["config", "authority", "tenant", "member"]),
        ["neighborhood", "address"]
    );
    assert!(model.container_keys(&["config", "authority"]).is_empty());
}

#[test]
fn test_namespace_declarations_and_fallback() {
    let model = load(ModelOptions::default());

    let ns = model.resolve_namespace(&["config"]).unwrap();
    assert_eq!(ns.prefix, "acme");
    assert_eq!(ns.uri, "http://example.com/acme");

    assert_eq!(model.namespace_at(&["config", "authority"]).unwrap().prefix, "authy");
    assert!(model.namespace_at(&ROUTER).is_none());
    assert_eq!(model.resolve_namespace(&ROUTER).unwrap().prefix, "authy");

    let routing = ["config", "authority", "router", "routing"];
    assert_eq!(model.namespace_at(&routing).unwrap().prefix, "rt");

    // Container reached through choice/case inside an augment of an augment
    let bgp = ["config", "authority", "router", "routing", "routing-protocol", "bgp"];
    assert_eq!(model.namespace_at(&bgp).unwrap().prefix, "bgp");
    let hold_time = [
        "config",
        "authority",
        "router",
        "routing",
        "routing-protocol",
        "bgp",
        "timers",
        "hold-time",
    ];
    assert_eq!(model.resolve_namespace(&hold_time).unwrap().prefix, "bgp");
    assert_eq!(
        model
            .resolve_namespace(&["config", "authority", "router", "routing", "routing-protocol", "type"])
            .unwrap()
            .prefix,
        "rt"
    );

    // Nodes copied in from another module's grouping belong to the user
    let service_name = ["config", "authority", "service", "name"];
    assert_eq!(model.resolve_namespace(&service_name).unwrap().prefix, "svc");
}

#[test]
fn test_identity_values() {
    let model = load(ModelOptions::default());

    let security = ["config", "authority", "router", "security"];
    assert!(model.is_identity(&security));
    assert_eq!(model.identity_prefix(&security, "aes1"), Some("authy"));
    assert_eq!(model.identity_prefix(&security, "aes2"), Some("authy"));
    assert_eq!(model.identity_prefix(&security, "rot13"), None);

    let protocol = ["config", "authority", "router", "routing", "routing-protocol", "type"];
    assert_eq!(model.identity_prefix(&protocol, "bgp"), Some("bgp"));
    assert_eq!(model.identity_prefix(&protocol, "static"), Some("rt"));

    let afi = [
        "config",
        "authority",
        "router",
        "routing",
        "routing-protocol",
        "bgp",
        "neighbor",
        "address-family",
        "afi-safi-type",
    ];
    assert_eq!(model.identity_prefix(&afi, "multicast"), Some("rt"));
    assert_eq!(model.identity_prefix(&afi, "unicast"), Some("bgp"));
    // Derived from unicast, not directly from address-family
    assert_eq!(model.identity_prefix(&afi, "ipv4-unicast"), Some("bgp"));

    assert!(!model.is_identity(&["config", "authority", "name"]));
}

#[test]
fn test_namespace_filter() {
    let all = load(ModelOptions::default());
    assert!(all.is_container(&["config", "external"]));

    let filtered = load(ModelOptions::new().with_namespace_filter("example.com/acme"));
    assert_eq!(filtered.stats().modules, 5);
    assert!(!filtered.is_container(&["config", "external"]));
    assert!(filtered.is_container(&ROUTER));
}

#[test]
fn test_entries_dump() {
    let model = load(ModelOptions::default());
    let entries = model.entries();

    let routing_stack = entries
        .iter()
        .find(|e| e.path == "config/authority/service-route/routing-stack")
        .unwrap();
    assert_eq!(routing_stack.entry.leaf, Some(LeafKind::Leaf));

    let json = serde_json::to_string(&entries).unwrap();
    assert!(json.contains(r#""path":"config/authority/router""#));
    assert!(json.contains(r#""leaf":"leaf-list""#));
}

#[test]
fn test_layering_last_file_wins_for_root() -> anyhow::Result<()> {
    let module = |prefix: &str| {
        format!(
            r#"<module name="{prefix}" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
  <namespace uri="urn:{prefix}"/><prefix value="{prefix}"/><container name="config"/>
</module>"#
        )
    };
    let sources = vec![
        SchemaSource::new("a.yin", module("first")),
        SchemaSource::new("b.yin", module("second")),
    ];
    // Files are processed in descending name order, so a.yin is layered last.
    let model = SchemaModel::build(&sources, &ModelOptions::default())?;
    assert_eq!(model.root_namespace().prefix, "first");
    Ok(())
}

#[test]
fn test_cycle_fails_build() {
    let source = SchemaSource::new(
        "loop.yin",
        r#"<module name="loop" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
  <namespace uri="urn:loop"/><prefix value="lp"/>
  <grouping name="a"><uses name="lp:b"/></grouping>
  <grouping name="b"><uses name="a"/></grouping>
  <container name="config"><uses name="a"/></container>
</module>"#,
    );
    match SchemaModel::build(&[source], &ModelOptions::default()).unwrap_err() {
        SchemaError::GroupingCycle { name, .. } => assert_eq!(name, "a"),
        e => panic!("Expected GroupingCycle, got {:?}", e),
    }
}
