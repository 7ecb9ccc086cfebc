//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use xmldb_yang::{Keyword, YangSpec};

fn interfaces_spec() -> YangSpec {
    let mut spec = YangSpec::new();
    spec.add_module("ietf-yang-types", "yang", "urn:ietf:yang-types");
    let module =
        spec.add_module("ietf-interfaces", "if", "urn:ietf:interfaces");
    spec.add_import(module, "ietf-yang-types", "yang");
    let interfaces = spec.add_container(module, "interfaces");
    let interface = spec.add_list(interfaces, "interface", "name");
    spec.add_leaf(interface, "name", "string", None);
    spec.add_leaf(interface, "enabled", "boolean", Some("true"));
    let choice = spec.add(interface, Keyword::Choice, Some("address"));
    let case = spec.add(choice, Keyword::Case, Some("v4"));
    spec.add_leaf(case, "ipv4", "string", None);
    spec
}

#[test]
fn test_module_lookups() {
    let spec = interfaces_spec();
    let module = spec.find_module("ietf-interfaces").unwrap();
    assert_eq!(spec.module_prefix(module), Some("if"));
    assert_eq!(spec.module_namespace(module), Some("urn:ietf:interfaces"));
    assert_eq!(
        spec.module_imports(module).collect::<Vec<_>>(),
        vec![("ietf-yang-types", "yang")]
    );
    assert_eq!(spec.find_module_by_namespace("urn:ietf:interfaces"), Some(module));
    assert_eq!(spec.find_module_by_prefix("yang"), spec.find_module("ietf-yang-types"));
    assert_eq!(spec.find_module("ietf-ip"), None);
    assert_eq!(spec.modules().count(), 2);
}

#[test]
fn test_find_child_through_choice() {
    let spec = interfaces_spec();
    let module = spec.find_module("ietf-interfaces").unwrap();
    let interfaces = spec.find_child(module, None, "interfaces").unwrap();
    let interface = spec
        .find_child(interfaces, Some(Keyword::List), "interface")
        .unwrap();
    assert_eq!(spec.list_keys(interface), vec!["name"]);

    let ipv4 = spec.find_child(interface, None, "ipv4").unwrap();
    assert_eq!(spec.keyword(ipv4), Keyword::Leaf);
    assert!(spec.in_choice(ipv4));
    assert_eq!(spec.node_namespace(ipv4), Some("urn:ietf:interfaces"));

    let enabled = spec.find_child(interface, None, "enabled").unwrap();
    assert_eq!(spec.default_value(enabled), Some("true"));
    assert_eq!(spec.type_name(enabled), Some("boolean"));
    assert!(spec.find_child(interface, Some(Keyword::Container), "enabled").is_none());

    let names = spec
        .data_children(interface)
        .into_iter()
        .filter_map(|id| spec.argument(id))
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["name", "enabled", "ipv4"]);
}

#[test]
fn test_submodule_namespace() {
    let mut spec = YangSpec::new();
    spec.add_module("example", "ex", "urn:example");
    let submodule =
        spec.add(spec.root(), Keyword::Submodule, Some("example-sub"));
    let belongs_to = spec.add(submodule, Keyword::BelongsTo, Some("example"));
    spec.add(belongs_to, Keyword::Prefix, Some("ex"));
    let container = spec.add_container(submodule, "settings");

    assert_eq!(spec.node_prefix(container), Some("ex"));
    assert_eq!(spec.node_namespace(container), Some("urn:example"));
    assert_eq!(spec.node_main_module(container), spec.find_module("example"));
    // Submodules aren't reported as modules.
    assert_eq!(spec.modules().count(), 1);
}

#[test]
fn test_json_roundtrip() {
    let spec = interfaces_spec();
    let json = spec.to_json();
    let decoded = YangSpec::from_json(&json).unwrap();
    assert_eq!(decoded.to_json(), json);

    let module = decoded.find_module("ietf-interfaces").unwrap();
    assert_eq!(decoded.module_namespace(module), Some("urn:ietf:interfaces"));
}

#[test]
fn test_json_decode_error() {
    assert!(YangSpec::from_json(r#"[{"keyword": "bogus"}]"#).is_err());
    assert!(YangSpec::from_json("not json").is_err());
}
