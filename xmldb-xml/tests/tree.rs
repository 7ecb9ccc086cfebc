//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use xmldb_xml::{
    Error, NodeFlags, NodeKind, PrintOpts, ResolveCtx, XmlTree,
};
use xmldb_yang::{Keyword, YangSpec};

//
// Helper functions.
//

fn interfaces_spec() -> YangSpec {
    let mut spec = YangSpec::new();
    let module =
        spec.add_module("ietf-interfaces", "if", "urn:ietf:interfaces");
    let interfaces = spec.add_container(module, "interfaces");
    let interface = spec.add_list(interfaces, "interface", "name");
    spec.add_leaf(interface, "name", "string", None);
    spec.add_leaf(interface, "mtu", "uint16", Some("1500"));
    let options = spec.add_container(interface, "options");
    spec.add_leaf(options, "trace", "boolean", Some("false"));
    let settings = spec.add_container(module, "settings");
    spec.add_leaf(settings, "hostname", "string", Some("router"));
    spec.add_leaf(module, "mode", "string", Some("normal"));
    spec.add(module, Keyword::Anydata, Some("extra"));
    spec
}

fn print(tree: &XmlTree) -> String {
    tree.print(tree.root(), PrintOpts::default()).unwrap()
}

//
// Tests.
//

#[test]
fn test_new_node_document_order() {
    let mut tree = XmlTree::new("config");
    let root = tree.root();
    let a = tree.new_node("a", Some(root), NodeKind::Element).unwrap();
    let b = tree.new_node("b", Some(root), NodeKind::Element).unwrap();
    let c = tree.new_node("c", Some(root), NodeKind::Element).unwrap();

    assert_eq!(tree.children(root, None).collect::<Vec<_>>(), vec![a, b, c]);
    assert_eq!(tree.node(b).parent(), Some(root));
    assert!(tree.node(root).flags().contains(NodeFlags::TOP));
    assert!(!tree.node(a).flags().contains(NodeFlags::TOP));

    // Children of non-element nodes can't be created.
    let attr = tree.add_attribute(a, None, "id", "1").unwrap();
    assert!(matches!(
        tree.new_node("x", Some(attr), NodeKind::Element),
        Err(Error::NodeCreate(_))
    ));
}

#[test]
fn test_children_filter_and_restart() {
    let tree = XmlTree::parse(r#"<a x="1" y="2"><b/>text<c/></a>"#).unwrap();
    let root = tree.root();

    assert_eq!(tree.children(root, None).count(), 5);
    assert_eq!(tree.children(root, Some(NodeKind::Attribute)).count(), 2);
    assert_eq!(tree.children(root, Some(NodeKind::Element)).count(), 2);
    assert_eq!(tree.body(root), Some("text"));

    // A new iterator starts over from the first child.
    let first = tree.children(root, Some(NodeKind::Element)).next();
    let again = tree.children(root, Some(NodeKind::Element)).next();
    assert_eq!(first, again);
    assert_eq!(tree.node(first.unwrap()).name(), "b");
}

#[test]
fn test_attribute_uniqueness() {
    let mut tree = XmlTree::new("a");
    let root = tree.root();
    let first = tree.add_attribute(root, None, "id", "1").unwrap();
    let second = tree.add_attribute(root, None, "id", "2").unwrap();
    assert_eq!(first, second);
    assert_eq!(tree.find_value(root, None, "id", NodeKind::Attribute), Some("2"));

    // Namespace declarations are keyed by prefix.
    tree.add_attribute(root, Some("xmlns"), "id", "urn:id").unwrap();
    assert_eq!(tree.child_count_of(root, NodeKind::Attribute), 2);
    assert!(matches!(
        tree.new_node("id", Some(root), NodeKind::Attribute),
        Err(Error::NodeCreate(_))
    ));
}

#[test]
fn test_attribute_on_non_element() {
    let mut tree = XmlTree::parse("<a><b>1</b></a>").unwrap();
    let root = tree.root();
    let attr = tree.add_attribute(root, None, "id", "1").unwrap();
    let b = tree.find(root, None, "b", NodeKind::Element).unwrap();
    let body = tree.children(b, Some(NodeKind::Body)).next().unwrap();
    let len = tree.len();

    assert!(matches!(
        tree.add_attribute(body, None, "x", "1"),
        Err(Error::NodeCreate(_))
    ));
    assert!(matches!(
        tree.add_attribute(attr, None, "x", "1"),
        Err(Error::NodeCreate(_))
    ));
    assert_eq!(tree.len(), len);
}

#[test]
fn test_sort_attributes() {
    let mut tree = XmlTree::parse(
        r#"<a x="1" xmlns:p="urn:p" y="2" xmlns="urn:d"><b/></a>"#,
    )
    .unwrap();
    let root = tree.root();
    tree.sort(root);

    let names = |tree: &XmlTree| {
        tree.children(root, None)
            .map(|child| tree.node(child).qname())
            .collect::<Vec<_>>()
    };
    let expected = vec!["xmlns:p", "xmlns", "x", "y", "b"];
    assert_eq!(names(&tree), expected);

    // Sorting is idempotent.
    tree.sort(root);
    assert_eq!(names(&tree), expected);
}

#[test]
fn test_copy_deep_and_independent() {
    let src = XmlTree::parse(
        r#"<config xmlns="urn:a"><system><name>r1</name></system></config>"#,
    )
    .unwrap();
    let mut copy = src.duplicate();
    assert!(src.subtree_eq(src.root(), &copy, copy.root()));

    let system = copy
        .find(copy.root(), None, "system", NodeKind::Element)
        .unwrap();
    copy.add_element(system, None, "location").unwrap();
    assert!(!src.subtree_eq(src.root(), &copy, copy.root()));
    assert_eq!(print(&src), r#"<config xmlns="urn:a"><system><name>r1</name></system></config>"#);
}

#[test]
fn test_copy_conflict() {
    let mut tree = XmlTree::parse("<a><b><c/></b><d><e/></d></a>").unwrap();
    let root = tree.root();
    let b = tree.find(root, None, "b", NodeKind::Element).unwrap();
    let d = tree.find(root, None, "d", NodeKind::Element).unwrap();
    assert!(matches!(tree.copy(b, d), Err(Error::CopyConflict)));

    let empty = tree.add_element(root, None, "f").unwrap();
    tree.copy(b, empty).unwrap();
    assert_eq!(tree.node(empty).name(), "b");
    assert!(tree.find(empty, None, "c", NodeKind::Element).is_some());
}

#[test]
fn test_copy_keeps_schema_drops_cache() {
    let spec = interfaces_spec();
    let mut tree = XmlTree::parse(
        r#"<config><interfaces xmlns="urn:ietf:interfaces"><interface><name>eth0</name><mtu>9000</mtu></interface></interfaces></config>"#,
    )
    .unwrap();
    let ctx = ResolveCtx::default();
    tree.bind_schema(&spec, &ctx).unwrap();
    let interfaces = tree
        .find(tree.root(), None, "interfaces", NodeKind::Element)
        .unwrap();
    tree.resolve(interfaces, None, &ctx).unwrap();
    assert!(tree.node(interfaces).nscache().is_some());

    let copy = tree.subtree(interfaces).unwrap();
    assert!(copy.node(copy.root()).nscache().is_none());
    assert_eq!(copy.node(copy.root()).schema(), tree.node(interfaces).schema());
}

#[test]
fn test_free() {
    let mut tree = XmlTree::parse("<a><b><c/><d/></b><e/></a>").unwrap();
    let root = tree.root();
    let b = tree.find(root, None, "b", NodeKind::Element).unwrap();
    let c = tree.find(b, None, "c", NodeKind::Element).unwrap();
    tree.free(b);
    assert!(!tree.contains(b));
    assert!(!tree.contains(c));
    assert_eq!(tree.child_count(root), 1);

    // Stale indices are ignored.
    tree.free(b);

    tree.free(root);
    assert!(tree.contains(root));
    assert_eq!(tree.child_count(root), 0);
    assert!(tree.is_empty());
}

#[test]
fn test_attach_detach() {
    let mut tree = XmlTree::parse("<a><b><c/></b><d/></a>").unwrap();
    let root = tree.root();
    let b = tree.find(root, None, "b", NodeKind::Element).unwrap();
    let c = tree.find(b, None, "c", NodeKind::Element).unwrap();
    let d = tree.find(root, None, "d", NodeKind::Element).unwrap();

    tree.detach(c).unwrap();
    assert_eq!(tree.node(c).parent(), None);
    tree.attach(d, c).unwrap();
    assert_eq!(tree.node(c).parent(), Some(d));
    assert_eq!(tree.path(c), "/d/c");

    // A node can't be attached below itself.
    tree.detach(d).unwrap();
    assert!(tree.attach(c, d).is_err());
}

#[test]
fn test_parse_print() {
    let text = r#"<config xmlns="urn:a" xmlns:b="urn:b"><b:x attr="&lt;1&gt;">a &amp; b</b:x><y/></config>"#;
    let tree = XmlTree::parse(text).unwrap();
    let x = tree.find(tree.root(), Some("b"), "x", NodeKind::Element).unwrap();
    assert_eq!(tree.body(x), Some("a & b"));
    assert_eq!(tree.find_value(x, None, "attr", NodeKind::Attribute), Some("<1>"));
    assert_eq!(print(&tree), text);

    let pretty = tree
        .print(tree.root(), PrintOpts { pretty: true, skip_defaults: false })
        .unwrap();
    assert!(pretty.contains("\n  <b:x"));
}

#[test]
fn test_parse_errors() {
    assert!(XmlTree::parse("").is_err());
    assert!(XmlTree::parse("<a/><b/>").is_err());
    assert!(XmlTree::parse("<a><b></a>").is_err());
    assert!(XmlTree::parse("<a>").is_err());
    assert!(XmlTree::parse("text").is_err());
}

#[test]
fn test_parse_fragment() {
    let mut tree = XmlTree::new("config");
    let root = tree.root();
    let top = tree.parse_fragment(root, "<a>1</a><b><c/></b>").unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(tree.find_value(root, None, "a", NodeKind::Element), Some("1"));
}

#[test]
fn test_merge() {
    let spec = interfaces_spec();
    let ctx = ResolveCtx::default();
    let mut running = XmlTree::parse(
        r#"<config><interfaces xmlns="urn:ietf:interfaces"><interface><name>eth0</name><mtu>1500</mtu></interface></interfaces></config>"#,
    )
    .unwrap();
    running.bind_schema(&spec, &ctx).unwrap();
    let mut edit = XmlTree::parse(
        r#"<config><interfaces xmlns="urn:ietf:interfaces"><interface><name>eth0</name><mtu>9000</mtu></interface><interface><name>eth1</name></interface></interfaces></config>"#,
    )
    .unwrap();
    edit.bind_schema(&spec, &ctx).unwrap();

    let root = running.root();
    running.merge(root, &edit, edit.root(), Some(&spec)).unwrap();
    assert_eq!(
        print(&running),
        r#"<config><interfaces xmlns="urn:ietf:interfaces"><interface><name>eth0</name><mtu>9000</mtu></interface><interface><name>eth1</name></interface></interfaces></config>"#
    );
}

#[test]
fn test_diff() {
    let spec = interfaces_spec();
    let ctx = ResolveCtx::default();
    let mut old = XmlTree::parse(
        r#"<config><interfaces xmlns="urn:ietf:interfaces"><interface><name>eth0</name><mtu>1500</mtu></interface><interface><name>eth1</name></interface></interfaces></config>"#,
    )
    .unwrap();
    old.bind_schema(&spec, &ctx).unwrap();
    let mut new = XmlTree::parse(
        r#"<config><interfaces xmlns="urn:ietf:interfaces"><interface><name>eth0</name><mtu>9000</mtu></interface><interface><name>eth2</name></interface></interfaces></config>"#,
    )
    .unwrap();
    new.bind_schema(&spec, &ctx).unwrap();

    let diff = old.diff(old.root(), &new, new.root(), Some(&spec));
    assert_eq!(diff.removed.len(), 1);
    assert_eq!(diff.added.len(), 1);
    assert_eq!(diff.changed.len(), 1);
    let (before, after) = diff.changed[0];
    assert_eq!(old.body(before), Some("1500"));
    assert_eq!(new.body(after), Some("9000"));

    let copy = old.duplicate();
    assert!(old.diff(old.root(), &copy, copy.root(), Some(&spec)).is_empty());
}

#[test]
fn test_bind_and_defaults() {
    let spec = interfaces_spec();
    let ctx = ResolveCtx::default();
    let mut tree = XmlTree::parse(
        r#"<config><interfaces xmlns="urn:ietf:interfaces"><interface><name>eth0</name></interface></interfaces></config>"#,
    )
    .unwrap();
    assert_eq!(tree.bind_schema(&spec, &ctx).unwrap(), xmldb_xml::Bind::Bound);

    tree.add_global_defaults(&spec).unwrap();
    let root = tree.root();
    tree.add_defaults(root, &spec).unwrap();

    let interfaces = tree.find(root, None, "interfaces", NodeKind::Element).unwrap();
    let interface = tree.find(interfaces, None, "interface", NodeKind::Element).unwrap();
    assert_eq!(tree.find_value(interface, None, "mtu", NodeKind::Element), Some("1500"));
    let options = tree.find(interface, None, "options", NodeKind::Element).unwrap();
    assert_eq!(tree.find_value(options, None, "trace", NodeKind::Element), Some("false"));
    assert!(tree.is_default(options));

    let settings = tree.find(root, None, "settings", NodeKind::Element).unwrap();
    assert_eq!(tree.ns_decl(settings, None), Some("urn:ietf:interfaces"));
    assert_eq!(tree.find_value(root, None, "mode", NodeKind::Element), Some("normal"));

    // Defaults are left out on request.
    let text = tree
        .print(root, PrintOpts { pretty: false, skip_defaults: true })
        .unwrap();
    assert_eq!(
        text,
        r#"<config><interfaces xmlns="urn:ietf:interfaces"><interface><name>eth0</name></interface></interfaces></config>"#
    );
}

#[test]
fn test_bind_unknown() {
    let spec = interfaces_spec();
    let ctx = ResolveCtx::default();

    let mut tree = XmlTree::parse(
        r#"<config><interfaces xmlns="urn:ietf:interfaces"><bogus/></interfaces></config>"#,
    )
    .unwrap();
    assert!(matches!(
        tree.bind_schema(&spec, &ctx).unwrap(),
        xmldb_xml::Bind::NotBound(_)
    ));

    let mut tree =
        XmlTree::parse(r#"<config><interfaces xmlns="urn:other"/></config>"#)
            .unwrap();
    assert!(matches!(
        tree.bind_schema(&spec, &ctx).unwrap(),
        xmldb_xml::Bind::NotBound(_)
    ));
}
