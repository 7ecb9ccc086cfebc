//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use maplit::btreemap;
use xmldb_xml::{Error, NodeIndex, NodeKind, NsContext, ResolveCtx, XmlTree};
use xmldb_yang::{NETCONF_BASE_NAMESPACE, YangSpec};

//
// Helper functions.
//

const CONFIG: &str = r#"<config xmlns:a="urn:a"><top xmlns="urn:d" xmlns:b="urn:b"><mid><a:leaf>1</a:leaf><b:leaf>2</b:leaf><inner xmlns:a="urn:a2"><x/><y/></inner></mid></top></config>"#;

fn element(tree: &XmlTree, path: &[&str]) -> NodeIndex {
    path.iter().fold(tree.root(), |node, name| {
        tree.find(node, None, name, NodeKind::Element).unwrap()
    })
}

// Resolves every (node, prefix) combination of the tree.
fn resolve_all(
    tree: &mut XmlTree,
    ctx: &ResolveCtx,
) -> Vec<Result<String, String>> {
    let mut nodes = vec![tree.root()];
    let mut i = 0;
    while i < nodes.len() {
        nodes.extend(tree.children(nodes[i], Some(NodeKind::Element)));
        i += 1;
    }

    let mut results = vec![];
    for node in nodes {
        for prefix in [None, Some("a"), Some("b"), Some("c")] {
            let result = tree
                .resolve(node, prefix, ctx)
                .map_err(|error| error.to_string());
            results.push(result);
        }
    }
    results
}

fn two_module_spec() -> YangSpec {
    let mut spec = YangSpec::new();
    spec.add_module("module-a", "a", "urn:a");
    let b = spec.add_module("module-b", "b", "urn:b");
    spec.add_import(b, "module-a", "ma");
    spec.add_import(b, "module-missing", "mm");
    spec.add_container(b, "settings");
    spec
}

fn to_map(nsctx: &NsContext) -> BTreeMap<Option<String>, String> {
    nsctx
        .iter()
        .map(|(prefix, uri)| (prefix.map(str::to_owned), uri.to_owned()))
        .collect()
}

//
// Tests.
//

#[test]
fn test_nsctx_add_get() {
    let mut nsctx = NsContext::init(Some("a"), Some("urn:a"));
    nsctx.add(None, "urn:d");
    nsctx.add(Some("b"), "urn:b");
    nsctx.add(Some("a"), "urn:a2");

    assert_eq!(nsctx.len(), 3);
    assert_eq!(nsctx.get(Some("a")), Some("urn:a2"));
    assert_eq!(nsctx.get(None), Some("urn:d"));
    assert_eq!(nsctx.get(Some("c")), None);
    assert_eq!(nsctx.get_prefix("urn:b"), Some(Some("b")));
    assert_eq!(nsctx.get_prefix("urn:d"), Some(None));
    assert_eq!(nsctx.get_prefix("urn:x"), None);
    assert_eq!(
        nsctx.to_string(),
        r#"xmlns:a="urn:a2" xmlns="urn:d" xmlns:b="urn:b""#
    );
    assert!(NsContext::init(Some("a"), None).is_empty());
}

#[test]
fn test_nsctx_get_prefix_first_inserted() {
    let nsctx: NsContext =
        [(Some("y"), "urn:x"), (Some("x"), "urn:x")].into_iter().collect();
    assert_eq!(nsctx.get_prefix("urn:x"), Some(Some("y")));
}

#[test]
fn test_nsctx_from_node() {
    let tree = XmlTree::parse(CONFIG).unwrap();
    let inner = element(&tree, &["top", "mid", "inner"]);
    let nsctx = NsContext::from_node(&tree, inner, &ResolveCtx::default());
    assert_eq!(
        to_map(&nsctx),
        btreemap! {
            None => "urn:d".to_owned(),
            Some("a".to_owned()) => "urn:a2".to_owned(),
            Some("b".to_owned()) => "urn:b".to_owned(),
        }
    );

    // The NETCONF base namespace is only added when no default is in scope.
    let root = tree.root();
    let ctx = ResolveCtx::new(true);
    let nsctx = NsContext::from_node(&tree, root, &ctx);
    assert_eq!(nsctx.get(None), Some(NETCONF_BASE_NAMESPACE));
    let nsctx = NsContext::from_node(&tree, inner, &ctx);
    assert_eq!(nsctx.get(None), Some("urn:d"));
}

#[test]
fn test_nsctx_from_schema_node() {
    let spec = two_module_spec();
    let module = spec.find_module("module-b").unwrap();
    let settings = spec.find_child(module, None, "settings").unwrap();
    let nsctx = NsContext::from_schema_node(&spec, settings).unwrap();
    assert_eq!(
        to_map(&nsctx),
        btreemap! {
            None => "urn:b".to_owned(),
            Some("b".to_owned()) => "urn:b".to_owned(),
            Some("ma".to_owned()) => "urn:a".to_owned(),
        }
    );

    // Statements outside of any module.
    assert!(matches!(
        NsContext::from_schema_node(&spec, spec.root()),
        Err(Error::SchemaIncomplete(_))
    ));

    // Module without a namespace.
    let mut spec = YangSpec::new();
    let module = spec.add(spec.root(), xmldb_yang::Keyword::Module, Some("m"));
    spec.add(module, xmldb_yang::Keyword::Prefix, Some("m"));
    assert!(matches!(
        NsContext::from_schema_node(&spec, module),
        Err(Error::SchemaIncomplete(_))
    ));
}

#[test]
fn test_nsctx_from_schema_root() {
    let spec = two_module_spec();
    let nsctx = NsContext::from_schema_root(&spec);
    assert_eq!(nsctx.get(Some("a")), Some("urn:a"));
    assert_eq!(nsctx.get(Some("b")), Some("urn:b"));
    assert_eq!(nsctx.get(None), Some(NETCONF_BASE_NAMESPACE));
    assert_eq!(nsctx.get(Some("nc")), Some(NETCONF_BASE_NAMESPACE));
    assert_eq!(nsctx.len(), 4);
}

#[test]
fn test_resolve() {
    let mut tree = XmlTree::parse(CONFIG).unwrap();
    let ctx = ResolveCtx::default();
    let inner = element(&tree, &["top", "mid", "inner"]);
    let mid = element(&tree, &["top", "mid"]);

    assert_eq!(tree.resolve(inner, Some("a"), &ctx).unwrap(), "urn:a2");
    assert_eq!(tree.resolve(mid, Some("a"), &ctx).unwrap(), "urn:a");
    assert_eq!(tree.resolve(inner, Some("b"), &ctx).unwrap(), "urn:b");
    assert_eq!(tree.resolve(inner, None, &ctx).unwrap(), "urn:d");
    assert!(matches!(
        tree.resolve(inner, Some("c"), &ctx),
        Err(Error::NamespaceNotFound(Some(_)))
    ));
    assert_eq!(tree.lookup_ns(inner, Some("c"), &ctx).unwrap(), None);

    // Only nodes with more than one child get a cache entry.
    assert!(tree.node(inner).nscache().is_some());
    let x = element(&tree, &["top", "mid", "inner", "x"]);
    tree.resolve(x, None, &ctx).unwrap();
    assert!(tree.node(x).nscache().is_none());
}

#[test]
fn test_resolve_root_without_declarations() {
    let mut tree = XmlTree::new("config");
    let root = tree.root();
    assert!(matches!(
        tree.resolve(root, None, &ResolveCtx::default()),
        Err(Error::NamespaceNotFound(None))
    ));

    let ctx = ResolveCtx::new(true);
    assert_eq!(tree.resolve(root, None, &ctx).unwrap(), NETCONF_BASE_NAMESPACE);
    assert!(tree.resolve(root, Some("nc"), &ctx).is_err());
}

#[test]
fn test_resolve_cache_differential() {
    for netconf_default in [false, true] {
        let cached = ResolveCtx::new(netconf_default);
        let uncached = ResolveCtx {
            cache: false,
            ..cached
        };

        let mut tree = XmlTree::parse(CONFIG).unwrap();
        let expected = resolve_all(&mut tree, &uncached);
        // Cold cache, then warm cache.
        assert_eq!(resolve_all(&mut tree, &cached), expected);
        assert_eq!(resolve_all(&mut tree, &cached), expected);

        // Declaration changes are visible through a warm cache.
        let inner = element(&tree, &["top", "mid", "inner"]);
        let mid = element(&tree, &["top", "mid"]);
        tree.declare(inner, mid, Some("c"), "urn:c").unwrap();
        tree.declare(inner, mid, Some("b"), "urn:b2").unwrap();
        let expected = resolve_all(&mut tree, &uncached);
        assert_eq!(resolve_all(&mut tree, &cached), expected);

        let attr = tree
            .find(mid, Some("xmlns"), "c", NodeKind::Attribute)
            .unwrap();
        tree.free(attr);
        let expected = resolve_all(&mut tree, &uncached);
        assert_eq!(resolve_all(&mut tree, &cached), expected);
    }

    // Alternating contexts on the same tree.
    let with_default = ResolveCtx::new(true);
    let without_default = ResolveCtx::new(false);
    let mut tree = XmlTree::parse(CONFIG).unwrap();
    let expected_with = resolve_all(
        &mut tree,
        &ResolveCtx {
            cache: false,
            ..with_default
        },
    );
    let expected_without = resolve_all(
        &mut tree,
        &ResolveCtx {
            cache: false,
            ..without_default
        },
    );
    for _ in 0..2 {
        assert_eq!(resolve_all(&mut tree, &with_default), expected_with);
        assert_eq!(resolve_all(&mut tree, &without_default), expected_without);
    }
}

#[test]
fn test_netconf_default_not_cached() {
    let mut tree =
        XmlTree::parse("<config><a><x/><y/></a><b/></config>").unwrap();
    let root = tree.root();
    let x = element(&tree, &["a", "x"]);
    let with_default = ResolveCtx::new(true);
    let without_default = ResolveCtx::new(false);

    assert_eq!(
        tree.resolve(x, None, &with_default).unwrap(),
        NETCONF_BASE_NAMESPACE
    );
    assert_eq!(tree.lookup_ns(x, None, &without_default).unwrap(), None);
    assert!(matches!(
        tree.resolve(root, None, &without_default),
        Err(Error::NamespaceNotFound(None))
    ));

    assert_eq!(
        tree.resolve_prefix(x, NETCONF_BASE_NAMESPACE, &with_default)
            .unwrap(),
        Some(None)
    );
    assert_eq!(
        tree.resolve_prefix(x, NETCONF_BASE_NAMESPACE, &without_default)
            .unwrap(),
        None
    );
}

#[test]
fn test_declare_roundtrip() {
    let mut tree = XmlTree::parse(CONFIG).unwrap();
    let ctx = ResolveCtx::default();
    let x = element(&tree, &["top", "mid", "inner", "x"]);
    let top = element(&tree, &["top"]);

    for (prefix, uri) in [
        (Some("p1"), "urn:p1"),
        (None, "urn:new-default"),
        (Some("a"), "urn:a3"),
    ] {
        tree.declare(x, x, prefix, uri).unwrap();
        assert_eq!(tree.resolve(x, prefix, &ctx).unwrap(), uri);
    }

    // Declarations precede the other attributes.
    tree.add_attribute(top, None, "id", "1").unwrap();
    tree.declare(top, top, Some("q"), "urn:q").unwrap();
    let first = tree.children(top, Some(NodeKind::Attribute)).next().unwrap();
    assert!(tree.node(first).is_ns_decl());
    let last = tree.children(top, Some(NodeKind::Attribute)).last().unwrap();
    assert_eq!(tree.node(last).name(), "id");

    // The declaring node must be in scope.
    let mid = element(&tree, &["top", "mid"]);
    assert!(tree.declare(top, mid, Some("z"), "urn:z").is_err());
}

#[test]
fn test_resolve_prefix() {
    let mut tree = XmlTree::parse(CONFIG).unwrap();
    let ctx = ResolveCtx::default();
    let inner = element(&tree, &["top", "mid", "inner"]);
    let mid = element(&tree, &["top", "mid"]);

    assert_eq!(
        tree.resolve_prefix(inner, "urn:b", &ctx).unwrap(),
        Some(Some("b".to_owned()))
    );
    assert_eq!(tree.resolve_prefix(inner, "urn:d", &ctx).unwrap(), Some(None));
    assert_eq!(tree.resolve_prefix(inner, "urn:x", &ctx).unwrap(), None);

    // "a" is redeclared below "mid", so "urn:a" has no prefix in scope.
    assert_eq!(tree.resolve_prefix(inner, "urn:a", &ctx).unwrap(), None);
    assert_eq!(
        tree.resolve_prefix(mid, "urn:a", &ctx).unwrap(),
        Some(Some("a".to_owned()))
    );
    // The reverse lookup didn't poison the forward cache.
    assert_eq!(tree.resolve(inner, Some("a"), &ctx).unwrap(), "urn:a2");
}

#[test]
fn test_resolve_recurse() {
    let mut tree = XmlTree::parse(CONFIG).unwrap();
    let root = tree.root();
    let ctx = ResolveCtx::default();
    tree.resolve_recurse(root, &ctx).unwrap();

    let mid = element(&tree, &["top", "mid"]);
    tree.add_element(mid, Some("c"), "leaf").unwrap();
    assert!(matches!(
        tree.resolve_recurse(root, &ctx),
        Err(Error::NamespaceNotFound(Some(_)))
    ));
}
