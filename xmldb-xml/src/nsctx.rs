//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use itertools::Itertools;
use xmldb_yang::{
    NETCONF_BASE_NAMESPACE, NETCONF_BASE_PREFIX, SchemaNodeId, YangSpec,
};

use crate::error::Error;
use crate::ns::ResolveCtx;
use crate::tree::{NodeIndex, NodeKind, XmlTree};

/// Ordered mapping of namespace prefixes to namespace URIs.
///
/// An absent prefix stands for the default namespace. There's at most one
/// entry per prefix: adding an existing prefix replaces its URI in place,
/// keeping the original insertion position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NsContext {
    entries: Vec<(Option<String>, String)>,
}

// ===== impl NsContext =====

impl NsContext {
    pub fn new() -> NsContext {
        NsContext::default()
    }

    // Creates a context, optionally seeded with one entry.
    pub fn init(prefix: Option<&str>, uri: Option<&str>) -> NsContext {
        let mut nsctx = NsContext::new();
        if let Some(uri) = uri {
            nsctx.add(prefix, uri);
        }
        nsctx
    }

    pub fn add(&mut self, prefix: Option<&str>, uri: &str) {
        match self
            .entries
            .iter_mut()
            .find(|(p, _)| p.as_deref() == prefix)
        {
            Some((_, u)) => *u = uri.to_owned(),
            None => self
                .entries
                .push((prefix.map(str::to_owned), uri.to_owned())),
        }
    }

    pub fn remove(&mut self, prefix: Option<&str>) -> Option<String> {
        let pos = self
            .entries
            .iter()
            .position(|(p, _)| p.as_deref() == prefix)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, prefix: Option<&str>) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    // Reverse lookup. When several prefixes are bound to the same URI, the
    // one inserted first is returned. The outer `Option` tells whether the
    // URI was found, the inner one is the prefix (`None` for the default
    // namespace).
    pub fn get_prefix(&self, uri: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(prefix, _)| prefix.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &str)> + '_ {
        self.entries
            .iter()
            .map(|(prefix, uri)| (prefix.as_deref(), uri.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Collects every namespace declaration in scope at the given node.
    //
    // The walk goes from the node up to the root, so the closest declaration
    // of each prefix wins.
    pub fn from_node(
        tree: &XmlTree,
        node: NodeIndex,
        ctx: &ResolveCtx,
    ) -> NsContext {
        let mut nsctx = NsContext::new();
        let mut current = tree.get(node).map(|_| node);
        while let Some(index) = current {
            for attr in tree.children(index, Some(NodeKind::Attribute)) {
                let attr = tree.node(attr);
                if !attr.is_ns_decl() {
                    continue;
                }
                let prefix = attr.declared_prefix();
                if nsctx.get(prefix).is_none() {
                    nsctx.add(prefix, attr.value().unwrap_or_default());
                }
            }
            current = tree.node(index).parent();
        }

        if ctx.netconf_default && nsctx.get(None).is_none() {
            nsctx.add(None, NETCONF_BASE_NAMESPACE);
        }
        nsctx
    }

    // Builds the context of the module defining the given schema node: its
    // namespace as both the default and under its own prefix, plus the
    // prefixes of all its imports.
    pub fn from_schema_node(
        spec: &YangSpec,
        node: SchemaNodeId,
    ) -> Result<NsContext, Error> {
        let module = spec.node_module(node).ok_or_else(|| {
            Error::SchemaIncomplete("schema node has no module".to_owned())
        })?;
        let module_name = spec.argument(module).unwrap_or_default();
        let prefix = spec.module_prefix(module).ok_or_else(|| {
            Error::SchemaIncomplete(format!("module {module_name} has no prefix"))
        })?;
        let namespace = spec.module_namespace(module).ok_or_else(|| {
            Error::SchemaIncomplete(format!(
                "module {module_name} has no namespace"
            ))
        })?;

        let mut nsctx = NsContext::new();
        nsctx.add(None, namespace);
        nsctx.add(Some(prefix), namespace);
        for (name, prefix) in spec.module_imports(module) {
            // Imports of modules that weren't loaded are skipped.
            let Some(namespace) = spec
                .find_module(name)
                .and_then(|import| spec.module_namespace(import))
            else {
                continue;
            };
            nsctx.add(Some(prefix), namespace);
        }
        Ok(nsctx)
    }

    // Builds the canonical context of a whole schema: the prefix of every
    // loaded module, plus the NETCONF base namespace as the default and
    // under its canonical prefix.
    pub fn from_schema_root(spec: &YangSpec) -> NsContext {
        let mut nsctx = NsContext::new();
        for module in spec.modules() {
            if let (Some(prefix), Some(namespace)) =
                (spec.module_prefix(module), spec.module_namespace(module))
            {
                nsctx.add(Some(prefix), namespace);
            }
        }
        nsctx.add(None, NETCONF_BASE_NAMESPACE);
        nsctx.add(Some(NETCONF_BASE_PREFIX), NETCONF_BASE_NAMESPACE);
        nsctx
    }
}

impl std::fmt::Display for NsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let decls = self
            .iter()
            .map(|(prefix, uri)| match prefix {
                Some(prefix) => format!("xmlns:{prefix}=\"{uri}\""),
                None => format!("xmlns=\"{uri}\""),
            })
            .join(" ");
        write!(f, "{decls}")
    }
}

impl<'a> FromIterator<(Option<&'a str>, &'a str)> for NsContext {
    fn from_iter<I>(iter: I) -> NsContext
    where
        I: IntoIterator<Item = (Option<&'a str>, &'a str)>,
    {
        let mut nsctx = NsContext::new();
        for (prefix, uri) in iter {
            nsctx.add(prefix, uri);
        }
        nsctx
    }
}
