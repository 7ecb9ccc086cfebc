//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use xmldb_yang::NETCONF_BASE_NAMESPACE;

use crate::debug::Debug;
use crate::error::Error;
use crate::nsctx::NsContext;
use crate::tree::{NodeIndex, NodeKind, XMLNS, XmlTree};

/// Settings shared by every namespace resolution call.
#[derive(Clone, Copy, Debug)]
pub struct ResolveCtx {
    // Resolve the default namespace to the NETCONF base namespace when no
    // declaration is found up to the root.
    pub netconf_default: bool,
    // Use and populate the per-node namespace cache.
    pub cache: bool,
}

// ===== impl ResolveCtx =====

impl ResolveCtx {
    pub fn new(netconf_default: bool) -> ResolveCtx {
        ResolveCtx {
            netconf_default,
            cache: true,
        }
    }
}

impl Default for ResolveCtx {
    fn default() -> ResolveCtx {
        ResolveCtx::new(false)
    }
}

// ===== impl XmlTree =====

impl XmlTree {
    // Resolves a namespace prefix (`None` for the default namespace) in the
    // scope of the given node.
    //
    // Successful lookups are cached on every visited node that has more
    // than one child; nodes with a single child are typically leaves whose
    // lookups are already cheap. The NETCONF default depends on the context
    // rather than the tree and is never cached.
    pub fn resolve(
        &mut self,
        node: NodeIndex,
        prefix: Option<&str>,
        ctx: &ResolveCtx,
    ) -> Result<String, Error> {
        self.lookup_ns(node, prefix, ctx)?
            .ok_or_else(|| Error::NamespaceNotFound(prefix.map(str::to_owned)))
    }

    // Same as `resolve`, but reports a missing namespace as `None`.
    pub fn lookup_ns(
        &mut self,
        node: NodeIndex,
        prefix: Option<&str>,
        ctx: &ResolveCtx,
    ) -> Result<Option<String>, Error> {
        let mut visited = vec![];
        let mut current = node;
        let mut fallback = false;
        let namespace = loop {
            let xnode = self.get(current).ok_or(Error::NodeNotFound)?;
            if ctx.cache {
                if let Some(ns) =
                    xnode.nscache().and_then(|cache| cache.get(prefix))
                {
                    break Some(ns.to_owned());
                }
            }
            visited.push(current);
            if let Some(ns) = self.ns_decl(current, prefix) {
                break Some(ns.to_owned());
            }
            match xnode.parent() {
                Some(parent) => current = parent,
                None if ctx.netconf_default && prefix.is_none() => {
                    fallback = true;
                    break Some(NETCONF_BASE_NAMESPACE.to_owned());
                }
                None => break None,
            }
        };

        if let Some(ns) = &namespace {
            if ctx.cache && !fallback {
                for index in visited {
                    if self.child_count(index) > 1 {
                        self.cache_ns(index, prefix, ns);
                    }
                }
            }
        }
        Ok(namespace)
    }

    // Finds a prefix bound to the given namespace in the scope of the node.
    //
    // Returns `Some(None)` when the namespace is the default one, and `None`
    // when it isn't bound at all. Declarations shadowed by a closer
    // declaration of the same prefix are skipped. When several prefixes are
    // bound to the namespace, the closest declaring element wins, then the
    // first declaration in document order; a cached answer takes precedence
    // over both.
    pub fn resolve_prefix(
        &mut self,
        node: NodeIndex,
        uri: &str,
        ctx: &ResolveCtx,
    ) -> Result<Option<Option<String>>, Error> {
        let mut visited: Vec<NodeIndex> = vec![];
        let mut current = node;
        let mut fallback = false;
        let prefix = loop {
            let xnode = self.get(current).ok_or(Error::NodeNotFound)?;
            if ctx.cache {
                let cached = xnode
                    .nscache()
                    .and_then(|cache| cache.get_prefix(uri))
                    .map(|prefix| prefix.map(str::to_owned));
                if let Some(prefix) = cached {
                    if !self.is_shadowed(&visited, prefix.as_deref()) {
                        break Some(prefix);
                    }
                }
            }
            let declared = self
                .children(current, Some(NodeKind::Attribute))
                .map(|attr| self.node(attr))
                .filter(|attr| attr.is_ns_decl() && attr.value() == Some(uri))
                .map(|attr| attr.declared_prefix())
                .find(|prefix| !self.is_shadowed(&visited, *prefix))
                .map(|prefix| prefix.map(str::to_owned));
            visited.push(current);
            if let Some(prefix) = declared {
                break Some(prefix);
            }
            match xnode.parent() {
                Some(parent) => current = parent,
                None if ctx.netconf_default
                    && uri == NETCONF_BASE_NAMESPACE
                    && !self.is_shadowed(&visited, None) =>
                {
                    fallback = true;
                    break Some(None);
                }
                None => break None,
            }
        };

        if let Some(prefix) = &prefix {
            if ctx.cache && !fallback {
                for index in visited {
                    self.cache_ns(index, prefix.as_deref(), uri);
                }
            }
        }
        Ok(prefix)
    }

    // Declares a namespace by adding an `xmlns[:prefix]` attribute to
    // `declare_at`, which must be `node` or one of its ancestors.
    //
    // Caches below `declare_at` are dropped, the declaration is cached on
    // `declare_at` and its attributes are re-sorted so the declaration
    // precedes the other attributes.
    pub fn declare(
        &mut self,
        node: NodeIndex,
        declare_at: NodeIndex,
        prefix: Option<&str>,
        uri: &str,
    ) -> Result<(), Error> {
        if !self.contains(node) || !self.contains(declare_at) {
            return Err(Error::NodeNotFound);
        }
        if node != declare_at && !self.ancestors(node).any(|a| a == declare_at)
        {
            return Err(Error::NodeCreate(
                "declaring node is not an ancestor",
            ));
        }

        match prefix {
            Some(prefix) => {
                self.add_attribute(declare_at, Some(XMLNS), prefix, uri)?
            }
            None => self.add_attribute(declare_at, None, XMLNS, uri)?,
        };
        self.cache_ns(declare_at, prefix, uri);
        self.sort(declare_at);
        Debug::NsDeclare(prefix, uri).log();
        Ok(())
    }

    // Checks that the prefix of every element in the subtree resolves to a
    // namespace.
    pub fn resolve_recurse(
        &mut self,
        node: NodeIndex,
        ctx: &ResolveCtx,
    ) -> Result<(), Error> {
        let children = self
            .children(node, Some(NodeKind::Element))
            .collect::<Vec<_>>();
        for child in children {
            if let Some(prefix) = self.node(child).prefix().map(str::to_owned)
            {
                self.resolve(child, Some(&prefix), ctx)?;
            }
            self.resolve_recurse(child, ctx)?;
        }
        Ok(())
    }

    fn is_shadowed(&self, below: &[NodeIndex], prefix: Option<&str>) -> bool {
        below
            .iter()
            .any(|index| self.ns_decl(*index, prefix).is_some())
    }

    fn cache_ns(&mut self, index: NodeIndex, prefix: Option<&str>, uri: &str) {
        self.nscache_mut(index)
            .get_or_insert_with(NsContext::new)
            .add(prefix, uri);
    }
}
