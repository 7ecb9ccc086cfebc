//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use xmldb_yang::{Keyword, SchemaNodeId, YangSpec};

use crate::debug::Debug;
use crate::error::Error;
use crate::ns::ResolveCtx;
use crate::tree::{NodeIndex, NodeKind, XmlTree};

// Outcome of binding a tree to a schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Bind {
    Bound,
    // Some element has no matching schema node.
    NotBound(String),
}

// ===== impl XmlTree =====

impl XmlTree {
    // Assigns a schema node to every element below the root.
    //
    // Top-level elements are looked up in the module owning their
    // namespace; the others among the data children of their parent's
    // schema node. Binding stops at the first element that can't be
    // matched.
    pub fn bind_schema(
        &mut self,
        spec: &YangSpec,
        ctx: &ResolveCtx,
    ) -> Result<Bind, Error> {
        let root = self.root();
        let children = self
            .children(root, Some(NodeKind::Element))
            .collect::<Vec<_>>();
        for child in children {
            let prefix = self.node(child).prefix().map(str::to_owned);
            let Some(namespace) =
                self.lookup_ns(child, prefix.as_deref(), ctx)?
            else {
                return Ok(self.not_bound(child, "namespace not found"));
            };
            let Some(module) = spec.find_module_by_namespace(&namespace) else {
                return Ok(self.not_bound(child, "unknown namespace"));
            };
            let name = self.node(child).name().to_owned();
            let Some(schema) = spec.find_child(module, None, &name) else {
                return Ok(self.not_bound(child, "unknown element"));
            };
            self.set_schema(child, Some(schema))?;
            Debug::SchemaBind(&self.path(child)).log();

            if let Bind::NotBound(reason) =
                self.bind_children(child, schema, spec, ctx)?
            {
                return Ok(Bind::NotBound(reason));
            }
        }

        Ok(Bind::Bound)
    }

    fn bind_children(
        &mut self,
        node: NodeIndex,
        schema: SchemaNodeId,
        spec: &YangSpec,
        ctx: &ResolveCtx,
    ) -> Result<Bind, Error> {
        // Opaque content.
        if matches!(spec.keyword(schema), Keyword::Anydata | Keyword::Anyxml)
        {
            return Ok(Bind::Bound);
        }

        let children = self
            .children(node, Some(NodeKind::Element))
            .collect::<Vec<_>>();
        for child in children {
            let name = self.node(child).name().to_owned();
            let Some(child_schema) = spec.find_child(schema, None, &name)
            else {
                return Ok(self.not_bound(child, "unknown element"));
            };

            let prefix = self.node(child).prefix().map(str::to_owned);
            let namespace = self.lookup_ns(child, prefix.as_deref(), ctx)?;
            if namespace.as_deref() != spec.node_namespace(child_schema) {
                return Ok(self.not_bound(child, "namespace mismatch"));
            }

            self.set_schema(child, Some(child_schema))?;
            if let Bind::NotBound(reason) =
                self.bind_children(child, child_schema, spec, ctx)?
            {
                return Ok(Bind::NotBound(reason));
            }
        }

        Ok(Bind::Bound)
    }

    fn not_bound(&self, node: NodeIndex, reason: &str) -> Bind {
        let path = self.path(node);
        Debug::SchemaUnbound(&path, reason).log();
        Bind::NotBound(format!("{path}: {reason}"))
    }
}
