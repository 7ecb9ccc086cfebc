//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use xmldb_yang::{Keyword, SchemaNodeId, YangSpec};

use crate::debug::Debug;
use crate::error::Error;
use crate::tree::{NodeFlags, NodeIndex, NodeKind, XMLNS, XmlTree};

// ===== impl XmlTree =====

impl XmlTree {
    // Adds the defaults of the top-level data nodes of every module.
    //
    // Created top-level elements carry their own default namespace
    // declaration.
    pub fn add_global_defaults(
        &mut self,
        spec: &YangSpec,
    ) -> Result<(), Error> {
        let root = self.root();
        for module in spec.modules() {
            let Some(namespace) = spec.module_namespace(module) else {
                continue;
            };
            for schema in spec.data_children(module) {
                if spec.in_choice(schema) || self.has_child(root, spec, schema)
                {
                    continue;
                }
                if let Some(element) =
                    self.add_default_node(root, spec, schema)?
                {
                    self.add_attribute(element, None, XMLNS, namespace)?;
                    self.sort(element);
                }
            }
        }
        Ok(())
    }

    // Adds the defaults below every bound element of the subtree.
    pub fn add_defaults(
        &mut self,
        node: NodeIndex,
        spec: &YangSpec,
    ) -> Result<(), Error> {
        if let Some(schema) = self.node(node).schema() {
            if matches!(
                spec.keyword(schema),
                Keyword::Container | Keyword::List
            ) {
                for child_schema in spec.data_children(schema) {
                    if spec.in_choice(child_schema)
                        || self.has_child(node, spec, child_schema)
                    {
                        continue;
                    }
                    self.add_default_node(node, spec, child_schema)?;
                }
            }
        }

        let children = self
            .children(node, Some(NodeKind::Element))
            .collect::<Vec<_>>();
        for child in children {
            if !self.node(child).flags().contains(NodeFlags::DEFAULT) {
                self.add_defaults(child, spec)?;
            }
        }
        Ok(())
    }

    // Creates the default instance of a schema node: a leaf with a default
    // value, or a non-presence container holding at least one default.
    fn add_default_node(
        &mut self,
        parent: NodeIndex,
        spec: &YangSpec,
        schema: SchemaNodeId,
    ) -> Result<Option<NodeIndex>, Error> {
        let Some(name) = spec.argument(schema) else {
            return Ok(None);
        };
        let element = match spec.keyword(schema) {
            Keyword::Leaf => {
                let Some(value) = spec.default_value(schema) else {
                    return Ok(None);
                };
                let element = self.add_element(parent, None, name)?;
                self.add_body(element, value)?;
                element
            }
            Keyword::Container if !spec.is_presence(schema) => {
                let element = self.add_element(parent, None, name)?;
                for child_schema in spec.data_children(schema) {
                    if !spec.in_choice(child_schema) {
                        self.add_default_node(element, spec, child_schema)?;
                    }
                }
                if self.child_count(element) == 0 {
                    self.free(element);
                    return Ok(None);
                }
                element
            }
            _ => return Ok(None),
        };

        self.set_schema(element, Some(schema))?;
        self.flag_set(element, NodeFlags::DEFAULT);
        Debug::DefaultAdd(&self.path(element)).log();
        Ok(Some(element))
    }

    fn has_child(
        &self,
        parent: NodeIndex,
        spec: &YangSpec,
        schema: SchemaNodeId,
    ) -> bool {
        let name = spec.argument(schema).unwrap_or_default();
        self.children(parent, Some(NodeKind::Element)).any(|child| {
            let child = self.node(child);
            match child.schema() {
                Some(child_schema) => child_schema == schema,
                None => child.name() == name,
            }
        })
    }
}
