//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use xmldb_yang::{Keyword, YangSpec};

use crate::error::Error;
use crate::tree::{NodeFlags, NodeIndex, NodeKind, XmlTree};

// Differences between two configuration trees.
//
// Node indices of removed and changed entries refer to the old tree; those
// of added entries refer to the new tree.
#[derive(Debug, Default)]
pub struct Diff {
    pub removed: Vec<NodeIndex>,
    pub added: Vec<NodeIndex>,
    pub changed: Vec<(NodeIndex, NodeIndex)>,
}

// ===== impl Diff =====

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
            && self.added.is_empty()
            && self.changed.is_empty()
    }
}

// ===== impl XmlTree =====

impl XmlTree {
    // Merges the content of `src` into `dst`.
    //
    // Attributes and text bodies of `src` overwrite those of `dst`. Child
    // elements present on both sides are merged recursively, the others are
    // copied.
    pub fn merge(
        &mut self,
        dst: NodeIndex,
        src_tree: &XmlTree,
        src: NodeIndex,
        spec: Option<&YangSpec>,
    ) -> Result<(), Error> {
        if !self.contains(dst) || !src_tree.contains(src) {
            return Err(Error::NodeNotFound);
        }
        if !src_tree.node(src).flags().contains(NodeFlags::DEFAULT) {
            self.flag_reset(dst, NodeFlags::DEFAULT);
        }
        if self.node(dst).schema().is_none() {
            self.set_schema(dst, src_tree.node(src).schema())?;
        }

        for attr in src_tree.children(src, Some(NodeKind::Attribute)) {
            let attr = src_tree.node(attr);
            self.add_attribute(
                dst,
                attr.prefix(),
                attr.name(),
                attr.value().unwrap_or_default(),
            )?;
        }
        if let Some(body) = src_tree.body(src) {
            self.set_body(dst, body)?;
        }
        for child in src_tree.children(src, Some(NodeKind::Element)) {
            match self.match_child(dst, src_tree, child, spec) {
                Some(existing) => {
                    self.merge(existing, src_tree, child, spec)?;
                }
                None => {
                    self.add_copy(dst, src_tree, child)?;
                }
            }
        }

        Ok(())
    }

    // Finds the child element of `parent` with the same identity as `other`
    // from `other_tree`.
    pub fn match_child(
        &self,
        parent: NodeIndex,
        other_tree: &XmlTree,
        other: NodeIndex,
        spec: Option<&YangSpec>,
    ) -> Option<NodeIndex> {
        self.children(parent, Some(NodeKind::Element))
            .find(|child| self.same_identity(*child, other_tree, other, spec))
    }

    // Returns whether two elements denote the same data node: same name and
    // schema node, and for list entries and leaf-list entries the same keys
    // or value. Elements not bound to a schema are matched by name only.
    pub fn same_identity(
        &self,
        index: NodeIndex,
        other_tree: &XmlTree,
        other: NodeIndex,
        spec: Option<&YangSpec>,
    ) -> bool {
        let (a, b) = (self.node(index), other_tree.node(other));
        if a.name() != b.name() {
            return false;
        }
        let schema = match (a.schema(), b.schema()) {
            (Some(sa), Some(sb)) if sa != sb => return false,
            (schema, other_schema) => schema.or(other_schema),
        };
        let (Some(spec), Some(schema)) = (spec, schema) else {
            return true;
        };

        match spec.keyword(schema) {
            Keyword::List => spec.list_keys(schema).into_iter().all(|key| {
                self.find_value(index, None, key, NodeKind::Element)
                    == other_tree.find_value(
                        other,
                        None,
                        key,
                        NodeKind::Element,
                    )
            }),
            Keyword::LeafList => self.body(index) == other_tree.body(other),
            _ => true,
        }
    }

    // Computes the differences between the subtrees `old` of this tree and
    // `new` of `new_tree`.
    pub fn diff(
        &self,
        old: NodeIndex,
        new_tree: &XmlTree,
        new: NodeIndex,
        spec: Option<&YangSpec>,
    ) -> Diff {
        let mut diff = Diff::default();
        self.diff_recurse(old, new_tree, new, spec, &mut diff);
        diff
    }

    fn diff_recurse(
        &self,
        old: NodeIndex,
        new_tree: &XmlTree,
        new: NodeIndex,
        spec: Option<&YangSpec>,
        diff: &mut Diff,
    ) {
        for child in self.children(old, Some(NodeKind::Element)) {
            match new_tree.match_child(new, self, child, spec) {
                Some(new_child) => {
                    let is_leaf = self
                        .children(child, Some(NodeKind::Element))
                        .next()
                        .is_none()
                        && new_tree
                            .children(new_child, Some(NodeKind::Element))
                            .next()
                            .is_none();
                    if is_leaf {
                        if self.body(child) != new_tree.body(new_child) {
                            diff.changed.push((child, new_child));
                        }
                    } else {
                        self.diff_recurse(
                            child, new_tree, new_child, spec, diff,
                        );
                    }
                }
                None => diff.removed.push(child),
            }
        }
        for new_child in new_tree.children(new, Some(NodeKind::Element)) {
            if self.match_child(old, new_tree, new_child, spec).is_none() {
                diff.added.push(new_child);
            }
        }
    }
}
