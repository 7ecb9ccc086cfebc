//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bitflags::bitflags;
use generational_arena::{Arena, Index};
use xmldb_yang::SchemaNodeId;

use crate::error::Error;
use crate::nsctx::NsContext;

pub type NodeIndex = Index;

// Attribute prefix used by prefixed namespace declarations.
pub const XMLNS: &str = "xmlns";

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    Element,
    Attribute,
    Body,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct NodeFlags: u8 {
        // Document root.
        const TOP = 0x01;
        // Created from a schema default value.
        const DEFAULT = 0x02;
    }
}

#[derive(Debug)]
pub struct XmlNode {
    kind: NodeKind,
    name: String,
    prefix: Option<String>,
    value: Option<String>,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    schema: Option<SchemaNodeId>,
    nscache: Option<NsContext>,
    flags: NodeFlags,
}

/// XML document stored in a node arena.
///
/// Nodes refer to their parent and children by arena index, which keeps the
/// ownership acyclic: the tree owns every node, and a node belongs to exactly
/// one tree. Attributes and text bodies are children of their element, in
/// document order.
#[derive(Debug)]
pub struct XmlTree {
    arena: Arena<XmlNode>,
    root: NodeIndex,
}

/// Lazy iterator over the direct children of an element, optionally
/// filtered by kind.
///
/// The iterator borrows the tree, so the children can't be mutated while it
/// is alive. Calling [`XmlTree::children`] again restarts the iteration.
pub struct Children<'a> {
    tree: &'a XmlTree,
    iter: std::slice::Iter<'a, NodeIndex>,
    kind: Option<NodeKind>,
}

// ===== impl XmlNode =====

impl XmlNode {
    fn new(kind: NodeKind, name: &str, parent: Option<NodeIndex>) -> XmlNode {
        XmlNode {
            kind,
            name: name.to_owned(),
            prefix: None,
            value: None,
            parent,
            children: vec![],
            schema: None,
            nscache: None,
            flags: NodeFlags::empty(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn schema(&self) -> Option<SchemaNodeId> {
        self.schema
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn nscache(&self) -> Option<&NsContext> {
        self.nscache.as_ref()
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    // Returns whether this is an `xmlns` or `xmlns:prefix` attribute.
    pub fn is_ns_decl(&self) -> bool {
        self.kind == NodeKind::Attribute
            && match self.prefix.as_deref() {
                None => self.name == XMLNS,
                Some(prefix) => prefix == XMLNS,
            }
    }

    // Returns the prefix declared by a namespace-declaration attribute
    // (`None` for the default namespace).
    pub fn declared_prefix(&self) -> Option<&str> {
        match self.prefix.as_deref() {
            Some(XMLNS) => Some(&self.name),
            _ => None,
        }
    }

    // Returns the qualified name (`prefix:name`).
    pub fn qname(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }
}

// ===== impl XmlTree =====

impl XmlTree {
    // Creates a tree whose root is a document element with the given name.
    pub fn new(name: &str) -> XmlTree {
        let mut arena = Arena::new();
        let mut node = XmlNode::new(NodeKind::Element, name, None);
        node.flags = NodeFlags::TOP;
        let root = arena.insert(node);
        XmlTree { arena, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    // Returns the node stored at the given index.
    //
    // Panics if the index doesn't refer to a live node of this tree.
    pub fn node(&self, index: NodeIndex) -> &XmlNode {
        &self.arena[index]
    }

    pub fn get(&self, index: NodeIndex) -> Option<&XmlNode> {
        self.arena.get(index)
    }

    pub fn contains(&self, index: NodeIndex) -> bool {
        self.arena.contains(index)
    }

    // Returns the total number of live nodes, detached ones included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() <= 1
    }

    // Creates a new node. When a parent is given, the node is appended as
    // its last child; otherwise the node is created detached and can be
    // linked later using `attach`.
    pub fn new_node(
        &mut self,
        name: &str,
        parent: Option<NodeIndex>,
        kind: NodeKind,
    ) -> Result<NodeIndex, Error> {
        if let Some(parent) = parent {
            let pnode = self.arena.get(parent).ok_or(Error::NodeNotFound)?;
            if !pnode.is_element() {
                return Err(Error::NodeCreate(
                    "parent node is not an element",
                ));
            }
            if kind == NodeKind::Attribute
                && self.find_exact(parent, None, name, kind).is_some()
            {
                return Err(Error::NodeCreate("duplicate attribute"));
            }
        }

        let index = self.arena.insert(XmlNode::new(kind, name, parent));
        if let Some(parent) = parent {
            self.arena[parent].children.push(index);
            if self.arena[index].is_ns_decl() {
                self.invalidate_nscache(parent);
            }
        }
        Ok(index)
    }

    pub fn add_element(
        &mut self,
        parent: NodeIndex,
        prefix: Option<&str>,
        name: &str,
    ) -> Result<NodeIndex, Error> {
        let index = self.new_node(name, Some(parent), NodeKind::Element)?;
        self.arena[index].prefix = prefix.map(str::to_owned);
        Ok(index)
    }

    // Sets an attribute on the given element, replacing the value of an
    // existing attribute with the same prefix and name.
    pub fn add_attribute(
        &mut self,
        element: NodeIndex,
        prefix: Option<&str>,
        name: &str,
        value: &str,
    ) -> Result<NodeIndex, Error> {
        self.check_element(element)?;
        let index = match self.find_exact(
            element,
            prefix,
            name,
            NodeKind::Attribute,
        ) {
            Some(index) => index,
            None => {
                let index = self.arena.insert(XmlNode::new(
                    NodeKind::Attribute,
                    name,
                    Some(element),
                ));
                self.arena[index].prefix = prefix.map(str::to_owned);
                self.arena[element].children.push(index);
                index
            }
        };
        self.set_value(index, value)?;
        Ok(index)
    }

    pub fn add_body(
        &mut self,
        element: NodeIndex,
        text: &str,
    ) -> Result<NodeIndex, Error> {
        let index = self.new_node("body", Some(element), NodeKind::Body)?;
        self.arena[index].value = Some(text.to_owned());
        Ok(index)
    }

    // Sets the text body of an element, replacing the first existing body.
    pub fn set_body(
        &mut self,
        element: NodeIndex,
        text: &str,
    ) -> Result<(), Error> {
        match self.children(element, Some(NodeKind::Body)).next() {
            Some(body) => self.set_value(body, text),
            None => self.add_body(element, text).map(|_| ()),
        }
    }

    pub fn set_value(
        &mut self,
        index: NodeIndex,
        value: &str,
    ) -> Result<(), Error> {
        let node = self.arena.get_mut(index).ok_or(Error::NodeNotFound)?;
        node.value = Some(value.to_owned());
        if node.is_ns_decl() {
            if let Some(parent) = node.parent {
                self.invalidate_nscache(parent);
            }
        }
        Ok(())
    }

    pub fn set_prefix(
        &mut self,
        index: NodeIndex,
        prefix: Option<&str>,
    ) -> Result<(), Error> {
        let node = self.arena.get(index).ok_or(Error::NodeNotFound)?;
        let parent = node.parent;
        if node.kind == NodeKind::Attribute {
            if let Some(parent) = parent {
                let name = node.name.clone();
                if self
                    .find_exact(parent, prefix, &name, NodeKind::Attribute)
                    .is_some_and(|other| other != index)
                {
                    return Err(Error::NodeCreate("duplicate attribute"));
                }
            }
        }

        let was_decl = self.arena[index].is_ns_decl();
        self.arena[index].prefix = prefix.map(str::to_owned);
        if was_decl || self.arena[index].is_ns_decl() {
            if let Some(parent) = parent {
                self.invalidate_nscache(parent);
            }
        }
        Ok(())
    }

    pub fn set_schema(
        &mut self,
        index: NodeIndex,
        schema: Option<SchemaNodeId>,
    ) -> Result<(), Error> {
        let node = self.arena.get_mut(index).ok_or(Error::NodeNotFound)?;
        node.schema = schema;
        Ok(())
    }

    pub fn flag_set(&mut self, index: NodeIndex, flags: NodeFlags) {
        if let Some(node) = self.arena.get_mut(index) {
            node.flags.insert(flags);
        }
    }

    pub fn flag_reset(&mut self, index: NodeIndex, flags: NodeFlags) {
        if let Some(node) = self.arena.get_mut(index) {
            node.flags.remove(flags);
        }
    }

    // Links a detached node as the last child of `parent`.
    pub fn attach(
        &mut self,
        parent: NodeIndex,
        child: NodeIndex,
    ) -> Result<(), Error> {
        self.check_element(parent)?;
        let node = self.arena.get(child).ok_or(Error::NodeNotFound)?;
        if node.parent.is_some() || child == self.root {
            return Err(Error::NodeCreate("node is already attached"));
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(Error::NodeCreate("node can't be its own descendant"));
        }

        self.arena[child].parent = Some(parent);
        self.arena[parent].children.push(child);
        if self.arena[child].is_ns_decl() {
            self.invalidate_nscache(parent);
        } else {
            self.invalidate_nscache(child);
        }
        Ok(())
    }

    // Unlinks a node from its parent, keeping its subtree in the arena.
    pub fn detach(&mut self, index: NodeIndex) -> Result<(), Error> {
        let node = self.arena.get(index).ok_or(Error::NodeNotFound)?;
        let Some(parent) = node.parent else {
            return Ok(());
        };
        let is_ns_decl = node.is_ns_decl();
        self.arena[parent].children.retain(|child| *child != index);
        self.arena[index].parent = None;
        if is_ns_decl {
            self.invalidate_nscache(parent);
        } else {
            self.invalidate_nscache(index);
        }
        Ok(())
    }

    // Releases a node and its whole subtree. Stale indices are ignored.
    //
    // The root element itself belongs to the tree: freeing it releases all
    // of its children instead.
    pub fn free(&mut self, index: NodeIndex) {
        if !self.arena.contains(index) {
            return;
        }
        if index == self.root {
            for child in std::mem::take(&mut self.arena[index].children) {
                self.remove_subtree(child);
            }
            self.arena[index].nscache = None;
            return;
        }

        if let Some(parent) = self.arena[index].parent {
            let is_ns_decl = self.arena[index].is_ns_decl();
            self.arena[parent].children.retain(|child| *child != index);
            if is_ns_decl {
                self.invalidate_nscache(parent);
            }
        }
        self.remove_subtree(index);
    }

    // Returns an iterator over the direct children of a node, in document
    // order.
    pub fn children(
        &self,
        index: NodeIndex,
        kind: Option<NodeKind>,
    ) -> Children<'_> {
        let children = match self.arena.get(index) {
            Some(node) => node.children.as_slice(),
            None => &[],
        };
        Children {
            tree: self,
            iter: children.iter(),
            kind,
        }
    }

    // Returns all children of a node, regardless of their kind.
    pub fn child_count(&self, index: NodeIndex) -> usize {
        self.arena
            .get(index)
            .map(|node| node.children.len())
            .unwrap_or(0)
    }

    pub fn child_count_of(&self, index: NodeIndex, kind: NodeKind) -> usize {
        self.children(index, Some(kind)).count()
    }

    // Returns an iterator over the ancestors of a node, closest first.
    pub fn ancestors(
        &self,
        index: NodeIndex,
    ) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(
            self.arena.get(index).and_then(|node| node.parent),
            |parent| self.arena.get(*parent).and_then(|node| node.parent),
        )
    }

    // Finds the first child of the given kind with a matching name. A `None`
    // prefix matches any prefix.
    pub fn find(
        &self,
        index: NodeIndex,
        prefix: Option<&str>,
        name: &str,
        kind: NodeKind,
    ) -> Option<NodeIndex> {
        self.children(index, Some(kind)).find(|child| {
            let node = &self.arena[*child];
            node.name == name
                && prefix.is_none_or(|prefix| node.prefix() == Some(prefix))
        })
    }

    // Like `find`, but for attributes returns the value and for elements
    // returns the text body.
    pub fn find_value(
        &self,
        index: NodeIndex,
        prefix: Option<&str>,
        name: &str,
        kind: NodeKind,
    ) -> Option<&str> {
        let child = self.find(index, prefix, name, kind)?;
        match kind {
            NodeKind::Element => self.body(child),
            _ => self.arena[child].value(),
        }
    }

    // Returns the text of the first body child of an element.
    pub fn body(&self, index: NodeIndex) -> Option<&str> {
        self.children(index, Some(NodeKind::Body))
            .next()
            .and_then(|body| self.arena[body].value())
    }

    // Returns the namespace declared on the element itself for the given
    // prefix (`None` for the default namespace).
    pub fn ns_decl(
        &self,
        index: NodeIndex,
        prefix: Option<&str>,
    ) -> Option<&str> {
        let attr = match prefix {
            Some(prefix) => {
                self.find_exact(index, Some(XMLNS), prefix, NodeKind::Attribute)
            }
            None => self.find_exact(index, None, XMLNS, NodeKind::Attribute),
        }?;
        self.arena[attr].value()
    }

    // Reorders the children of an element so that namespace declarations
    // come first, followed by the other attributes, followed by elements and
    // bodies. The relative order within each group is preserved.
    pub fn sort(&mut self, index: NodeIndex) {
        let Some(node) = self.arena.get_mut(index) else {
            return;
        };
        let mut children = std::mem::take(&mut node.children);
        children.sort_by_key(|child| {
            let child = &self.arena[*child];
            match child.kind {
                NodeKind::Attribute if child.is_ns_decl() => 0,
                NodeKind::Attribute => 1,
                _ => 2,
            }
        });
        self.arena[index].children = children;
    }

    // Deep-copies `src` from `src_tree` into `dst`: name, prefix, value,
    // schema reference, flags and all children. Namespace caches are not
    // copied. `dst` must not have any children.
    pub fn copy_from(
        &mut self,
        dst: NodeIndex,
        src_tree: &XmlTree,
        src: NodeIndex,
    ) -> Result<(), Error> {
        let dnode = self.arena.get(dst).ok_or(Error::NodeNotFound)?;
        let snode = src_tree.arena.get(src).ok_or(Error::NodeNotFound)?;
        if !dnode.children.is_empty() {
            return Err(Error::CopyConflict);
        }
        if dnode.kind != snode.kind {
            return Err(Error::NodeCreate("node kind mismatch"));
        }

        let top = dnode.flags & NodeFlags::TOP;
        let dnode = &mut self.arena[dst];
        dnode.name = snode.name.clone();
        dnode.prefix = snode.prefix.clone();
        dnode.value = snode.value.clone();
        dnode.schema = snode.schema;
        dnode.flags = (snode.flags - NodeFlags::TOP) | top;
        for child in &snode.children {
            self.copy_node(dst, src_tree, *child);
        }
        self.invalidate_nscache(dst);
        Ok(())
    }

    // Deep-copies a node of the same tree into `dst`.
    pub fn copy(&mut self, src: NodeIndex, dst: NodeIndex) -> Result<(), Error> {
        let subtree = self.subtree(src)?;
        self.copy_from(dst, &subtree, subtree.root())
    }

    // Appends a deep copy of `src` from `src_tree` as the last child of
    // `parent`.
    pub fn add_copy(
        &mut self,
        parent: NodeIndex,
        src_tree: &XmlTree,
        src: NodeIndex,
    ) -> Result<NodeIndex, Error> {
        self.check_element(parent)?;
        if !src_tree.contains(src) {
            return Err(Error::NodeNotFound);
        }
        let index = self.copy_node(parent, src_tree, src);
        if self.arena[index].is_ns_decl() {
            self.invalidate_nscache(parent);
        }
        Ok(index)
    }

    // Returns a new tree whose root is a deep copy of the given node.
    pub fn subtree(&self, index: NodeIndex) -> Result<XmlTree, Error> {
        let node = self.arena.get(index).ok_or(Error::NodeNotFound)?;
        if !node.is_element() {
            return Err(Error::NodeCreate("subtree root must be an element"));
        }
        let mut tree = XmlTree::new(&node.name);
        tree.copy_from(tree.root, self, index)?;
        tree.flag_set(tree.root, NodeFlags::TOP);
        Ok(tree)
    }

    // Returns a deep copy of the whole document.
    pub fn duplicate(&self) -> XmlTree {
        let mut tree = XmlTree::new(&self.arena[self.root].name);
        let root = tree.root;
        let snode = &self.arena[self.root];
        tree.arena[root].prefix = snode.prefix.clone();
        tree.arena[root].value = snode.value.clone();
        tree.arena[root].schema = snode.schema;
        tree.arena[root].flags = snode.flags | NodeFlags::TOP;
        for child in &snode.children {
            tree.copy_node(root, self, *child);
        }
        tree
    }

    // Compares two subtrees structurally: kinds, names, prefixes, values
    // and children in document order.
    pub fn subtree_eq(
        &self,
        index: NodeIndex,
        other: &XmlTree,
        other_index: NodeIndex,
    ) -> bool {
        let (Some(a), Some(b)) =
            (self.arena.get(index), other.arena.get(other_index))
        else {
            return false;
        };
        a.kind == b.kind
            && a.name == b.name
            && a.prefix == b.prefix
            && a.value == b.value
            && a.children.len() == b.children.len()
            && a
                .children
                .iter()
                .zip(b.children.iter())
                .all(|(a, b)| self.subtree_eq(*a, other, *b))
    }

    // Clears the namespace cache of a node and of all its descendants.
    pub fn invalidate_nscache(&mut self, index: NodeIndex) {
        let mut stack = vec![index];
        while let Some(index) = stack.pop() {
            if let Some(node) = self.arena.get_mut(index) {
                node.nscache = None;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    // Returns a slash-separated path of qualified names from the root to the
    // node, for diagnostics.
    pub fn path(&self, index: NodeIndex) -> String {
        let mut names = vec![];
        let mut current = Some(index);
        while let Some(index) = current {
            let Some(node) = self.arena.get(index) else {
                break;
            };
            if node.parent.is_some() {
                names.push(node.qname());
            }
            current = node.parent;
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    pub(crate) fn nscache_mut(
        &mut self,
        index: NodeIndex,
    ) -> &mut Option<NsContext> {
        &mut self.arena[index].nscache
    }

    fn find_exact(
        &self,
        index: NodeIndex,
        prefix: Option<&str>,
        name: &str,
        kind: NodeKind,
    ) -> Option<NodeIndex> {
        self.children(index, Some(kind)).find(|child| {
            let node = &self.arena[*child];
            node.name == name && node.prefix() == prefix
        })
    }

    fn check_element(&self, index: NodeIndex) -> Result<(), Error> {
        match self.arena.get(index) {
            Some(node) if node.is_element() => Ok(()),
            Some(_) => Err(Error::NodeCreate("parent node is not an element")),
            None => Err(Error::NodeNotFound),
        }
    }

    fn copy_node(
        &mut self,
        parent: NodeIndex,
        src_tree: &XmlTree,
        src: NodeIndex,
    ) -> NodeIndex {
        let snode = &src_tree.arena[src];
        let index = self.arena.insert(XmlNode {
            kind: snode.kind,
            name: snode.name.clone(),
            prefix: snode.prefix.clone(),
            value: snode.value.clone(),
            parent: Some(parent),
            children: Vec::with_capacity(snode.children.len()),
            schema: snode.schema,
            nscache: None,
            flags: snode.flags - NodeFlags::TOP,
        });
        self.arena[parent].children.push(index);
        for child in &snode.children {
            self.copy_node(index, src_tree, *child);
        }
        index
    }

    fn remove_subtree(&mut self, index: NodeIndex) {
        let mut stack = vec![index];
        while let Some(index) = stack.pop() {
            if let Some(node) = self.arena.remove(index) {
                stack.extend(node.children);
            }
        }
    }
}

// ===== impl Children =====

impl Iterator for Children<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let tree = self.tree;
        let kind = self.kind;
        self.iter
            .by_ref()
            .copied()
            .find(|child| kind.is_none_or(|kind| tree.arena[*child].kind == kind))
    }
}
