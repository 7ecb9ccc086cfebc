//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeSet, HashMap};

use xmldb_xml::tree::XMLNS;
use xmldb_xml::{
    Bind, NodeFlags, NodeIndex, NodeKind, NsContext, ResolveCtx, XmlTree,
};
use xmldb_yang::{NETCONF_BASE_NAMESPACE, YangSpec};

use crate::debug::Debug;
use crate::element::{CANDIDATE, NO_SESSION};
use crate::error::Error;
use crate::xmldb::Xmldb;

// Name of the attribute selecting the operation of an edit node.
const OPERATION_ATTR: &str = "operation";

// Edit operations (RFC 6241, section 7.2).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EditOp {
    #[default]
    Merge,
    Replace,
    Create,
    Delete,
    Remove,
    None,
}

// Edit being applied to a datastore tree.
struct Edit<'a> {
    db: &'a str,
    tree: &'a XmlTree,
    operations: &'a HashMap<NodeIndex, EditOp>,
    spec: Option<&'a YangSpec>,
    resolve: ResolveCtx,
}

// ===== impl EditOp =====

impl std::str::FromStr for EditOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<EditOp, Error> {
        match s {
            "merge" => Ok(EditOp::Merge),
            "replace" => Ok(EditOp::Replace),
            "create" => Ok(EditOp::Create),
            "delete" => Ok(EditOp::Delete),
            "remove" => Ok(EditOp::Remove),
            "none" => Ok(EditOp::None),
            _ => Err(Error::EditInvalid(format!("unknown operation: {s}"))),
        }
    }
}

impl std::fmt::Display for EditOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditOp::Merge => write!(f, "merge"),
            EditOp::Replace => write!(f, "replace"),
            EditOp::Create => write!(f, "create"),
            EditOp::Delete => write!(f, "delete"),
            EditOp::Remove => write!(f, "remove"),
            EditOp::None => write!(f, "none"),
        }
    }
}

// ===== impl Edit =====

impl Edit<'_> {
    fn apply_children(
        &self,
        xml: &mut XmlTree,
        dst: NodeIndex,
        src: NodeIndex,
        op: EditOp,
    ) -> Result<(), Error> {
        let children = self
            .tree
            .children(src, Some(NodeKind::Element))
            .collect::<Vec<_>>();
        for child in children {
            self.apply(xml, dst, child, op)?;
        }
        Ok(())
    }

    fn apply(
        &self,
        xml: &mut XmlTree,
        parent: NodeIndex,
        src: NodeIndex,
        inherited: EditOp,
    ) -> Result<(), Error> {
        let op = self.operations.get(&src).copied().unwrap_or(inherited);
        let existing = xml.match_child(parent, self.tree, src, self.spec);
        let path = self.tree.path(src);
        Debug::Edit(self.db, op, &path).log();

        match (op, existing) {
            (EditOp::Create, Some(_)) => Err(Error::DataExists(path)),
            (EditOp::Delete, None) => Err(Error::DataMissing(path)),
            (EditOp::Delete | EditOp::Remove, Some(existing)) => {
                xml.free(existing);
                Ok(())
            }
            (EditOp::Remove, None) => Ok(()),
            (EditOp::Replace, existing) => {
                if let Some(existing) = existing {
                    xml.free(existing);
                }
                let new = xml.add_copy(parent, self.tree, src)?;
                self.declare_namespaces(xml, new, src)
            }
            (EditOp::Merge | EditOp::None, Some(existing)) => {
                self.update(xml, existing, src)?;
                self.apply_children(xml, existing, src, op)
            }
            (EditOp::Merge | EditOp::Create | EditOp::None, None) => {
                let new = xml.add_element(
                    parent,
                    self.tree.node(src).prefix(),
                    self.tree.node(src).name(),
                )?;
                self.update(xml, new, src)?;
                self.declare_namespaces(xml, new, src)?;
                self.apply_children(xml, new, src, op)
            }
        }
    }

    // Copies the attributes, text body and schema of an edit node.
    fn update(
        &self,
        xml: &mut XmlTree,
        dst: NodeIndex,
        src: NodeIndex,
    ) -> Result<(), Error> {
        for attr in self.tree.children(src, Some(NodeKind::Attribute)) {
            let attr = self.tree.node(attr);
            xml.add_attribute(
                dst,
                attr.prefix(),
                attr.name(),
                attr.value().unwrap_or_default(),
            )?;
        }
        if let Some(body) = self.tree.body(src) {
            xml.set_body(dst, body)?;
        }
        if xml.node(dst).schema().is_none() {
            xml.set_schema(dst, self.tree.node(src).schema())?;
        }
        xml.flag_reset(dst, NodeFlags::DEFAULT);
        xml.sort(dst);
        Ok(())
    }

    // Declares on `new` the namespaces its copied subtree relies on and
    // that resolve differently at its new location.
    fn declare_namespaces(
        &self,
        xml: &mut XmlTree,
        new: NodeIndex,
        src: NodeIndex,
    ) -> Result<(), Error> {
        let nsctx = NsContext::from_node(self.tree, src, &self.resolve);
        for prefix in used_prefixes(self.tree, src) {
            let Some(uri) = nsctx.get(prefix.as_deref()) else {
                continue;
            };
            if xml.lookup_ns(new, prefix.as_deref(), &self.resolve)?.as_deref()
                != Some(uri)
            {
                xml.declare(new, new, prefix.as_deref(), uri)?;
            }
        }
        Ok(())
    }
}

// ===== impl Xmldb =====

impl Xmldb {
    // Applies an edit to a database on behalf of a session.
    //
    // The document element of the edit stands for the datastore root.
    // Elements may carry a NETCONF `operation` attribute overriding the
    // operation inherited from their parent, `op` being the default.
    // The edit is applied to a copy of the cached tree, which replaces it
    // only when every element succeeded. Unless the database is volatile,
    // the result is written to disk.
    pub fn put(
        &mut self,
        db: &str,
        op: EditOp,
        edit: &XmlTree,
        session: u32,
    ) -> Result<(), Error> {
        let holder = self.is_locked(db);
        if holder != NO_SESSION && holder != session {
            return Err(Error::LockDenied(db.to_owned(), holder));
        }

        let resolve = self.resolve;
        let spec = self.spec.clone();
        let mut tree = edit.duplicate();
        let operations = extract_operations(&mut tree, &resolve)?;
        if let Some(spec) = &spec {
            if let Bind::NotBound(reason) = tree.bind_schema(spec, &resolve)? {
                return Err(Error::EditInvalid(reason));
            }
        }

        let edit = Edit {
            db,
            tree: &tree,
            operations: &operations,
            spec: spec.as_deref(),
            resolve,
        };
        let mut xml = self.get_cache(db)?.duplicate();
        let root = xml.root();
        let op = operations.get(&tree.root()).copied().unwrap_or(op);
        match op {
            EditOp::Replace | EditOp::Delete | EditOp::Remove => {
                let children = xml
                    .children(root, Some(NodeKind::Element))
                    .collect::<Vec<_>>();
                for child in children {
                    xml.free(child);
                }
            }
            _ => (),
        }
        if !matches!(op, EditOp::Delete | EditOp::Remove) {
            edit.apply_children(&mut xml, root, tree.root(), op)?;
        }
        if let Some(spec) = &spec {
            xml.add_defaults(root, spec)?;
        }
        self.element_get_create(db)?.xml = Some(xml);

        if db == CANDIDATE {
            self.set_modified(db, true)?;
        }
        if !self.volatile(db)? {
            self.write(db)?;
        }

        Ok(())
    }
}

// ===== helper functions =====

// Removes the NETCONF operation attributes of an edit tree, returning the
// operation of each element carrying one.
fn extract_operations(
    tree: &mut XmlTree,
    resolve: &ResolveCtx,
) -> Result<HashMap<NodeIndex, EditOp>, Error> {
    let mut operations = HashMap::new();
    let mut stack = vec![tree.root()];
    while let Some(element) = stack.pop() {
        stack.extend(tree.children(element, Some(NodeKind::Element)));

        let attrs = tree
            .children(element, Some(NodeKind::Attribute))
            .filter(|attr| {
                let node = tree.node(*attr);
                node.name() == OPERATION_ATTR
                    && node.prefix().is_some_and(|prefix| prefix != XMLNS)
            })
            .collect::<Vec<_>>();
        for attr in attrs {
            let prefix = tree.node(attr).prefix().map(str::to_owned);
            let uri = tree.lookup_ns(element, prefix.as_deref(), resolve)?;
            if uri.as_deref() != Some(NETCONF_BASE_NAMESPACE) {
                continue;
            }
            let op = tree
                .node(attr)
                .value()
                .unwrap_or_default()
                .parse::<EditOp>()?;
            operations.insert(element, op);
            tree.free(attr);
        }
    }
    Ok(operations)
}

// Returns the prefixes of the elements and attributes of a subtree.
fn used_prefixes(tree: &XmlTree, index: NodeIndex) -> BTreeSet<Option<String>> {
    let mut prefixes = BTreeSet::new();
    let mut stack = vec![index];
    while let Some(index) = stack.pop() {
        let node = tree.node(index);
        match node.kind() {
            NodeKind::Element => {
                prefixes.insert(node.prefix().map(str::to_owned));
                stack.extend(tree.children(index, None));
            }
            NodeKind::Attribute if !node.is_ns_decl() => {
                if let Some(prefix) = node.prefix() {
                    prefixes.insert(Some(prefix.to_owned()));
                }
            }
            _ => (),
        }
    }
    prefixes
}
