//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

/// Index of a statement inside a [`YangSpec`].
///
/// Statements are never removed from a specification, so an index stays
/// valid for the whole lifetime of the specification that created it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SchemaNodeId(usize);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Keyword {
    Spec,
    Module,
    Submodule,
    BelongsTo,
    Import,
    Prefix,
    Namespace,
    Revision,
    Container,
    List,
    Leaf,
    LeafList,
    Choice,
    Case,
    Anydata,
    Anyxml,
    Key,
    Type,
    Default,
    Presence,
    Config,
}

#[derive(Clone, Debug)]
pub struct YangStmt {
    pub keyword: Keyword,
    pub argument: Option<String>,
    pub parent: Option<SchemaNodeId>,
    pub children: Vec<SchemaNodeId>,
}

/// Compiled YANG specification.
///
/// This is the read-only view of an already parsed and validated set of YANG
/// modules. The statement tree is rooted at a [`Keyword::Spec`] statement
/// whose children are the loaded modules.
#[derive(Clone, Debug)]
pub struct YangSpec {
    stmts: Vec<YangStmt>,
}

// ===== impl Keyword =====

impl Keyword {
    // Returns whether statements of this kind instantiate XML data nodes.
    pub fn is_data_node(&self) -> bool {
        matches!(
            self,
            Keyword::Container
                | Keyword::List
                | Keyword::Leaf
                | Keyword::LeafList
                | Keyword::Anydata
                | Keyword::Anyxml
        )
    }

    // Returns whether statements of this kind are transparent in the data
    // tree (their data children appear directly under the parent).
    pub fn is_schema_only(&self) -> bool {
        matches!(self, Keyword::Choice | Keyword::Case)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keyword = match self {
            Keyword::Spec => "spec",
            Keyword::Module => "module",
            Keyword::Submodule => "submodule",
            Keyword::BelongsTo => "belongs-to",
            Keyword::Import => "import",
            Keyword::Prefix => "prefix",
            Keyword::Namespace => "namespace",
            Keyword::Revision => "revision",
            Keyword::Container => "container",
            Keyword::List => "list",
            Keyword::Leaf => "leaf",
            Keyword::LeafList => "leaf-list",
            Keyword::Choice => "choice",
            Keyword::Case => "case",
            Keyword::Anydata => "anydata",
            Keyword::Anyxml => "anyxml",
            Keyword::Key => "key",
            Keyword::Type => "type",
            Keyword::Default => "default",
            Keyword::Presence => "presence",
            Keyword::Config => "config",
        };
        write!(f, "{keyword}")
    }
}

// ===== impl YangSpec =====

impl YangSpec {
    pub fn new() -> YangSpec {
        YangSpec {
            stmts: vec![YangStmt {
                keyword: Keyword::Spec,
                argument: None,
                parent: None,
                children: vec![],
            }],
        }
    }

    pub fn root(&self) -> SchemaNodeId {
        SchemaNodeId(0)
    }

    pub fn get(&self, id: SchemaNodeId) -> &YangStmt {
        &self.stmts[id.0]
    }

    pub fn keyword(&self, id: SchemaNodeId) -> Keyword {
        self.get(id).keyword
    }

    pub fn argument(&self, id: SchemaNodeId) -> Option<&str> {
        self.get(id).argument.as_deref()
    }

    pub fn parent(&self, id: SchemaNodeId) -> Option<SchemaNodeId> {
        self.get(id).parent
    }

    pub fn children(
        &self,
        id: SchemaNodeId,
    ) -> impl Iterator<Item = SchemaNodeId> + '_ {
        self.get(id).children.iter().copied()
    }

    // Appends a new statement as the last child of `parent`.
    pub fn add(
        &mut self,
        parent: SchemaNodeId,
        keyword: Keyword,
        argument: Option<&str>,
    ) -> SchemaNodeId {
        let id = SchemaNodeId(self.stmts.len());
        self.stmts.push(YangStmt {
            keyword,
            argument: argument.map(str::to_owned),
            parent: Some(parent),
            children: vec![],
        });
        self.stmts[parent.0].children.push(id);
        id
    }

    // Adds a module along with its prefix and namespace statements.
    pub fn add_module(
        &mut self,
        name: &str,
        prefix: &str,
        namespace: &str,
    ) -> SchemaNodeId {
        let module = self.add(self.root(), Keyword::Module, Some(name));
        self.add(module, Keyword::Prefix, Some(prefix));
        self.add(module, Keyword::Namespace, Some(namespace));
        module
    }

    // Adds an import statement to the given module.
    pub fn add_import(
        &mut self,
        module: SchemaNodeId,
        name: &str,
        prefix: &str,
    ) -> SchemaNodeId {
        let import = self.add(module, Keyword::Import, Some(name));
        self.add(import, Keyword::Prefix, Some(prefix));
        import
    }

    pub fn add_container(
        &mut self,
        parent: SchemaNodeId,
        name: &str,
    ) -> SchemaNodeId {
        self.add(parent, Keyword::Container, Some(name))
    }

    pub fn add_list(
        &mut self,
        parent: SchemaNodeId,
        name: &str,
        keys: &str,
    ) -> SchemaNodeId {
        let list = self.add(parent, Keyword::List, Some(name));
        self.add(list, Keyword::Key, Some(keys));
        list
    }

    pub fn add_leaf(
        &mut self,
        parent: SchemaNodeId,
        name: &str,
        type_name: &str,
        default: Option<&str>,
    ) -> SchemaNodeId {
        let leaf = self.add(parent, Keyword::Leaf, Some(name));
        self.add(leaf, Keyword::Type, Some(type_name));
        if let Some(default) = default {
            self.add(leaf, Keyword::Default, Some(default));
        }
        leaf
    }

    // Finds the first child of `parent` matching the given keyword and
    // argument. `None` acts as a wildcard for either field.
    pub fn find(
        &self,
        parent: SchemaNodeId,
        keyword: Option<Keyword>,
        argument: Option<&str>,
    ) -> Option<SchemaNodeId> {
        self.children(parent).find(|child| {
            let stmt = self.get(*child);
            keyword.is_none_or(|keyword| stmt.keyword == keyword)
                && argument.is_none_or(|argument| {
                    stmt.argument.as_deref() == Some(argument)
                })
        })
    }

    // Returns all loaded modules, in load order.
    pub fn modules(&self) -> impl Iterator<Item = SchemaNodeId> + '_ {
        self.children(self.root())
            .filter(|id| self.keyword(*id) == Keyword::Module)
    }

    pub fn find_module(&self, name: &str) -> Option<SchemaNodeId> {
        self.find(self.root(), Some(Keyword::Module), Some(name))
    }

    pub fn find_module_by_namespace(
        &self,
        namespace: &str,
    ) -> Option<SchemaNodeId> {
        self.modules()
            .find(|module| self.module_namespace(*module) == Some(namespace))
    }

    pub fn find_module_by_prefix(&self, prefix: &str) -> Option<SchemaNodeId> {
        self.modules()
            .find(|module| self.module_prefix(*module) == Some(prefix))
    }

    pub fn module_prefix(&self, module: SchemaNodeId) -> Option<&str> {
        match self.keyword(module) {
            Keyword::Submodule => self
                .find(module, Some(Keyword::BelongsTo), None)
                .and_then(|belongs_to| {
                    self.find(belongs_to, Some(Keyword::Prefix), None)
                }),
            _ => self.find(module, Some(Keyword::Prefix), None),
        }
        .and_then(|prefix| self.argument(prefix))
    }

    pub fn module_namespace(&self, module: SchemaNodeId) -> Option<&str> {
        let module = match self.keyword(module) {
            Keyword::Submodule => self.submodule_owner(module)?,
            _ => module,
        };
        self.find(module, Some(Keyword::Namespace), None)
            .and_then(|namespace| self.argument(namespace))
    }

    // Returns the (name, prefix) pairs of all imports of the given module.
    pub fn module_imports(
        &self,
        module: SchemaNodeId,
    ) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.children(module)
            .filter(|id| self.keyword(*id) == Keyword::Import)
            .filter_map(|import| {
                let name = self.argument(import)?;
                let prefix = self
                    .find(import, Some(Keyword::Prefix), None)
                    .and_then(|prefix| self.argument(prefix))?;
                Some((name, prefix))
            })
    }

    // Returns the module or submodule the given statement is defined in.
    pub fn node_module(&self, node: SchemaNodeId) -> Option<SchemaNodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.keyword(id) {
                Keyword::Module | Keyword::Submodule => return Some(id),
                _ => current = self.parent(id),
            }
        }
        None
    }

    // Returns the top-level module owning the given statement, following the
    // belongs-to statement of submodules.
    pub fn node_main_module(&self, node: SchemaNodeId) -> Option<SchemaNodeId> {
        let module = self.node_module(node)?;
        match self.keyword(module) {
            Keyword::Submodule => self.submodule_owner(module),
            _ => Some(module),
        }
    }

    // Returns the prefix of the module the given statement belongs to.
    pub fn node_prefix(&self, node: SchemaNodeId) -> Option<&str> {
        self.node_module(node)
            .and_then(|module| self.module_prefix(module))
    }

    // Returns the namespace of the module the given statement belongs to.
    pub fn node_namespace(&self, node: SchemaNodeId) -> Option<&str> {
        self.node_module(node)
            .and_then(|module| self.module_namespace(module))
    }

    // Finds a data child of `node`, looking through choice and case
    // statements which don't instantiate data nodes.
    pub fn find_child(
        &self,
        node: SchemaNodeId,
        keyword: Option<Keyword>,
        name: &str,
    ) -> Option<SchemaNodeId> {
        for child in self.children(node) {
            let stmt = self.get(child);
            if stmt.keyword.is_schema_only() {
                if let Some(found) = self.find_child(child, keyword, name) {
                    return Some(found);
                }
                continue;
            }
            if !stmt.keyword.is_data_node() {
                continue;
            }
            if keyword.is_some_and(|keyword| keyword != stmt.keyword) {
                continue;
            }
            if stmt.argument.as_deref() == Some(name) {
                return Some(child);
            }
        }
        None
    }

    // Returns the data children of `node`, skipping choice and case
    // statements.
    pub fn data_children(&self, node: SchemaNodeId) -> Vec<SchemaNodeId> {
        let mut children = vec![];
        for child in self.children(node) {
            let keyword = self.keyword(child);
            if keyword.is_schema_only() {
                children.extend(self.data_children(child));
            } else if keyword.is_data_node() {
                children.push(child);
            }
        }
        children
    }

    pub fn default_value(&self, node: SchemaNodeId) -> Option<&str> {
        self.find(node, Some(Keyword::Default), None)
            .and_then(|default| self.argument(default))
    }

    pub fn type_name(&self, node: SchemaNodeId) -> Option<&str> {
        self.find(node, Some(Keyword::Type), None)
            .and_then(|type_stmt| self.argument(type_stmt))
    }

    // Returns the key leaf names of a list, in the order they're declared.
    pub fn list_keys(&self, node: SchemaNodeId) -> Vec<&str> {
        self.find(node, Some(Keyword::Key), None)
            .and_then(|key| self.argument(key))
            .map(|keys| keys.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn is_presence(&self, node: SchemaNodeId) -> bool {
        self.find(node, Some(Keyword::Presence), None).is_some()
    }

    // Returns whether the statement is a direct child of a choice or case.
    pub fn in_choice(&self, node: SchemaNodeId) -> bool {
        self.parent(node)
            .is_some_and(|parent| self.keyword(parent).is_schema_only())
    }

    fn submodule_owner(&self, submodule: SchemaNodeId) -> Option<SchemaNodeId> {
        self.find(submodule, Some(Keyword::BelongsTo), None)
            .and_then(|belongs_to| self.argument(belongs_to))
            .and_then(|name| self.find_module(name))
    }
}

impl Default for YangSpec {
    fn default() -> YangSpec {
        YangSpec::new()
    }
}
