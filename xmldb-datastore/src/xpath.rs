//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashSet;

use xmldb_xml::io::split_qname;
use xmldb_xml::{NodeIndex, NodeKind, NsContext, XmlTree};
use xmldb_yang::{Keyword, YangSpec};

use crate::debug::Debug;
use crate::error::Error;
use crate::xmldb::Xmldb;

// Location step of a data path: `[prefix:]name[key='value']...`.
#[derive(Debug, Eq, PartialEq)]
pub struct Step {
    pub prefix: Option<String>,
    pub name: String,
    pub predicates: Vec<(String, String)>,
}

// ===== impl Step =====

impl Step {
    fn parse(step: &str, path: &str) -> Result<Step, Error> {
        let invalid = || Error::InvalidPath(path.to_owned());

        let (qname, mut rest) = match step.find('[') {
            Some(pos) => step.split_at(pos),
            None => (step, ""),
        };
        let (prefix, name) = split_qname(qname);
        if name.is_empty() || prefix.is_some_and(str::is_empty) {
            return Err(invalid());
        }

        let mut predicates = vec![];
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[').ok_or_else(invalid)?;
            let end = inner.find(']').ok_or_else(invalid)?;
            let (key, value) =
                inner[..end].split_once('=').ok_or_else(invalid)?;
            let (_, key) = split_qname(key.trim());
            let value = value.trim();
            let value = value
                .strip_prefix('\'')
                .and_then(|value| value.strip_suffix('\''))
                .or_else(|| {
                    value
                        .strip_prefix('"')
                        .and_then(|value| value.strip_suffix('"'))
                })
                .ok_or_else(invalid)?;
            predicates.push((key.to_owned(), value.to_owned()));
            rest = &inner[end + 1..];
        }

        Ok(Step {
            prefix: prefix.map(str::to_owned),
            name: name.to_owned(),
            predicates,
        })
    }
}

// ===== impl Xmldb =====

impl Xmldb {
    // Returns the part of a database selected by a data path.
    //
    // The result is a new tree rooted at a copy of the datastore root,
    // holding the selected subtrees along with their ancestors and the
    // keys of the ancestor list entries. Prefixes of the path are resolved
    // using `nsctx`, or the namespaces of the loaded modules by default;
    // unprefixed steps match elements of any namespace.
    pub fn get(
        &mut self,
        db: &str,
        xpath: &str,
        nsctx: Option<&NsContext>,
    ) -> Result<XmlTree, Error> {
        Debug::Get(db, xpath).log();
        let steps = parse_path(xpath)?;
        let default_nsctx = match nsctx {
            Some(_) => None,
            None => self.spec.as_deref().map(NsContext::from_schema_root),
        };
        let nsctx = nsctx.or(default_nsctx.as_ref());
        let resolve = self.resolve;
        let spec = self.spec.clone();

        let xml = self.get_cache_mut(db)?;
        let mut selected = vec![xml.root()];
        for step in &steps {
            let uri = match &step.prefix {
                Some(prefix) => Some(
                    nsctx
                        .and_then(|nsctx| nsctx.get(Some(prefix)))
                        .ok_or_else(|| Error::InvalidPath(xpath.to_owned()))?
                        .to_owned(),
                ),
                None => None,
            };

            let mut next = vec![];
            for parent in selected {
                let children = xml
                    .children(parent, Some(NodeKind::Element))
                    .filter(|child| xml.node(*child).name() == step.name)
                    .filter(|child| {
                        step.predicates.iter().all(|(key, value)| {
                            xml.find_value(*child, None, key, NodeKind::Element)
                                == Some(value.as_str())
                        })
                    })
                    .collect::<Vec<_>>();
                for child in children {
                    if let Some(uri) = &uri {
                        let prefix =
                            xml.node(child).prefix().map(str::to_owned);
                        let ns =
                            xml.lookup_ns(child, prefix.as_deref(), &resolve)?;
                        if ns.as_deref() != Some(uri.as_str()) {
                            continue;
                        }
                    }
                    next.push(child);
                }
            }
            selected = next;
        }

        select(xml, &selected, spec.as_deref())
    }
}

// ===== helper functions =====

fn parse_path(xpath: &str) -> Result<Vec<Step>, Error> {
    let path = xpath.trim();
    if path.is_empty() || path == "/" {
        return Ok(vec![]);
    }
    let path = path
        .strip_prefix('/')
        .ok_or_else(|| Error::InvalidPath(xpath.to_owned()))?;

    // Slashes within predicate values don't separate steps.
    let mut steps = vec![];
    let mut depth = 0;
    let mut start = 0;
    for (pos, c) in path.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            '/' if depth == 0 => {
                steps.push(Step::parse(&path[start..pos], xpath)?);
                start = pos + 1;
            }
            _ => (),
        }
    }
    steps.push(Step::parse(&path[start..], xpath)?);

    Ok(steps)
}

// Builds the tree holding the selected nodes and their ancestors.
fn select(
    xml: &XmlTree,
    selected: &[NodeIndex],
    spec: Option<&YangSpec>,
) -> Result<XmlTree, Error> {
    let root = xml.root();
    let mut result = XmlTree::new(xml.node(root).name());
    let result_root = result.root();
    copy_attributes(&mut result, result_root, xml, root)?;

    if selected.contains(&root) {
        for child in xml.children(root, Some(NodeKind::Element)) {
            result.add_copy(result_root, xml, child)?;
        }
        return Ok(result);
    }

    let ancestors = selected
        .iter()
        .flat_map(|node| xml.ancestors(*node))
        .collect::<HashSet<_>>();
    let selection = Selection {
        xml,
        spec,
        selected: selected.iter().copied().collect(),
        ancestors,
    };
    selection.copy_children(&mut result, result_root, root)?;

    Ok(result)
}

fn copy_attributes(
    result: &mut XmlTree,
    dst: NodeIndex,
    xml: &XmlTree,
    src: NodeIndex,
) -> Result<(), Error> {
    for attr in xml.children(src, Some(NodeKind::Attribute)) {
        let attr = xml.node(attr);
        result.add_attribute(
            dst,
            attr.prefix(),
            attr.name(),
            attr.value().unwrap_or_default(),
        )?;
    }
    Ok(())
}

// Nodes selected by a data path, along with their ancestors.
struct Selection<'a> {
    xml: &'a XmlTree,
    spec: Option<&'a YangSpec>,
    selected: HashSet<NodeIndex>,
    ancestors: HashSet<NodeIndex>,
}

// ===== impl Selection =====

impl Selection<'_> {
    fn copy_children(
        &self,
        result: &mut XmlTree,
        parent: NodeIndex,
        node: NodeIndex,
    ) -> Result<(), Error> {
        let xml = self.xml;
        for child in xml.children(node, Some(NodeKind::Element)) {
            if self.selected.contains(&child) {
                result.add_copy(parent, xml, child)?;
            } else if self.ancestors.contains(&child) {
                let cnode = xml.node(child);
                let copy =
                    result.add_element(parent, cnode.prefix(), cnode.name())?;
                result.set_schema(copy, cnode.schema())?;
                copy_attributes(result, copy, xml, child)?;
                self.copy_keys(result, copy, child)?;
                self.copy_children(result, copy, child)?;
            }
        }
        Ok(())
    }

    // Copies the keys of a list entry on the path to a selected node.
    fn copy_keys(
        &self,
        result: &mut XmlTree,
        dst: NodeIndex,
        src: NodeIndex,
    ) -> Result<(), Error> {
        let xml = self.xml;
        let (Some(spec), Some(schema)) = (self.spec, xml.node(src).schema())
        else {
            return Ok(());
        };
        if spec.keyword(schema) != Keyword::List {
            return Ok(());
        }

        let keys = spec.list_keys(schema);
        for child in xml.children(src, Some(NodeKind::Element)) {
            if keys.contains(&xml.node(child).name())
                && !self.selected.contains(&child)
                && !self.ancestors.contains(&child)
            {
                result.add_copy(dst, xml, child)?;
            }
        }
        Ok(())
    }
}
