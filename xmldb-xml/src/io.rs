//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::Error;
use crate::tree::{NodeFlags, NodeIndex, NodeKind, XmlTree};

// Output settings of the XML printer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrintOpts {
    // Indent nested elements.
    pub pretty: bool,
    // Leave out nodes created from schema default values.
    pub skip_defaults: bool,
}

// ===== impl XmlTree =====

impl XmlTree {
    // Parses a document. Its single top-level element becomes the root of
    // the returned tree.
    pub fn parse(text: &str) -> Result<XmlTree, Error> {
        let mut scratch = XmlTree::new("top");
        let root = scratch.root();
        let top = scratch.parse_fragment(root, text)?;
        match top.as_slice() {
            [element] => scratch.subtree(*element),
            [] => Err(Error::XmlInvalid("no document element".to_owned())),
            _ => Err(Error::XmlInvalid(
                "more than one document element".to_owned(),
            )),
        }
    }

    // Parses a sequence of elements and appends them to `parent`. Returns
    // the indices of the new top-level elements.
    pub fn parse_fragment(
        &mut self,
        parent: NodeIndex,
        text: &str,
    ) -> Result<Vec<NodeIndex>, Error> {
        let mut reader = Reader::from_str(text);
        reader.trim_text(true);

        let mut stack = vec![parent];
        let mut top = vec![];
        loop {
            let current = stack[stack.len() - 1];
            match reader.read_event()? {
                Event::Start(start) => {
                    let element = self.add_start(current, &start)?;
                    if stack.len() == 1 {
                        top.push(element);
                    }
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = self.add_start(current, &start)?;
                    if stack.len() == 1 {
                        top.push(element);
                    }
                }
                Event::End(_) => {
                    if stack.len() == 1 {
                        return Err(Error::XmlInvalid(
                            "unexpected end tag".to_owned(),
                        ));
                    }
                    stack.pop();
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    if stack.len() == 1 {
                        return Err(Error::XmlInvalid(
                            "text outside of an element".to_owned(),
                        ));
                    }
                    self.add_body(current, &text)?;
                }
                Event::CData(data) => {
                    if stack.len() == 1 {
                        return Err(Error::XmlInvalid(
                            "text outside of an element".to_owned(),
                        ));
                    }
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(|error| Error::XmlInvalid(error.to_string()))?;
                    self.add_body(current, &text)?;
                }
                Event::Eof => break,
                // Declarations, comments and processing instructions.
                _ => (),
            }
        }
        if stack.len() > 1 {
            return Err(Error::XmlInvalid("unclosed element".to_owned()));
        }

        Ok(top)
    }

    // Serializes a node and its subtree.
    pub fn print(
        &self,
        index: NodeIndex,
        opts: PrintOpts,
    ) -> Result<String, Error> {
        let node = self.get(index).ok_or(Error::NodeNotFound)?;
        if !node.is_element() {
            return Ok(node.value().unwrap_or_default().to_owned());
        }

        let mut writer = match opts.pretty {
            true => Writer::new_with_indent(Vec::new(), b' ', 2),
            false => Writer::new(Vec::new()),
        };
        self.write_element(&mut writer, index, opts)?;
        String::from_utf8(writer.into_inner())
            .map_err(|error| Error::XmlInvalid(error.to_string()))
    }

    // Returns whether the node and all the elements below it were created
    // from schema defaults.
    pub fn is_default(&self, index: NodeIndex) -> bool {
        self.node(index).flags().contains(NodeFlags::DEFAULT)
            && self
                .children(index, Some(NodeKind::Element))
                .all(|child| self.is_default(child))
    }

    fn add_start(
        &mut self,
        parent: NodeIndex,
        start: &BytesStart<'_>,
    ) -> Result<NodeIndex, Error> {
        let qname = std::str::from_utf8(start.name().as_ref())
            .map_err(|error| Error::XmlInvalid(error.to_string()))?
            .to_owned();
        let (prefix, name) = split_qname(&qname);
        let element = self.add_element(parent, prefix, name)?;

        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|error| Error::XmlInvalid(error.to_string()))?;
            let value = attr.unescape_value()?;
            let (prefix, name) = split_qname(key);
            self.add_attribute(element, prefix, name, &value)?;
        }

        Ok(element)
    }

    fn write_element(
        &self,
        writer: &mut Writer<Vec<u8>>,
        index: NodeIndex,
        opts: PrintOpts,
    ) -> Result<(), Error> {
        let qname = self.node(index).qname();
        let mut start = BytesStart::new(qname.as_str());
        for attr in self.children(index, Some(NodeKind::Attribute)) {
            let attr = self.node(attr);
            start.push_attribute((
                attr.qname().as_str(),
                attr.value().unwrap_or_default(),
            ));
        }

        let content = self
            .children(index, None)
            .filter(|child| match self.node(*child).kind() {
                NodeKind::Attribute => false,
                NodeKind::Body => true,
                NodeKind::Element => {
                    !(opts.skip_defaults && self.is_default(*child))
                }
            })
            .collect::<Vec<_>>();
        if content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in content {
            let node = self.node(child);
            match node.kind() {
                NodeKind::Body => {
                    let text = node.value().unwrap_or_default();
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                }
                _ => self.write_element(writer, child, opts)?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(qname.as_str())))?;

        Ok(())
    }
}

impl std::fmt::Display for XmlTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self
            .print(self.root(), PrintOpts::default())
            .map_err(|_| std::fmt::Error)?;
        write!(f, "{text}")
    }
}

// ===== helper functions =====

// Splits a qualified name into its prefix and local name.
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, qname),
    }
}
