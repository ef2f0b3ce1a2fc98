//! Buffered tree sink.
//!
//! [`TreeSink`] builds an addressable document tree in memory and writes it
//! out with quick-xml once the root element is closed. Elements stay
//! addressable after they are closed, so attributes and children may be added
//! in any order. This is the only sink that supports CDATA sections.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::config::{EncoderConfig, SinkKind};
use crate::error::{MapperError, Result};
use crate::xml::sink::XmlSink;
use crate::xml::utils;

/// Handle to an element of a [`TreeSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Content of an element, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(NodeId),
    /// Text that is escaped on output.
    Text(String),
    /// Text that is written verbatim.
    RawText(String),
    CData(String),
}

/// An element in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNode {
    pub tag: String,
    /// Attributes in insertion order. Setting an existing name replaces its value in place.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Content>,
    closed: bool,
}

/// Sink that buffers the whole document as a tree.
#[derive(Debug)]
pub struct TreeSink {
    nodes: Vec<OutputNode>,
    root: Option<NodeId>,
    indent: Option<usize>,
    xml_declaration: bool,
}

impl TreeSink {
    /// Creates an empty tree.
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            indent: config.indent,
            xml_declaration: config.xml_declaration,
        }
    }

    /// Returns the root element, if one was started.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns an element of the tree.
    pub fn node(&self, id: NodeId) -> &OutputNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut OutputNode> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| MapperError::malformed(format!("unknown element handle {:?}", id)))
    }

    /// Serializes the tree into `out`.
    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        let root = self
            .root
            .ok_or_else(|| MapperError::malformed("document has no root element"))?;
        if !self.node(root).closed {
            return Err(MapperError::malformed(format!(
                "root element '{}' is still open",
                self.node(root).tag
            )));
        }

        let mut writer = match self.indent {
            Some(width) => Writer::new_with_indent(out, b' ', width),
            None => Writer::new(out),
        };

        if self.xml_declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            // The indenting writer breaks the line itself
            if self.indent.is_none() {
                writer.get_mut().write_all(b"\n")?;
            }
        }

        self.write_element(&mut writer, root)?;
        writer.get_mut().write_all(b"\n")?;

        Ok(())
    }

    /// Returns `true` if the element contains only other elements, meaning
    /// it's safe to indent its children.
    fn is_element_only(&self, id: NodeId) -> bool {
        self.node(id)
            .children
            .iter()
            .all(|c| matches!(c, Content::Element(_)))
    }

    fn write_element<W: Write>(&self, writer: &mut Writer<W>, id: NodeId) -> Result<()> {
        let node = self.node(id);
        utils::check_name("element", &node.tag)?;

        let mut start = BytesStart::new(node.tag.as_str());
        for (name, value) in &node.attributes {
            utils::check_name("attribute", name)?;
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if node.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;

        if self.indent.is_none() || self.is_element_only(id) {
            for child in &node.children {
                self.write_content(writer, child)?;
            }
        } else {
            // Mixed content is written without indentation so no whitespace
            // is added to the text
            let mut inner = Writer::new(Vec::new());
            for child in &node.children {
                self.write_content(&mut inner, child)?;
            }
            let raw = String::from_utf8(inner.into_inner())?;
            writer.write_event(Event::Text(BytesText::from_escaped(raw)))?;
        }

        writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
        Ok(())
    }

    fn write_content<W: Write>(&self, writer: &mut Writer<W>, content: &Content) -> Result<()> {
        match content {
            Content::Element(child) => self.write_element(writer, *child)?,
            Content::Text(text) => {
                writer.write_event(Event::Text(BytesText::from_escaped(utils::escape_text(text))))?
            }
            Content::RawText(text) => {
                writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?
            }
            Content::CData(text) => {
                for part in utils::split_cdata(text) {
                    writer.write_event(Event::CData(BytesCData::new(part)))?;
                }
            }
        }
        Ok(())
    }
}

impl XmlSink for TreeSink {
    type Handle = NodeId;

    const KIND: SinkKind = SinkKind::Tree;

    fn create(config: &EncoderConfig) -> Self {
        Self::new(config)
    }

    fn start_element(&mut self, parent: Option<NodeId>, name: &str) -> Result<NodeId> {
        if parent.is_none() && self.root.is_some() {
            return Err(MapperError::malformed(format!(
                "cannot add second root element '{}'",
                name
            )));
        }

        let id = NodeId(self.nodes.len());
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(Content::Element(id));
        } else {
            self.root = Some(id);
        }
        self.nodes.push(OutputNode {
            tag: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            closed: false,
        });
        Ok(id)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.node_mut(element)?;
        match node.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn append_text(&mut self, element: NodeId, text: &str) -> Result<()> {
        self.node_mut(element)?
            .children
            .push(Content::Text(text.to_string()));
        Ok(())
    }

    fn append_raw_text(&mut self, element: NodeId, text: &str) -> Result<()> {
        self.node_mut(element)?
            .children
            .push(Content::RawText(text.to_string()));
        Ok(())
    }

    fn supports_cdata(&self) -> bool {
        true
    }

    fn append_cdata(&mut self, element: NodeId, text: &str) -> Result<()> {
        self.node_mut(element)?
            .children
            .push(Content::CData(text.to_string()));
        Ok(())
    }

    fn end_element(&mut self, element: NodeId) -> Result<()> {
        self.node_mut(element)?.closed = true;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }
}
