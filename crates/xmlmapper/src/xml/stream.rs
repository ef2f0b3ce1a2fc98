//! Forward-only streaming sink.
//!
//! [`StreamSink`] writes quick-xml events as soon as the encoder produces
//! them and keeps only the stack of open elements. The start tag of the
//! innermost element is held back until its first content arrives, so
//! attributes can still be added right after `start_element`. Once content has
//! been written an element can no longer take attributes, and closed elements
//! can never be reopened. CDATA sections are not supported.
//!
//! Indentation follows the tree sink: children of element-only content go on
//! their own lines, and once an element has text its subtree is written
//! without added whitespace. Text that arrives after a child element was
//! already written on its own line cannot take that line break back, so only
//! such late text makes the two sinks differ.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::config::{EncoderConfig, SinkKind};
use crate::error::{MapperError, Result};
use crate::xml::sink::XmlSink;
use crate::xml::utils;

/// Handle to an open element of a [`StreamSink`]: its nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Depth(usize);

#[derive(Debug)]
struct OpenElement {
    name: String,
    has_children: bool,
    /// Text was written into this element.
    mixed: bool,
}

/// Sink that streams XML events into a buffer.
pub struct StreamSink {
    writer: Writer<Vec<u8>>,
    /// Start tag waiting for attributes.
    pending: Option<BytesStart<'static>>,
    open_elements: Vec<OpenElement>,
    indent: Option<usize>,
    xml_declaration: bool,
    started: bool,
}

impl StreamSink {
    /// Creates an empty stream.
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            pending: None,
            open_elements: Vec::new(),
            indent: config.indent,
            xml_declaration: config.xml_declaration,
            started: false,
        }
    }

    /// Checks that `element` is the innermost open element.
    fn check_current(&self, element: Depth) -> Result<()> {
        match self.open_elements.len().checked_sub(1) {
            Some(top) if top == element.0 => Ok(()),
            _ => Err(MapperError::malformed(format!(
                "element at depth {} is not the innermost open element",
                element.0
            ))),
        }
    }

    /// Writes the held-back start tag, if any.
    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }

    /// Returns true if no open element holds text, so line breaks may be added.
    fn can_indent(&self) -> bool {
        self.indent.is_some() && !self.open_elements.iter().any(|e| e.mixed)
    }

    /// Starts a new line indented for nesting level `level`.
    fn write_indent(&mut self, level: usize) {
        let width = self.indent.unwrap_or(0) * level;
        let buffer = self.writer.get_mut();
        buffer.push(b'\n');
        buffer.resize(buffer.len() + width, b' ');
    }

    fn write_declaration(&mut self) -> Result<()> {
        if self.xml_declaration {
            self.writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            self.writer.get_mut().push(b'\n');
        }
        Ok(())
    }

    fn write_text(&mut self, element: Depth, text: BytesText<'_>) -> Result<()> {
        self.check_current(element)?;
        self.flush_pending()?;
        if let Some(current) = self.open_elements.last_mut() {
            current.mixed = true;
        }
        self.writer.write_event(Event::Text(text))?;
        Ok(())
    }
}

impl XmlSink for StreamSink {
    type Handle = Depth;

    const KIND: SinkKind = SinkKind::Stream;

    fn create(config: &EncoderConfig) -> Self {
        Self::new(config)
    }

    fn start_element(&mut self, parent: Option<Depth>, name: &str) -> Result<Depth> {
        match parent {
            None if self.started => {
                return Err(MapperError::malformed(format!(
                    "cannot add second root element '{}'",
                    name
                )));
            }
            None => {
                self.write_declaration()?;
                self.started = true;
            }
            Some(parent) => {
                self.check_current(parent)?;
                self.flush_pending()?;
                if self.can_indent() {
                    self.write_indent(self.open_elements.len());
                }
                if let Some(current) = self.open_elements.last_mut() {
                    current.has_children = true;
                }
            }
        }

        utils::check_name("element", name)?;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open_elements.push(OpenElement {
            name: name.to_string(),
            has_children: false,
            mixed: false,
        });
        Ok(Depth(self.open_elements.len() - 1))
    }

    fn set_attribute(&mut self, element: Depth, name: &str, value: &str) -> Result<()> {
        self.check_current(element)?;
        utils::check_name("attribute", name)?;
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(MapperError::malformed(format!(
                "attribute '{}' written after element content",
                name
            ))),
        }
    }

    fn append_text(&mut self, element: Depth, text: &str) -> Result<()> {
        self.write_text(element, BytesText::from_escaped(utils::escape_text(text)))
    }

    fn append_raw_text(&mut self, element: Depth, text: &str) -> Result<()> {
        self.write_text(element, BytesText::from_escaped(text))
    }

    fn end_element(&mut self, element: Depth) -> Result<()> {
        self.check_current(element)?;

        if let Some(start) = self.pending.take() {
            self.open_elements.pop();
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        let break_line = self.can_indent()
            && self.open_elements.last().is_some_and(|e| e.has_children);
        if break_line {
            self.write_indent(element.0);
        }

        let open = self
            .open_elements
            .pop()
            .ok_or_else(|| MapperError::malformed("no open element to close"))?;
        self.writer
            .write_event(Event::End(BytesEnd::new(open.name)))?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        if !self.started {
            return Err(MapperError::malformed("document has no root element"));
        }
        if let Some(open) = self.open_elements.last() {
            return Err(MapperError::malformed(format!(
                "element '{}' is still open",
                open.name
            )));
        }

        let mut buffer = self.writer.into_inner();
        buffer.push(b'\n');
        Ok(buffer)
    }
}
