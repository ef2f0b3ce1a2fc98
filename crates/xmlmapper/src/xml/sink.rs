//! The output sink abstraction.
//!
//! The encoder drives a sink through element handles. Both implementations
//! share the same calling discipline so the encoder stays sink-agnostic:
//!
//! 1. `start_element(parent, name)` opens an element and returns its handle.
//! 2. Attributes, text, raw text and CDATA are added through the handle.
//! 3. `end_element(handle)` closes it.
//! 4. `finish()` produces the document bytes once the root is closed.
//!
//! An illegal element or attribute name surfaces as
//! [`MapperError::MalformedOutput`](crate::MapperError::MalformedOutput): the
//! tree sink reports it when the document is written out, the stream sink as
//! soon as the name arrives.

use std::fmt;

use crate::config::{EncoderConfig, SinkKind};
use crate::error::{MapperError, Result};

/// Accumulates XML output.
pub trait XmlSink: Sized {
    /// Handle to an element created by this sink.
    type Handle: Copy + fmt::Debug;

    /// Which backend this is.
    const KIND: SinkKind;

    /// Creates an empty sink for one document.
    fn create(config: &EncoderConfig) -> Self;

    /// Opens an element under `parent`, or as the document root when `parent` is `None`.
    fn start_element(&mut self, parent: Option<Self::Handle>, name: &str) -> Result<Self::Handle>;

    /// Sets an attribute on an element.
    fn set_attribute(&mut self, element: Self::Handle, name: &str, value: &str) -> Result<()>;

    /// Appends escaped text content.
    fn append_text(&mut self, element: Self::Handle, text: &str) -> Result<()>;

    /// Appends text content verbatim, without escaping.
    fn append_raw_text(&mut self, element: Self::Handle, text: &str) -> Result<()>;

    /// Returns true if the sink can write CDATA sections.
    fn supports_cdata(&self) -> bool {
        false
    }

    /// Appends a CDATA section.
    fn append_cdata(&mut self, _element: Self::Handle, _text: &str) -> Result<()> {
        Err(MapperError::malformed(format!(
            "the {} sink cannot write CDATA sections",
            Self::KIND
        )))
    }

    /// Closes an element.
    fn end_element(&mut self, element: Self::Handle) -> Result<()>;

    /// Finalizes the document and returns its bytes.
    fn finish(self) -> Result<Vec<u8>>;
}
