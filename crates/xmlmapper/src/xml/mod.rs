//! XML output sinks.
//!
//! The encoder writes through the [`XmlSink`] trait, which has two
//! implementations:
//!
//! - [`TreeSink`]: buffers the document as an addressable tree and serializes
//!   it with quick-xml at the end. Supports attributes, escaped and raw text,
//!   CDATA sections and nested elements in any order.
//! - [`StreamSink`]: forward-only. Events go to the quick-xml writer as they
//!   arrive. Attributes must precede the content of their element, and CDATA
//!   sections cannot be written.
//!
//! ## Output Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Person id="42">
//!     <name>Ada</name>
//!     <tags>x</tags>
//!     <tags>y</tags>
//! </Person>
//! ```
//!
//! Empty elements are written self-closing, text is escaped for `<`, `>` and
//! `&`, and attribute values are fully escaped.

pub mod sink;
pub mod stream;
pub mod tree;
pub(crate) mod utils;

pub use sink::XmlSink;
pub use stream::StreamSink;
pub use tree::TreeSink;
