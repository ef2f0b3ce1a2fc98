//! # Helios XML Mapper
//!
//! Metadata-driven encoding of object graphs to XML documents.
//!
//! An object describes itself through [`XmlSerializable`]: a static
//! [`ClassMetadata`] listing its properties (declared types and role markers)
//! and a reader for property values. The [`XmlEncoder`] walks that graph and
//! writes one element per object, with properties as child elements,
//! attributes, CDATA sections or raw text content.
//!
//! ## Features
//!
//! - **Role Markers**: a property can be an attribute, a CDATA section or the
//!   element's own text; the first marker in that order wins.
//! - **Type Coercion**: per-type transforms registered with
//!   [`XmlEncoder::add_type`] rewrite values before they are written.
//! - **Name Conversion**: output names can be rewritten through any
//!   [`NameConverter`], e.g. [`CamelCaseConverter`].
//! - **Two Sinks**: [`TreeSink`] buffers the document and supports every role;
//!   [`StreamSink`] writes events forward-only and rejects CDATA.
//!
//! ## Mapping Rules
//!
//! | Property | XML |
//! |----------|-----|
//! | `name: Some("Ada")` | `<name>Ada</name>` |
//! | `active: Some(true)` | `<active>1</active>` |
//! | `tags: vec!["x", "y"]` | `<tags>x</tags><tags>y</tags>` |
//! | `#[xml(attribute)] id: 42` | `<Person id="42">` |
//! | `#[xml(cdata)] body` | `<![CDATA[...]]>` |
//! | `#[xml(node_value)] text` | raw text inside the element |
//! | `None` | nothing |
//!
//! ## Example
//!
//! ```
//! use helios_xmlmapper::{EncoderConfig, XmlSerializable, to_xml_string_with};
//!
//! #[derive(XmlSerializable)]
//! struct Person {
//!     name: Option<String>,
//!     active: Option<bool>,
//!     tags: Vec<String>,
//! }
//!
//! let person = Person {
//!     name: Some("Ada".to_string()),
//!     active: Some(true),
//!     tags: vec!["x".to_string(), "y".to_string()],
//! };
//!
//! let xml = to_xml_string_with(&person, &EncoderConfig::compact()).unwrap();
//! assert_eq!(
//!     xml,
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
//!      <Person><name>Ada</name><active>1</active><tags>x</tags><tags>y</tags></Person>\n"
//! );
//! ```

extern crate self as helios_xmlmapper;

pub mod coercion;
pub mod config;
pub mod converter;
pub mod encoder;
pub mod error;
pub mod metadata;
pub mod role;
pub mod value;
pub mod xml;

pub use coercion::CoercionRegistry;
pub use config::{EncoderConfig, SinkKind};
pub use converter::{CamelCaseConverter, NameCase, NameConverter};
pub use encoder::{XmlEncoder, to_xml_string, to_xml_string_with};
pub use error::{BoxError, MapperError, Result};
pub use metadata::{
    AnnotationReader, ClassMetadata, DeclaredType, MetadataRegistry, PropertyInfoExtractor,
    PropertyMetadata, StaticMetadata, TypeTag, XmlSerializable,
};
pub use role::{Markers, PropertyRole, resolve_role};
pub use value::{Value, XmlValue};
pub use xml::{StreamSink, TreeSink, XmlSink};

#[cfg(feature = "derive")]
pub use helios_xmlmapper_derive::XmlSerializable;
