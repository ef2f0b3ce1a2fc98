//! Error types for object to XML mapping.
//!
//! Every failure is terminal: `XmlEncoder::map` either returns a complete
//! document or one of these errors, never a partially encoded tree.

// Variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::metadata::TypeTag;
use crate::role::PropertyRole;

/// Boxed error returned by user supplied coercion transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for all mapping operations.
#[derive(Error, Debug)]
pub enum MapperError {
    /// The property info extractor cannot describe the class.
    #[error("metadata unavailable for {class}: {reason}")]
    MetadataUnavailable { class: String, reason: String },

    /// A registered coercion transform failed. The uncoerced value is never used as a fallback.
    #[error("coercion of property '{property}' ({type_tag}) failed: {source}")]
    Coercion {
        property: String,
        type_tag: TypeTag,
        #[source]
        source: BoxError,
    },

    /// The sink bound to the encoder cannot express the role of a property.
    #[error("property '{property}' has role {role} which the {sink} sink cannot express")]
    UnsupportedRoleForSink {
        property: String,
        role: PropertyRole,
        sink: &'static str,
    },

    /// A non-plain role was declared on a collection-typed property.
    #[error("property {class}::{property} is a collection and cannot carry role {role}")]
    RoleOnCollection {
        class: String,
        property: String,
        role: PropertyRole,
    },

    /// The runtime value does not match the declared type of the property.
    #[error("property '{property}' declared as {expected} but holds {found}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The value cannot be rendered as text.
    #[error("property '{property}' holds a {kind} value which cannot be written as text")]
    UnsupportedValue { property: String, kind: &'static str },

    /// The sink was asked to produce a document that is not well-formed.
    #[error("malformed output: {0}")]
    MalformedOutput(String),

    /// Low level XML writer error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error while writing the document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The produced document was not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl MapperError {
    /// Creates a [`MapperError::MalformedOutput`] from any message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        MapperError::MalformedOutput(msg.into())
    }

    /// Returns true if the error originates from the output sink rather than the object graph.
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            MapperError::MalformedOutput(_)
                | MapperError::Xml(_)
                | MapperError::Io(_)
                | MapperError::Utf8(_)
        )
    }
}

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, MapperError>;
