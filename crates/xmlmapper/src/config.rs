//! Encoder configuration.
//!
//! [`EncoderConfig`] can be built programmatically or deserialized from any
//! serde format. Missing fields take their defaults.
//!
//! | Field | Default | Description |
//! |-------|---------|-------------|
//! | `indent` | `4` | Spaces per nesting level, `null` for compact output |
//! | `xml_declaration` | `true` | Emit `<?xml version="1.0" encoding="UTF-8"?>` |
//! | `escape_node_values` | `false` | Escape node-value text instead of writing it raw |
//! | `name_case` | `null` | Name converter used when none is injected |
//! | `sink` | `tree` | Output backend for [`to_xml_string_with`](crate::to_xml_string_with) |
//!
//! # Example
//!
//! ```
//! use helios_xmlmapper::config::{EncoderConfig, SinkKind};
//! use helios_xmlmapper::converter::NameCase;
//!
//! let config = EncoderConfig::default()
//!     .with_indent(None)
//!     .with_name_case(NameCase::Camel)
//!     .with_sink(SinkKind::Stream);
//! assert!(config.indent.is_none());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::converter::NameCase;

/// Default indentation width.
pub const DEFAULT_INDENT: usize = 4;

/// Output backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Buffered document tree. Supports every property role.
    #[default]
    Tree,
    /// Forward-only writer. Cannot express CDATA sections.
    Stream,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Tree => write!(f, "tree"),
            SinkKind::Stream => write!(f, "stream"),
        }
    }
}

/// Configuration for an [`XmlEncoder`](crate::XmlEncoder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EncoderConfig {
    pub indent: Option<usize>,
    pub xml_declaration: bool,
    pub escape_node_values: bool,
    pub name_case: Option<NameCase>,
    pub sink: SinkKind,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            indent: Some(DEFAULT_INDENT),
            xml_declaration: true,
            escape_node_values: false,
            name_case: None,
            sink: SinkKind::Tree,
        }
    }
}

impl EncoderConfig {
    /// Compact output without indentation.
    pub fn compact() -> Self {
        Self::default().with_indent(None)
    }

    #[must_use]
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }

    #[must_use]
    pub fn with_escape_node_values(mut self, escape: bool) -> Self {
        self.escape_node_values = escape;
        self
    }

    #[must_use]
    pub fn with_name_case(mut self, name_case: NameCase) -> Self {
        self.name_case = Some(name_case);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: SinkKind) -> Self {
        self.sink = sink;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EncoderConfig::default();
        assert_eq!(config.indent, Some(4));
        assert!(config.xml_declaration);
        assert!(!config.escape_node_values);
        assert_eq!(config.name_case, None);
        assert_eq!(config.sink, SinkKind::Tree);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EncoderConfig =
            serde_json::from_str(r#"{"indent": null, "name_case": "camel", "sink": "stream"}"#)
                .unwrap();
        assert_eq!(config.indent, None);
        assert_eq!(config.name_case, Some(NameCase::Camel));
        assert_eq!(config.sink, SinkKind::Stream);
        assert!(config.xml_declaration);
    }

    #[test]
    fn test_deserialize_empty_is_default() {
        let config: EncoderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EncoderConfig::default());
    }

    #[test]
    fn test_serialize_roundtrip_names() {
        let config = EncoderConfig::compact().with_name_case(NameCase::Kebab);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["name_case"], "kebab");
        assert_eq!(json["sink"], "tree");
        assert!(json["indent"].is_null());
    }

    #[test]
    fn test_sink_kind_display() {
        assert_eq!(SinkKind::Tree.to_string(), "tree");
        assert_eq!(SinkKind::Stream.to_string(), "stream");
    }
}
