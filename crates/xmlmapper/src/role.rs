//! Property roles and the role resolver.
//!
//! A property carries zero or more role markers. The resolver turns the
//! marker set into exactly one [`PropertyRole`] with a fixed priority:
//! attribute, then CDATA section, then node value. Conflicting markers are
//! not an error; the first match wins.

use std::fmt;

/// Role markers attached to a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Markers {
    pub attribute: bool,
    pub cdata: bool,
    pub node_value: bool,
}

impl Markers {
    /// No markers: the property is encoded as a plain element.
    pub const NONE: Markers = Markers {
        attribute: false,
        cdata: false,
        node_value: false,
    };

    pub const ATTRIBUTE: Markers = Markers::NONE.with_attribute();
    pub const CDATA: Markers = Markers::NONE.with_cdata();
    pub const NODE_VALUE: Markers = Markers::NONE.with_node_value();

    #[must_use]
    pub const fn with_attribute(mut self) -> Self {
        self.attribute = true;
        self
    }

    #[must_use]
    pub const fn with_cdata(mut self) -> Self {
        self.cdata = true;
        self
    }

    #[must_use]
    pub const fn with_node_value(mut self) -> Self {
        self.node_value = true;
        self
    }

    /// Returns true if no marker is set.
    pub const fn is_empty(&self) -> bool {
        !self.attribute && !self.cdata && !self.node_value
    }
}

/// How a property is represented in the XML output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyRole {
    /// An attribute on the enclosing element.
    Attribute,
    /// A `<![CDATA[...]]>` section inside the enclosing element.
    CDataSection,
    /// Unescaped text content of the enclosing element.
    NodeValue,
    /// A child element (or repeated sibling elements for collections).
    #[default]
    Plain,
}

impl PropertyRole {
    /// Returns true for every role except [`PropertyRole::Plain`].
    pub fn is_marked(&self) -> bool {
        !matches!(self, PropertyRole::Plain)
    }
}

impl fmt::Display for PropertyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyRole::Attribute => write!(f, "attribute"),
            PropertyRole::CDataSection => write!(f, "cdata-section"),
            PropertyRole::NodeValue => write!(f, "node-value"),
            PropertyRole::Plain => write!(f, "plain"),
        }
    }
}

/// Resolves the role of a property from its markers.
pub fn resolve_role(markers: Markers) -> PropertyRole {
    if markers.attribute {
        PropertyRole::Attribute
    } else if markers.cdata {
        PropertyRole::CDataSection
    } else if markers.node_value {
        PropertyRole::NodeValue
    } else {
        PropertyRole::Plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markers_is_plain() {
        assert_eq!(resolve_role(Markers::NONE), PropertyRole::Plain);
        assert!(Markers::NONE.is_empty());
        assert_eq!(Markers::default(), Markers::NONE);
    }

    #[test]
    fn test_single_markers() {
        assert_eq!(resolve_role(Markers::ATTRIBUTE), PropertyRole::Attribute);
        assert_eq!(resolve_role(Markers::CDATA), PropertyRole::CDataSection);
        assert_eq!(resolve_role(Markers::NODE_VALUE), PropertyRole::NodeValue);
    }

    #[test]
    fn test_attribute_wins_over_node_value() {
        let markers = Markers::ATTRIBUTE.with_node_value();
        assert_eq!(resolve_role(markers), PropertyRole::Attribute);
    }

    #[test]
    fn test_cdata_wins_over_node_value() {
        let markers = Markers::NODE_VALUE.with_cdata();
        assert_eq!(resolve_role(markers), PropertyRole::CDataSection);
    }

    #[test]
    fn test_all_markers_resolve_to_attribute() {
        let markers = Markers::NONE
            .with_node_value()
            .with_cdata()
            .with_attribute();
        assert_eq!(resolve_role(markers), PropertyRole::Attribute);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(PropertyRole::Attribute.to_string(), "attribute");
        assert_eq!(PropertyRole::CDataSection.to_string(), "cdata-section");
        assert_eq!(PropertyRole::NodeValue.to_string(), "node-value");
        assert_eq!(PropertyRole::Plain.to_string(), "plain");
        assert!(!PropertyRole::Plain.is_marked());
        assert!(PropertyRole::NodeValue.is_marked());
    }
}
