//! Property metadata and the interfaces the encoder uses to introspect types.
//!
//! The encoder never inspects Rust types directly. It asks three narrow
//! collaborators instead:
//!
//! - [`XmlSerializable`]: implemented by every encodable type (usually via
//!   `#[derive(XmlSerializable)]`). Exposes the static [`ClassMetadata`] of the
//!   type and a by-name value accessor.
//! - [`PropertyInfoExtractor`]: lists the properties of a class in output order
//!   and reports the declared type of each one.
//! - [`AnnotationReader`]: reports the role [`Markers`] of a property.
//!
//! [`StaticMetadata`] implements both extractor traits on top of the static
//! class descriptors. [`MetadataRegistry`] is an explicit table that can
//! replace it when the set of encodable classes must be controlled.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::{MapperError, Result};
use crate::role::Markers;
use crate::value::Value;

/// Static type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Boolean,
    /// A nested type that is itself [`XmlSerializable`].
    Object,
    /// Unknown or mixed; the runtime value decides how it is written.
    Mixed,
    /// Any other named type (`"Date"`, `"NaiveDate"`, ...), usually a coercion target.
    Named(&'static str),
}

impl TypeTag {
    /// Creates a [`TypeTag::Named`] tag.
    pub const fn named(name: &'static str) -> Self {
        TypeTag::Named(name)
    }

    /// Returns true for [`TypeTag::Object`].
    pub const fn is_object(&self) -> bool {
        matches!(self, TypeTag::Object)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::String => write!(f, "string"),
            TypeTag::Integer => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Boolean => write!(f, "bool"),
            TypeTag::Object => write!(f, "object"),
            TypeTag::Mixed => write!(f, "mixed"),
            TypeTag::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Declared type of a property: a single value or a collection of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Single(TypeTag),
    /// A collection; the tag is the element type.
    Collection(TypeTag),
}

impl DeclaredType {
    /// Type assumed when the extractor has no information about a property.
    pub const DEFAULT: DeclaredType = DeclaredType::Single(TypeTag::String);

    /// Returns the scalar tag, or the element tag for collections.
    pub const fn tag(&self) -> TypeTag {
        match self {
            DeclaredType::Single(tag) | DeclaredType::Collection(tag) => *tag,
        }
    }

    pub const fn is_collection(&self) -> bool {
        matches!(self, DeclaredType::Collection(_))
    }

    /// Replaces the tag while keeping collection-ness.
    #[must_use]
    pub const fn with_tag(self, tag: TypeTag) -> Self {
        match self {
            DeclaredType::Single(_) => DeclaredType::Single(tag),
            DeclaredType::Collection(_) => DeclaredType::Collection(tag),
        }
    }

    /// Wraps the tag of this type into a collection type.
    #[must_use]
    pub const fn into_collection(self) -> Self {
        DeclaredType::Collection(self.tag())
    }
}

impl Default for DeclaredType {
    fn default() -> Self {
        DeclaredType::DEFAULT
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Single(tag) => write!(f, "{}", tag),
            DeclaredType::Collection(tag) => write!(f, "{}[]", tag),
        }
    }
}

/// Static descriptor of one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyMetadata {
    pub name: &'static str,
    pub declared_type: Option<DeclaredType>,
    pub markers: Markers,
}

impl PropertyMetadata {
    pub const fn new(name: &'static str, declared_type: Option<DeclaredType>, markers: Markers) -> Self {
        Self {
            name,
            declared_type,
            markers,
        }
    }
}

/// Static descriptor of an encodable class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassMetadata {
    /// Fully qualified name, used as the class identity.
    pub name: &'static str,
    /// Short name, used for the root element.
    pub short_name: &'static str,
    /// Properties in declaration order.
    pub properties: &'static [PropertyMetadata],
}

impl ClassMetadata {
    pub const fn new(
        name: &'static str,
        short_name: &'static str,
        properties: &'static [PropertyMetadata],
    ) -> Self {
        Self {
            name,
            short_name,
            properties,
        }
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&'static PropertyMetadata> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A type that can be encoded to XML.
///
/// Usually implemented with `#[derive(XmlSerializable)]`. Hand-written
/// implementations must keep [`metadata`](Self::metadata) and
/// [`property_value`](Self::property_value) consistent: every listed property
/// should be readable, and unreadable ones are skipped silently.
pub trait XmlSerializable {
    /// Returns the static descriptor of the runtime type.
    fn metadata(&self) -> &'static ClassMetadata;

    /// Reads a property. `None` means the property does not exist on this
    /// instance; an existing property without a value returns `Some(Value::Null)`.
    fn property_value(&self, property: &str) -> Option<Value<'_>>;
}

impl fmt::Debug for dyn XmlSerializable + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.metadata().name)
    }
}

/// Lists properties and their declared types.
pub trait PropertyInfoExtractor: Send + Sync {
    /// Returns the property names of `class` in output order.
    fn properties<'a>(&'a self, class: &'a ClassMetadata) -> Result<Vec<Cow<'a, str>>>;

    /// Returns the declared type of a property, if known.
    fn declared_type(&self, class: &ClassMetadata, property: &str) -> Option<DeclaredType>;
}

/// Reports the role markers attached to a property.
pub trait AnnotationReader: Send + Sync {
    fn markers(&self, class: &ClassMetadata, property: &str) -> Markers;
}

/// Reads everything from the static [`ClassMetadata`] of the instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMetadata;

impl PropertyInfoExtractor for StaticMetadata {
    fn properties<'a>(&'a self, class: &'a ClassMetadata) -> Result<Vec<Cow<'a, str>>> {
        Ok(class
            .properties
            .iter()
            .map(|p| Cow::Borrowed(p.name))
            .collect())
    }

    fn declared_type(&self, class: &ClassMetadata, property: &str) -> Option<DeclaredType> {
        class.property(property).and_then(|p| p.declared_type)
    }
}

impl AnnotationReader for StaticMetadata {
    fn markers(&self, class: &ClassMetadata, property: &str) -> Markers {
        class
            .property(property)
            .map(|p| p.markers)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
struct RegisteredProperty {
    name: String,
    declared_type: Option<DeclaredType>,
    markers: Markers,
}

#[derive(Debug, Clone, Default)]
struct RegisteredClass {
    properties: Vec<RegisteredProperty>,
}

impl RegisteredClass {
    fn property(&self, name: &str) -> Option<&RegisteredProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Explicit class table used instead of the static descriptors.
///
/// Only registered classes can be encoded; any other class fails with
/// [`MapperError::MetadataUnavailable`]. Property lists may be a subset or a
/// reordering of the fields the type actually has.
///
/// # Example
///
/// ```
/// use helios_xmlmapper::metadata::{DeclaredType, MetadataRegistry, TypeTag};
/// use helios_xmlmapper::role::Markers;
///
/// let mut registry = MetadataRegistry::new();
/// registry
///     .register("app::Person")
///     .property_with_markers("id", Some(DeclaredType::Single(TypeTag::Integer)), Markers::ATTRIBUTE)
///     .property("name", None);
/// assert!(registry.contains("app::Person"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    classes: HashMap<String, RegisteredClass>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or resets) a class and returns a builder for its properties.
    pub fn register(&mut self, class: impl Into<String>) -> ClassEntry<'_> {
        let entry = self.classes.entry(class.into()).or_default();
        entry.properties.clear();
        ClassEntry { class: entry }
    }

    /// Registers a class with the properties of its static descriptor.
    pub fn register_metadata(&mut self, metadata: &ClassMetadata) -> &mut Self {
        let mut entry = self.register(metadata.name);
        for p in metadata.properties {
            entry = entry.property_with_markers(p.name, p.declared_type, p.markers);
        }
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    fn class(&self, class: &ClassMetadata) -> Result<&RegisteredClass> {
        self.classes
            .get(class.name)
            .ok_or_else(|| MapperError::MetadataUnavailable {
                class: class.name.to_string(),
                reason: "class is not registered".to_string(),
            })
    }
}

/// Builder returned by [`MetadataRegistry::register`].
pub struct ClassEntry<'a> {
    class: &'a mut RegisteredClass,
}

impl ClassEntry<'_> {
    /// Appends a property without role markers.
    pub fn property(self, name: impl Into<String>, declared_type: Option<DeclaredType>) -> Self {
        self.property_with_markers(name, declared_type, Markers::NONE)
    }

    /// Appends a property with role markers.
    pub fn property_with_markers(
        self,
        name: impl Into<String>,
        declared_type: Option<DeclaredType>,
        markers: Markers,
    ) -> Self {
        self.class.properties.push(RegisteredProperty {
            name: name.into(),
            declared_type,
            markers,
        });
        self
    }
}

impl PropertyInfoExtractor for MetadataRegistry {
    fn properties<'a>(&'a self, class: &'a ClassMetadata) -> Result<Vec<Cow<'a, str>>> {
        Ok(self
            .class(class)?
            .properties
            .iter()
            .map(|p| Cow::Borrowed(p.name.as_str()))
            .collect())
    }

    fn declared_type(&self, class: &ClassMetadata, property: &str) -> Option<DeclaredType> {
        self.classes
            .get(class.name)
            .and_then(|c| c.property(property))
            .and_then(|p| p.declared_type)
    }
}

impl AnnotationReader for MetadataRegistry {
    fn markers(&self, class: &ClassMetadata, property: &str) -> Markers {
        self.classes
            .get(class.name)
            .and_then(|c| c.property(property))
            .map(|p| p.markers)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PERSON: ClassMetadata = ClassMetadata::new(
        "app::Person",
        "Person",
        &[
            PropertyMetadata::new(
                "id",
                Some(DeclaredType::Single(TypeTag::Integer)),
                Markers::ATTRIBUTE,
            ),
            PropertyMetadata::new("name", None, Markers::NONE),
            PropertyMetadata::new(
                "tags",
                Some(DeclaredType::Collection(TypeTag::String)),
                Markers::NONE,
            ),
        ],
    );

    static OTHER: ClassMetadata = ClassMetadata::new("app::Other", "Other", &[]);

    #[test]
    fn test_declared_type_helpers() {
        let tags = DeclaredType::Collection(TypeTag::String);
        assert!(tags.is_collection());
        assert_eq!(tags.tag(), TypeTag::String);
        assert_eq!(
            tags.with_tag(TypeTag::named("Date")),
            DeclaredType::Collection(TypeTag::Named("Date"))
        );
        assert_eq!(
            DeclaredType::Single(TypeTag::Object).into_collection(),
            DeclaredType::Collection(TypeTag::Object)
        );
        assert_eq!(DeclaredType::default(), DeclaredType::Single(TypeTag::String));
        assert_eq!(tags.to_string(), "string[]");
    }

    #[test]
    fn test_static_metadata_preserves_order() {
        let names = StaticMetadata.properties(&PERSON).unwrap();
        assert_eq!(names, vec!["id", "name", "tags"]);
    }

    #[test]
    fn test_static_metadata_types_and_markers() {
        assert_eq!(
            StaticMetadata.declared_type(&PERSON, "id"),
            Some(DeclaredType::Single(TypeTag::Integer))
        );
        assert_eq!(StaticMetadata.declared_type(&PERSON, "name"), None);
        assert_eq!(StaticMetadata.declared_type(&PERSON, "missing"), None);
        assert_eq!(StaticMetadata.markers(&PERSON, "id"), Markers::ATTRIBUTE);
        assert_eq!(StaticMetadata.markers(&PERSON, "missing"), Markers::NONE);
    }

    #[test]
    fn test_registry_unknown_class_is_unavailable() {
        let registry = MetadataRegistry::new();
        let err = registry.properties(&OTHER).unwrap_err();
        assert!(matches!(err, MapperError::MetadataUnavailable { ref class, .. } if class == "app::Other"));
    }

    #[test]
    fn test_registry_overrides_order_and_markers() {
        let mut registry = MetadataRegistry::new();
        registry
            .register("app::Person")
            .property("name", None)
            .property_with_markers(
                "id",
                Some(DeclaredType::Single(TypeTag::Integer)),
                Markers::NODE_VALUE,
            );

        assert_eq!(registry.properties(&PERSON).unwrap(), vec!["name", "id"]);
        assert_eq!(registry.markers(&PERSON, "id"), Markers::NODE_VALUE);
        assert_eq!(registry.markers(&PERSON, "tags"), Markers::NONE);
        assert_eq!(registry.declared_type(&PERSON, "tags"), None);
    }

    #[test]
    fn test_registry_from_static_metadata() {
        let mut registry = MetadataRegistry::new();
        registry.register_metadata(&PERSON);
        assert!(registry.contains("app::Person"));
        assert_eq!(registry.properties(&PERSON).unwrap(), vec!["id", "name", "tags"]);
        assert_eq!(registry.markers(&PERSON, "id"), Markers::ATTRIBUTE);
    }

    #[test]
    fn test_register_resets_properties() {
        let mut registry = MetadataRegistry::new();
        registry.register_metadata(&PERSON);
        registry.register("app::Person").property("name", None);
        assert_eq!(registry.properties(&PERSON).unwrap(), vec!["name"]);
    }
}
