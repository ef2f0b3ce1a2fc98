//! The recursive encoding engine.
//!
//! [`XmlEncoder`] walks an object graph through the metadata interfaces and
//! writes it into an [`XmlSink`]. For every property, in the order the
//! extractor reports them:
//!
//! 1. the declared type is looked up (default: single string),
//! 2. a registered coercion rule for that type replaces the value,
//! 3. absent values are dropped without a trace,
//! 4. the name converter produces the output name,
//! 5. the resolved role decides between attribute, CDATA section, raw text,
//!    repeated sibling elements (collections), a nested element (objects) or a
//!    scalar element.
//!
//! A `map` call is all-or-nothing: the first failure aborts the call and no
//! partial document is returned.

use std::fmt;
use std::io::Write;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, debug_span, trace};

use crate::coercion::CoercionRegistry;
use crate::config::{EncoderConfig, SinkKind};
use crate::converter::NameConverter;
use crate::error::{BoxError, MapperError, Result};
use crate::metadata::{
    AnnotationReader, DeclaredType, PropertyInfoExtractor, StaticMetadata, TypeTag, XmlSerializable,
};
use crate::role::{PropertyRole, resolve_role};
use crate::value::Value;
use crate::xml::{StreamSink, TreeSink, XmlSink};

/// Encodes objects to XML documents.
///
/// The sink type parameter selects the backend. Coercion rules are registered
/// through `&mut self` and encoding runs through `&self`, so the registry is
/// frozen while any `map` call is in flight and an encoder can be shared
/// between threads once configured.
///
/// # Example
///
/// ```
/// use helios_xmlmapper::{XmlEncoder, XmlSerializable};
///
/// #[derive(XmlSerializable)]
/// struct Person {
///     #[xml(attribute)]
///     id: u32,
///     name: Option<String>,
/// }
///
/// let encoder = XmlEncoder::compact();
/// let xml = encoder.map(&Person { id: 42, name: None }).unwrap();
/// assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Person id=\"42\"/>\n");
/// ```
pub struct XmlEncoder<S: XmlSink = TreeSink> {
    config: EncoderConfig,
    extractor: Arc<dyn PropertyInfoExtractor>,
    annotations: Arc<dyn AnnotationReader>,
    name_converter: Option<Box<dyn NameConverter>>,
    coercions: CoercionRegistry,
    _sink: PhantomData<fn() -> S>,
}

impl XmlEncoder<TreeSink> {
    /// Creates a tree-backed encoder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    /// Creates a tree-backed encoder producing compact output.
    pub fn compact() -> Self {
        Self::with_config(EncoderConfig::compact())
    }
}

impl Default for XmlEncoder<TreeSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlEncoder<StreamSink> {
    /// Creates a stream-backed encoder with the default configuration.
    pub fn streaming() -> Self {
        Self::with_config(EncoderConfig::default().with_sink(SinkKind::Stream))
    }
}

impl<S: XmlSink> XmlEncoder<S> {
    /// Creates an encoder from a configuration.
    ///
    /// The `sink` field of the configuration is ignored here; the backend is
    /// the type parameter `S`.
    pub fn with_config(config: EncoderConfig) -> Self {
        let name_converter = config
            .name_case
            .map(|case| Box::new(case) as Box<dyn NameConverter>);
        Self {
            config,
            extractor: Arc::new(StaticMetadata),
            annotations: Arc::new(StaticMetadata),
            name_converter,
            coercions: CoercionRegistry::new(),
            _sink: PhantomData,
        }
    }

    /// Replaces the property info extractor.
    #[must_use]
    pub fn with_extractor<E>(mut self, extractor: E) -> Self
    where
        E: PropertyInfoExtractor + 'static,
    {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Replaces the annotation reader.
    #[must_use]
    pub fn with_annotation_reader<A>(mut self, annotations: A) -> Self
    where
        A: AnnotationReader + 'static,
    {
        self.annotations = Arc::new(annotations);
        self
    }

    /// Uses one source for both property info and annotations, e.g. a
    /// [`MetadataRegistry`](crate::metadata::MetadataRegistry).
    #[must_use]
    pub fn with_metadata<M>(mut self, metadata: M) -> Self
    where
        M: PropertyInfoExtractor + AnnotationReader + 'static,
    {
        let metadata = Arc::new(metadata);
        self.extractor = metadata.clone();
        self.annotations = metadata;
        self
    }

    /// Sets the name converter, overriding `name_case` from the configuration.
    #[must_use]
    pub fn with_name_converter<C>(mut self, converter: C) -> Self
    where
        C: NameConverter + 'static,
    {
        self.name_converter = Some(Box::new(converter));
        self
    }

    /// Registers a coercion rule for a declared type.
    ///
    /// # Example
    ///
    /// ```
    /// use helios_xmlmapper::{TypeTag, Value, XmlEncoder};
    ///
    /// let mut encoder = XmlEncoder::new();
    /// encoder.add_type(TypeTag::Boolean, |_, value| {
    ///     Ok(match value {
    ///         Value::Bool(b) => Value::string(if b { "yes" } else { "no" }),
    ///         other => other,
    ///     })
    /// });
    /// assert!(encoder.coercions().is_registered(TypeTag::Boolean));
    /// ```
    pub fn add_type<F>(&mut self, tag: TypeTag, transform: F) -> &mut Self
    where
        F: for<'a> Fn(&str, Value<'a>) -> std::result::Result<Value<'a>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.coercions.register(tag, transform);
        self
    }

    /// Returns the registered coercion rules.
    pub fn coercions(&self) -> &CoercionRegistry {
        &self.coercions
    }

    /// Returns the configuration this encoder was built with.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Maps an object to an XML document string.
    pub fn map(&self, instance: &dyn XmlSerializable) -> Result<String> {
        Ok(String::from_utf8(self.map_to_vec(instance)?)?)
    }

    /// Maps an object to XML document bytes (UTF-8).
    pub fn map_to_vec(&self, instance: &dyn XmlSerializable) -> Result<Vec<u8>> {
        let class = instance.metadata();
        let root_name = self.convert_name(class.short_name);

        let span = debug_span!("map", class = class.name, sink = %S::KIND);
        let _enter = span.enter();

        let mut sink = S::create(&self.config);
        self.encode_object(&mut sink, None, &root_name, instance)?;
        let bytes = sink.finish()?;

        debug!(root = %root_name, bytes = bytes.len(), "Encoded XML document");
        Ok(bytes)
    }

    /// Maps an object and writes the document to `writer`.
    ///
    /// Nothing is written if encoding fails.
    pub fn map_to_writer<W: Write>(&self, instance: &dyn XmlSerializable, mut writer: W) -> Result<()> {
        let bytes = self.map_to_vec(instance)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    fn convert_name(&self, name: &str) -> String {
        match &self.name_converter {
            Some(converter) => converter.convert(name),
            None => name.to_string(),
        }
    }

    /// Opens `tag`, encodes all properties of `instance` into it and closes it.
    fn encode_object(
        &self,
        sink: &mut S,
        parent: Option<S::Handle>,
        tag: &str,
        instance: &dyn XmlSerializable,
    ) -> Result<()> {
        let handle = sink.start_element(parent, tag)?;
        self.encode_properties(sink, handle, instance)?;
        sink.end_element(handle)
    }

    /// Encodes the properties of `instance` into `handle`.
    ///
    /// Attributes are set in a first pass over the properties, before any
    /// child content is written, so forward-only sinks accept attribute
    /// properties declared after element properties.
    fn encode_properties(
        &self,
        sink: &mut S,
        handle: S::Handle,
        instance: &dyn XmlSerializable,
    ) -> Result<()> {
        let class = instance.metadata();
        let properties = self.extractor.properties(class)?;
        let mut content = Vec::with_capacity(properties.len());

        for property in &properties {
            let property = property.as_ref();

            let Some(value) = instance.property_value(property) else {
                trace!(class = class.name, property, "Skipping unreachable property");
                continue;
            };

            let declared = self
                .extractor
                .declared_type(class, property)
                .unwrap_or_default();
            let value = self.coerce(property, value, declared)?;

            // Absent values never reach the output
            if value.is_null() {
                continue;
            }

            let name = self.convert_name(property);
            let role = resolve_role(self.annotations.markers(class, property));
            trace!(property, %role, declared_type = %declared, "Encoding property");

            if role.is_marked() && (declared.is_collection() || matches!(value, Value::Collection(_))) {
                return Err(MapperError::RoleOnCollection {
                    class: class.name.to_string(),
                    property: property.to_string(),
                    role,
                });
            }

            match role {
                PropertyRole::Attribute => {
                    let text = stringify(property, &value)?;
                    sink.set_attribute(handle, &name, &text)?;
                }
                PropertyRole::CDataSection if !sink.supports_cdata() => {
                    return Err(MapperError::UnsupportedRoleForSink {
                        property: property.to_string(),
                        role,
                        sink: sink_name(S::KIND),
                    });
                }
                _ => content.push(ContentProperty {
                    property,
                    name,
                    role,
                    declared,
                    value,
                }),
            }
        }

        for entry in content {
            let ContentProperty {
                property,
                name,
                role,
                declared,
                value,
            } = entry;

            match role {
                // Already set in the first pass
                PropertyRole::Attribute => {}
                PropertyRole::CDataSection => {
                    let text = stringify(property, &value)?;
                    sink.append_cdata(handle, &text)?;
                }
                PropertyRole::NodeValue => {
                    let text = stringify(property, &value)?;
                    if self.config.escape_node_values {
                        sink.append_text(handle, &text)?;
                    } else {
                        sink.append_raw_text(handle, &text)?;
                    }
                }
                PropertyRole::Plain if declared.is_collection() => {
                    self.encode_collection(sink, handle, declared.tag(), &name, property, &value)?;
                }
                PropertyRole::Plain => {
                    self.encode_object_or_scalar(sink, handle, declared.tag(), &name, property, &value)?;
                }
            }
        }

        Ok(())
    }

    /// Applies the coercion rule for the declared type. Collections are
    /// coerced element by element. Elements a rule turns into null are
    /// dropped; elements that were already null keep their place.
    fn coerce<'a>(&self, property: &str, value: Value<'a>, declared: DeclaredType) -> Result<Value<'a>> {
        let tag = declared.tag();
        if !self.coercions.is_registered(tag) {
            return Ok(value);
        }

        match (declared, value) {
            (DeclaredType::Collection(_), Value::Collection(items)) => {
                let mut coerced = Vec::with_capacity(items.len());
                for item in items {
                    let absent = item.is_null();
                    let item = self.coercions.apply(property, item, tag)?;
                    if absent || !item.is_null() {
                        coerced.push(item);
                    }
                }
                Ok(Value::Collection(coerced))
            }
            (_, value) => self.coercions.apply(property, value, tag),
        }
    }

    /// Writes every element of a collection as a sibling element named `name`.
    /// Absent elements are written as empty elements.
    fn encode_collection(
        &self,
        sink: &mut S,
        handle: S::Handle,
        element_type: TypeTag,
        name: &str,
        property: &str,
        value: &Value<'_>,
    ) -> Result<()> {
        let Value::Collection(items) = value else {
            return Err(MapperError::TypeMismatch {
                property: property.to_string(),
                expected: "collection",
                found: value.kind(),
            });
        };

        for item in items {
            self.encode_object_or_scalar(sink, handle, element_type, name, property, item)?;
        }
        Ok(())
    }

    fn encode_object_or_scalar(
        &self,
        sink: &mut S,
        handle: S::Handle,
        tag: TypeTag,
        name: &str,
        property: &str,
        value: &Value<'_>,
    ) -> Result<()> {
        match (tag, value) {
            (_, Value::Null) => {
                let element = sink.start_element(Some(handle), name)?;
                sink.end_element(element)
            }
            (TypeTag::Object | TypeTag::Mixed, Value::Object(object)) => {
                self.encode_object(sink, Some(handle), name, *object)
            }
            (TypeTag::Object, other) => Err(MapperError::TypeMismatch {
                property: property.to_string(),
                expected: "object",
                found: other.kind(),
            }),
            (_, value) => {
                let text = stringify(property, value)?;
                let element = sink.start_element(Some(handle), name)?;
                if !text.is_empty() {
                    sink.append_text(element, &text)?;
                }
                sink.end_element(element)
            }
        }
    }
}

/// A property that writes element content, resolved before any content is written.
struct ContentProperty<'p, 'v> {
    property: &'p str,
    name: String,
    role: PropertyRole,
    declared: DeclaredType,
    value: Value<'v>,
}

impl<S: XmlSink> fmt::Debug for XmlEncoder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlEncoder")
            .field("sink", &S::KIND)
            .field("config", &self.config)
            .field("name_converter", &self.name_converter.is_some())
            .field("coercions", &self.coercions)
            .finish()
    }
}

fn sink_name(kind: SinkKind) -> &'static str {
    match kind {
        SinkKind::Tree => "tree",
        SinkKind::Stream => "stream",
    }
}

/// Renders a scalar value as text; booleans become `1` and `0`.
fn stringify<'v>(property: &str, value: &'v Value<'_>) -> Result<std::borrow::Cow<'v, str>> {
    value.to_text().ok_or_else(|| MapperError::UnsupportedValue {
        property: property.to_string(),
        kind: value.kind(),
    })
}

/// Maps an object to an XML string with a default tree-backed encoder.
pub fn to_xml_string(instance: &dyn XmlSerializable) -> Result<String> {
    XmlEncoder::new().map(instance)
}

/// Maps an object to an XML string using the sink and options of `config`.
pub fn to_xml_string_with(instance: &dyn XmlSerializable, config: &EncoderConfig) -> Result<String> {
    match config.sink {
        SinkKind::Tree => XmlEncoder::<TreeSink>::with_config(config.clone()).map(instance),
        SinkKind::Stream => XmlEncoder::<StreamSink>::with_config(config.clone()).map(instance),
    }
}
