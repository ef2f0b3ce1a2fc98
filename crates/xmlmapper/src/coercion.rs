//! Custom type coercion rules.
//!
//! A coercion rule maps the value of every property declared with a given
//! [`TypeTag`] to a new value before the encoder looks at it. The transform
//! sees the raw value, including [`Value::Null`], and fully owns the result:
//! returning `Value::Null` suppresses the property.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{BoxError, MapperError, Result};
use crate::metadata::TypeTag;
use crate::value::Value;

/// A registered transform: `(property name, raw value) -> new value`.
pub type CoercionFn =
    dyn for<'a> Fn(&str, Value<'a>) -> std::result::Result<Value<'a>, BoxError> + Send + Sync;

/// Table of coercion rules keyed by type tag.
#[derive(Default)]
pub struct CoercionRegistry {
    rules: HashMap<TypeTag, Box<CoercionFn>>,
}

impl CoercionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule, replacing any rule already registered for `tag`.
    pub fn register<F>(&mut self, tag: TypeTag, transform: F)
    where
        F: for<'a> Fn(&str, Value<'a>) -> std::result::Result<Value<'a>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        debug!(type_tag = %tag, "Registering coercion rule");
        self.rules.insert(tag, Box::new(transform));
    }

    pub fn is_registered(&self, tag: TypeTag) -> bool {
        self.rules.contains_key(&tag)
    }

    /// Applies the rule registered for `tag`. Values of unregistered tags pass through.
    pub fn apply<'a>(&self, property: &str, value: Value<'a>, tag: TypeTag) -> Result<Value<'a>> {
        match self.rules.get(&tag) {
            Some(rule) => rule(property, value)
                .map_err(|source| MapperError::Coercion {
                    property: property.to_string(),
                    type_tag: tag,
                    source,
                }),
            None => Ok(value),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for CoercionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.rules.keys()).finish()
    }
}
