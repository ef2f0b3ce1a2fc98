//! Property and class name converters.
//!
//! A converter turns a model-level name into the string used as the XML tag
//! or attribute name. Converters are pure; the encoder applies the configured
//! one to the root element name and to every property name.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

/// Converts a property or class name to an XML name.
pub trait NameConverter: Send + Sync {
    fn convert(&self, name: &str) -> String;
}

impl<F> NameConverter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn convert(&self, name: &str) -> String {
        self(name)
    }
}

/// Converts names to lower camel case (`camel_case_property` -> `camelCaseProperty`).
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCaseConverter;

impl NameConverter for CamelCaseConverter {
    fn convert(&self, name: &str) -> String {
        name.to_lower_camel_case()
    }
}

/// Naming conventions selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    /// `camelCase`
    Camel,
    /// `PascalCase`
    Pascal,
    /// `snake_case`
    Snake,
    /// `kebab-case`
    Kebab,
}

impl NameConverter for NameCase {
    fn convert(&self, name: &str) -> String {
        match self {
            NameCase::Camel => name.to_lower_camel_case(),
            NameCase::Pascal => name.to_upper_camel_case(),
            NameCase::Snake => name.to_snake_case(),
            NameCase::Kebab => name.to_kebab_case(),
        }
    }
}
