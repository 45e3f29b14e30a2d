#![deny(missing_docs)]

//! # Design Types
//!
//! Data types of the design graph: primitives, arrays, maps and named user types
//! with their validations and views.

use super::Meta;
use indexmap::IndexMap;
use serde_json::{Number, Value};

/// Name of the view every user type implicitly has.
pub const DEFAULT_VIEW: &str = "default";

/// Primitive design types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Boolean value.
    Boolean,
    /// Platform sized signed integer (emitted as int64).
    Int,
    /// 32 bit signed integer.
    Int32,
    /// 64 bit signed integer.
    Int64,
    /// Platform sized unsigned integer (emitted as int64).
    UInt,
    /// 32 bit unsigned integer.
    UInt32,
    /// 64 bit unsigned integer.
    UInt64,
    /// Single precision float.
    Float32,
    /// Double precision float.
    Float64,
    /// UTF-8 string.
    String,
    /// Raw bytes (base64 on the wire).
    Bytes,
    /// Any value.
    Any,
}

impl Primitive {
    /// Whether length validations apply as string lengths.
    pub fn is_textual(&self) -> bool {
        matches!(self, Primitive::String | Primitive::Bytes)
    }
}

/// Reference to a user type, optionally projected through a view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Name of the user type in [`super::DesignRoot::types`].
    pub name: String,
    /// View to project through; `None` means the default view.
    pub view: Option<String>,
}

impl TypeRef {
    /// Returns the view name, `None` when it is the default view.
    pub fn explicit_view(&self) -> Option<&str> {
        self.view.as_deref().filter(|v| *v != DEFAULT_VIEW)
    }
}

/// Shape of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// A primitive.
    Primitive(Primitive),
    /// An array of elements.
    Array(Box<Attribute>),
    /// A map with string-serialized keys.
    Map {
        /// Key attribute.
        key: Box<Attribute>,
        /// Element attribute.
        elem: Box<Attribute>,
    },
    /// A named user (object) type.
    User(TypeRef),
}

/// Inclusive or exclusive numeric bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    /// Bound value.
    pub value: Number,
    /// Whether the bound itself is excluded.
    pub exclusive: bool,
}

impl Bound {
    /// Inclusive bound.
    pub fn inclusive(value: impl Into<Number>) -> Self {
        Self {
            value: value.into(),
            exclusive: false,
        }
    }

    /// Exclusive bound.
    pub fn exclusive(value: impl Into<Number>) -> Self {
        Self {
            value: value.into(),
            exclusive: true,
        }
    }
}

/// Validation rules attached to an attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    /// Allowed literal values.
    pub values: Vec<Value>,
    /// Format (e.g. `email`, `date-time`); overrides the primitive's default format.
    pub format: Option<String>,
    /// Regular expression the value must match.
    pub pattern: Option<String>,
    /// Lower numeric bound.
    pub minimum: Option<Bound>,
    /// Upper numeric bound.
    pub maximum: Option<Bound>,
    /// Minimum length (string length, array items or map entries).
    pub min_length: Option<u64>,
    /// Maximum length (string length, array items or map entries).
    pub max_length: Option<u64>,
}

impl Validation {
    /// Creates an empty validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts values to the given literals.
    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    /// Sets the format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets the lower bound.
    pub fn with_minimum(mut self, bound: Bound) -> Self {
        self.minimum = Some(bound);
        self
    }

    /// Sets the upper bound.
    pub fn with_maximum(mut self, bound: Bound) -> Self {
        self.maximum = Some(bound);
        self
    }

    /// Sets the minimum length.
    pub fn with_min_length(mut self, len: u64) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Sets the maximum length.
    pub fn with_max_length(mut self, len: u64) -> Self {
        self.max_length = Some(len);
        self
    }
}

/// A typed, documented and validated value slot (field, payload, result...).
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Shape of the value.
    pub data_type: DataType,
    /// Human readable description.
    pub description: Option<String>,
    /// Validation rules.
    pub validation: Validation,
    /// Default value.
    pub default: Option<Value>,
    /// Example value.
    pub example: Option<Value>,
    /// Free-form metadata (extensions, generation switches).
    pub meta: Meta,
}

impl Attribute {
    /// Creates an attribute of the given type.
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            description: None,
            validation: Validation::default(),
            default: None,
            example: None,
            meta: Meta::new(),
        }
    }

    /// Primitive attribute.
    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(DataType::Primitive(primitive))
    }

    /// String attribute.
    pub fn string() -> Self {
        Self::primitive(Primitive::String)
    }

    /// Int attribute.
    pub fn int() -> Self {
        Self::primitive(Primitive::Int)
    }

    /// Boolean attribute.
    pub fn boolean() -> Self {
        Self::primitive(Primitive::Boolean)
    }

    /// Array of `elem`.
    pub fn array_of(elem: Attribute) -> Self {
        Self::new(DataType::Array(Box::new(elem)))
    }

    /// Map from `key` to `elem`.
    pub fn map_of(key: Attribute, elem: Attribute) -> Self {
        Self::new(DataType::Map {
            key: Box::new(key),
            elem: Box::new(elem),
        })
    }

    /// Reference to a user type (default view).
    pub fn user(name: impl Into<String>) -> Self {
        Self::new(DataType::User(TypeRef {
            name: name.into(),
            view: None,
        }))
    }

    /// Reference to a user type projected through `view`.
    pub fn user_view(name: impl Into<String>, view: impl Into<String>) -> Self {
        Self::new(DataType::User(TypeRef {
            name: name.into(),
            view: Some(view.into()),
        }))
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the validation rules.
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the example value.
    pub fn with_example(mut self, value: Value) -> Self {
        self.example = Some(value);
        self
    }

    /// Adds a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Returns the referenced user type, if any.
    pub fn type_ref(&self) -> Option<&TypeRef> {
        match &self.data_type {
            DataType::User(r) => Some(r),
            _ => None,
        }
    }
}

/// A named object type.
#[derive(Debug, Clone, PartialEq)]
pub struct UserType {
    /// Type name; the identity of the type within the design.
    pub name: String,
    /// Human readable description.
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: IndexMap<String, Attribute>,
    /// Names of required fields.
    pub required: Vec<String>,
    /// Views: view name to the field names it exposes.
    pub views: IndexMap<String, Vec<String>>,
    /// Free-form metadata.
    pub meta: Meta,
}

impl UserType {
    /// Creates an empty object type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            required: Vec::new(),
            views: IndexMap::new(),
            meta: Meta::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a field.
    pub fn field(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.fields.insert(name.into(), attribute);
        self
    }

    /// Appends a field and marks it required.
    pub fn required_field(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.fields.insert(name, attribute);
        self
    }

    /// Declares a view exposing the given fields.
    pub fn view<I, S>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.views
            .insert(name.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Whether the field is required.
    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|r| r == field)
    }

    /// Field names exposed by `view` (`None` = default view).
    ///
    /// The default view exposes every field unless a `default` view is declared.
    /// Returns `None` when a non-default view is not declared.
    pub fn view_fields(&self, view: Option<&str>) -> Option<Vec<&str>> {
        match view.filter(|v| *v != DEFAULT_VIEW) {
            None => Some(match self.views.get(DEFAULT_VIEW) {
                Some(fields) => fields.iter().map(String::as_str).collect(),
                None => self.fields.keys().map(String::as_str).collect(),
            }),
            Some(v) => self
                .views
                .get(v)
                .map(|fields| fields.iter().map(String::as_str).collect()),
        }
    }
}
