#![deny(missing_docs)]

//! # Schema Object
//!
//! The Swagger 2.0 Schema Object as a sum type: a schema is a reference, an object,
//! an array or a scalar, never a mix of them.

use crate::oas::extensions::Extensions;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// JSON pointer prefix of entries in the `definitions` table.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Annotations shared by every non-reference schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaMeta {
    /// Title (the definition name for registered schemas).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Vendor extensions.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Scalar JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
}

/// The `object` type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// `object`
    #[default]
    Object,
}

/// The `array` type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayType {
    /// `array`
    #[default]
    Array,
}

/// Reference to a registered definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefSchema {
    /// Definition name (serialized as a `#/definitions/` pointer).
    #[serde(rename = "$ref", serialize_with = "serialize_pointer")]
    pub name: String,
}

#[allow(clippy::ptr_arg)]
fn serialize_pointer<S: Serializer>(name: &String, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{}{}", DEFINITIONS_PREFIX, name))
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A primitive value schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarSchema {
    /// JSON type; `None` accepts any value.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scalar_type: Option<ScalarType>,
    /// Format qualifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Allowed values.
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
    /// Regular expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    /// Whether `minimum` is excluded.
    #[serde(skip_serializing_if = "is_false")]
    pub exclusive_minimum: bool,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// Whether `maximum` is excluded.
    #[serde(skip_serializing_if = "is_false")]
    pub exclusive_maximum: bool,
    /// Minimum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Annotations.
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

impl ScalarSchema {
    /// Scalar of the given type and format.
    pub fn new(scalar_type: Option<ScalarType>, format: Option<&str>) -> Self {
        Self {
            scalar_type,
            format: format.map(str::to_string),
            ..Default::default()
        }
    }
}

/// An array schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArraySchema {
    /// Always `array`.
    #[serde(rename = "type")]
    pub array_type: ArrayType,
    /// Element schema.
    pub items: Box<Schema>,
    /// Minimum number of items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Maximum number of items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Annotations.
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

impl ArraySchema {
    /// Array of `items`.
    pub fn new(items: Schema) -> Self {
        Self {
            array_type: ArrayType::Array,
            items: Box::new(items),
            min_items: None,
            max_items: None,
            meta: SchemaMeta::default(),
        }
    }
}

/// An object schema (user type projection or map).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    /// Always `object`.
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    /// Properties in declaration order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    /// Required property names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Schema of map values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    /// Minimum number of entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    /// Maximum number of entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    /// Annotations.
    #[serde(flatten)]
    pub meta: SchemaMeta,
}

/// A Swagger 2.0 Schema Object.
///
/// Derived equality is the structural equality the definition registry dedups on:
/// references compare by name, never by the referenced content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Schema {
    /// `$ref` to a definition.
    Ref(RefSchema),
    /// Object with properties or additional properties.
    Object(ObjectSchema),
    /// Array with items.
    Array(ArraySchema),
    /// Primitive value.
    Scalar(ScalarSchema),
}

impl Schema {
    /// Reference to the definition `name`.
    pub fn reference(name: impl Into<String>) -> Self {
        Schema::Ref(RefSchema { name: name.into() })
    }

    /// The referenced definition name, if this is a reference.
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            Schema::Ref(r) => Some(&r.name),
            _ => None,
        }
    }

    /// Annotations; references carry none.
    pub fn meta(&self) -> Option<&SchemaMeta> {
        match self {
            Schema::Ref(_) => None,
            Schema::Object(o) => Some(&o.meta),
            Schema::Array(a) => Some(&a.meta),
            Schema::Scalar(s) => Some(&s.meta),
        }
    }

    /// Mutable annotations; references carry none.
    pub fn meta_mut(&mut self) -> Option<&mut SchemaMeta> {
        match self {
            Schema::Ref(_) => None,
            Schema::Object(o) => Some(&mut o.meta),
            Schema::Array(a) => Some(&mut a.meta),
            Schema::Scalar(s) => Some(&mut s.meta),
        }
    }

    /// Whether the schema can be written inline in a non-body parameter or header:
    /// a typed scalar or an array (of arrays) of typed scalars.
    pub fn is_simple(&self) -> bool {
        match self {
            Schema::Scalar(s) => s.scalar_type.is_some(),
            Schema::Array(a) => a.items.is_simple(),
            _ => false,
        }
    }

    /// Gives untyped scalars, array items included, the `string` type.
    pub fn type_untyped_as_string(&mut self) {
        match self {
            Schema::Scalar(s) if s.scalar_type.is_none() => {
                s.scalar_type = Some(ScalarType::String);
            }
            Schema::Array(a) => a.items.type_untyped_as_string(),
            _ => {}
        }
    }

    /// Calls `f` with every definition name referenced from this schema.
    pub fn visit_refs(&self, f: &mut dyn FnMut(&str)) {
        match self {
            Schema::Ref(r) => f(&r.name),
            Schema::Object(o) => {
                for prop in o.properties.values() {
                    prop.visit_refs(f);
                }
                if let Some(additional) = &o.additional_properties {
                    additional.visit_refs(f);
                }
            }
            Schema::Array(a) => a.items.visit_refs(f),
            Schema::Scalar(_) => {}
        }
    }
}
