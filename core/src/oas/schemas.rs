#![deny(missing_docs)]

//! # Schema Builder
//!
//! Maps design attributes onto Swagger 2.0 schemas.
//!
//! - Primitives become scalar schemas carrying the attribute validations.
//! - Arrays and maps are inlined (`items` / `additionalProperties`).
//! - User types are never inlined: each (type, view) projection is registered once in
//!   the [`DefinitionRegistry`] and referenced everywhere it appears.
//! - Recursive types are cut by handing out a reference to the reserved name while
//!   the type is still in progress.

use crate::design::{
    is_generated, Attribute, DataType, DesignRoot, Primitive, TypeRef, UserType, Validation,
};
use crate::error::{AppError, AppResult};
use crate::oas::extensions::extensions_from_meta;
use crate::oas::models::{ArraySchema, ObjectSchema, ScalarSchema, ScalarType, Schema};
use crate::oas::registry::{DefinitionRegistry, TypeKey};
use heck::ToUpperCamelCase;
use std::collections::HashSet;
use tracing::trace;

/// Swagger type and default format of a primitive.
pub fn primitive_type(primitive: Primitive) -> (Option<ScalarType>, Option<&'static str>) {
    match primitive {
        Primitive::Boolean => (Some(ScalarType::Boolean), None),
        Primitive::Int | Primitive::Int64 | Primitive::UInt | Primitive::UInt64 => {
            (Some(ScalarType::Integer), Some("int64"))
        }
        Primitive::Int32 | Primitive::UInt32 => (Some(ScalarType::Integer), Some("int32")),
        Primitive::Float32 => (Some(ScalarType::Number), Some("float")),
        Primitive::Float64 => (Some(ScalarType::Number), Some("double")),
        Primitive::String => (Some(ScalarType::String), None),
        Primitive::Bytes => (Some(ScalarType::String), Some("byte")),
        Primitive::Any => (None, None),
    }
}

/// Definition name of a user type projected through `view`.
///
/// e.g. `("bottle", None)` -> `Bottle`, `("bottle", Some("tiny"))` -> `BottleTiny`
pub fn definition_name(type_name: &str, view: Option<&str>) -> String {
    let mut name = type_name.to_upper_camel_case();
    if let Some(view) = view {
        name.push_str(&view.to_upper_camel_case());
    }
    name
}

fn scalar_schema(primitive: Primitive, validation: &Validation) -> ScalarSchema {
    let (scalar_type, format) = primitive_type(primitive);
    let mut scalar = ScalarSchema::new(scalar_type, format);
    if let Some(format) = &validation.format {
        scalar.format = Some(format.clone());
    }
    scalar.values = validation.values.clone();
    scalar.pattern = validation.pattern.clone();
    if let Some(min) = &validation.minimum {
        scalar.minimum = Some(min.value.clone());
        scalar.exclusive_minimum = min.exclusive;
    }
    if let Some(max) = &validation.maximum {
        scalar.maximum = Some(max.value.clone());
        scalar.exclusive_maximum = max.exclusive;
    }
    if primitive.is_textual() {
        scalar.min_length = validation.min_length;
        scalar.max_length = validation.max_length;
    }
    scalar
}

/// Builds schemas for one generation run, registering user types as it goes.
pub struct SchemaBuilder<'a> {
    design: &'a DesignRoot,
    registry: &'a mut DefinitionRegistry,
    in_progress: HashSet<TypeKey>,
}

impl<'a> SchemaBuilder<'a> {
    /// Creates a builder over `design` populating `registry`.
    pub fn new(design: &'a DesignRoot, registry: &'a mut DefinitionRegistry) -> Self {
        Self {
            design,
            registry,
            in_progress: HashSet::new(),
        }
    }

    /// The design being compiled.
    pub fn design(&self) -> &'a DesignRoot {
        self.design
    }

    /// The registry populated so far.
    pub fn registry(&self) -> &DefinitionRegistry {
        self.registry
    }

    /// Builds the schema of an attribute.
    pub fn build(&mut self, attribute: &Attribute) -> AppResult<Schema> {
        let validation = &attribute.validation;
        let mut schema = match &attribute.data_type {
            DataType::Primitive(primitive) => Schema::Scalar(scalar_schema(*primitive, validation)),
            DataType::Array(elem) => {
                let mut array = ArraySchema::new(self.build(elem)?);
                array.min_items = validation.min_length;
                array.max_items = validation.max_length;
                Schema::Array(array)
            }
            DataType::Map { elem, .. } => {
                let mut object = ObjectSchema {
                    additional_properties: Some(Box::new(self.build(elem)?)),
                    ..Default::default()
                };
                object.min_properties = validation.min_length;
                object.max_properties = validation.max_length;
                Schema::Object(object)
            }
            DataType::User(type_ref) => return self.build_user_type(type_ref),
        };
        if let Some(meta) = schema.meta_mut() {
            meta.description = attribute.description.clone();
            meta.default = attribute.default.clone();
            meta.example = attribute.example.clone();
            meta.extensions = extensions_from_meta(&attribute.meta);
        }
        Ok(schema)
    }

    /// Registers the projection of a user type and returns a reference to it.
    pub fn build_user_type(&mut self, type_ref: &TypeRef) -> AppResult<Schema> {
        let view = type_ref.explicit_view();
        let key = TypeKey::new(&type_ref.name, view);
        if let Some(name) = self.registry.name_of(&key) {
            if self.in_progress.contains(&key) {
                trace!(definition = %name, "forward reference to type in progress");
            }
            return Ok(Schema::reference(name));
        }

        let design = self.design;
        let user = design
            .user_type(&type_ref.name)
            .ok_or_else(|| AppError::design(&type_ref.name, "unknown user type"))?;
        let fields = user.view_fields(view).ok_or_else(|| {
            AppError::design(
                &user.name,
                format!("view '{}' is not defined", view.unwrap_or_default()),
            )
        })?;

        let name = self
            .registry
            .reserve(key.clone(), &definition_name(&user.name, view))?;
        self.in_progress.insert(key.clone());
        let object = self.object_schema(user, &fields, Some(&name));
        self.in_progress.remove(&key);
        self.registry.complete(&name, Schema::Object(object?));
        Ok(Schema::reference(name))
    }

    /// Builds the body formed by the fields of `attribute` not listed in `excluded`.
    ///
    /// Without exclusions the attribute is referenced as-is. With exclusions, the
    /// remaining fields are registered as `name`. Returns `None` when nothing remains.
    pub fn build_body(
        &mut self,
        name: &str,
        attribute: &Attribute,
        excluded: &[&str],
    ) -> AppResult<Option<Schema>> {
        if excluded.is_empty() {
            return self.build(attribute).map(Some);
        }
        let Some(type_ref) = attribute.type_ref() else {
            // a non-object payload consumed by a parameter leaves no body
            return Ok(None);
        };

        let design = self.design;
        let user = design
            .user_type(&type_ref.name)
            .ok_or_else(|| AppError::design(&type_ref.name, "unknown user type"))?;
        let view = type_ref.explicit_view();
        let fields: Vec<&str> = user
            .view_fields(view)
            .ok_or_else(|| {
                AppError::design(
                    &user.name,
                    format!("view '{}' is not defined", view.unwrap_or_default()),
                )
            })?
            .into_iter()
            .filter(|f| !excluded.contains(f))
            .collect();

        let object = self.object_schema(user, &fields, None)?;
        if object.properties.is_empty() {
            return Ok(None);
        }
        let name = self.registry.register(name, Schema::Object(object))?;
        Ok(Some(Schema::reference(name)))
    }

    fn object_schema(
        &mut self,
        user: &UserType,
        fields: &[&str],
        title: Option<&str>,
    ) -> AppResult<ObjectSchema> {
        let mut object = ObjectSchema::default();
        for field in fields {
            let attribute = user.fields.get(*field).ok_or_else(|| {
                AppError::design(
                    format!("{}.{}", user.name, field),
                    "field listed in a view is not declared",
                )
            })?;
            if !is_generated(&attribute.meta) {
                continue;
            }
            object
                .properties
                .insert(field.to_string(), self.build(attribute)?);
            if user.is_required(field) {
                object.required.push(field.to_string());
            }
        }
        object.meta.title = title.map(str::to_string);
        object.meta.description = user.description.clone();
        object.meta.extensions = extensions_from_meta(&user.meta);
        Ok(object)
    }
}
