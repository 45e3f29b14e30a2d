#![deny(missing_docs)]

//! # Document Validation
//!
//! Post-conditions checked on every emitted document.
//!
//! - [`validate_swagger`] parses rendered JSON back into a structural Swagger shape and
//!   rejects documents missing the `swagger` version, `info` or `paths`.
//! - [`check_integrity`] walks an assembled document:
//!   - every `$ref` resolves to a definition,
//!   - every security requirement names a declared scheme (scopes only on OAuth2),
//!   - path parameters are required and match the path template exactly,
//!   - `default`, `example` and `enum` literals satisfy their own schema.

use crate::error::{AppError, AppResult};
use crate::oas::models::{
    Document, Operation, ParameterLocation, ScalarType, Schema, SWAGGER_VERSION,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::OnceLock;
use tracing::debug;

#[derive(Deserialize)]
struct ShimSwagger {
    #[serde(default)]
    swagger: Option<String>,
    #[serde(default)]
    info: Option<ShimInfo>,
    #[serde(default)]
    paths: Option<BTreeMap<String, Value>>,
}

#[derive(Deserialize)]
struct ShimInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Parses rendered JSON bytes as a Swagger 2.0 document.
pub fn validate_swagger(bytes: &[u8]) -> AppResult<()> {
    let shim: ShimSwagger = serde_json::from_slice(bytes)?;
    match shim.swagger.as_deref().map(str::trim) {
        None | Some("") => {
            return Err(AppError::validation(
                "swagger",
                "document missing required 'swagger' version",
            ))
        }
        Some(SWAGGER_VERSION) => {}
        Some(other) => {
            return Err(AppError::validation(
                "swagger",
                format!("unsupported version '{}'", other),
            ))
        }
    }
    let Some(info) = shim.info else {
        return Err(AppError::validation("info", "document missing required 'info' object"));
    };
    if info.title.is_none() || info.version.is_none() {
        return Err(AppError::validation("info", "'title' and 'version' are required"));
    }
    if shim.paths.is_none() {
        return Err(AppError::validation("paths", "document missing required 'paths' object"));
    }
    Ok(())
}

/// Checks the structural post-conditions of an assembled document.
pub fn check_integrity(doc: &Document) -> AppResult<()> {
    let definitions = &doc.definitions;

    for (name, schema) in definitions {
        let subject = format!("definitions.{}", name);
        check_refs(definitions, &subject, schema)?;
        check_schema_literals(definitions, &subject, schema)?;
    }

    for (path, item) in &doc.paths {
        let template_params = template_names(path);
        for (method, op) in item.operations() {
            let subject = format!("paths.{}.{}", path, method);
            check_operation(doc, &subject, &template_params, op)?;
        }
    }
    Ok(())
}

fn check_operation(
    doc: &Document,
    subject: &str,
    template_params: &[String],
    op: &Operation,
) -> AppResult<()> {
    let definitions = &doc.definitions;
    let mut path_params = BTreeSet::new();
    let mut seen = HashSet::new();

    for param in &op.parameters {
        let param_subject = format!("{}.parameters.{}", subject, param.name);
        if !seen.insert((param.name.as_str(), param.location)) {
            return Err(AppError::validation(param_subject, "duplicate parameter"));
        }
        if param.location == ParameterLocation::Path {
            if !param.is_required() {
                return Err(AppError::validation(param_subject, "path parameter must be required"));
            }
            path_params.insert(param.name.as_str());
        }
        if param.location != ParameterLocation::Body && !param.schema.is_simple() {
            return Err(AppError::validation(
                param_subject,
                "non-body parameter must be a typed primitive or an array of them",
            ));
        }
        check_refs(definitions, &param_subject, &param.schema)?;
        check_schema_literals(definitions, &param_subject, &param.schema)?;
    }

    for name in template_params {
        if !path_params.remove(name.as_str()) {
            return Err(AppError::validation(
                subject,
                format!("path template parameter '{}' is not declared", name),
            ));
        }
    }
    if let Some(extra) = path_params.into_iter().next() {
        return Err(AppError::validation(
            subject,
            format!("path parameter '{}' does not appear in the path template", extra),
        ));
    }

    if op.responses.is_empty() {
        return Err(AppError::validation(subject, "operation declares no response"));
    }
    for (status, response) in &op.responses {
        let response_subject = format!("{}.responses.{}", subject, status);
        if let Some(schema) = &response.schema {
            check_refs(definitions, &response_subject, schema)?;
            check_schema_literals(definitions, &response_subject, schema)?;
        }
        for (name, header) in &response.headers {
            let header_subject = format!("{}.headers.{}", response_subject, name);
            if !header.schema.is_simple() {
                return Err(AppError::validation(
                    header_subject,
                    "header must be a typed primitive or an array of them",
                ));
            }
            check_refs(definitions, &header_subject, &header.schema)?;
            check_schema_literals(definitions, &header_subject, &header.schema)?;
        }
    }

    for requirement in &op.security {
        for (name, scopes) in requirement {
            let Some(scheme) = doc.security_definitions.get(name) else {
                return Err(AppError::validation(
                    subject,
                    format!("security scheme '{}' is not defined", name),
                ));
            };
            if !scopes.is_empty() && !scheme.accepts_scopes() {
                return Err(AppError::validation(
                    subject,
                    format!("security scheme '{}' does not accept scopes", name),
                ));
            }
        }
    }
    Ok(())
}

/// Parameter names of a path template, in order.
fn template_names(path: &str) -> Vec<String> {
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    let param_re = PARAM_RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("Invalid regex"));
    param_re
        .captures_iter(path)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn check_refs(
    definitions: &BTreeMap<String, Schema>,
    subject: &str,
    schema: &Schema,
) -> AppResult<()> {
    let mut dangling = None;
    schema.visit_refs(&mut |name| {
        if dangling.is_none() && !definitions.contains_key(name) {
            dangling = Some(name.to_string());
        }
    });
    match dangling {
        Some(name) => Err(AppError::validation(
            subject,
            format!("reference to undefined definition '{}'", name),
        )),
        None => Ok(()),
    }
}

/// Checks the `default`, `example` and `enum` literals of `schema` and its children.
fn check_schema_literals(
    definitions: &BTreeMap<String, Schema>,
    subject: &str,
    schema: &Schema,
) -> AppResult<()> {
    if let Some(meta) = schema.meta() {
        for (label, literal) in [("default", &meta.default), ("example", &meta.example)] {
            if let Some(value) = literal {
                check_literal(definitions, schema, value).map_err(|reason| {
                    AppError::validation(subject, format!("{} {}: {}", label, value, reason))
                })?;
            }
        }
    }
    match schema {
        Schema::Scalar(scalar) => {
            for value in &scalar.values {
                check_literal(definitions, schema, value).map_err(|reason| {
                    AppError::validation(subject, format!("enum value {}: {}", value, reason))
                })?;
            }
        }
        Schema::Array(array) => {
            check_schema_literals(definitions, &format!("{}.items", subject), &array.items)?;
        }
        Schema::Object(object) => {
            for (name, prop) in &object.properties {
                check_schema_literals(definitions, &format!("{}.{}", subject, name), prop)?;
            }
            if let Some(additional) = &object.additional_properties {
                check_schema_literals(
                    definitions,
                    &format!("{}.additionalProperties", subject),
                    additional,
                )?;
            }
        }
        Schema::Ref(_) => {}
    }
    Ok(())
}

/// Whether `value` satisfies the constraints of `schema`.
fn check_literal(
    definitions: &BTreeMap<String, Schema>,
    schema: &Schema,
    value: &Value,
) -> Result<(), String> {
    match schema {
        Schema::Ref(r) => match definitions.get(&r.name) {
            Some(target) => check_literal(definitions, target, value),
            None => Ok(()),
        },
        Schema::Object(object) => {
            let Value::Object(map) = value else {
                return Err("expected an object".into());
            };
            for required in &object.required {
                if !map.contains_key(required) {
                    return Err(format!("missing required property '{}'", required));
                }
            }
            for (key, item) in map {
                let child = object
                    .properties
                    .get(key)
                    .or(object.additional_properties.as_deref());
                if let Some(child) = child {
                    check_literal(definitions, child, item)
                        .map_err(|reason| format!("property '{}': {}", key, reason))?;
                }
            }
            check_count(map.len(), object.min_properties, object.max_properties, "properties")
        }
        Schema::Array(array) => {
            let Value::Array(items) = value else {
                return Err("expected an array".into());
            };
            check_count(items.len(), array.min_items, array.max_items, "items")?;
            for item in items {
                check_literal(definitions, &array.items, item)?;
            }
            Ok(())
        }
        Schema::Scalar(scalar) => {
            let type_ok = match scalar.scalar_type {
                None => true,
                Some(ScalarType::String) => value.is_string(),
                Some(ScalarType::Boolean) => value.is_boolean(),
                Some(ScalarType::Number) => value.is_number(),
                Some(ScalarType::Integer) => {
                    value.is_i64()
                        || value.is_u64()
                        || value.as_f64().is_some_and(|f| f.fract() == 0.0)
                }
            };
            if !type_ok {
                return Err("type mismatch".into());
            }
            if !scalar.values.is_empty() && !scalar.values.contains(value) {
                return Err("not an allowed value".into());
            }
            if let Some(n) = value.as_f64() {
                if let Some(min) = scalar.minimum.as_ref().and_then(|m| m.as_f64()) {
                    if n < min || (scalar.exclusive_minimum && n == min) {
                        return Err(format!("below minimum {}", min));
                    }
                }
                if let Some(max) = scalar.maximum.as_ref().and_then(|m| m.as_f64()) {
                    if n > max || (scalar.exclusive_maximum && n == max) {
                        return Err(format!("above maximum {}", max));
                    }
                }
            }
            if let Some(text) = value.as_str() {
                check_count(
                    text.chars().count(),
                    scalar.min_length,
                    scalar.max_length,
                    "characters",
                )?;
                if let Some(pattern) = &scalar.pattern {
                    match Regex::new(pattern) {
                        Ok(re) if !re.is_match(text) => {
                            return Err(format!("does not match pattern '{}'", pattern))
                        }
                        Ok(_) => {}
                        Err(e) => debug!(pattern = %pattern, error = %e, "pattern not checked"),
                    }
                }
            }
            Ok(())
        }
    }
}

fn check_count(len: usize, min: Option<u64>, max: Option<u64>, what: &str) -> Result<(), String> {
    let len = len as u64;
    if let Some(min) = min {
        if len < min {
            return Err(format!("fewer than {} {}", min, what));
        }
    }
    if let Some(max) = max {
        if len > max {
            return Err(format!("more than {} {}", max, what));
        }
    }
    Ok(())
}
