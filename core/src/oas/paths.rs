#![deny(missing_docs)]

//! # Path Mapping
//!
//! Turns design routes into Swagger path templates and payload bindings into
//! non-body parameters.
//!
//! Route wildcards may be written `{name}`, `{*name}` (catch-all), `:name` or `*name`;
//! all of them become `{name}` in the emitted template. Literal segment text is
//! percent-encoded so that templates stay valid URL paths.

use crate::error::{AppError, AppResult};
use crate::oas::models::{Parameter, ParameterLocation, Schema};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::sync::OnceLock;

/// Characters escaped in literal path text.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A Swagger path template and the wildcard names it declares, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    /// Template, e.g. `/items/{id}`.
    pub template: String,
    /// Wildcard names, e.g. `["id"]`.
    pub wildcards: Vec<String>,
}

/// Joins path fragments with single slashes.
///
/// The result always starts with `/` and never ends with one, except for the root.
pub fn join_path(parts: &[&str]) -> String {
    let segments: Vec<&str> = parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Maps a route (prefixed by the service base path) to a path template.
///
/// Fails when the same wildcard name appears twice in one route.
pub fn map_path(base_path: Option<&str>, route: &str) -> AppResult<PathTemplate> {
    static WILDCARD_RE: OnceLock<Regex> = OnceLock::new();
    let wildcard_re = WILDCARD_RE
        .get_or_init(|| Regex::new(r"\{\*?([^{}/*]+)\}").expect("Invalid regex"));

    let joined = join_path(&[base_path.unwrap_or_default(), route]);
    let mut wildcards: Vec<String> = Vec::new();
    let mut segments = Vec::new();

    for segment in joined.split('/').skip(1) {
        if let Some(name) = segment
            .strip_prefix(':')
            .or_else(|| segment.strip_prefix('*'))
            .filter(|n| !n.is_empty())
        {
            wildcards.push(name.to_string());
            segments.push(format!("{{{}}}", name));
            continue;
        }

        let mut mapped = String::new();
        let mut last = 0;
        for caps in wildcard_re.captures_iter(segment) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            mapped.extend(utf8_percent_encode(&segment[last..whole.start()], SEGMENT));
            mapped.push_str(&format!("{{{}}}", name.as_str()));
            wildcards.push(name.as_str().to_string());
            last = whole.end();
        }
        mapped.extend(utf8_percent_encode(&segment[last..], SEGMENT));
        segments.push(mapped);
    }

    for (i, name) in wildcards.iter().enumerate() {
        if wildcards[..i].contains(name) {
            return Err(AppError::design(
                route,
                format!("wildcard '{}' appears more than once", name),
            ));
        }
    }

    Ok(PathTemplate {
        template: format!("/{}", segments.join("/")),
        wildcards,
    })
}

/// Builds a path, query or header parameter from a field schema.
///
/// Only scalars and arrays of scalars can be written inline; anything else is a design
/// error. Untyped values travel as strings. Query arrays repeat the parameter
/// (`collectionFormat: multi`).
pub fn simple_parameter(
    subject: &str,
    name: &str,
    location: ParameterLocation,
    required: bool,
    mut schema: Schema,
) -> AppResult<Parameter> {
    schema.type_untyped_as_string();
    if !schema.is_simple() {
        return Err(AppError::design(
            subject,
            format!(
                "{:?} parameter '{}' must be a primitive or an array of primitives",
                location, name
            ),
        ));
    }
    let is_array = matches!(schema, Schema::Array(_));
    let mut param = Parameter::new(name, location, required, schema);
    if is_array && location == ParameterLocation::Query {
        param.collection_format = Some("multi".to_string());
    }
    Ok(param)
}
