#![deny(missing_docs)]

//! # Operation Builder
//!
//! Builds one Swagger operation per endpoint route.
//!
//! Payload fields bound to path wildcards, query parameters or headers become
//! individual parameters. The body parameter carries either one named payload field or
//! the fields left over by the bindings. Responses are keyed by status code; errors
//! sharing a status code are merged into a single response.

use crate::design::{
    is_generated, Attribute, BodyBinding, BindingLocation, DesignRoot, Endpoint, ErrorDef,
    Route, Service, UserType, META_SUMMARY,
};
use crate::error::{AppError, AppResult};
use crate::oas::document::external_docs;
use crate::oas::extensions::{extensions_from_meta, merge, Extensions};
use crate::oas::models::{
    Header, Operation, Parameter, ParameterLocation, Response, SecurityScheme,
};
use crate::oas::paths::{map_path, simple_parameter, PathTemplate};
use crate::oas::schemas::SchemaBuilder;
use crate::oas::security::{effective_requirements, map_requirements};
use heck::ToUpperCamelCase;
use http::{Method, StatusCode};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::warn;

/// An operation together with the path and method it is served on.
#[derive(Debug, Clone)]
pub struct RoutedOperation {
    /// Path template.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// The operation.
    pub operation: Operation,
}

/// Fields of an endpoint payload or result that bindings may refer to.
///
/// For an object the fields are looked up by name. A primitive value is bound as a
/// whole under any name.
struct Fields<'a> {
    attribute: Option<&'a Attribute>,
    user: Option<&'a UserType>,
}

impl<'a> Fields<'a> {
    fn new(
        root: &'a DesignRoot,
        subject: &str,
        attribute: Option<&'a Attribute>,
    ) -> AppResult<Self> {
        let user = match attribute.and_then(Attribute::type_ref) {
            Some(type_ref) => Some(root.user_type(&type_ref.name).ok_or_else(|| {
                AppError::design(subject, format!("unknown user type '{}'", type_ref.name))
            })?),
            None => None,
        };
        Ok(Self { attribute, user })
    }

    /// The bound attribute and whether it is required.
    fn get(&self, field: &str) -> Option<(&'a Attribute, bool)> {
        match (self.user, self.attribute) {
            (Some(user), _) => user
                .fields
                .get(field)
                .map(|attr| (attr, user.is_required(field))),
            (None, Some(attr)) => Some((attr, true)),
            (None, None) => None,
        }
    }
}

/// Default description of a status code, e.g. `OK response.`
fn status_description(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Response");
    format!("{} response.", reason)
}

/// Adds a response, merging it into an existing one with the same status code.
///
/// The first description is kept and later distinct ones are appended on new lines.
/// The first schema wins; extensions merge with last-write-wins.
fn add_response(
    responses: &mut BTreeMap<String, Response>,
    subject: &str,
    status: u16,
    response: Response,
) {
    match responses.entry(status.to_string()) {
        Entry::Vacant(slot) => {
            slot.insert(response);
        }
        Entry::Occupied(mut slot) => {
            let existing = slot.get_mut();
            if !existing
                .description
                .split('\n')
                .any(|d| d == response.description)
            {
                existing.description.push('\n');
                existing.description.push_str(&response.description);
            }
            if let Some(schema) = response.schema {
                match &existing.schema {
                    None => existing.schema = Some(schema),
                    Some(current) if *current != schema => {
                        warn!(
                            operation = %subject,
                            status,
                            "conflicting response schemas, keeping the first"
                        );
                    }
                    Some(_) => {}
                }
            }
            existing.headers.extend(response.headers);
            existing.extensions =
                merge(std::mem::take(&mut existing.extensions), &response.extensions);
        }
    }
}

/// Builds operations for endpoints of one service.
pub struct OperationBuilder<'s, 'a> {
    schemas: &'s mut SchemaBuilder<'a>,
    security_definitions: &'s mut BTreeMap<String, SecurityScheme>,
}

impl<'s, 'a> OperationBuilder<'s, 'a> {
    /// Creates a builder sharing the run's schema builder and security definitions.
    pub fn new(
        schemas: &'s mut SchemaBuilder<'a>,
        security_definitions: &'s mut BTreeMap<String, SecurityScheme>,
    ) -> Self {
        Self {
            schemas,
            security_definitions,
        }
    }

    /// Builds one operation per route of `endpoint`.
    pub fn build(
        &mut self,
        service: &Service,
        endpoint: &Endpoint,
    ) -> AppResult<Vec<RoutedOperation>> {
        let root = self.schemas.design();
        let subject = format!("{}#{}", service.name, endpoint.name);
        let payload = Fields::new(root, &subject, endpoint.payload.as_ref())?;
        let result = Fields::new(root, &subject, endpoint.result.as_ref())?;

        let security = map_requirements(
            root,
            &subject,
            effective_requirements(root, service, endpoint),
            self.security_definitions,
        )?;
        let responses = self.responses(service, endpoint, &subject, &result)?;

        let mut operations = Vec::with_capacity(endpoint.routes.len());
        for (i, route) in endpoint.routes.iter().enumerate() {
            let operation_id = match i {
                0 => subject.clone(),
                n => format!("{}#{}", subject, n + 1),
            };
            let template = map_path(service.base_path.as_deref(), &route.path)?;
            let parameters =
                self.parameters(service, endpoint, &operation_id, &template, &payload)?;
            let operation = Operation {
                tags: vec![service.name.clone()],
                summary: Some(
                    endpoint
                        .meta
                        .get(META_SUMMARY)
                        .cloned()
                        .unwrap_or_else(|| format!("{} {}", endpoint.name, service.name)),
                ),
                description: endpoint.description.clone(),
                external_docs: endpoint.docs.as_ref().map(external_docs),
                operation_id,
                consumes: endpoint.consumes.clone(),
                produces: endpoint.produces.clone(),
                parameters,
                responses: responses.clone(),
                deprecated: endpoint.deprecated,
                security: security.clone(),
                extensions: route_extensions(endpoint, route),
                ..Default::default()
            };
            operations.push(RoutedOperation {
                path: template.template,
                method: route.method.clone(),
                operation,
            });
        }
        Ok(operations)
    }

    fn parameters(
        &mut self,
        service: &Service,
        endpoint: &Endpoint,
        subject: &str,
        template: &PathTemplate,
        payload: &Fields<'_>,
    ) -> AppResult<Vec<Parameter>> {
        let mut parameters = Vec::new();
        let mut consumed: Vec<&str> = Vec::new();

        for wildcard in &template.wildcards {
            let (attr, _) = payload.get(wildcard).ok_or_else(|| {
                AppError::design(
                    subject,
                    format!("path wildcard '{}' is not bound to a payload field", wildcard),
                )
            })?;
            let schema = self.schemas.build(attr)?;
            parameters.push(simple_parameter(
                subject,
                wildcard,
                ParameterLocation::Path,
                true,
                schema,
            )?);
            consumed.push(wildcard);
        }

        for binding in &endpoint.params {
            let (attr, required) = payload.get(&binding.field).ok_or_else(|| {
                AppError::design(
                    subject,
                    format!("parameter '{}' is not a payload field", binding.field),
                )
            })?;
            consumed.push(&binding.field);
            if !is_generated(&attr.meta) {
                continue;
            }
            let location = match binding.location {
                BindingLocation::Query => ParameterLocation::Query,
                BindingLocation::Header => ParameterLocation::Header,
            };
            let schema = self.schemas.build(attr)?;
            parameters.push(simple_parameter(
                subject,
                binding.wire_name(),
                location,
                required,
                schema,
            )?);
        }

        let body_name = format!("{}RequestBody", endpoint.name.to_upper_camel_case());
        let body = match (&endpoint.body, endpoint.payload.as_ref()) {
            (Some(BodyBinding::Field(field)), _) => {
                let (attr, _) = payload.get(field).ok_or_else(|| {
                    AppError::design(
                        subject,
                        format!("body field '{}' is not a payload field", field),
                    )
                })?;
                Some(self.schemas.build(attr)?)
            }
            (Some(BodyBinding::Remaining), Some(attr)) => {
                let derived = format!(
                    "{}{}RequestBody",
                    service.name.to_upper_camel_case(),
                    endpoint.name.to_upper_camel_case()
                );
                self.schemas.build_body(&derived, attr, &consumed)?
            }
            _ => None,
        };
        if let Some(schema) = body {
            parameters.push(Parameter::new(body_name, ParameterLocation::Body, true, schema));
        }
        Ok(parameters)
    }

    fn responses(
        &mut self,
        service: &Service,
        endpoint: &Endpoint,
        subject: &str,
        result: &Fields<'_>,
    ) -> AppResult<BTreeMap<String, Response>> {
        let def = &endpoint.response;
        let status = def
            .status
            .unwrap_or(if endpoint.result.is_some() { 200 } else { 204 });

        let mut headers = BTreeMap::new();
        let mut consumed = Vec::new();
        for binding in &def.headers {
            let (attr, _) = result.get(&binding.field).ok_or_else(|| {
                AppError::design(
                    subject,
                    format!("response header '{}' is not a result field", binding.field),
                )
            })?;
            consumed.push(binding.field.as_str());
            let mut schema = self.schemas.build(attr)?;
            schema.type_untyped_as_string();
            if !schema.is_simple() {
                return Err(AppError::design(
                    subject,
                    format!(
                        "response header '{}' must be a primitive or an array of primitives",
                        binding.wire_name()
                    ),
                ));
            }
            if let Some(meta) = schema.meta_mut() {
                meta.title = None;
                meta.example = None;
            }
            headers.insert(binding.wire_name().to_string(), Header { schema });
        }

        let schema = match endpoint.result.as_ref() {
            Some(_) if status == 204 => None,
            Some(attr) => {
                let derived = format!(
                    "{}{}ResponseBody",
                    service.name.to_upper_camel_case(),
                    endpoint.name.to_upper_camel_case()
                );
                self.schemas.build_body(&derived, attr, &consumed)?
            }
            None => None,
        };

        let mut responses = BTreeMap::new();
        add_response(
            &mut responses,
            subject,
            status,
            Response {
                description: def
                    .description
                    .clone()
                    .unwrap_or_else(|| status_description(status)),
                schema,
                headers,
                extensions: extensions_from_meta(&def.meta),
            },
        );

        for error in endpoint.errors.iter().filter(|e| is_generated(&e.meta)) {
            let response = self.error_response(error)?;
            add_response(&mut responses, subject, error.status, response);
        }
        Ok(responses)
    }

    fn error_response(&mut self, error: &ErrorDef) -> AppResult<Response> {
        let schema = match &error.attribute {
            Some(attr) => Some(self.schemas.build(attr)?),
            None => None,
        };
        Ok(Response {
            description: error
                .description
                .clone()
                .unwrap_or_else(|| format!("{}: {}", error.name, status_description(error.status))),
            schema,
            headers: BTreeMap::new(),
            extensions: extensions_from_meta(&error.meta),
        })
    }
}

/// Extensions of the operation served on `route`: the endpoint's, overridden by the route's.
fn route_extensions(endpoint: &Endpoint, route: &Route) -> Extensions {
    merge(
        extensions_from_meta(&endpoint.meta),
        &extensions_from_meta(&route.meta),
    )
}
