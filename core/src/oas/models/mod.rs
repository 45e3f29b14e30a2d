#![deny(missing_docs)]

//! # Swagger 2.0 Models
//!
//! Serializable OpenAPI v2 objects emitted by the compiler. Maps whose order is
//! visible in the output (paths, definitions, security definitions, responses,
//! extensions) are `BTreeMap`s so repeated runs produce identical bytes.

pub mod schema;

pub use schema::{
    ArraySchema, ObjectSchema, RefSchema, ScalarSchema, ScalarType, Schema, SchemaMeta,
    DEFINITIONS_PREFIX,
};

use crate::error::{AppError, AppResult};
use crate::oas::extensions::Extensions;
use http::Method;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Value of the mandatory `swagger` field.
pub const SWAGGER_VERSION: &str = "2.0";

fn is_false(value: &bool) -> bool {
    !*value
}

/// Contact Object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// License Object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct License {
    /// Name.
    pub name: String,
    /// URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// External Documentation Object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalDocs {
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL.
    pub url: String,
}

/// Info Object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Terms of service URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    /// Contact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// License.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// API version.
    pub version: String,
}

/// Tag Object; one per service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// External docs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// Vendor extensions.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path template variable.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Request body.
    Body,
}

/// Parameter Object.
///
/// Body parameters nest their schema under `schema`; every other location writes the
/// (scalar or array) schema inline, as Swagger 2.0 requires.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name.
    pub name: String,
    /// Location.
    pub location: ParameterLocation,
    /// Description.
    pub description: Option<String>,
    required: bool,
    /// Value schema.
    pub schema: Schema,
    /// `collectionFormat` of array parameters.
    pub collection_format: Option<String>,
    /// Vendor extensions.
    pub extensions: Extensions,
}

impl Parameter {
    /// Creates a parameter. Path parameters are always required.
    ///
    /// For non-body locations the description and extensions of the inline schema are
    /// lifted onto the parameter, so that no key is written twice.
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        required: bool,
        mut schema: Schema,
    ) -> Self {
        let mut description = None;
        let mut extensions = Extensions::new();
        if location != ParameterLocation::Body {
            if let Some(meta) = schema.meta_mut() {
                description = meta.description.take();
                extensions = std::mem::take(&mut meta.extensions);
                meta.title = None;
                meta.example = None;
            }
        }
        Self {
            name: name.into(),
            location,
            description,
            required: required || location == ParameterLocation::Path,
            schema,
            collection_format: None,
            extensions,
        }
    }

    /// Whether the parameter is required.
    pub fn is_required(&self) -> bool {
        self.required
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParameterRepr<'a> {
    name: &'a str,
    #[serde(rename = "in")]
    location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a Schema>,
    #[serde(flatten)]
    inline: Option<&'a Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection_format: Option<&'a str>,
    #[serde(flatten)]
    extensions: &'a Extensions,
}

impl Serialize for Parameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = self.location == ParameterLocation::Body;
        ParameterRepr {
            name: &self.name,
            location: self.location,
            description: self.description.as_deref(),
            required: self.required,
            schema: body.then_some(&self.schema),
            inline: (!body).then_some(&self.schema),
            collection_format: self.collection_format.as_deref(),
            extensions: &self.extensions,
        }
        .serialize(serializer)
    }
}

/// Header Object of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    /// Inline (scalar or array) schema, including its description.
    #[serde(flatten)]
    pub schema: Schema,
}

/// Response Object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Description (mandatory in Swagger 2.0).
    pub description: String,
    /// Body schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Headers by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Header>,
    /// Vendor extensions.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Security Requirement Object: scheme name to required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// Operation Object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// External docs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// Unique operation id.
    pub operation_id: String,
    /// Consumed media types overriding the document ones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    /// Produced media types overriding the document ones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    /// Parameters, the body parameter last.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Responses by status code.
    pub responses: BTreeMap<String, Response>,
    /// Whether the operation is deprecated.
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Security requirements (alternatives).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Vendor extensions.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Operation {
    /// Schema of the body parameter, if any.
    pub fn request_body(&self) -> Option<&Schema> {
        self.parameters
            .iter()
            .find(|p| p.location == ParameterLocation::Body)
            .map(|p| &p.schema)
    }
}

/// Path Item Object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: &Method) -> Option<&mut Option<Operation>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::PUT => Some(&mut self.put),
            Method::POST => Some(&mut self.post),
            Method::DELETE => Some(&mut self.delete),
            Method::OPTIONS => Some(&mut self.options),
            Method::HEAD => Some(&mut self.head),
            Method::PATCH => Some(&mut self.patch),
            _ => None,
        }
    }

    /// Sets the operation for `method`.
    ///
    /// Fails on methods Swagger 2.0 cannot describe and on a second operation for the
    /// same method.
    pub fn insert(&mut self, path: &str, method: &Method, operation: Operation) -> AppResult<()> {
        let Some(slot) = self.slot(method) else {
            return Err(AppError::design(
                &operation.operation_id,
                format!("HTTP method {} is not supported by Swagger 2.0", method),
            ));
        };
        if let Some(existing) = slot.as_ref() {
            return Err(AppError::design(
                &operation.operation_id,
                format!(
                    "{} {} is already served by '{}'",
                    method, path, existing.operation_id
                ),
            ));
        }
        *slot = Some(operation);
        Ok(())
    }

    /// Operations with their lower-case method names, in output order.
    pub fn operations(&self) -> Vec<(&'static str, &Operation)> {
        [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
        ]
        .into_iter()
        .filter_map(|(name, op)| op.as_ref().map(|op| (name, op)))
        .collect()
    }
}

/// API key location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    /// Header.
    Header,
    /// Query string.
    Query,
}

/// Swagger 2.0 OAuth2 flow names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OAuth2FlowKind {
    /// Authorization code.
    AccessCode,
    /// Implicit.
    Implicit,
    /// Resource owner password.
    Password,
    /// Client credentials.
    Application,
}

/// Security Scheme Object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    /// HTTP basic authentication.
    #[serde(rename = "basic")]
    Basic {
        /// Description.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Vendor extensions.
        #[serde(flatten)]
        extensions: Extensions,
    },
    /// API key.
    #[serde(rename = "apiKey")]
    ApiKey {
        /// Description.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Header or query parameter name.
        name: String,
        /// Location.
        #[serde(rename = "in")]
        location: ApiKeyLocation,
        /// Vendor extensions.
        #[serde(flatten)]
        extensions: Extensions,
    },
    /// OAuth2.
    #[serde(rename = "oauth2")]
    OAuth2 {
        /// Description.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Flow.
        flow: OAuth2FlowKind,
        /// Authorization URL (implicit, accessCode).
        #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
        authorization_url: Option<String>,
        /// Token URL (password, application, accessCode).
        #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
        token_url: Option<String>,
        /// Scope name to description.
        scopes: BTreeMap<String, String>,
        /// Vendor extensions.
        #[serde(flatten)]
        extensions: Extensions,
    },
}

impl SecurityScheme {
    /// Whether requirements on this scheme may list scopes.
    pub fn accepts_scopes(&self) -> bool {
        matches!(self, SecurityScheme::OAuth2 { .. })
    }
}

/// The Swagger 2.0 root object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Specification version, always `2.0`.
    pub swagger: String,
    /// API metadata.
    pub info: Info,
    /// Host (and port) serving the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Path prefix of every path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Transfer protocols.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    /// Consumed media types.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    /// Produced media types.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    /// Path templates to operations.
    pub paths: BTreeMap<String, PathItem>,
    /// Registered schemas.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, Schema>,
    /// Security schemes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub security_definitions: BTreeMap<String, SecurityScheme>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// External docs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// Vendor extensions.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Document {
    /// An empty document for the given info.
    pub fn new(info: Info) -> Self {
        Self {
            swagger: SWAGGER_VERSION.to_string(),
            info,
            ..Default::default()
        }
    }
}
