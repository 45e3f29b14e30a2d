#![deny(missing_docs)]

//! # Design Services
//!
//! API, services, endpoints, their HTTP bindings and security declarations.

use super::types::Attribute;
use super::Meta;
use http::Method;
use indexmap::IndexMap;

/// Contact metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    /// Contact name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact URL.
    pub url: Option<String>,
}

/// License metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    /// License name.
    pub name: String,
    /// License URL.
    pub url: Option<String>,
}

/// External documentation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docs {
    /// Link description.
    pub description: Option<String>,
    /// Link target.
    pub url: String,
}

/// A server the API is reachable on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    /// Server name.
    pub name: String,
    /// URL, possibly containing `{variable}` placeholders.
    pub url: String,
    /// Placeholder name to default value.
    pub variables: IndexMap<String, String>,
}

impl Server {
    /// Creates a server without variables.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            variables: IndexMap::new(),
        }
    }

    /// Declares a URL variable with its default value.
    pub fn with_variable(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.variables.insert(name.into(), default.into());
        self
    }

    /// The URL with every variable replaced by its default.
    pub fn resolved_url(&self) -> String {
        self.variables
            .iter()
            .fold(self.url.clone(), |url, (name, default)| {
                url.replace(&format!("{{{}}}", name), default)
            })
    }
}

/// API wide metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Api {
    /// API name.
    pub name: String,
    /// Title; defaults to the name.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// API version.
    pub version: String,
    /// Terms of service URL.
    pub terms_of_service: Option<String>,
    /// Contact.
    pub contact: Option<Contact>,
    /// License.
    pub license: Option<License>,
    /// External docs.
    pub docs: Option<Docs>,
    /// Servers; the first one provides `host`.
    pub servers: Vec<Server>,
    /// Common path prefix emitted as `basePath`.
    pub base_path: Option<String>,
    /// Security applied to endpoints that declare none.
    pub security: Vec<Requirement>,
    /// Free-form metadata.
    pub meta: Meta,
}

impl Api {
    /// Creates an API with the given name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            version: version.into(),
            terms_of_service: None,
            contact: None,
            license: None,
            docs: None,
            servers: Vec::new(),
            base_path: None,
            security: Vec::new(),
            meta: Meta::new(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a server.
    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    /// Sets the base path.
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the API wide security.
    pub fn with_security(mut self, requirement: Requirement) -> Self {
        self.security.push(requirement);
        self
    }

    /// Adds a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// A group of endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Service name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// API version this service belongs to; defaults to the API version.
    pub version: Option<String>,
    /// Path prefix prepended to every route.
    pub base_path: Option<String>,
    /// Endpoints in declaration order.
    pub endpoints: Vec<Endpoint>,
    /// Security for endpoints declaring none; `None` inherits the API security.
    pub security: Option<Vec<Requirement>>,
    /// External docs.
    pub docs: Option<Docs>,
    /// Free-form metadata.
    pub meta: Meta,
}

impl Service {
    /// Creates an empty service.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            version: None,
            base_path: None,
            endpoints: Vec::new(),
            security: None,
            docs: None,
            meta: Meta::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the path prefix.
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Appends an endpoint.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Sets the service security.
    pub fn with_security(mut self, requirements: Vec<Requirement>) -> Self {
        self.security = Some(requirements);
        self
    }

    /// Adds a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// An HTTP route an endpoint is reachable on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// HTTP method.
    pub method: Method,
    /// Route pattern, e.g. `/items/{id}` or `/files/{*path}`.
    pub path: String,
    /// Free-form metadata.
    pub meta: Meta,
}

/// Where a non-path payload field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingLocation {
    /// Query string.
    Query,
    /// Request header.
    Header,
}

/// Binds a payload field to a query parameter or header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    /// Payload field name.
    pub field: String,
    /// Wire name; defaults to the field name.
    pub name: Option<String>,
    /// Location.
    pub location: BindingLocation,
}

impl ParamBinding {
    /// The name the parameter has on the wire.
    pub fn wire_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.field)
    }
}

/// How the request body is formed from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyBinding {
    /// Payload fields not bound to path, query or headers.
    Remaining,
    /// A single payload field.
    Field(String),
}

/// Binds a result field to a response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBinding {
    /// Result field name.
    pub field: String,
    /// Header name; defaults to the field name.
    pub name: Option<String>,
}

impl HeaderBinding {
    /// The name the header has on the wire.
    pub fn wire_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.field)
    }
}

/// Successful response definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDef {
    /// Status code; defaults to 200 with a result and 204 without.
    pub status: Option<u16>,
    /// Description; defaults to the status reason phrase.
    pub description: Option<String>,
    /// Result fields sent as headers.
    pub headers: Vec<HeaderBinding>,
    /// Free-form metadata.
    pub meta: Meta,
}

/// A named error an endpoint may return.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDef {
    /// Error name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Error body type.
    pub attribute: Option<Attribute>,
    /// HTTP status code.
    pub status: u16,
    /// Free-form metadata.
    pub meta: Meta,
}

impl ErrorDef {
    /// Creates an error without body.
    pub fn new(name: impl Into<String>, status: u16) -> Self {
        Self {
            name: name.into(),
            description: None,
            attribute: None,
            status,
            meta: Meta::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the body type.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = Some(attribute);
        self
    }

    /// Adds a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// A service method exposed over HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// Endpoint name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Request payload.
    pub payload: Option<Attribute>,
    /// Result; a user type reference may select a view.
    pub result: Option<Attribute>,
    /// Declared errors.
    pub errors: Vec<ErrorDef>,
    /// HTTP routes.
    pub routes: Vec<Route>,
    /// Query and header bindings of payload fields.
    pub params: Vec<ParamBinding>,
    /// Request body binding; `None` means the endpoint has no body.
    pub body: Option<BodyBinding>,
    /// Success response.
    pub response: ResponseDef,
    /// Endpoint security; `None` inherits from the service.
    pub security: Option<Vec<Requirement>>,
    /// Whether the endpoint is deprecated.
    pub deprecated: bool,
    /// External documentation.
    pub docs: Option<Docs>,
    /// Request media types; empty inherits the document ones.
    pub consumes: Vec<String>,
    /// Response media types; empty inherits the document ones.
    pub produces: Vec<String>,
    /// Free-form metadata.
    pub meta: Meta,
}

impl Endpoint {
    /// Creates an endpoint without routes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            payload: None,
            result: None,
            errors: Vec::new(),
            routes: Vec::new(),
            params: Vec::new(),
            body: None,
            response: ResponseDef::default(),
            security: None,
            deprecated: false,
            docs: None,
            consumes: Vec::new(),
            produces: Vec::new(),
            meta: Meta::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the external documentation.
    pub fn with_docs(mut self, docs: Docs) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Overrides the request media types.
    pub fn with_consumes<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the response media types.
    pub fn with_produces<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a route.
    pub fn route(mut self, method: Method, path: impl Into<String>) -> Self {
        self.routes.push(Route {
            method,
            path: path.into(),
            meta: Meta::new(),
        });
        self
    }

    /// Adds metadata to the most recently added route.
    pub fn with_route_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(route) = self.routes.last_mut() {
            route.meta.insert(key.into(), value.into());
        }
        self
    }

    /// Sets the payload.
    pub fn payload(mut self, payload: Attribute) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the result.
    pub fn result(mut self, result: Attribute) -> Self {
        self.result = Some(result);
        self
    }

    /// Adds an error.
    pub fn error(mut self, error: ErrorDef) -> Self {
        self.errors.push(error);
        self
    }

    /// Binds a payload field to a query parameter.
    pub fn query(mut self, field: impl Into<String>) -> Self {
        self.params.push(ParamBinding {
            field: field.into(),
            name: None,
            location: BindingLocation::Query,
        });
        self
    }

    /// Binds a payload field to a request header.
    pub fn header(mut self, field: impl Into<String>, name: impl Into<String>) -> Self {
        self.params.push(ParamBinding {
            field: field.into(),
            name: Some(name.into()),
            location: BindingLocation::Header,
        });
        self
    }

    /// Sets the body binding.
    pub fn body(mut self, body: BodyBinding) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the success status.
    pub fn status(mut self, status: u16) -> Self {
        self.response.status = Some(status);
        self
    }

    /// Binds a result field to a response header.
    pub fn response_header(mut self, field: impl Into<String>, name: impl Into<String>) -> Self {
        self.response.headers.push(HeaderBinding {
            field: field.into(),
            name: Some(name.into()),
        });
        self
    }

    /// Sets the endpoint security.
    pub fn with_security(mut self, requirements: Vec<Requirement>) -> Self {
        self.security = Some(requirements);
        self
    }

    /// Marks the endpoint deprecated.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Adds a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Location of an API key or JWT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLocation {
    /// Request header.
    Header,
    /// Query string.
    Query,
}

/// OAuth2 flow of a scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuth2Flow {
    /// Authorization code flow.
    AuthorizationCode {
        /// Authorization endpoint.
        authorization_url: String,
        /// Token endpoint.
        token_url: String,
    },
    /// Implicit flow.
    Implicit {
        /// Authorization endpoint.
        authorization_url: String,
    },
    /// Resource owner password flow.
    Password {
        /// Token endpoint.
        token_url: String,
    },
    /// Client credentials flow.
    ClientCredentials {
        /// Token endpoint.
        token_url: String,
    },
}

/// Kind of security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemeKind {
    /// HTTP basic authentication.
    Basic,
    /// API key.
    ApiKey {
        /// Header or query parameter name.
        name: String,
        /// Location.
        location: KeyLocation,
    },
    /// JSON Web Token.
    Jwt {
        /// Header or query parameter name.
        name: String,
        /// Location.
        location: KeyLocation,
        /// Scope name to description.
        scopes: IndexMap<String, String>,
    },
    /// OAuth2.
    OAuth2 {
        /// Flow.
        flow: OAuth2Flow,
        /// Scope name to description.
        scopes: IndexMap<String, String>,
    },
}

/// A declared security scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct SecuritySchemeDef {
    /// Scheme name, referenced by requirements.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Kind.
    pub kind: SchemeKind,
    /// Free-form metadata.
    pub meta: Meta,
}

impl SecuritySchemeDef {
    /// Creates a scheme.
    pub fn new(name: impl Into<String>, kind: SchemeKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            meta: Meta::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// A security requirement: all listed schemes must be satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirement {
    /// Referenced scheme names.
    pub schemes: Vec<String>,
    /// Required scopes.
    pub scopes: Vec<String>,
}

impl Requirement {
    /// Requirement on a single scheme.
    pub fn scheme(name: impl Into<String>) -> Self {
        Self {
            schemes: vec![name.into()],
            scopes: Vec::new(),
        }
    }

    /// Adds another scheme.
    pub fn and(mut self, name: impl Into<String>) -> Self {
        self.schemes.push(name.into());
        self
    }

    /// Sets the required scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}
