#![deny(missing_docs)]

//! # Design Graph
//!
//! The already-validated, read-only API description the compiler consumes.
//!
//! - **types**: attributes, primitives, user types, views, validations.
//! - **service**: API metadata, services, endpoints, HTTP bindings, security.

pub mod service;
pub mod types;

pub use service::{
    Api, BindingLocation, BodyBinding, Contact, Docs, Endpoint, ErrorDef, HeaderBinding,
    KeyLocation, License, OAuth2Flow, ParamBinding, Requirement, ResponseDef, Route, SchemeKind,
    SecuritySchemeDef, Server, Service,
};
pub use types::{
    Attribute, Bound, DataType, Primitive, TypeRef, UserType, Validation, DEFAULT_VIEW,
};

use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Free-form metadata attached to design elements.
pub type Meta = BTreeMap<String, String>;

/// Metadata key that excludes an element from the generated documents when `"false"`.
pub const META_GENERATE: &str = "swagger:generate";

/// Metadata key overriding an operation summary.
pub const META_SUMMARY: &str = "swagger:summary";

/// Whether the element carrying `meta` should appear in generated documents.
pub fn is_generated(meta: &Meta) -> bool {
    meta.get(META_GENERATE)
        .map(|v| !v.trim().eq_ignore_ascii_case("false"))
        .unwrap_or(true)
}

/// Root of the design graph.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignRoot {
    /// API metadata.
    pub api: Api,
    /// User types by name.
    pub types: IndexMap<String, UserType>,
    /// Services in declaration order.
    pub services: Vec<Service>,
    /// Declared security schemes.
    pub schemes: Vec<SecuritySchemeDef>,
}

impl DesignRoot {
    /// Creates a design without services.
    pub fn new(api: Api) -> Self {
        Self {
            api,
            types: IndexMap::new(),
            services: Vec::new(),
            schemes: Vec::new(),
        }
    }

    /// Registers a user type.
    pub fn with_type(mut self, user_type: UserType) -> Self {
        self.types.insert(user_type.name.clone(), user_type);
        self
    }

    /// Appends a service.
    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    /// Declares a security scheme.
    pub fn with_scheme(mut self, scheme: SecuritySchemeDef) -> Self {
        self.schemes.push(scheme);
        self
    }

    /// Looks up a user type by name.
    pub fn user_type(&self, name: &str) -> Option<&UserType> {
        self.types.get(name)
    }

    /// Looks up a declared security scheme by name.
    pub fn scheme(&self, name: &str) -> Option<&SecuritySchemeDef> {
        self.schemes.iter().find(|s| s.name == name)
    }

    /// Version a service is published under.
    pub fn service_version<'a>(&'a self, service: &'a Service) -> &'a str {
        service.version.as_deref().unwrap_or(&self.api.version)
    }
}
