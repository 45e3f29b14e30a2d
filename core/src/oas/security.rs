#![deny(missing_docs)]

//! # Security Mapping
//!
//! Projects declared security schemes onto `securityDefinitions` and endpoint
//! requirements onto operation `security` entries.

use crate::design::{
    DesignRoot, Endpoint, KeyLocation, OAuth2Flow, Requirement, SchemeKind, SecuritySchemeDef,
    Service,
};
use crate::error::{AppError, AppResult};
use crate::oas::extensions::extensions_from_meta;
use crate::oas::models::{ApiKeyLocation, OAuth2FlowKind, SecurityRequirement, SecurityScheme};
use std::collections::BTreeMap;

fn key_location(location: KeyLocation) -> ApiKeyLocation {
    match location {
        KeyLocation::Header => ApiKeyLocation::Header,
        KeyLocation::Query => ApiKeyLocation::Query,
    }
}

/// Appends a markdown list of scopes to a JWT description, since `apiKey` schemes
/// cannot declare scopes.
fn jwt_description<'a>(
    description: Option<&str>,
    scopes: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> String {
    let mut text = description
        .unwrap_or("Secures endpoint by requiring a valid JWT token.")
        .to_string();
    let lines: Vec<String> = scopes
        .into_iter()
        .map(|(name, desc)| format!("  * `{}`: {}", name, desc))
        .collect();
    if !lines.is_empty() {
        text.push_str("\n\n**Security Scopes**:\n");
        text.push_str(&lines.join("\n"));
    }
    text
}

/// Maps a declared scheme to its name and Swagger security scheme.
pub fn map_scheme(def: &SecuritySchemeDef) -> (String, SecurityScheme) {
    let extensions = extensions_from_meta(&def.meta);
    let description = def.description.clone();
    let scheme = match &def.kind {
        SchemeKind::Basic => SecurityScheme::Basic {
            description,
            extensions,
        },
        SchemeKind::ApiKey { name, location } => SecurityScheme::ApiKey {
            description,
            name: name.clone(),
            location: key_location(*location),
            extensions,
        },
        SchemeKind::Jwt {
            name,
            location,
            scopes,
        } => SecurityScheme::ApiKey {
            description: Some(jwt_description(def.description.as_deref(), scopes)),
            name: name.clone(),
            location: key_location(*location),
            extensions,
        },
        SchemeKind::OAuth2 { flow, scopes } => {
            let (flow, authorization_url, token_url) = match flow {
                OAuth2Flow::AuthorizationCode {
                    authorization_url,
                    token_url,
                } => (
                    OAuth2FlowKind::AccessCode,
                    Some(authorization_url.clone()),
                    Some(token_url.clone()),
                ),
                OAuth2Flow::Implicit { authorization_url } => {
                    (OAuth2FlowKind::Implicit, Some(authorization_url.clone()), None)
                }
                OAuth2Flow::Password { token_url } => {
                    (OAuth2FlowKind::Password, None, Some(token_url.clone()))
                }
                OAuth2Flow::ClientCredentials { token_url } => {
                    (OAuth2FlowKind::Application, None, Some(token_url.clone()))
                }
            };
            SecurityScheme::OAuth2 {
                description,
                flow,
                authorization_url,
                token_url,
                scopes: scopes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                extensions,
            }
        }
    };
    (def.name.clone(), scheme)
}

/// Requirements applying to an endpoint: its own, else its service's, else the API's.
pub fn effective_requirements<'a>(
    root: &'a DesignRoot,
    service: &'a Service,
    endpoint: &'a Endpoint,
) -> &'a [Requirement] {
    endpoint
        .security
        .as_deref()
        .or(service.security.as_deref())
        .unwrap_or(&root.api.security)
}

/// Maps requirements to operation security entries.
///
/// Every referenced scheme is added to `definitions`. A reference to an undeclared
/// scheme is a design error naming `subject`.
pub fn map_requirements(
    root: &DesignRoot,
    subject: &str,
    requirements: &[Requirement],
    definitions: &mut BTreeMap<String, SecurityScheme>,
) -> AppResult<Vec<SecurityRequirement>> {
    let mut security = Vec::with_capacity(requirements.len());
    for requirement in requirements {
        let mut entry = SecurityRequirement::new();
        for scheme_name in &requirement.schemes {
            let def = root.scheme(scheme_name).ok_or_else(|| {
                AppError::design(
                    subject,
                    format!("security scheme '{}' is not declared", scheme_name),
                )
            })?;
            let scheme = definitions
                .entry(def.name.clone())
                .or_insert_with(|| map_scheme(def).1);
            let scopes = if scheme.accepts_scopes() {
                requirement.scopes.clone()
            } else {
                Vec::new()
            };
            entry.insert(def.name.clone(), scopes);
        }
        if !entry.is_empty() {
            security.push(entry);
        }
    }
    Ok(security)
}
