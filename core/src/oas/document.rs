#![deny(missing_docs)]

//! # Document Assembly
//!
//! Composes info, paths, definitions, security definitions, tags and top-level
//! extensions into complete Swagger documents, one per API version found in the design.
//!
//! Every document is built with its own [`DefinitionRegistry`], so nothing leaks
//! between documents or runs.

use crate::config::GeneratorConfig;
use crate::design::{is_generated, Api, DesignRoot, Docs, Service};
use crate::error::{AppError, AppResult};
use crate::oas::extensions::extensions_from_meta;
use crate::oas::models::{Contact, Document, ExternalDocs, Info, License, Tag};
use crate::oas::operations::OperationBuilder;
use crate::oas::registry::DefinitionRegistry;
use crate::oas::schemas::SchemaBuilder;
use crate::oas::validation::check_integrity;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;
use url::Url;

/// Schemes Swagger 2.0 can describe.
const SWAGGER_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

/// A document together with its output name and version.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDocument {
    /// File stem the document is written under, e.g. `openapi` or `openapi_v2`.
    pub name: String,
    /// API version the document describes.
    pub version: String,
    /// The document.
    pub document: Document,
}

/// Assembles one document per API version.
///
/// Services are grouped by version; the group of the API version comes first and is
/// named after the configured file stem. A design without services yields no document.
/// Versions that map to the same file stem get a numeric suffix.
pub fn assemble(
    root: &DesignRoot,
    config: &GeneratorConfig,
) -> AppResult<Vec<AssembledDocument>> {
    let mut groups: Vec<(&str, Vec<&Service>)> = Vec::new();
    for service in root.services.iter().filter(|s| is_generated(&s.meta)) {
        let version = root.service_version(service);
        match groups.iter_mut().find(|(v, _)| *v == version) {
            Some((_, services)) => services.push(service),
            None => groups.push((version, vec![service])),
        }
    }
    groups.sort_by_key(|(version, _)| *version != root.api.version);

    let mut taken = HashSet::new();
    groups
        .into_iter()
        .map(|(version, services)| {
            let base = document_name(&config.file_stem, &root.api.version, version);
            let name = claim_name(&mut taken, base);
            debug!(document = %name, services = services.len(), "assembling document");
            build_document(root, config, version, &services)
                .map(|document| AssembledDocument {
                    name: name.clone(),
                    version: version.to_string(),
                    document,
                })
                .map_err(|e| e.in_document(name))
        })
        .collect()
}

/// Output name of the document of `version`.
pub fn document_name(stem: &str, api_version: &str, version: &str) -> String {
    if version == api_version {
        return stem.to_string();
    }
    let suffix: String = version
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}", stem, suffix)
}

fn claim_name(taken: &mut HashSet<String>, base: String) -> String {
    let mut name = base.clone();
    let mut n = 2;
    while taken.contains(&name) {
        name = format!("{}_{}", base, n);
        n += 1;
    }
    if name != base {
        debug!(requested = %base, assigned = %name, "document name disambiguated");
    }
    taken.insert(name.clone());
    name
}

fn build_document(
    root: &DesignRoot,
    config: &GeneratorConfig,
    version: &str,
    services: &[&Service],
) -> AppResult<Document> {
    let api = &root.api;
    let mut doc = Document::new(info(api, version));
    apply_servers(api, &mut doc)?;
    doc.consumes = config.consumes.clone();
    doc.produces = config.produces.clone();
    doc.external_docs = api.docs.as_ref().map(external_docs);
    doc.extensions = extensions_from_meta(&api.meta);

    let mut registry = DefinitionRegistry::with_max_suffix(config.max_name_suffix);
    let mut security_definitions = BTreeMap::new();
    {
        let mut schemas = SchemaBuilder::new(root, &mut registry);
        let mut operations = OperationBuilder::new(&mut schemas, &mut security_definitions);
        for service in services {
            doc.tags.push(tag(service));
            for endpoint in service.endpoints.iter().filter(|e| is_generated(&e.meta)) {
                for routed in operations.build(service, endpoint)? {
                    doc.paths
                        .entry(routed.path.clone())
                        .or_default()
                        .insert(&routed.path, &routed.method, routed.operation)?;
                }
            }
        }
    }
    doc.definitions = registry.into_definitions()?;
    doc.security_definitions = security_definitions;
    debug!(
        paths = doc.paths.len(),
        definitions = doc.definitions.len(),
        "document assembled"
    );

    check_integrity(&doc)?;
    Ok(doc)
}

fn info(api: &Api, version: &str) -> Info {
    Info {
        title: api.title.clone().unwrap_or_else(|| api.name.clone()),
        description: api.description.clone(),
        terms_of_service: api.terms_of_service.clone(),
        contact: api.contact.as_ref().map(|c| Contact {
            name: c.name.clone(),
            email: c.email.clone(),
            url: c.url.clone(),
        }),
        license: api.license.as_ref().map(|l| License {
            name: l.name.clone(),
            url: l.url.clone(),
        }),
        version: version.to_string(),
    }
}

pub(crate) fn external_docs(docs: &Docs) -> ExternalDocs {
    ExternalDocs {
        description: docs.description.clone(),
        url: docs.url.clone(),
    }
}

fn tag(service: &Service) -> Tag {
    Tag {
        name: service.name.clone(),
        description: service.description.clone(),
        external_docs: service.docs.as_ref().map(external_docs),
        extensions: extensions_from_meta(&service.meta),
    }
}

/// Sets `host`, `schemes` and `basePath` from the API servers.
///
/// The first server provides the host; every server contributes its scheme.
fn apply_servers(api: &Api, doc: &mut Document) -> AppResult<()> {
    let mut first = true;
    for server in &api.servers {
        let resolved = server.resolved_url();
        let url = Url::parse(&resolved).map_err(|e| {
            AppError::design(&server.name, format!("invalid server URL '{}': {}", resolved, e))
        })?;
        if SWAGGER_SCHEMES.contains(&url.scheme())
            && !doc.schemes.iter().any(|s| s == url.scheme())
        {
            doc.schemes.push(url.scheme().to_string());
        }
        if first {
            first = false;
            doc.host = url.host_str().map(|host| match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            });
            let path = url.path().trim_end_matches('/');
            if !path.is_empty() {
                doc.base_path = Some(path.to_string());
            }
        }
    }
    if let Some(base) = &api.base_path {
        doc.base_path = Some(base.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{Attribute, Endpoint, Server, UserType, META_GENERATE};
    use http::Method;
    use serde_json::json;

    fn item_service(name: &str) -> Service {
        Service::new(name).endpoint(
            Endpoint::new("show")
                .payload(Attribute::user("Item"))
                .result(Attribute::user("Item"))
                .route(Method::GET, "/items/{id}"),
        )
    }

    fn root() -> DesignRoot {
        DesignRoot::new(Api::new("store", "1.0")).with_type(
            UserType::new("Item")
                .required_field("id", Attribute::int())
                .field("name", Attribute::string()),
        )
    }

    #[test]
    fn test_empty_design_yields_no_document() {
        let docs = assemble(&root(), &GeneratorConfig::default()).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_document_name() {
        assert_eq!(document_name("openapi", "1.0", "1.0"), "openapi");
        assert_eq!(document_name("openapi", "1.0", "v2"), "openapi_v2");
        assert_eq!(document_name("openapi", "1.0", "2 beta"), "openapi_2_beta");
    }

    #[test]
    fn test_groups_by_version() {
        let root = root()
            .with_service(item_service("legacy").with_version("0.9"))
            .with_service(item_service("items"));
        let docs = assemble(&root, &GeneratorConfig::default()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name, "openapi");
        assert_eq!(docs[0].document.tags[0].name, "items");
        assert_eq!(docs[1].name, "openapi_0.9");
        assert_eq!(docs[1].document.info.version, "0.9");
    }

    #[test]
    fn test_colliding_version_stems_disambiguated() {
        let root = root()
            .with_service(item_service("spaced").with_version("v 2"))
            .with_service(item_service("underscored").with_version("v_2"));
        let docs = assemble(&root, &GeneratorConfig::default()).unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["openapi_v_2", "openapi_v_2_2"]);
        assert_eq!(docs[1].version, "v_2");
    }

    #[test]
    fn test_servers_set_host_and_base_path() {
        let mut root = root().with_service(item_service("items"));
        root.api = root
            .api
            .with_server(
                Server::new("main", "https://{env}.example.com:8443/api/")
                    .with_variable("env", "prod"),
            )
            .with_server(Server::new("dev", "http://localhost"));
        let docs = assemble(&root, &GeneratorConfig::default()).unwrap();
        let doc = &docs[0].document;
        assert_eq!(doc.host.as_deref(), Some("prod.example.com:8443"));
        assert_eq!(doc.base_path.as_deref(), Some("/api"));
        assert_eq!(doc.schemes, vec!["https", "http"]);
    }

    #[test]
    fn test_invalid_server_url_is_wrapped() {
        let mut root = root().with_service(item_service("items"));
        root.api = root.api.with_server(Server::new("bad", "not a url"));
        let err = assemble(&root, &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Document { ref document, .. } if document == "openapi"));
        assert!(err.to_string().contains("invalid server URL"));
    }

    #[test]
    fn test_hidden_service_and_endpoint_skipped() {
        let root = root()
            .with_service(item_service("hidden").with_meta(META_GENERATE, "false"))
            .with_service(
                item_service("items").endpoint(
                    Endpoint::new("secret")
                        .route(Method::GET, "/secret")
                        .with_meta(META_GENERATE, "false"),
                ),
            );
        let docs = assemble(&root, &GeneratorConfig::default()).unwrap();
        assert_eq!(docs.len(), 1);
        let doc = &docs[0].document;
        assert_eq!(doc.tags.len(), 1);
        assert!(!doc.paths.contains_key("/secret"));
    }

    #[test]
    fn test_document_json_shape() {
        let root = root()
            .with_service(item_service("items").with_meta("swagger:extension:x-svc", "1"));
        let docs = assemble(&root, &GeneratorConfig::default()).unwrap();
        let value = serde_json::to_value(&docs[0].document).unwrap();
        assert_eq!(value["swagger"], json!("2.0"));
        assert_eq!(value["info"], json!({"title": "store", "version": "1.0"}));
        assert_eq!(value["tags"], json!([{"name": "items", "x-svc": 1}]));
        assert_eq!(
            value["paths"]["/items/{id}"]["get"]["responses"]["200"]["schema"],
            json!({"$ref": "#/definitions/Item"})
        );
        assert_eq!(value["definitions"]["Item"]["required"], json!(["id"]));
    }

    #[test]
    fn test_duplicate_route_is_fatal() {
        let root = root().with_service(
            item_service("items").endpoint(
                Endpoint::new("again")
                    .payload(Attribute::user("Item"))
                    .route(Method::GET, "/items/{id}"),
            ),
        );
        let err = assemble(&root, &GeneratorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("already served by 'items#show'"));
    }
}
