mod common;

use common::*;
use http::Method;
use indexmap::IndexMap;
use oas2_gen::design::{
    Api, Attribute, DesignRoot, Docs, Endpoint, KeyLocation, OAuth2Flow, Primitive, Requirement,
    SchemeKind, SecuritySchemeDef, Service, UserType,
};
use oas2_gen::{
    generate_rendered, render_files, validate_swagger, AppError, GeneratorConfig, HelperRenderer,
    OutputFormat,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_empty_design() {
    let root = DesignRoot::new(Api::new("empty", "1.0"));
    assert!(files(&root).is_empty());
}

#[test]
fn test_file_layout_and_sections() {
    let files = files(&item_design());
    let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["gen/http/openapi.json", "gen/http/openapi.yaml"]);
    for file in &files {
        assert_eq!(file.sections.len(), 1);
        let section = &file.sections[0];
        let helper = file.format.helper_name();
        assert_eq!(section.source, format!("{{{{ {} . }}}}", helper));
        assert!(section.helpers.contains_key(helper));
        assert_eq!(section.data["swagger"], json!("2.0"));
    }
}

#[test]
fn test_item_lookup_document() {
    let doc = openapi_json(&item_design());
    assert_eq!(
        doc["paths"],
        json!({
            "/items/{id}": {
                "get": {
                    "tags": ["items"],
                    "summary": "show items",
                    "operationId": "items#show",
                    "parameters": [{
                        "name": "id",
                        "in": "path",
                        "required": true,
                        "type": "integer",
                        "format": "int64"
                    }],
                    "responses": {
                        "200": {
                            "description": "OK response.",
                            "schema": {"$ref": "#/definitions/Item"}
                        }
                    }
                }
            }
        })
    );
    assert_eq!(
        doc["definitions"],
        json!({
            "Item": {
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "format": "int64"},
                    "name": {"type": "string"}
                },
                "required": ["id", "name"],
                "title": "Item",
                "description": "A stored item"
            }
        })
    );
    assert_eq!(
        doc["consumes"],
        json!(["application/json", "application/xml", "application/gob"])
    );
}

#[test]
fn test_multiple_services() {
    let root = item_design().with_service(
        Service::new("catalog")
            .with_description("Browse the catalog")
            .endpoint(
                Endpoint::new("list")
                    .result(Attribute::array_of(Attribute::user("Item")))
                    .route(Method::GET, "/catalog"),
            ),
    );
    let doc = openapi_json(&root);
    assert_eq!(
        doc["tags"],
        json!([{"name": "items"}, {"name": "catalog", "description": "Browse the catalog"}])
    );
    let paths: Vec<_> = doc["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(paths, vec!["/catalog", "/items/{id}"]);
    assert_eq!(
        doc["paths"]["/catalog"]["get"]["responses"]["200"]["schema"],
        json!({"type": "array", "items": {"$ref": "#/definitions/Item"}})
    );
    // shared type registered once
    assert_eq!(doc["definitions"].as_object().unwrap().len(), 1);
}

#[test]
fn test_multiple_views() {
    let root = item_design().with_service(
        Service::new("summary").endpoint(
            Endpoint::new("peek")
                .result(Attribute::user_view("Item", "tiny"))
                .route(Method::GET, "/peek"),
        ),
    );
    let doc = openapi_json(&root);
    let definitions = doc["definitions"].as_object().unwrap();
    assert_eq!(definitions.keys().collect::<Vec<_>>(), vec!["Item", "ItemTiny"]);
    assert_eq!(
        doc["definitions"]["ItemTiny"]["properties"],
        json!({"id": {"type": "integer", "format": "int64"}})
    );
    assert_eq!(doc["definitions"]["ItemTiny"]["required"], json!(["id"]));
}

#[test]
fn test_explicit_view_only() {
    let root = DesignRoot::new(Api::new("store", "1.0"))
        .with_type(item_type())
        .with_service(
            Service::new("items").endpoint(
                Endpoint::new("list")
                    .result(Attribute::array_of(Attribute::user_view("Item", "tiny")))
                    .route(Method::GET, "/items"),
            ),
        );
    let doc = openapi_json(&root);
    let definitions = doc["definitions"].as_object().unwrap();
    assert_eq!(definitions.keys().collect::<Vec<_>>(), vec!["ItemTiny"]);
}

fn security_design(requirement: Requirement) -> DesignRoot {
    let scopes: IndexMap<String, String> = [
        ("api:read".to_string(), "Read-only access".to_string()),
        ("api:write".to_string(), "Read and write access".to_string()),
    ]
    .into_iter()
    .collect();
    DesignRoot::new(Api::new("secure", "1.0"))
        .with_scheme(SecuritySchemeDef::new("basic", SchemeKind::Basic))
        .with_scheme(SecuritySchemeDef::new(
            "api_key",
            SchemeKind::ApiKey {
                name: "key".into(),
                location: KeyLocation::Query,
            },
        ))
        .with_scheme(SecuritySchemeDef::new(
            "jwt",
            SchemeKind::Jwt {
                name: "Authorization".into(),
                location: KeyLocation::Header,
                scopes: scopes.clone(),
            },
        ))
        .with_scheme(SecuritySchemeDef::new(
            "oauth2",
            SchemeKind::OAuth2 {
                flow: OAuth2Flow::AuthorizationCode {
                    authorization_url: "http://goa.design/authorization".into(),
                    token_url: "http://goa.design/token".into(),
                },
                scopes,
            },
        ))
        .with_service(
            Service::new("secured")
                .with_security(vec![requirement])
                .endpoint(Endpoint::new("secure").route(Method::GET, "/secure"))
                .endpoint(
                    Endpoint::new("open")
                        .route(Method::GET, "/open")
                        .with_security(vec![]),
                ),
        )
}

#[test]
fn test_security() {
    let root = security_design(
        Requirement::scheme("oauth2")
            .and("basic")
            .and("api_key")
            .with_scopes(["api:read"]),
    );
    let doc = openapi_json(&root);
    let definitions = doc["securityDefinitions"].as_object().unwrap();
    assert_eq!(
        definitions.keys().collect::<Vec<_>>(),
        vec!["api_key", "basic", "oauth2"]
    );
    assert_eq!(
        doc["paths"]["/secure"]["get"]["security"],
        json!([{"api_key": [], "basic": [], "oauth2": ["api:read"]}])
    );
    assert!(doc["paths"]["/open"]["get"].get("security").is_none());
    assert_eq!(
        doc["securityDefinitions"]["oauth2"],
        json!({
            "type": "oauth2",
            "flow": "accessCode",
            "authorizationUrl": "http://goa.design/authorization",
            "tokenUrl": "http://goa.design/token",
            "scopes": {"api:read": "Read-only access", "api:write": "Read and write access"}
        })
    );
}

#[test]
fn test_undeclared_security_scheme_is_fatal() {
    let root = security_design(Requirement::scheme("missing"));
    let err = generate_rendered(&root, &GeneratorConfig::default()).unwrap_err();
    let AppError::Document { document, source } = &err else {
        panic!("expected a document error, got {err}");
    };
    assert_eq!(document, "openapi");
    assert!(matches!(
        source.as_ref(),
        AppError::Design { subject, .. } if subject == "secured#secure"
    ));
}

#[test]
fn test_server_host_with_variables() {
    let root = with_server(
        item_design(),
        "https://{version}.goa.design:{port}/v1",
        &[("version", "v1"), ("port", "8080")],
    );
    let doc = openapi_json(&root);
    assert_eq!(doc["host"], json!("v1.goa.design:8080"));
    assert_eq!(doc["basePath"], json!("/v1"));
    assert_eq!(doc["schemes"], json!(["https"]));
}

#[test]
fn test_with_spaces() {
    let root = DesignRoot::new(Api::new("spaces", "1.0"))
        .with_type(
            UserType::new("bottle type")
                .required_field("bottle id", Attribute::int())
                .view("extended view", ["bottle id"]),
        )
        .with_service(
            Service::new("wine cellar").endpoint(
                Endpoint::new("get bottle")
                    .result(Attribute::user_view("bottle type", "extended view"))
                    .route(Method::GET, "/cellar rack/{*slot}")
                    .payload(Attribute::string()),
            ),
        );
    let doc = openapi_json(&root);
    let paths: Vec<_> = doc["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(paths, vec!["/cellar%20rack/{slot}"]);
    let op = &doc["paths"]["/cellar%20rack/{slot}"]["get"];
    assert_eq!(op["operationId"], json!("wine cellar#get bottle"));
    assert_eq!(
        op["responses"]["200"]["schema"],
        json!({"$ref": "#/definitions/BottleTypeExtendedView"})
    );
    assert!(doc["definitions"]["BottleTypeExtendedView"]["properties"]
        .get("bottle id")
        .is_some());
}

#[test]
fn test_with_map() {
    let root = DesignRoot::new(Api::new("maps", "1.0"))
        .with_type(
            UserType::new("Inventory").field(
                "counts",
                Attribute::map_of(Attribute::string(), Attribute::int())
                    .with_validation(oas2_gen::design::Validation::new().with_max_length(10)),
            ),
        )
        .with_service(
            Service::new("stock").endpoint(
                Endpoint::new("show")
                    .result(Attribute::user("Inventory"))
                    .route(Method::GET, "/stock"),
            ),
        );
    let doc = openapi_json(&root);
    assert_eq!(
        doc["definitions"]["Inventory"]["properties"]["counts"],
        json!({
            "type": "object",
            "additionalProperties": {"type": "integer", "format": "int64"},
            "maxProperties": 10
        })
    );
}

#[test]
fn test_path_with_wildcards() {
    let root = DesignRoot::new(Api::new("files", "1.0"))
        .with_type(
            UserType::new("FilePath")
                .required_field("bucket", Attribute::string())
                .required_field("path", Attribute::string()),
        )
        .with_service(
            Service::new("files")
                .with_base_path("/api")
                .endpoint(
                    Endpoint::new("download")
                        .payload(Attribute::user("FilePath"))
                        .route(Method::GET, "/buckets/:bucket/{*path}"),
                ),
        );
    let doc = openapi_json(&root);
    let op = &doc["paths"]["/api/buckets/{bucket}/{path}"]["get"];
    let names: Vec<_> = op["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["name"].clone(), p["in"].clone(), p["required"].clone()))
        .collect();
    assert_eq!(
        names,
        vec![
            (json!("bucket"), json!("path"), json!(true)),
            (json!("path"), json!("path"), json!(true)),
        ]
    );
    assert_eq!(op["responses"]["204"]["description"], json!("No Content response."));
}

#[test]
fn test_validations() {
    let doc = openapi_json(&validations_design());
    let account = &doc["definitions"]["Account"]["properties"];
    assert_eq!(
        account["login"],
        json!({"type": "string", "pattern": "^[a-z]+$", "minLength": 3, "maxLength": 16})
    );
    assert_eq!(
        account["age"],
        json!({
            "type": "integer",
            "format": "int64",
            "minimum": 18,
            "maximum": 130,
            "exclusiveMaximum": true
        })
    );
    assert_eq!(
        account["roles"],
        json!({
            "type": "array",
            "items": {"type": "string", "enum": ["admin", "user"]},
            "minItems": 1,
            "maxItems": 3
        })
    );
    let op = &doc["paths"]["/accounts"]["post"];
    assert_eq!(
        op["parameters"],
        json!([{
            "name": "CreateRequestBody",
            "in": "body",
            "required": true,
            "schema": {"$ref": "#/definitions/Account"}
        }])
    );
    assert_eq!(op["responses"]["400"]["description"], json!("Invalid account"));
    assert_eq!(
        op["responses"]["201"]["schema"],
        json!({"$ref": "#/definitions/Account"})
    );
}

#[test]
fn test_out_of_range_example_is_rejected() {
    let mut root = validations_design();
    let account = root.types.get_mut("Account").unwrap();
    let login = account.fields.get_mut("login").unwrap();
    login.example = Some(json!("ab"));
    let err = generate_rendered(&root, &GeneratorConfig::default()).unwrap_err();
    assert!(err.to_string().contains("fewer than 3 characters"));
}

#[test]
fn test_extensions() {
    let root = DesignRoot::new(Api::new("ext", "1.0").with_meta("swagger:extension:x-api", "true"))
        .with_service(
            Service::new("ext")
                .with_meta("swagger:extension:x-service", "{\"team\": \"blue\"}")
                .endpoint(
                    Endpoint::new("first")
                        .with_meta("swagger:extension:x-first", "1")
                        .with_meta("openapi:extension:x-shared", "\"a\"")
                        .route(Method::GET, "/first"),
                )
                .endpoint(
                    Endpoint::new("second")
                        .with_meta("swagger:extension:x-second", "2")
                        .route(Method::GET, "/second")
                        .with_route_meta("swagger:extension:x-shared", "\"b\""),
                ),
        );
    let doc = openapi_json(&root);
    assert_eq!(doc["x-api"], json!(true));
    assert_eq!(doc["tags"][0]["x-service"], json!({"team": "blue"}));
    let first = &doc["paths"]["/first"]["get"];
    let second = &doc["paths"]["/second"]["get"];
    assert_eq!(first["x-first"], json!(1));
    assert_eq!(first["x-shared"], json!("a"));
    assert!(first.get("x-second").is_none());
    assert_eq!(second["x-second"], json!(2));
    assert_eq!(second["x-shared"], json!("b"));
    assert!(second.get("x-first").is_none());
}

#[test]
fn test_multiple_versions() {
    let root = item_design().with_service(
        Service::new("legacy").with_version("v2").endpoint(
            Endpoint::new("show")
                .payload(Attribute::user("ItemID"))
                .result(Attribute::user_view("Item", "tiny"))
                .route(Method::GET, "/legacy/{id}"),
        ),
    );
    let paths: Vec<_> = files(&root).into_iter().map(|f| f.path).collect();
    assert_eq!(
        paths,
        vec![
            "gen/http/openapi.json",
            "gen/http/openapi.yaml",
            "gen/http/openapi_v2.json",
            "gen/http/openapi_v2.yaml",
        ]
    );
    let v2 = rendered_json(&root, "gen/http/openapi_v2.json");
    assert_eq!(v2["info"]["version"], json!("v2"));
    // registries are per document
    let definitions = v2["definitions"].as_object().unwrap();
    assert_eq!(definitions.keys().collect::<Vec<_>>(), vec!["ItemTiny"]);
}

#[test]
fn test_versions_with_colliding_stems_keep_both_files() {
    let legacy = |name: &str, version: &str| {
        Service::new(name).with_version(version).endpoint(
            Endpoint::new("show")
                .payload(Attribute::user("ItemID"))
                .result(Attribute::user("Item"))
                .route(Method::GET, "/items/{id}"),
        )
    };
    let root = item_design()
        .with_service(legacy("spaced", "v 2"))
        .with_service(legacy("underscored", "v_2"));
    let paths: Vec<_> = files(&root).into_iter().map(|f| f.path).collect();
    assert_eq!(
        paths,
        vec![
            "gen/http/openapi.json",
            "gen/http/openapi.yaml",
            "gen/http/openapi_v_2.json",
            "gen/http/openapi_v_2.yaml",
            "gen/http/openapi_v_2_2.json",
            "gen/http/openapi_v_2_2.yaml",
        ]
    );
    let second = rendered_json(&root, "gen/http/openapi_v_2_2.json");
    assert_eq!(second["info"]["version"], json!("v_2"));
    assert_eq!(second["tags"][0]["name"], json!("underscored"));
}

#[test]
fn test_untyped_fields_bound_as_strings() {
    let search = UserType::new("Search")
        .field("q", Attribute::primitive(Primitive::Any))
        .field("trace", Attribute::primitive(Primitive::Any));
    let root = DesignRoot::new(Api::new("search", "1.0"))
        .with_type(search)
        .with_service(
            Service::new("search").endpoint(
                Endpoint::new("find")
                    .payload(Attribute::user("Search"))
                    .result(Attribute::user("Search"))
                    .query("q")
                    .response_header("trace", "X-Trace")
                    .route(Method::GET, "/search"),
            ),
        );
    let doc = openapi_json(&root);
    let op = &doc["paths"]["/search"]["get"];
    assert_eq!(
        op["parameters"],
        json!([{"name": "q", "in": "query", "required": false, "type": "string"}])
    );
    assert_eq!(op["responses"]["200"]["headers"]["X-Trace"], json!({"type": "string"}));
}

#[test]
fn test_operation_docs_and_media_types() {
    let root = item_design().with_service(
        Service::new("exports").endpoint(
            Endpoint::new("csv")
                .payload(Attribute::user("ItemID"))
                .route(Method::GET, "/exports/{id}")
                .with_docs(Docs {
                    description: Some("Export format".into()),
                    url: "https://docs.example.com/csv".into(),
                })
                .with_produces(["text/csv"]),
        ),
    );
    let doc = openapi_json(&root);
    let op = &doc["paths"]["/exports/{id}"]["get"];
    assert_eq!(
        op["externalDocs"],
        json!({"description": "Export format", "url": "https://docs.example.com/csv"})
    );
    assert_eq!(op["produces"], json!(["text/csv"]));
    assert!(op.get("consumes").is_none());
    assert!(doc["paths"]["/items/{id}"]["get"].get("produces").is_none());
}

#[test]
fn test_deterministic_output() {
    let root = with_server(validations_design(), "http://localhost:8080", &[]);
    let first = generate_rendered(&root, &GeneratorConfig::default()).unwrap();
    let second = generate_rendered(&root, &GeneratorConfig::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_rendered_json_validates() {
    let config = GeneratorConfig::default().with_formats(vec![OutputFormat::Json]);
    for root in [item_design(), validations_design()] {
        let files = oas2_gen::generate(&root, &config).unwrap();
        for rendered in render_files(&files, &HelperRenderer) {
            let rendered = rendered.unwrap();
            assert!(rendered.path.ends_with(".json"));
            validate_swagger(rendered.content.as_bytes()).unwrap();
        }
    }
}
