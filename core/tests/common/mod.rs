//! Design fixtures shared by the integration tests.

#![allow(dead_code)]

use http::Method;
use oas2_gen::design::{
    Api, Attribute, Bound, DesignRoot, Endpoint, ErrorDef, Server, Service, UserType, Validation,
};
use oas2_gen::{generate, generate_rendered, GeneratorConfig, OutputFile};
use serde_json::Value;

/// `Item { id: integer, name: string }` and an `items` service exposing `GET /items/{id}`.
pub fn item_design() -> DesignRoot {
    DesignRoot::new(Api::new("store", "1.0"))
        .with_type(item_type())
        .with_service(
            Service::new("items").endpoint(
                Endpoint::new("show")
                    .payload(Attribute::user("ItemID"))
                    .result(Attribute::user("Item"))
                    .route(Method::GET, "/items/{id}"),
            ),
        )
        .with_type(UserType::new("ItemID").required_field("id", Attribute::int()))
}

/// `Item` with a `tiny` view exposing only `id`.
pub fn item_type() -> UserType {
    UserType::new("Item")
        .with_description("A stored item")
        .required_field("id", Attribute::int())
        .required_field("name", Attribute::string())
        .view("default", ["id", "name"])
        .view("tiny", ["id"])
}

/// A design exercising string, integer and array validations.
pub fn validations_design() -> DesignRoot {
    let account = UserType::new("Account")
        .required_field(
            "login",
            Attribute::string().with_validation(
                Validation::new()
                    .with_min_length(3)
                    .with_max_length(16)
                    .with_pattern("^[a-z]+$"),
            ),
        )
        .field(
            "age",
            Attribute::int().with_validation(
                Validation::new()
                    .with_minimum(Bound::inclusive(18))
                    .with_maximum(Bound::exclusive(130)),
            ),
        )
        .field(
            "roles",
            Attribute::array_of(
                Attribute::string().with_validation(
                    Validation::new().with_enum(vec!["admin".into(), "user".into()]),
                ),
            )
            .with_validation(Validation::new().with_min_length(1).with_max_length(3)),
        );
    DesignRoot::new(Api::new("accounts", "1.0"))
        .with_type(account)
        .with_service(
            Service::new("accounts").endpoint(
                Endpoint::new("create")
                    .payload(Attribute::user("Account"))
                    .result(Attribute::user("Account"))
                    .route(Method::POST, "/accounts")
                    .body(oas2_gen::design::BodyBinding::Remaining)
                    .status(201)
                    .error(ErrorDef::new("bad_request", 400).with_description("Invalid account")),
            ),
        )
}

/// Adds a server with URL variables to a design.
pub fn with_server(mut root: DesignRoot, url: &str, vars: &[(&str, &str)]) -> DesignRoot {
    let server = vars
        .iter()
        .fold(Server::new("main", url), |s, (k, v)| s.with_variable(*k, *v));
    root.api = root.api.with_server(server);
    root
}

/// Generates the output files of `root` with the default configuration.
pub fn files(root: &DesignRoot) -> Vec<OutputFile> {
    generate(root, &GeneratorConfig::default()).expect("generation should succeed")
}

/// The JSON document rendered at `path`.
pub fn rendered_json(root: &DesignRoot, path: &str) -> Value {
    let rendered = generate_rendered(root, &GeneratorConfig::default())
        .expect("rendering should succeed");
    let file = rendered
        .iter()
        .find(|f| f.path == path)
        .unwrap_or_else(|| panic!("no file rendered at {}", path));
    serde_json::from_str(&file.content).expect("rendered JSON should parse")
}

/// The base JSON document of `root`.
pub fn openapi_json(root: &DesignRoot) -> Value {
    rendered_json(root, "gen/http/openapi.json")
}
