#![deny(missing_docs)]

//! # OAS2 Gen
//!
//! Compiles an API design graph into OpenAPI v2 (Swagger) documents.
//!
//! The flow is: [`assemble`] the design into one [`Document`] per API version, turn
//! those into [`OutputFile`]s of template [`Section`]s, and hand them to a
//! [`Renderer`] through [`render_files`].

/// Shared error types.
pub mod error;

/// Generator configuration.
pub mod config;

/// The design graph consumed by the compiler.
pub mod design;

/// Swagger 2.0 model, builders and validation.
pub mod oas;

/// Section hand-off and rendering.
pub mod render;

pub use config::{GeneratorConfig, OutputFormat};
pub use design::DesignRoot;
pub use error::{AppError, AppResult};
pub use oas::{
    assemble, check_integrity, validate_swagger, AssembledDocument, DefinitionRegistry, Document,
    Schema, SchemaBuilder,
};
pub use render::{
    output_files, render_files, HelperRenderer, OutputFile, RenderedFile, Renderer, Section,
};

/// Assembles every document of `root` and packages them as output files.
pub fn generate(root: &DesignRoot, config: &GeneratorConfig) -> AppResult<Vec<OutputFile>> {
    let documents = assemble(root, config)?;
    output_files(&documents, config)
}

/// Generates and renders every output file with the built-in renderer.
///
/// Fails on the first file that could not be rendered or validated.
pub fn generate_rendered(
    root: &DesignRoot,
    config: &GeneratorConfig,
) -> AppResult<Vec<RenderedFile>> {
    let files = generate(root, config)?;
    render_files(&files, &HelperRenderer).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{Api, Attribute, Endpoint, Service, UserType};
    use http::Method;

    #[test]
    fn test_generate_empty_design() {
        let root = DesignRoot::new(Api::new("empty", "1.0"));
        assert!(generate(&root, &GeneratorConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_generate_rendered_paths() {
        let root = DesignRoot::new(Api::new("store", "1.0"))
            .with_type(UserType::new("Item").required_field("id", Attribute::int()))
            .with_service(
                Service::new("items").endpoint(
                    Endpoint::new("list")
                        .result(Attribute::array_of(Attribute::user("Item")))
                        .route(Method::GET, "/items"),
                ),
            );
        let files = generate_rendered(&root, &GeneratorConfig::default()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["gen/http/openapi.json", "gen/http/openapi.yaml"]);
        assert!(files[1].content.starts_with("swagger: '2.0'\n"));
    }
}
