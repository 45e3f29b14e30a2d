#![deny(missing_docs)]

//! # Swagger Compilation
//!
//! - **models**: the serializable Swagger 2.0 object model.
//! - **registry**: per-run `definitions` table with naming and deduplication.
//! - **schemas**: design attributes to schemas.
//! - **paths**: route patterns to path templates, bindings to parameters.
//! - **operations**: endpoints to operations and responses.
//! - **security**: security schemes and requirements.
//! - **extensions**: `x-*` vendor extensions from design metadata.
//! - **document**: one document per API version.
//! - **validation**: post-conditions on emitted documents.

pub mod document;
pub mod extensions;
pub mod models;
pub mod operations;
pub mod paths;
pub mod registry;
pub mod schemas;
pub mod security;
pub mod validation;

pub use document::{assemble, AssembledDocument};
pub use models::{Document, Schema};
pub use registry::DefinitionRegistry;
pub use schemas::SchemaBuilder;
pub use validation::{check_integrity, validate_swagger};
