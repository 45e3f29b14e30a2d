#![deny(missing_docs)]

//! # Generator Configuration
//!
//! Knobs the embedding system can tune without touching the design: where files land,
//! which serializations are produced, default media types and the naming suffix limit.

use crate::error::AppResult;
use serde::{Deserialize, Serialize};

/// Serialization format of one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Compact JSON. JSON outputs are validated after rendering.
    Json,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// File extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    /// Name of the template helper that serializes section data in this format.
    pub fn helper_name(&self) -> &'static str {
        match self {
            OutputFormat::Json => "toJSON",
            OutputFormat::Yaml => "toYAML",
        }
    }
}

/// Configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory (relative to the generation root) the documents are written to.
    pub output_dir: String,
    /// File stem of the base document; other versions append `_{version}`.
    pub file_stem: String,
    /// Output formats; one file is produced per format and document.
    pub formats: Vec<OutputFormat>,
    /// Document-level `consumes` media types.
    pub consumes: Vec<String>,
    /// Document-level `produces` media types.
    pub produces: Vec<String>,
    /// Highest numeric suffix tried when disambiguating definition names.
    pub max_name_suffix: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let media = vec![
            "application/json".to_string(),
            "application/xml".to_string(),
            "application/gob".to_string(),
        ];
        Self {
            output_dir: "gen/http".to_string(),
            file_stem: "openapi".to_string(),
            formats: vec![OutputFormat::Json, OutputFormat::Yaml],
            consumes: media.clone(),
            produces: media,
            max_name_suffix: 1000,
        }
    }
}

impl GeneratorConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from YAML; missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a configuration from JSON; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the base file stem.
    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }

    /// Replaces the output formats.
    pub fn with_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.formats = formats;
        self
    }

    /// Replaces the document-level `consumes` list.
    pub fn with_consumes(mut self, consumes: Vec<String>) -> Self {
        self.consumes = consumes;
        self
    }

    /// Replaces the document-level `produces` list.
    pub fn with_produces(mut self, produces: Vec<String>) -> Self {
        self.produces = produces;
        self
    }

    /// Sets the disambiguation suffix limit.
    pub fn with_max_name_suffix(mut self, max: usize) -> Self {
        self.max_name_suffix = max;
        self
    }
}
