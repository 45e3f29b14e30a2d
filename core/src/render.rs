#![deny(missing_docs)]

//! # Render Hand-off
//!
//! Packages assembled documents as template sections and renders them to bytes.
//!
//! A [`Section`] carries a template source, the data bound into it and the helper
//! functions the template may call. The core only ever emits `{{ toJSON . }}` and
//! `{{ toYAML . }}` sections; any [`Renderer`] able to evaluate those can be plugged in.
//! [`HelperRenderer`] is the built-in one.

use crate::config::{GeneratorConfig, OutputFormat};
use crate::error::{AppError, AppResult};
use crate::oas::document::AssembledDocument;
use crate::oas::validation::validate_swagger;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// A template helper: serializes bound data to text.
pub type Helper = fn(&Value) -> AppResult<String>;

/// Name of the section holding a document.
pub const DOCUMENT_SECTION: &str = "openapi";

/// One template invocation.
#[derive(Clone)]
pub struct Section {
    /// Section name.
    pub name: String,
    /// Template source.
    pub source: String,
    /// Data bound to `.` in the template.
    pub data: Value,
    /// Helpers available to the template by name.
    pub helpers: BTreeMap<String, Helper>,
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("data", &self.data)
            .field("helpers", &self.helpers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A file to be produced, made of sections rendered in order.
#[derive(Debug, Clone)]
pub struct OutputFile {
    /// Path relative to the generation root, e.g. `gen/http/openapi.json`.
    pub path: String,
    /// Serialization format.
    pub format: OutputFormat,
    /// Sections in output order.
    pub sections: Vec<Section>,
}

/// A rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path relative to the generation root.
    pub path: String,
    /// UTF-8 content.
    pub content: String,
}

/// Serializes data as compact JSON.
pub fn to_json(data: &Value) -> AppResult<String> {
    Ok(serde_json::to_string(data)?)
}

/// Serializes data as YAML.
pub fn to_yaml(data: &Value) -> AppResult<String> {
    Ok(serde_yaml::to_string(data)?)
}

/// Helpers registered on every document section.
pub fn default_helpers() -> BTreeMap<String, Helper> {
    let mut helpers: BTreeMap<String, Helper> = BTreeMap::new();
    helpers.insert(OutputFormat::Json.helper_name().to_string(), to_json);
    helpers.insert(OutputFormat::Yaml.helper_name().to_string(), to_yaml);
    helpers
}

/// Builds one output file per document and configured format.
pub fn output_files(
    documents: &[AssembledDocument],
    config: &GeneratorConfig,
) -> AppResult<Vec<OutputFile>> {
    let dir = config.output_dir.trim_end_matches('/');
    let mut files = Vec::with_capacity(documents.len() * config.formats.len());
    for assembled in documents {
        let data = serde_json::to_value(&assembled.document)
            .map_err(|e| AppError::from(e).in_document(&assembled.name))?;
        for format in &config.formats {
            let file_name = format!("{}.{}", assembled.name, format.extension());
            let path = if dir.is_empty() {
                file_name
            } else {
                format!("{}/{}", dir, file_name)
            };
            files.push(OutputFile {
                path,
                format: *format,
                sections: vec![Section {
                    name: DOCUMENT_SECTION.to_string(),
                    source: format!("{{{{ {} . }}}}", format.helper_name()),
                    data: data.clone(),
                    helpers: default_helpers(),
                }],
            });
        }
    }
    Ok(files)
}

/// The render collaborator: turns a section into text.
pub trait Renderer {
    /// Renders one section.
    fn render(&self, section: &Section) -> AppResult<String>;
}

/// Renders templates of the form `{{ helper . }}` by calling the named helper on the
/// section data.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelperRenderer;

impl Renderer for HelperRenderer {
    fn render(&self, section: &Section) -> AppResult<String> {
        static CALL_RE: OnceLock<Regex> = OnceLock::new();
        let call_re = CALL_RE.get_or_init(|| {
            Regex::new(r"^\s*\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s+\.\s*\}\}\s*$")
                .expect("Invalid regex")
        });

        let name = call_re
            .captures(&section.source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| {
                AppError::render(
                    &section.name,
                    format!("unsupported template '{}'", section.source),
                )
            })?;
        let helper = section.helpers.get(name).ok_or_else(|| {
            AppError::render(&section.name, format!("unknown helper '{}'", name))
        })?;
        helper(&section.data).map_err(|e| AppError::render(&section.name, e.to_string()))
    }
}

/// Renders every file; a failing file does not stop the others.
///
/// `.json` outputs are parsed back and checked with [`validate_swagger`].
pub fn render_files(files: &[OutputFile], renderer: &dyn Renderer) -> Vec<AppResult<RenderedFile>> {
    files
        .iter()
        .map(|file| render_file(file, renderer).map_err(|e| e.in_document(&file.path)))
        .collect()
}

fn render_file(file: &OutputFile, renderer: &dyn Renderer) -> AppResult<RenderedFile> {
    let mut content = String::new();
    for section in &file.sections {
        content.push_str(&renderer.render(section)?);
    }
    if file.path.ends_with(".json") {
        validate_swagger(content.as_bytes())?;
    }
    debug!(path = %file.path, bytes = content.len(), "rendered");
    Ok(RenderedFile {
        path: file.path.clone(),
        content,
    })
}
