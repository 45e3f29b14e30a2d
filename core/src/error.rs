//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// The design graph is inconsistent (undeclared scheme, unknown type, unbound wildcard...).
    #[from(ignore)]
    #[display("Design Error in '{subject}': {message}")]
    Design {
        /// The offending identifier (endpoint, type, scheme).
        subject: String,
        /// What is wrong with it.
        message: String,
    },

    /// No unique definition name could be derived within the configured suffix limit.
    #[from(ignore)]
    #[display("Naming Error: no unique definition name left for '{_0}'")]
    NameExhausted(String),

    /// Template execution failed.
    #[from(ignore)]
    #[display("Render Error in '{subject}': {message}")]
    Render {
        /// The section or file being rendered.
        subject: String,
        /// The failure reason.
        message: String,
    },

    /// An emitted document failed a post-condition check.
    #[from(ignore)]
    #[display("Validation Error in '{subject}': {message}")]
    Validation {
        /// The offending document element.
        subject: String,
        /// The violated condition.
        message: String,
    },

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML (de)serialization errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// Attaches the name of the document being generated to an inner error.
    #[from(ignore)]
    #[display("Document '{document}': {source}")]
    Document {
        /// Document name (e.g. `openapi`, `openapi_v2`).
        document: String,
        /// The underlying failure.
        source: Box<AppError>,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Builds a design inconsistency error.
    pub fn design(subject: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Design {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Builds a post-condition validation error.
    pub fn validation(subject: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Builds a rendering error.
    pub fn render(subject: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Render {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Wraps the error with the name of the document it occurred in.
    ///
    /// Already wrapped errors are returned untouched so the innermost document wins.
    pub fn in_document(self, document: impl Into<String>) -> Self {
        match self {
            AppError::Document { .. } => self,
            other => AppError::Document {
                document: document.into(),
                source: Box::new(other),
            },
        }
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Json(e) => Some(e),
            AppError::Yaml(e) => Some(e),
            AppError::Document { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_json_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Json(_)));
    }

    #[test]
    fn test_design_display_names_subject() {
        let err = AppError::design("users.show", "unknown scheme 'jwt'");
        assert_eq!(
            err.to_string(),
            "Design Error in 'users.show': unknown scheme 'jwt'"
        );
    }

    #[test]
    fn test_in_document_wraps_once() {
        let err = AppError::NameExhausted("User".into())
            .in_document("openapi")
            .in_document("other");
        match &err {
            AppError::Document { document, source } => {
                assert_eq!(document, "openapi");
                assert!(matches!(source.as_ref(), AppError::NameExhausted(_)));
            }
            _ => panic!("expected document wrapper"),
        }
        assert!(err.to_string().starts_with("Document 'openapi': Naming Error"));
    }
}
