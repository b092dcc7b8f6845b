//! Error type shared by every decoder in the crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DleError {
    /// The markup handed to a decoder was empty or contained no element.
    #[error("No HTML has been set.")]
    EmptyInput,

    /// The expected container, tag or class marker is absent.
    #[error("Unexpected markup structure: {0}")]
    Structure(String),

    /// A required attribute is missing (or empty) on an element.
    #[error("Element <{element}> is missing the '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A classifier was evaluated on a definition without a grammatical category.
    #[error("The definition has no grammatical category")]
    MissingCategory,

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "fetch")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DleError {
    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        DleError::Structure(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DleError>;
