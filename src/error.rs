//! Error type for the front ends.
//!
//! A layout pass itself never fails. Errors only come from turning input
//! into a [`Document`](crate::model::Document): JSON decoding, markup
//! loading, and the CLI's file handling.

use thiserror::Error;

/// The unified error type returned by the fallible public functions.
#[derive(Debug, Error)]
pub enum VellumError {
    /// JSON input failed to parse as a document or options object.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// Markup was well-formed XML but not a usable document.
    #[error("Markup error: {0}")]
    Markup(String),

    /// Markup was not well-formed XML.
    #[error("Malformed markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The layout tree could not be serialized.
    #[error("Failed to write layout: {0}")]
    Output(#[source] serde_json::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for VellumError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the document schema. Check element kinds and property names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        VellumError::Parse { source: e, hint }
    }
}
