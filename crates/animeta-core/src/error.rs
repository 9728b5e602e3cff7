use std::fmt;
use std::path::PathBuf;

use serde_path_to_error::Segment;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnimetaError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("config error: {0}")]
    Config(String),

    #[error("no usable title for {catalog} series {series_id}")]
    NoUsableTitle { catalog: String, series_id: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fetched or cached catalog document that could not be decoded.
#[derive(Debug, Clone, Error)]
#[error("failed to parse `{field}` in {}: {message}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    pub field: String,
    pub message: String,
}

impl ParseError {
    pub fn new(
        path: impl Into<PathBuf>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build from a decoder error that tracked where in the document it
    /// failed. Missing fields are named by the message; anything else by the
    /// innermost key on the path.
    pub fn from_tracked<E: fmt::Display>(
        path: impl Into<PathBuf>,
        err: serde_path_to_error::Error<E>,
    ) -> Self {
        let message = err.inner().to_string();
        let named = message
            .starts_with("missing field")
            .then(|| field_from_message(&message))
            .flatten()
            .map(str::to_string);
        let field = named
            .or_else(|| innermost_key(err.path()))
            .or_else(|| field_from_message(&message).map(str::to_string))
            .unwrap_or_else(|| "<document>".to_string());
        Self::new(path, field, message)
    }
}

fn innermost_key(path: &serde_path_to_error::Path) -> Option<String> {
    path.iter().rev().find_map(|segment| match segment {
        Segment::Map { key } => Some(key.clone()),
        _ => None,
    })
}

fn field_from_message(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    let field = &message[start..start + len];
    (!field.is_empty()).then_some(field)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Seiyuu {
        #[serde(rename = "ID")]
        #[allow(dead_code)]
        id: u64,
    }

    fn decode(json: &str) -> ParseError {
        let de = &mut serde_json::Deserializer::from_str(json);
        let err = serde_path_to_error::deserialize::<_, Seiyuu>(de).unwrap_err();
        ParseError::from_tracked("anidb/seiyuu.json", err)
    }

    #[test]
    fn test_missing_field_named_from_message() {
        let err = decode("{}");
        assert_eq!(err.field, "ID");
        assert_eq!(err.path, PathBuf::from("anidb/seiyuu.json"));
    }

    #[test]
    fn test_bad_value_named_from_path() {
        let err = decode(r#"{"ID": "abc"}"#);
        assert_eq!(err.field, "ID");
    }

    #[test]
    fn test_falls_back_to_document_marker() {
        let err = decode("{");
        assert_eq!(err.field, "<document>");
        assert!(err.to_string().contains("anidb/seiyuu.json"));
    }
}
