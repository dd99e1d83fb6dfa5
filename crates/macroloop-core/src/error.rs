//! Structured errors, serializable for `--json` output

use serde::{Deserialize, Serialize};
use std::path::Path;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{code:?}] {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MacroNotFound,
    MissingFile,
    InvalidRegion,
    InvalidFormat,
    Io,
    ImageCodec,
    InputFailed,
    CaptureFailed,
    ListenerFailed,
    NotImplemented,
    Unknown,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            context: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn macro_not_found(dir: &Path) -> Self {
        Self::new(
            ErrorCode::MacroNotFound,
            format!("No macro directory at {}", dir.display()),
        )
        .with_suggestions(vec![
            "Record a new macro with `ml record <DIR>`".to_string(),
            "List existing macros with `ml list`".to_string(),
        ])
    }

    pub fn missing_file(path: &Path) -> Self {
        Self::new(
            ErrorCode::MissingFile,
            format!("Missing macro file: {}", path.display()),
        )
    }

    pub fn invalid_region(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRegion, reason)
    }

    /// Parse failure; `line` is 1-based.
    pub fn invalid_format(line: usize, text: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("line {}: {} ({:?})", line, reason, text),
        )
        .with_context(serde_json::json!({ "line": line, "text": text }))
    }

    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, format!("{}: {}", path.display(), err))
    }

    pub fn input_failed(action: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::InputFailed, format!("{} failed: {}", action, reason))
    }

    pub fn capture_failed(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::CaptureFailed, reason)
    }

    pub fn listener_failed(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::ListenerFailed, reason)
    }

    pub fn not_implemented(what: &str) -> Self {
        Self::new(
            ErrorCode::NotImplemented,
            format!("{} is not supported on this platform yet", what),
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, e.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => io.into(),
            other => Self::new(ErrorCode::ImageCodec, other.to_string()),
        }
    }
}
