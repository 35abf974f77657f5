//! Error types for schema resolution, validation and the call pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by caller-supplied helpers, callbacks and handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors during dynamic schema resolution.
///
/// Both variants are transparent over the source raised by the
/// caller-supplied callable: the pipeline does not interpret or wrap it,
/// leaving classification to the caller.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Helper(BoxError),

    #[error(transparent)]
    Callback(BoxError),
}

/// Errors during payload validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The declared schema is not itself a valid JSON Schema. This is a
    /// defect in the operation declaration, not in the payload.
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Failure kinds of one pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input is malformed; could not decode JSON object")]
    MalformedInput,

    #[error("input validation failed: {0}")]
    InputValidation(ValidateError),

    #[error("resource not found")]
    NotFound,

    /// The handler produced data inconsistent with its own declared output
    /// schema. The detail is logged server-side and never sent to the caller.
    #[error("handler output violates its declared schema")]
    OutputContract { detail: String },

    /// The operation's declared schema is not a valid JSON Schema.
    #[error("operation declares an invalid schema: {message}")]
    BadSchema { message: String },

    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error(transparent)]
    Handler(BoxError),
}

impl PipelineError {
    /// Returns the HTTP status class for this failure.
    pub fn http_status(&self) -> u16 {
        match self {
            PipelineError::MalformedInput | PipelineError::InputValidation(_) => 400,
            PipelineError::NotFound => 404,
            PipelineError::OutputContract { .. }
            | PipelineError::BadSchema { .. }
            | PipelineError::Resolution(_)
            | PipelineError::Handler(_) => 500,
        }
    }
}

/// Errors from the documentation compiler.
#[derive(Debug, Error)]
pub enum DocError {
    /// A schema fragment reached the compiler without a `type` key. This is
    /// a defect in the schema declaration and must not silently produce a
    /// malformed notation.
    #[error("schema fragment at \"{path}\" has no \"type\" key")]
    MissingType { path: String },
}

/// Errors loading JSON documents from disk (CLI and tests).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}
