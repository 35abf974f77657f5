//! JSend Schema
//!
//! Schema validation and apidoc generation for JSend API handlers.
//!
//! This library enforces and documents the contract between an API handler
//! and its callers, expressed as JSON Schema fragments attached to each
//! registered operation:
//!
//! - at call time, request bodies are validated against the operation's
//!   input schema (including schemas with per-request dynamic parts) and
//!   handler results against its output schema, producing a JSend envelope
//!   (`{"status": "success", "data": ...}`) or a leak-safe failure;
//! - at documentation time, every schema fragment compiles into a flat,
//!   ordered sequence of `@api*` directives with compact type signatures,
//!   optionality brackets and canonical JSON example bodies.
//!
//! # Example
//!
//! ```
//! use jsend_schema::{compile, dispatch, Envelope, Operation, RequestContext, Verb};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string", "minLength": 2, "maxLength": 40 }
//!     },
//!     "required": ["name"]
//! });
//!
//! // Documentation: one directive per field, sorted, typed, bracketed.
//! let notations = compile(&schema, "apiParam", &[]).unwrap();
//! assert_eq!(notations[0].args, vec!["{String{2..40}}", "name"]);
//!
//! // Validation: the same schema guards the handler at call time.
//! let op = Operation::new(Verb::Post, "/api/people", "PersonHandler", |ctx| {
//!     Ok(json!({ "created": ctx.body.clone() }))
//! })
//! .input_schema(schema);
//!
//! let ctx = RequestContext::new(Verb::Post, "/api/people", br#"{"name": "Ada"}"#.to_vec());
//! let envelope = dispatch(&op, ctx).unwrap();
//! assert!(matches!(envelope, Envelope::Success { .. }));
//! ```

mod apidoc;
mod error;
mod loader;
mod notation;
mod pipeline;
mod schema;
mod skeleton;
mod types;
mod validator;

pub use apidoc::{compile, format_field_name, format_type};
pub use error::{
    BoxError, DocError, LoadError, PipelineError, ResolveError, SchemaError, ValidateError,
};
pub use loader::{load_json, load_json_str};
pub use notation::{
    render_block, request_example, response_example, sort_keys, to_compact_string,
    to_pretty_string, Notation,
};
pub use pipeline::{dispatch, respond, Envelope, HandlerFn, Operation, Registry};
pub use schema::{resolve, Schema, SchemaCallback, SchemaHelper};
pub use skeleton::{
    artifact_file_name, operation_block, project_manifest, shared_definitions, slugify,
    ApidocConfig,
};
pub use types::{array_suffix, effective_type, innermost_item, RequestContext, Verb};
pub use validator::{validate_against_schema, validate_output};
