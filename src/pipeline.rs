//! Call-time validation pipeline.
//!
//! One [`Operation`] per registered `(verb, url)` pair, carrying its schemas,
//! examples and handler. [`dispatch`] runs a single call through
//! receive → resolve → validate input → invoke → validate output → emit,
//! producing a success [`Envelope`] or a [`PipelineError`]; [`respond`]
//! additionally converts failures into leak-safe envelopes.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{BoxError, PipelineError, ValidateError};
use crate::schema::Schema;
use crate::types::{RequestContext, Verb};
use crate::validator::{validate_against_schema, validate_output};

/// Handler invoked with the validated input attached to the call context.
pub type HandlerFn = Box<dyn Fn(&RequestContext) -> Result<Value, BoxError> + Send + Sync>;

/// Input schema as declared, split at registration time so the pipeline
/// knows whether per-request resolution is needed.
#[derive(Debug, Clone)]
enum DeclaredInput {
    Static(Value),
    Dynamic(Schema),
}

/// One registered handler operation. Registered once at startup, read-only
/// thereafter.
pub struct Operation {
    pub verb: Verb,
    pub url: String,
    /// Handler name, also the documentation group.
    pub name: String,
    /// Free-text description. First line is the summary; later lines
    /// starting with `@api` pass through to the documentation artifact.
    pub description: String,
    pub output_schema: Option<Value>,
    pub input_example: Option<Value>,
    pub output_example: Option<Value>,
    /// Treat a falsy handler result as a missing resource.
    pub on_empty_404: bool,
    input: Option<DeclaredInput>,
    handler: HandlerFn,
}

impl Operation {
    pub fn new(
        verb: Verb,
        url: impl Into<String>,
        name: impl Into<String>,
        handler: impl Fn(&RequestContext) -> Result<Value, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Operation {
            verb,
            url: url.into(),
            name: name.into(),
            description: String::new(),
            output_schema: None,
            input_example: None,
            output_example: None,
            on_empty_404: false,
            input: None,
            handler: Box::new(handler),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Declare the input schema. Whether the tree contains any deferred node
    /// is detected here, once, so `dispatch` only resolves when it must.
    pub fn input_schema(mut self, schema: impl Into<Schema>) -> Self {
        let schema = schema.into();
        self.input = Some(match schema.to_static() {
            Some(value) => DeclaredInput::Static(value),
            None => DeclaredInput::Dynamic(schema),
        });
        self
    }

    pub fn output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn input_example(mut self, example: Value) -> Self {
        self.input_example = Some(example);
        self
    }

    pub fn output_example(mut self, example: Value) -> Self {
        self.output_example = Some(example);
        self
    }

    pub fn on_empty_404(mut self, enabled: bool) -> Self {
        self.on_empty_404 = enabled;
        self
    }

    pub fn has_input_schema(&self) -> bool {
        self.input.is_some()
    }

    /// True if the input schema needs per-request resolution.
    pub fn input_is_dynamic(&self) -> bool {
        matches!(self.input, Some(DeclaredInput::Dynamic(_)))
    }

    /// The declared input schema when it is fully static. Dynamic schemas
    /// have no request-independent form and return `None`.
    pub fn static_input_schema(&self) -> Option<&Value> {
        match &self.input {
            Some(DeclaredInput::Static(value)) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("verb", &self.verb)
            .field("url", &self.url)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Read-only operation registry, iterated in `(verb, url)` order.
#[derive(Debug, Default)]
pub struct Registry {
    ops: BTreeMap<(Verb, String), Operation>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation. A later registration for the same
    /// `(verb, url)` replaces the earlier one.
    pub fn register(&mut self, op: Operation) {
        self.ops.insert((op.verb, op.url.clone()), op);
    }

    pub fn get(&self, verb: Verb, url: &str) -> Option<&Operation> {
        self.ops.get(&(verb, url.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.ops.values()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Standard envelope returned to callers. Field names are a client contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Success { data: Value },
    Fail { data: Value },
    Error { code: u16, message: String },
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Envelope::Success { data }
    }

    /// Leak-safe envelope for a failed call. Client mistakes carry the
    /// violation detail; server-side defects carry a fixed message only.
    pub fn for_error(err: &PipelineError) -> Self {
        match err {
            PipelineError::MalformedInput => Envelope::Fail {
                data: Value::String(err.to_string()),
            },
            PipelineError::InputValidation(detail) => Envelope::Fail {
                data: Value::String(describe_validation(detail)),
            },
            PipelineError::NotFound => Envelope::Error {
                code: 404,
                message: "Resource not found.".to_string(),
            },
            PipelineError::OutputContract { .. }
            | PipelineError::BadSchema { .. }
            | PipelineError::Resolution(_)
            | PipelineError::Handler(_) => Envelope::Error {
                code: 500,
                message: "Internal Server Error".to_string(),
            },
        }
    }
}

fn describe_validation(err: &ValidateError) -> String {
    match err {
        ValidateError::Invalid { errors } => errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Run one call through the pipeline.
///
/// Exactly one body read, zero or one handler invocation, and nothing is
/// emitted on the error path, so an abandoned call observes no partial write.
///
/// # Errors
///
/// See [`PipelineError`] for the failure taxonomy. Helper, callback and
/// handler errors propagate unchanged.
pub fn dispatch(op: &Operation, mut ctx: RequestContext) -> Result<Envelope, PipelineError> {
    tracing::debug!(verb = %op.verb, url = %op.url, "dispatching");

    let input = match &op.input {
        None => None,
        Some(declared) => {
            let text = std::str::from_utf8(&ctx.raw_body)
                .map_err(|_| PipelineError::MalformedInput)?;
            let parsed: Value =
                serde_json::from_str(text).map_err(|_| PipelineError::MalformedInput)?;

            let resolved;
            let schema = match declared {
                DeclaredInput::Static(value) => value,
                DeclaredInput::Dynamic(schema) => {
                    tracing::debug!(verb = %op.verb, url = %op.url, "resolving dynamic input schema");
                    resolved = schema.resolve(&ctx)?;
                    &resolved
                }
            };

            match validate_against_schema(schema, &parsed) {
                Ok(()) => {}
                Err(err @ ValidateError::Invalid { .. }) => {
                    return Err(PipelineError::InputValidation(err));
                }
                Err(ValidateError::InvalidSchema { message }) => {
                    return Err(PipelineError::BadSchema { message });
                }
            }
            Some(parsed)
        }
    };

    ctx.body = input;
    let output = (op.handler)(&ctx).map_err(PipelineError::Handler)?;

    if op.on_empty_404 && is_empty_result(&output) {
        return Err(PipelineError::NotFound);
    }

    if let Some(out_schema) = &op.output_schema {
        match validate_output(out_schema, &output) {
            Ok(()) => {}
            Err(ValidateError::Invalid { errors }) => {
                let detail = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n");
                tracing::error!(
                    verb = %op.verb,
                    url = %op.url,
                    %detail,
                    "handler output violates its declared schema"
                );
                return Err(PipelineError::OutputContract { detail });
            }
            Err(ValidateError::InvalidSchema { message }) => {
                return Err(PipelineError::BadSchema { message });
            }
        }
    }

    Ok(Envelope::success(output))
}

/// Run one call and convert any failure into its status code and leak-safe
/// envelope.
pub fn respond(op: &Operation, ctx: RequestContext) -> (u16, Envelope) {
    match dispatch(op, ctx) {
        Ok(envelope) => (200, envelope),
        Err(err) => {
            tracing::debug!(status = err.http_status(), error = %err, "call failed");
            (err.http_status(), Envelope::for_error(&err))
        }
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are empty.
fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
