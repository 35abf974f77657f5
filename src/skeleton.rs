//! Per-operation documentation artifact assembly.
//!
//! Combines an operation's identity line, schema notations and example
//! bodies into the ordered text block the external apidoc renderer consumes,
//! plus the shared error-definition blocks emitted once per generation run.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::apidoc::compile;
use crate::error::DocError;
use crate::notation::{render_block, request_example, response_example, to_pretty_string, Notation};
use crate::pipeline::Operation;

/// Project-level metadata for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApidocConfig {
    pub name: String,
    pub title: String,
    pub version: String,
}

impl Default for ApidocConfig {
    fn default() -> Self {
        ApidocConfig {
            name: "My project".to_string(),
            title: "My JSend based project".to_string(),
            version: "0.0.1".to_string(),
        }
    }
}

/// Assemble the documentation text block for one operation.
///
/// Block order: `@api` identity line, `@apiVersion`, `@apiName`, `@apiGroup`
/// (suppressed when the description already carries one), input `apiParam`
/// notations with the shared validation-error reference, input example,
/// output `apiSuccess` notations over the envelope wrapper, output example,
/// the shared internal-error reference, then pass-through `@api*` lines from
/// the description.
pub fn operation_block(op: &Operation, config: &ApidocConfig) -> Result<String, DocError> {
    let span = tracing::info_span!("operation_doc", verb = %op.verb, url = %op.url);
    let _guard = span.enter();

    let mut desc_lines = op.description.lines().map(str::trim);
    let summary = desc_lines.next().unwrap_or("");
    let extra: Vec<&str> = desc_lines.filter(|l| l.starts_with("@api")).collect();
    let has_group = extra.iter().any(|l| l.starts_with("@apiGroup"));

    let mut notations = vec![
        Notation::new(
            "api",
            [
                format!("{{{}}}", op.verb),
                op.url.clone(),
                summary.to_string(),
            ],
        ),
        Notation::new("apiVersion", [config.version.clone()]),
        Notation::new(
            "apiName",
            [format!("{}{}", op.verb.as_str().to_uppercase(), op.name)],
        ),
    ];
    if !has_group {
        notations.push(Notation::new("apiGroup", [op.name.clone()]));
    }

    if op.has_input_schema() {
        // Dynamic input schemas have no request-independent form to document;
        // the validation-error reference still applies.
        if let Some(input_schema) = op.static_input_schema() {
            notations.extend(compile(input_schema, "apiParam", &[])?);
        }
        notations.push(Notation::new("apiUse", ["SchemaValidationError"]));
    }
    if let Some(example) = &op.input_example {
        notations.push(request_example(example));
    }

    if let Some(output_schema) = &op.output_schema {
        let wrapper = json!({
            "type": "object",
            "properties": {
                "data": output_schema,
                "status": {
                    "description": "Returns 'success', 'fail' or 'error'.",
                    "type": "string",
                    "enum": ["fail", "success", "error"]
                }
            },
            "required": ["data", "status"]
        });
        notations.extend(compile(&wrapper, "apiSuccess", &[])?);
    }
    if let Some(example) = &op.output_example {
        notations.push(response_example(&json!({
            "data": example,
            "status": "success"
        })));
    }

    notations.push(Notation::new("apiUse", ["InternalServerError"]));

    let mut block = render_block(&notations);
    for line in extra {
        block.push_str("\n\n");
        block.push_str(line);
    }
    tracing::info!(verb = %op.verb, url = %op.url, "generated documentation block");
    Ok(block)
}

/// Shared error-definition blocks, emitted once per generation run.
pub fn shared_definitions() -> String {
    let notations = [
        Notation::new("apiDefine", ["SchemaValidationError"]),
        Notation::new(
            "apiError",
            ["SchemaValidationError", "One schema field did not validate"],
        ),
        Notation::new("apiErrorExample", ["{json}", "SchemaValidationError-Response:"])
            .with_lines([
                "HTTP/1.1 400 Bad Request".to_string(),
                to_pretty_string(&json!({
                    "data": "TRACEBACK FROM SERVER",
                    "status": "fail"
                })),
            ]),
        Notation::new("apiDefine", ["InternalServerError"]),
        Notation::new(
            "apiError",
            [
                "(Error 5xx) InternalServerError",
                "Return data for any internal server error",
            ],
        ),
        Notation::new("apiErrorExample", ["{json}", "InternalServerError-Response:"])
            .with_lines([
                "HTTP/1.1 500 Internal Server Error".to_string(),
                to_pretty_string(&json!({
                    "status": "error",
                    "code": 500,
                    "message": "Internal Server Error"
                })),
            ]),
    ];
    render_block(&notations)
}

/// Content of the `apidoc.json` project manifest.
pub fn project_manifest(config: &ApidocConfig) -> String {
    to_pretty_string(&json!({
        "name": config.name,
        "title": config.title,
        "version": config.version
    }))
}

/// File-name-safe slug for an operation URL.
pub fn slugify(url: &str) -> String {
    let mut slug = String::with_capacity(url.len());
    for c in url.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

/// Artifact file name for one operation's block.
pub fn artifact_file_name(op: &Operation) -> String {
    format!("{}_{}.txt", slugify(&op.url), op.name.to_lowercase())
}
