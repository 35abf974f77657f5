//! Payload validation against declared schemas.

use serde_json::{json, Value};

use crate::error::{SchemaError, ValidateError};

/// Validate a payload against a fully resolved schema.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the schema itself does not
/// compile, or `ValidateError::Invalid` with every violation collected.
pub fn validate_against_schema(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(payload)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

/// Validate a handler result against its declared output schema.
///
/// The result is wrapped as `{"result": <value>}` and validated against an
/// object wrapper so that top-level scalar and array results validate too.
pub fn validate_output(output_schema: &Value, output: &Value) -> Result<(), ValidateError> {
    let wrapper = json!({
        "type": "object",
        "properties": { "result": output_schema },
        "required": ["result"]
    });
    validate_against_schema(&wrapper, &json!({ "result": output }))
}
