//! Core types shared across the pipeline and the documentation compiler.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP verbs an operation can be registered under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Verb {
    /// Returns the lowercase verb name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
            Verb::Head => "head",
            Verb::Options => "options",
        }
    }

    /// Parse a verb from a string, case-insensitive.
    ///
    /// Returns `None` for unknown verbs (caller should error).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "get" => Some(Verb::Get),
            "post" => Some(Verb::Post),
            "put" => Some(Verb::Put),
            "patch" => Some(Verb::Patch),
            "delete" => Some(Verb::Delete),
            "head" => Some(Verb::Head),
            "options" => Some(Verb::Options),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call request context handed to schema helpers, callbacks and handlers.
///
/// `body` is `None` until the pipeline has parsed and validated the input,
/// after which the handler sees the validated value.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub verb: Verb,
    pub url: String,
    pub raw_body: Vec<u8>,
    /// Parsed, schema-validated input body. Set by the pipeline before the
    /// handler runs; `None` when the operation declares no input schema.
    pub body: Option<Value>,
}

impl RequestContext {
    pub fn new(verb: Verb, url: impl Into<String>, raw_body: impl Into<Vec<u8>>) -> Self {
        Self {
            verb,
            url: url.into(),
            raw_body: raw_body.into(),
            body: None,
        }
    }
}

/// Effective type of a schema fragment.
///
/// A `type` given as a union list collapses to its first non-`"null"` member.
/// Returns `None` when the fragment has no usable `type` key.
pub fn effective_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(members) => members
            .iter()
            .filter_map(|m| m.as_str())
            .find(|s| *s != "null"),
        _ => None,
    }
}

/// Descend through nested `array` fragments to the innermost non-array item.
///
/// The single traversal shared by the type formatter, the array-suffix
/// calculator and the documentation compiler, so the three agree for
/// arbitrary nesting depth. A non-array fragment is returned as-is; an array
/// without `items` stops the descent.
pub fn innermost_item(schema: &Value) -> &Value {
    if effective_type(schema) == Some("array") {
        if let Some(items) = schema.get("items") {
            return innermost_item(items);
        }
    }
    schema
}

/// One `[]` token per array nesting level of the fragment.
pub fn array_suffix(schema: &Value) -> String {
    if effective_type(schema) == Some("array") {
        if let Some(items) = schema.get("items") {
            return format!("{}[]", array_suffix(items));
        }
    }
    String::new()
}
