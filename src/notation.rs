//! Documentation directives and canonical JSON rendering.

use serde::Serialize;
use serde_json::Value;

/// One rendered documentation directive plus optional indented body.
///
/// Renders as a blank-line-separated `@tag arg arg ...` line; body entries
/// (which may span multiple lines) follow indented by four spaces, with
/// trailing whitespace stripped from every line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notation {
    pub tag: String,
    pub args: Vec<String>,
    pub lines: Vec<String>,
}

impl Notation {
    pub fn new<I, S>(tag: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Notation {
            tag: tag.into(),
            args: args.into_iter().map(Into::into).collect(),
            lines: Vec::new(),
        }
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Display for Notation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut head = format!("@{}", self.tag);
        for arg in &self.args {
            head.push(' ');
            head.push_str(arg);
        }
        write!(f, "\n{}", head.trim_end())?;
        for entry in &self.lines {
            for line in entry.lines() {
                let indented = format!("    {}", line);
                write!(f, "\n{}", indented.trim_end())?;
            }
        }
        writeln!(f)
    }
}

/// Render a sequence of notations as one text block, directives separated by
/// blank lines, without leading/trailing blank lines.
pub fn render_block(notations: &[Notation]) -> String {
    let mut out = String::new();
    for notation in notations {
        out.push_str(&notation.to_string());
    }
    let trimmed: Vec<&str> = out.lines().map(str::trim_end).collect();
    trimmed.join("\n").trim_matches('\n').to_string()
}

/// Rebuild a JSON value with all object keys in ascending order, recursively.
///
/// `serde_json` is built with `preserve_order`, so sorting has to be done
/// explicitly before serializing.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(k, _)| k.as_str());
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Compact canonical encoding: no whitespace, keys sorted ascending.
///
/// Used for inline default values in field-name declarations.
pub fn to_compact_string(value: &Value) -> String {
    serde_json::to_string(&sort_keys(value)).expect("serializing a JSON value cannot fail")
}

/// Pretty canonical encoding: 4-space indentation, keys sorted ascending.
///
/// Used for example bodies.
pub fn to_pretty_string(value: &Value) -> String {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    sort_keys(value)
        .serialize(&mut ser)
        .expect("serializing a JSON value cannot fail");
    String::from_utf8(buf).expect("serde_json emits valid UTF-8")
}

/// Request example body under an `apiParamExample` directive.
pub fn request_example(value: &Value) -> Notation {
    Notation::new("apiParamExample", ["{json}", "Request-Example:"])
        .with_lines([to_pretty_string(value)])
}

/// Success response example under an `apiSuccessExample` directive, with the
/// status line above the body.
pub fn response_example(value: &Value) -> Notation {
    Notation::new("apiSuccessExample", ["{json}", "Success-Response:"])
        .with_lines(["HTTP/1.1 200 OK".to_string(), to_pretty_string(value)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn directive_line_renders_args() {
        let n = Notation::new("apiVersion", ["0.0.1"]);
        assert_eq!(n.to_string(), "\n@apiVersion 0.0.1\n");
    }

    #[test]
    fn body_lines_indented_four_spaces() {
        let n = Notation::new("apiSuccessExample", ["{json}", "Success-Response:"])
            .with_lines(["HTTP/1.1 200 OK", "\"Foobar\""]);
        assert_eq!(
            n.to_string(),
            "\n@apiSuccessExample {json} Success-Response:\n    HTTP/1.1 200 OK\n    \"Foobar\"\n"
        );
    }

    #[test]
    fn render_block_separates_with_blank_lines() {
        let block = render_block(&[
            Notation::new("apiSuccess", ["{Integer}", "[age]"]),
            Notation::new("apiSuccess", ["{String}", "[name]"]),
        ]);
        assert_eq!(
            block,
            "@apiSuccess {Integer} [age]\n\n@apiSuccess {String} [name]"
        );
    }

    #[test]
    fn compact_encoding_sorts_keys() {
        let value = json!({"b": 1, "a": {"d": 2, "c": 3}});
        assert_eq!(to_compact_string(&value), r#"{"a":{"c":3,"d":2},"b":1}"#);
    }

    #[test]
    fn pretty_encoding_uses_four_space_indent() {
        let value = json!({"name": "Paulo", "address": {"country": "Brazil"}});
        assert_eq!(
            to_pretty_string(&value),
            "{\n    \"address\": {\n        \"country\": \"Brazil\"\n    },\n    \"name\": \"Paulo\"\n}"
        );
    }

    #[test]
    fn response_example_carries_status_line() {
        let n = response_example(&json!("Foobar"));
        assert_eq!(
            render_block(std::slice::from_ref(&n)),
            "@apiSuccessExample {json} Success-Response:\n    HTTP/1.1 200 OK\n    \"Foobar\""
        );
    }

    #[test]
    fn request_example_has_no_status_line() {
        let n = request_example(&json!({"published": true}));
        assert!(!n.to_string().contains("HTTP/1.1"));
    }
}
