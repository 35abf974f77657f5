//! Schema-to-documentation compiler.
//!
//! Maps schema fragments to compact type signatures and field-name
//! declarations, and walks object/array schemas into a flat, ordered
//! sequence of [`Notation`]s with dotted path prefixes for nesting.

use serde_json::Value;

use crate::error::DocError;
use crate::notation::{to_compact_string, Notation};
use crate::types::{array_suffix, effective_type, innermost_item};

/// Compact type signature for a schema fragment.
///
/// The base name is the capitalized innermost type, followed by one `[]`
/// token per array nesting level, a range clause derived from the innermost
/// leaf's bounds, and an enum clause.
///
/// # Errors
///
/// Returns `DocError::MissingType` when the fragment (or its innermost array
/// item) declares no `type`.
pub fn format_type(schema: &Value) -> Result<String, DocError> {
    let leaf = innermost_item(schema);
    let kind = effective_type(leaf).ok_or_else(|| DocError::MissingType {
        path: String::new(),
    })?;

    let mut out = capitalize(kind);
    out.push_str(&array_suffix(schema));
    out.push_str(&range_clause(leaf, kind));
    out.push_str(&enum_clause(leaf));
    Ok(out)
}

/// Field-name declaration: bracketed when optional, with its default value
/// appended in compact canonical JSON when one is declared.
pub fn format_field_name(
    schema: &Value,
    key: &str,
    path_key: Option<&str>,
    required: &[String],
) -> String {
    let name = path_key.unwrap_or(key);
    let not_required = !required.iter().any(|r| r == key);

    match schema.get("default") {
        Some(default) if not_required => format!("[{}={}]", name, to_compact_string(default)),
        _ if not_required => format!("[{}]", name),
        _ => name.to_string(),
    }
}

/// Compile an object/array schema into an ordered sequence of notations.
///
/// Properties iterate in ascending key order; each field's children follow
/// immediately after it, depth-first, with dotted path prefixes. Array roots
/// and array fields flatten to their innermost element schema for field
/// discovery, and an array-of-object's `required` list is read from the
/// innermost object itself. Non-object roots yield an empty sequence; an
/// object fragment without a `type` key is a declaration error.
pub fn compile(schema: &Value, tag: &str, path_prefix: &[String]) -> Result<Vec<Notation>, DocError> {
    if !schema.is_object() {
        return Ok(Vec::new());
    }
    let Some(kind) = effective_type(schema) else {
        return Err(DocError::MissingType {
            path: path_prefix.join("."),
        });
    };
    if kind != "object" && kind != "array" {
        return Ok(Vec::new());
    }

    let target = innermost_item(schema);
    if effective_type(target) != Some("object") {
        return Ok(Vec::new());
    }

    let required: Vec<String> = target
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let Some(props) = target.get("properties").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let mut entries: Vec<(&String, &Value)> = props.iter().collect();
    entries.sort_by_key(|(k, _)| k.as_str());

    let mut notations = Vec::new();
    for (key, field) in entries {
        let mut path = path_prefix.to_vec();
        path.push(key.clone());
        let path_key = path.join(".");

        let type_sig = format_type(field).map_err(|_| DocError::MissingType {
            path: path_key.clone(),
        })?;
        let field_kind = effective_type(field).unwrap_or("");

        let description = field
            .get("description")
            .and_then(Value::as_str)
            .or_else(|| {
                if field_kind == "object" {
                    field.get("title").and_then(Value::as_str)
                } else {
                    None
                }
            })
            .unwrap_or("");

        let mut args = vec![
            format!("{{{}}}", type_sig),
            format_field_name(field, key, Some(&path_key), &required),
        ];
        if !description.is_empty() {
            args.push(description.to_string());
        }
        notations.push(Notation {
            tag: tag.to_string(),
            args,
            lines: Vec::new(),
        });

        notations.extend(compile(field, tag, &path)?);
    }

    Ok(notations)
}

// --- Internal implementation ---

fn capitalize(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Bound clause for the leaf kind. Presence of a bound decides rendering,
/// so a minimum of 0 still renders.
fn range_clause(schema: &Value, kind: &str) -> String {
    match kind {
        "string" => match (schema.get("minLength"), schema.get("maxLength")) {
            (Some(min), Some(max)) => format!("{{{}..{}}}", min, max),
            (Some(min), None) => format!("{{{}..}}", min),
            (None, Some(max)) => format!("{{..{}}}", max),
            (None, None) => String::new(),
        },
        "number" => match (schema.get("minimum"), schema.get("maximum")) {
            (Some(min), Some(max)) => format!("{{{}~{}}}", min, max),
            (Some(min), None) => format!("{{>={}}}", min),
            (None, Some(max)) => format!("{{<={}}}", max),
            (None, None) => String::new(),
        },
        _ => String::new(),
    }
}

fn enum_clause(schema: &Value) -> String {
    match schema.get("enum").and_then(Value::as_array) {
        Some(values) if !values.is_empty() => {
            let encoded: Vec<String> = values.iter().map(Value::to_string).collect();
            format!("={}", encoded.join(","))
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::render_block;
    use serde_json::json;

    #[test]
    fn plain_types_capitalize() {
        assert_eq!(format_type(&json!({"type": "boolean"})).unwrap(), "Boolean");
        assert_eq!(format_type(&json!({"type": "integer"})).unwrap(), "Integer");
    }

    #[test]
    fn string_length_bounds() {
        assert_eq!(
            format_type(&json!({"type": "string", "minLength": 5, "maxLength": 10})).unwrap(),
            "String{5..10}"
        );
        assert_eq!(
            format_type(&json!({"type": "string", "minLength": 10})).unwrap(),
            "String{10..}"
        );
        assert_eq!(
            format_type(&json!({"type": "string", "maxLength": 10})).unwrap(),
            "String{..10}"
        );
    }

    #[test]
    fn zero_bound_still_renders() {
        assert_eq!(
            format_type(&json!({"type": "string", "minLength": 0})).unwrap(),
            "String{0..}"
        );
    }

    #[test]
    fn number_bounds() {
        assert_eq!(
            format_type(&json!({"type": "number", "minimum": 5, "maximum": 10})).unwrap(),
            "Number{5~10}"
        );
        assert_eq!(
            format_type(&json!({"type": "number", "minimum": 10})).unwrap(),
            "Number{>=10}"
        );
        assert_eq!(
            format_type(&json!({"type": "number", "maximum": 10})).unwrap(),
            "Number{<=10}"
        );
    }

    #[test]
    fn array_suffix_and_leaf_constraints() {
        assert_eq!(
            format_type(&json!({"type": "array", "items": {"type": "string"}})).unwrap(),
            "String[]"
        );
        assert_eq!(
            format_type(&json!({
                "type": "array",
                "items": { "type": "string", "minLength": 5, "maxLength": 10 }
            }))
            .unwrap(),
            "String[]{5..10}"
        );
        assert_eq!(
            format_type(&json!({
                "type": "array",
                "items": { "type": "array", "items": { "type": "string" } }
            }))
            .unwrap(),
            "String[][]"
        );
    }

    #[test]
    fn enum_clause_after_range() {
        assert_eq!(
            format_type(&json!({
                "type": "string",
                "enum": ["AA", "BB", "CC"],
                "minLength": 2
            }))
            .unwrap(),
            "String{2..}=\"AA\",\"BB\",\"CC\""
        );
        assert_eq!(
            format_type(&json!({
                "type": "array",
                "items": {
                    "type": "string",
                    "enum": ["A", "B", "C"],
                    "minLength": 5,
                    "maxLength": 10
                }
            }))
            .unwrap(),
            "String[]{5..10}=\"A\",\"B\",\"C\""
        );
    }

    #[test]
    fn non_string_enum_values_stay_unquoted() {
        assert_eq!(
            format_type(&json!({"type": "integer", "enum": [1, 2, 3]})).unwrap(),
            "Integer=1,2,3"
        );
    }

    #[test]
    fn union_type_skips_null() {
        assert_eq!(
            format_type(&json!({"type": ["null", "string"]})).unwrap(),
            "String"
        );
    }

    #[test]
    fn missing_type_fails_loudly() {
        assert!(matches!(
            format_type(&json!({"enum": ["A"]})),
            Err(DocError::MissingType { .. })
        ));
    }

    #[test]
    fn field_name_variants() {
        let plain = json!({"type": "boolean"});
        let with_default = json!({"type": "boolean", "default": true});
        let required = vec!["published".to_string()];

        assert_eq!(
            format_field_name(&plain, "published", None, &required),
            "published"
        );
        assert_eq!(format_field_name(&plain, "published", None, &[]), "[published]");
        assert_eq!(
            format_field_name(&with_default, "published", None, &[]),
            "[published=true]"
        );
    }

    #[test]
    fn field_name_with_dotted_path() {
        let schema = json!({"type": "boolean", "default": true});
        assert_eq!(
            format_field_name(&schema, "published", Some("news.published"), &[]),
            "[news.published=true]"
        );
        assert_eq!(
            format_field_name(
                &json!({"type": "boolean"}),
                "published",
                Some("news.published"),
                &["published".to_string()]
            ),
            "news.published"
        );
    }

    #[test]
    fn compile_sorts_keys_and_brackets_optionals() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" }
            }
        });
        let notations = compile(&schema, "apiParam", &[]).unwrap();
        assert_eq!(notations.len(), 2);
        assert_eq!(notations[0].args, vec!["{Integer}", "[age]"]);
        assert_eq!(notations[1].args, vec!["{String}", "[name]"]);
    }

    #[test]
    fn compile_nested_object_with_title_fallback() {
        let schema = json!({
            "title": "Person details",
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" },
                "address": {
                    "title": "Person address",
                    "type": "object",
                    "properties": {
                        "country": { "type": "string" }
                    }
                }
            }
        });
        let block = render_block(&compile(&schema, "apiSuccess", &[]).unwrap());
        assert_eq!(
            block,
            "@apiSuccess {Object} [address] Person address\n\n\
             @apiSuccess {String} [address.country]\n\n\
             @apiSuccess {Integer} [age]\n\n\
             @apiSuccess {String} [name]"
        );
    }

    #[test]
    fn compile_array_of_object_uses_innermost_required() {
        let schema = json!({
            "type": "object",
            "properties": {
                "connections": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "airport": { "type": "string" },
                            "flight": { "type": "string" },
                            "arrive_time": { "type": "string" }
                        },
                        "required": ["flight", "arrive_time"]
                    }
                }
            }
        });
        let block = render_block(&compile(&schema, "apiSuccess", &[]).unwrap());
        assert_eq!(
            block,
            "@apiSuccess {Object[]} [connections]\n\n\
             @apiSuccess {String} [connections.airport]\n\n\
             @apiSuccess {String} connections.arrive_time\n\n\
             @apiSuccess {String} connections.flight"
        );
    }

    #[test]
    fn compile_array_of_array_of_object() {
        let schema = json!({
            "type": "object",
            "properties": {
                "connections": {
                    "type": "array",
                    "items": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "airport": { "type": "string" },
                                "flight": { "type": "string" }
                            },
                            "required": ["airport", "flight"]
                        }
                    }
                }
            }
        });
        let block = render_block(&compile(&schema, "apiSuccess", &[]).unwrap());
        assert_eq!(
            block,
            "@apiSuccess {Object[][]} [connections]\n\n\
             @apiSuccess {String} connections.airport\n\n\
             @apiSuccess {String} connections.flight"
        );
    }

    #[test]
    fn compile_array_root_descends_to_element_fields() {
        let schema = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer" }
                },
                "required": ["id"]
            }
        });
        let notations = compile(&schema, "apiSuccess", &[]).unwrap();
        assert_eq!(notations.len(), 1);
        assert_eq!(notations[0].args, vec!["{Integer}", "id"]);
    }

    #[test]
    fn compile_scalar_root_yields_nothing() {
        assert!(compile(&json!("Foobar"), "apiSuccess", &[]).unwrap().is_empty());
        assert!(compile(&json!({"type": "string"}), "apiSuccess", &[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn compile_missing_field_type_reports_path() {
        let schema = json!({
            "type": "object",
            "properties": {
                "news": {
                    "type": "object",
                    "properties": {
                        "tags": { "enum": ["a", "b"] }
                    }
                }
            }
        });
        match compile(&schema, "apiParam", &[]) {
            Err(DocError::MissingType { path }) => assert_eq!(path, "news.tags"),
            other => panic!("expected MissingType, got {:?}", other),
        }
    }

    #[test]
    fn compile_default_annotated_field() {
        let schema = json!({
            "type": "object",
            "properties": {
                "published": { "type": "boolean", "default": false }
            }
        });
        let notations = compile(&schema, "apiParam", &[]).unwrap();
        assert_eq!(notations[0].args, vec!["{Boolean}", "[published=false]"]);
    }
}
