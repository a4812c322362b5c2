//! Locates and parses the JSON payload embedded in backend output.
//!
//! Generation backends routinely wrap JSON in prose or markdown fences.
//! Extraction is two-stage: find the first balanced bracket span and parse
//! it, then fall back to parsing the entire response as JSON. Both stages
//! failing surfaces a [`MalformedResponse`] carrying the raw text.

use serde_json::Value;

use crate::errors::{JsonShape, MalformedResponse};

/// Extract a JSON object from text that may contain other content.
pub fn extract_object(text: &str) -> Result<Value, MalformedResponse> {
    extract(text, JsonShape::Object)
}

/// Extract a JSON array from text that may contain other content.
pub fn extract_array(text: &str) -> Result<Vec<Value>, MalformedResponse> {
    match extract(text, JsonShape::Array)? {
        Value::Array(items) => Ok(items),
        _ => Err(MalformedResponse {
            expected: JsonShape::Array,
            raw: text.to_string(),
        }),
    }
}

fn extract(text: &str, expected: JsonShape) -> Result<Value, MalformedResponse> {
    let (open, close) = match expected {
        JsonShape::Object => ('{', '}'),
        JsonShape::Array => ('[', ']'),
    };

    if let Some(span) = balanced_span(text, open, close)
        && let Ok(value) = serde_json::from_str::<Value>(span)
        && matches_shape(&value, expected)
    {
        return Ok(value);
    }

    // The response may be bare JSON with no surrounding prose.
    if let Ok(value) = serde_json::from_str::<Value>(text.trim())
        && matches_shape(&value, expected)
    {
        return Ok(value);
    }

    Err(MalformedResponse {
        expected,
        raw: text.to_string(),
    })
}

/// Find the first balanced `open`..`close` span, using bracket-depth
/// counting. Brackets inside JSON string literals are ignored.
fn balanced_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..start + i + 1]);
            }
        }
    }

    None
}

fn matches_shape(value: &Value, expected: JsonShape) -> bool {
    match expected {
        JsonShape::Object => value.is_object(),
        JsonShape::Array => value.is_array(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_object_simple() {
        let value = extract_object(r#"{"key": "value"}"#).unwrap();
        assert_eq!(value, json!({"key": "value"}));
    }

    #[test]
    fn test_extract_object_with_prefix_and_suffix() {
        let text = r#"Here is the JSON you asked for: {"key": "value"} hope it helps!"#;
        let value = extract_object(text).unwrap();
        assert_eq!(value, json!({"key": "value"}));
    }

    #[test]
    fn test_extract_object_markdown_fenced() {
        let text = "```json\n{\"key\": \"value\"}\n```";
        let value = extract_object(text).unwrap();
        assert_eq!(value, json!({"key": "value"}));
    }

    #[test]
    fn test_extract_object_nested() {
        let value = extract_object(r#"{"outer": {"inner": "value"}}"#).unwrap();
        assert_eq!(value, json!({"outer": {"inner": "value"}}));
    }

    #[test]
    fn test_extract_object_braces_inside_strings() {
        let text = r#"{"code": "fn main() { println!(\"}\"); }"}"#;
        let value = extract_object(text).unwrap();
        assert_eq!(value["code"], json!("fn main() { println!(\"}\"); }"));
    }

    #[test]
    fn test_extract_object_no_json() {
        let err = extract_object("No JSON here").unwrap_err();
        assert_eq!(err.expected, JsonShape::Object);
        assert_eq!(err.raw, "No JSON here");
    }

    #[test]
    fn test_extract_object_unclosed_brace() {
        let err = extract_object(r#"{"key": "value""#).unwrap_err();
        assert_eq!(err.expected, JsonShape::Object);
    }

    #[test]
    fn test_extract_object_rejects_bare_array() {
        assert!(extract_object(r#"[1, 2, 3]"#).is_err());
    }

    #[test]
    fn test_extract_array_simple() {
        let items = extract_array(r#"[{"id": "t-1"}, {"id": "t-2"}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], json!("t-1"));
    }

    #[test]
    fn test_extract_array_with_surrounding_prose() {
        let text = "The tasks are:\n\n[{\"id\": \"t-1\"}]\n\nLet me know if you need more.";
        let items = extract_array(text).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_extract_array_preserves_order() {
        let items = extract_array(r#"[{"id": "b"}, {"id": "a"}, {"id": "c"}]"#).unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_extract_array_rejects_bare_object() {
        assert!(extract_array(r#"{"id": "t-1"}"#).is_err());
    }

    #[test]
    fn test_both_stages_failing_carries_raw_text() {
        let err = extract_object("{ oops").unwrap_err();
        assert_eq!(err.raw, "{ oops");
    }

    #[test]
    fn test_extract_equivalent_to_parse_for_bare_json() {
        let text = r#"{"a": [1, 2], "b": {"c": null}}"#;
        let extracted = extract_object(text).unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(extracted, parsed);
    }

    #[test]
    fn test_extract_picks_first_balanced_object() {
        let text = r#"{"first": 1} and later {"second": 2}"#;
        let value = extract_object(text).unwrap();
        assert_eq!(value, json!({"first": 1}));
    }
}
