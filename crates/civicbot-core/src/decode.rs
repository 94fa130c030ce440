//! Lenient decoding of JSON replies from the chat-completion model.
//!
//! The model is asked for keys like `MissingData` but answers with whatever
//! casing it likes. Object keys are normalized (lower-cased, `_`/`-`
//! removed) at every depth before binding to the target record. Object
//! entries holding `null` are dropped so the record's default applies.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Decode a model reply into `T`.
///
/// A reply fenced as a Markdown code block is unwrapped first. On failure the
/// error quotes the full reply text.
pub fn decode_reply<T: DeserializeOwned>(reply: &str) -> Result<T, CoreError> {
    let body = strip_code_fence(reply);
    let value: Value = serde_json::from_str(body).map_err(|source| CoreError::Decode {
        reply: reply.to_string(),
        source,
    })?;
    serde_json::from_value(normalize_keys(value)).map_err(|source| CoreError::Decode {
        reply: reply.to_string(),
        source,
    })
}

/// Normalize a single key: lower-case with `_` and `-` removed.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let normalized: Map<String, Value> = map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (normalize_key(&k), normalize_keys(v)))
                .collect();
            Value::Object(normalized)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChartSelectResponse, ChartType, SqlResponse};

    #[test]
    fn decodes_capitalized_keys() {
        let reply = r#"{
            "Schema": "operating_budget(program, amount)",
            "Applicability": "Directly answerable",
            "SQL": "SELECT program, SUM(amount) FROM operating_budget GROUP BY program",
            "MissingData": ""
        }"#;
        let resp: SqlResponse = decode_reply(reply).unwrap();
        assert_eq!(resp.schema, "operating_budget(program, amount)");
        assert!(resp.sql.starts_with("SELECT program"));
        assert!(resp.missing_data.is_empty());
    }

    #[test]
    fn decodes_mixed_case_and_snake_keys() {
        let reply = r#"{"sql": "SELECT 1", "missing_data": "ward boundaries"}"#;
        let resp: SqlResponse = decode_reply(reply).unwrap();
        assert_eq!(resp.sql, "SELECT 1");
        assert_eq!(resp.missing_data, "ward boundaries");
        assert!(resp.applicability.is_empty());
    }

    #[test]
    fn decodes_nested_chart_data() {
        let reply = r#"{
            "Chart": "Bar",
            "Title": "Budget by program",
            "Data": [{"Name": "Police", "Value": 1100.5}, {"name": "Fire", "value": 500}],
            "ValueIsCurrency": true
        }"#;
        let resp: ChartSelectResponse = decode_reply(reply).unwrap();
        assert_eq!(resp.chart_type(), ChartType::Bar);
        assert_eq!(resp.data.len(), 2);
        assert_eq!(resp.data[0].name, "Police");
        assert_eq!(resp.data[1].value, 500.0);
        assert!(resp.value_is_currency);
    }

    #[test]
    fn unwraps_code_fence() {
        let reply = "```json\n{\"SQL\": \"SELECT 2\"}\n```";
        let resp: SqlResponse = decode_reply(reply).unwrap();
        assert_eq!(resp.sql, "SELECT 2");
    }

    #[test]
    fn invalid_json_quotes_reply() {
        let reply = "Sorry, I can't help with that.";
        let err = decode_reply::<SqlResponse>(reply).unwrap_err();
        assert!(err.to_string().contains("Sorry, I can't help with that."));
    }

    #[test]
    fn wrong_shape_fails() {
        let err = decode_reply::<ChartSelectResponse>(r#"{"Data": "not a list"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn null_fields_take_defaults() {
        let reply = r#"{"Schema": "s", "Applicability": "yes", "SQL": "SELECT 1", "MissingData": null}"#;
        let resp: SqlResponse = decode_reply(reply).unwrap();
        assert_eq!(resp.sql, "SELECT 1");
        assert!(resp.missing_data.is_empty());
        assert!(resp.has_query());

        let reply = r#"{"Chart": "pie", "Title": null, "Data": null, "ValueIsCurrency": null}"#;
        let resp: ChartSelectResponse = decode_reply(reply).unwrap();
        assert_eq!(resp.chart_type(), ChartType::Pie);
        assert!(resp.title.is_empty());
        assert!(resp.data.is_empty());
        assert!(!resp.value_is_currency);
    }

    #[test]
    fn null_values_inside_data_entries() {
        let reply = r#"{
            "Chart": "bar",
            "Data": [{"Name": "Police", "Value": null}, {"Name": null, "Value": 12}],
            "ValueIsCurrency": null
        }"#;
        let resp: ChartSelectResponse = decode_reply(reply).unwrap();
        assert_eq!(resp.data[0].name, "Police");
        assert_eq!(resp.data[0].value, 0.0);
        assert!(resp.data[1].name.is_empty());
        assert_eq!(resp.data[1].value, 12.0);
    }

    #[test]
    fn normalize_key_strips_separators() {
        assert_eq!(normalize_key("Value_Is-Currency"), "valueiscurrency");
    }
}
