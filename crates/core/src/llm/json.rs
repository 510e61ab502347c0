use crate::error::AnalyzeError;
use serde_json::{Map, Value};

/// How much of an unparseable model answer is echoed back for diagnostics.
pub const RAW_RESPONSE_PREVIEW_CHARS: usize = 500;

/// Removes a Markdown code fence (```` ```json ... ``` ```` or ```` ``` ... ``` ````)
/// wrapped around the model output, then trims.
pub fn strip_code_fences(text: &str) -> &str {
    let mut inner = text.trim();

    if let Some(after_open) = inner.strip_prefix("```") {
        // Optional info string such as `json`, directly after the backticks.
        let tag_len = after_open
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after_open.len());
        let rest = &after_open[tag_len..];
        inner = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);
    }

    let trimmed_end = inner.trim_end();
    if let Some(before_close) = trimmed_end.strip_suffix("```") {
        inner = before_close;
    }

    inner.trim()
}

/// First `max_chars` characters of `text`, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Parses cleaned model output into a JSON object.
pub fn parse_analysis_object(text: &str) -> Result<Map<String, Value>, AnalyzeError> {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "model output is JSON but not an object");
            Err(parse_error(cleaned))
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                preview = truncate_chars(cleaned, 200),
                "model output is not valid JSON"
            );
            Err(parse_error(cleaned))
        }
    }
}

fn parse_error(cleaned: &str) -> AnalyzeError {
    AnalyzeError::ResultParseError {
        raw: truncate_chars(cleaned, RAW_RESPONSE_PREVIEW_CHARS).to_string(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_code_fences_handles_fenced_blocks() {
        let body = "{\"a\":1}";
        assert_eq!(strip_code_fences(&format!("```json\n{body}\n```\n")), body);
        assert_eq!(strip_code_fences(&format!("```\n{body}\n```")), body);
        assert_eq!(strip_code_fences(&format!("```json{body}```")), body);
        assert_eq!(strip_code_fences(&format!("  ```JSON\r\n{body}\r\n```  ")), body);
    }

    #[test]
    fn strip_code_fences_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(strip_code_fences("no fences here"), "no fences here");
    }

    #[test]
    fn parse_returns_inner_object_unchanged() {
        let inner = json!({
            "ticker": "NVDA",
            "executive_summary": {"recommendation": "Buy", "key_risks": ["a", "b"]},
        });
        let fenced = format!("```json\n{}\n```", serde_json::to_string_pretty(&inner).unwrap());
        let parsed = parse_analysis_object(&fenced).unwrap();
        assert_eq!(Value::Object(parsed), inner);
    }

    #[test]
    fn parse_rejects_non_objects() {
        for text in ["[1, 2, 3]", "\"just a string\"", "42", "null"] {
            match parse_analysis_object(text) {
                Err(AnalyzeError::ResultParseError { raw }) => assert_eq!(raw, text),
                other => panic!("expected parse error for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_error_carries_first_500_chars() {
        let text = "x".repeat(800);
        match parse_analysis_object(&text) {
            Err(AnalyzeError::ResultParseError { raw }) => {
                assert_eq!(raw.chars().count(), 500);
                assert_eq!(raw, text[..500]);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        let text = "é".repeat(600);
        let cut = truncate_chars(&text, 500);
        assert_eq!(cut.chars().count(), 500);
        assert_eq!(truncate_chars("short", 500), "short");
    }
}
