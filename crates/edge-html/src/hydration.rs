//! Hydration payload and script-safe JSON.

use serde::Serialize;

/// Global the client reads the hydration payload from.
pub const SSR_DATA_GLOBAL: &str = "window.__SSR_DATA__";

/// Errors while assembling a document.
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("failed to serialize script payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Data handed to the client for hydration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationPayload<'a> {
    /// Content the page was rendered from.
    pub content_data: &'a serde_json::Value,
    /// Canonical URL of the page.
    pub url: &'a str,
}

impl<'a> HydrationPayload<'a> {
    /// Create a payload.
    pub fn new(content_data: &'a serde_json::Value, url: &'a str) -> Self {
        Self { content_data, url }
    }

    /// Payload as JSON safe to embed in a `<script>` element.
    pub fn to_script_json(&self) -> Result<String, HtmlError> {
        to_script_json(self)
    }
}

/// Serialize `value` to JSON that cannot terminate or confuse a `<script>` element.
pub fn to_script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, HtmlError> {
    let json = serde_json::to_string(value)?;
    Ok(escape_script_json(&json))
}

/// Escape `<`, `>`, `&`, U+2028 and U+2029 as `\uXXXX`.
///
/// The input must be JSON; the escapes are only valid inside string
/// literals or between tokens, which is everywhere these characters can
/// occur in JSON.
pub fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escapes_markup_characters() {
        let escaped = escape_script_json(r#"{"a":"</script><b>&amp;"}"#);
        assert_eq!(
            escaped,
            r#"{"a":"\u003c/script\u003e\u003cb\u003e\u0026amp;"}"#
        );
    }

    #[test]
    fn test_escapes_line_separators() {
        let json = serde_json::to_string(&json!({"s": "a\u{2028}b\u{2029}c"})).unwrap();
        let escaped = escape_script_json(&json);
        assert!(!escaped.contains('\u{2028}'));
        assert!(!escaped.contains('\u{2029}'));
        assert!(escaped.contains("\\u2028"));
    }

    #[test]
    fn test_escaped_json_round_trips() {
        let value = json!({"html": "<p>Tom & Jerry</p>", "n": 1});
        let escaped = to_script_json(&value).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&escaped).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_payload_field_names() {
        let content = json!({"title": "Docs"});
        let payload = HydrationPayload::new(&content, "https://www.example.com/docs");
        let json = payload.to_script_json().unwrap();
        assert_eq!(
            json,
            r#"{"contentData":{"title":"Docs"},"url":"https://www.example.com/docs"}"#
        );
    }
}
