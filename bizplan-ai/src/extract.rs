//! Best-effort recovery of JSON from model replies.
//!
//! Models are told to answer with bare JSON but regularly wrap it in prose
//! or markdown fences. [`parse_lenient`] tries the whole reply first, then
//! the outermost `{...}` span, then the outermost `[...]` span.

use serde::de::DeserializeOwned;

use crate::error::GenerationError;

pub fn parse_lenient<T: DeserializeOwned>(content: &str) -> Result<T, GenerationError> {
    let trimmed = content.trim();
    let first_err = match serde_json::from_str(trimmed) {
        Ok(parsed) => return Ok(parsed),
        Err(e) => e,
    };

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(span) = outer_span(trimmed, open, close) {
            if let Ok(parsed) = serde_json::from_str(span) {
                return Ok(parsed);
            }
        }
    }

    Err(GenerationError::Parse(format!(
        "Failed to parse JSON: {}. Raw: {}",
        first_err, content
    )))
}

fn outer_span(
    content: &str,
    open: char,
    close: char,
) -> Option<&str> {
    let start = content.find(open)?;
    let end = content.rfind(close)?;
    (end > start).then(|| &content[start..=end])
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        summary: String,
    }

    #[test]
    fn parses_bare_json() {
        let reply: Reply = parse_lenient(r#"{"summary": "Salary wins."}"#).unwrap();
        assert_eq!(reply.summary, "Salary wins.");
    }

    #[test]
    fn parses_json_inside_markdown_fence() {
        let content = "Here you go:\n```json\n{\"summary\": \"Test\"}\n```\nHope that helps!";
        let reply: Reply = parse_lenient(content).unwrap();
        assert_eq!(reply.summary, "Test");
    }

    #[test]
    fn parses_arrays_wrapped_in_prose() {
        let content = "Considerations: [\"Keep receipts\", \"Review annually\"] as requested.";
        let reply: Vec<String> = parse_lenient(content).unwrap();
        assert_eq!(reply, vec!["Keep receipts", "Review annually"]);
    }

    #[test]
    fn prose_without_json_is_parse_error() {
        let result: Result<Reply, _> = parse_lenient("I cannot help with that.");
        assert!(matches!(result, Err(GenerationError::Parse(_))));
    }

    #[test]
    fn mismatched_braces_are_parse_error() {
        let result: Result<Reply, _> = parse_lenient("} nothing here {");
        assert!(matches!(result, Err(GenerationError::Parse(_))));
    }
}
