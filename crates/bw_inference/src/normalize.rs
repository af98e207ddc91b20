use bw_core::{Error, Result};
use serde::de::DeserializeOwned;

/// Parse a model reply expected to hold one JSON document.
///
/// Strict parse first; if that fails, strip a surrounding code fence and try
/// again. A reply that fails both is an error for the caller to handle.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    match serde_json::from_str(raw.trim()) {
        Ok(parsed) => Ok(parsed),
        Err(strict_err) => {
            let unwrapped = strip_code_fence(raw);
            serde_json::from_str(unwrapped).map_err(|e| {
                Error::Parse(format!(
                    "Reply is not valid JSON ({}; after unfencing: {})",
                    strict_err, e
                ))
            })
        }
    }
}

/// Remove a leading ```lang line and a trailing ``` marker, if present.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        score: u32,
    }

    #[test]
    fn test_strict_json() {
        let reply: Reply = parse_structured(" {\"score\": 7} ").unwrap();
        assert_eq!(reply, Reply { score: 7 });
    }

    #[test]
    fn test_fenced_json() {
        let reply: Reply = parse_structured("```json\n{\"score\": 7}\n```").unwrap();
        assert_eq!(reply.score, 7);
        let reply: Reply = parse_structured("```\n{\"score\": 8}\n```").unwrap();
        assert_eq!(reply.score, 8);
        let reply: Reply = parse_structured("```JSON\n{\"score\": 9}```").unwrap();
        assert_eq!(reply.score, 9);
    }

    #[test]
    fn test_unparseable_reply_is_an_error() {
        let err = parse_structured::<Reply>("The article leans left.").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(parse_structured::<Reply>("```json\nnot json\n```").is_err());
    }

    #[test]
    fn test_strip_code_fence_leaves_plain_text() {
        assert_eq!(strip_code_fence("{}"), "{}");
        assert_eq!(strip_code_fence("```{}```"), "{}");
    }
}
