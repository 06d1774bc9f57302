use super::error::{OracleError, OracleResult};
use super::types::OracleResponse;

/// Parses an oracle reply that is either bare JSON or JSON wrapped in a
/// markdown code fence, possibly surrounded by prose.
pub fn parse_response(text: &str) -> OracleResult<OracleResponse> {
    let body = extract_json(text).ok_or_else(|| OracleError::malformed("no JSON object in reply"))?;
    serde_json::from_str(body).map_err(|e| OracleError::malformed(e.to_string()))
}

fn extract_json(text: &str) -> Option<&str> {
    let text = text.trim();

    if let Some(start) = text.find("```") {
        let after_fence = &text[start + 3..];
        // skip an optional language tag on the fence line
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            return braces(&body[..end]);
        }
    }

    braces(text)
}

fn braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
