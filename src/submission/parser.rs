use serde_json::{Map, Value};

use super::Submission;

/// Parse a request body into a submission.
///
/// An empty body yields an empty submission. Anything other than a JSON
/// object is rejected.
pub fn parse_body(body: &[u8]) -> Result<Submission, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Submission::new(Map::new()));
    }

    match serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))? {
        Value::Object(fields) => Ok(Submission::new(fields)),
        _ => Err("Submission must be a JSON object".to_string()),
    }
}
