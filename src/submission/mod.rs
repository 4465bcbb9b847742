pub mod parser;
pub mod pipeline;

use serde::Serialize;
use serde_json::{Map, Value};

/// A form submission: field names mapped to arbitrary JSON values, in the
/// order the caller sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Submission(Map<String, Value>);

impl Submission {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Two-space indented JSON, used as the notification body.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<Map<String, Value>> for Submission {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pretty_json_keeps_field_order() {
        let Value::Object(fields) = json!({ "name": "Ann", "email": "a@x.com", "age": 30 }) else {
            unreachable!()
        };
        let submission = Submission::new(fields);

        assert_eq!(
            submission.to_pretty_json(),
            "{\n  \"name\": \"Ann\",\n  \"email\": \"a@x.com\",\n  \"age\": 30\n}"
        );
    }

    #[test]
    fn serializes_as_plain_object() {
        let Value::Object(fields) = json!({ "message": "hi", "tags": ["a", "b"] }) else {
            unreachable!()
        };
        let submission = Submission::from(fields);

        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            json!({ "message": "hi", "tags": ["a", "b"] })
        );
    }
}
