use serde_json::{Map, Value};

use course_core::model::{ContactSubmission, ProgressDocument};

/// The JSON object stored in the single suspend-data string.
///
/// Two producers share it: the progress bridge owns the `progress` field
/// and the contact flow owns `contact`. Rewriting one field must preserve
/// the other's last value, so writers always parse the current string,
/// merge their field, and serialize the whole object back. Unknown
/// top-level fields survive the round trip untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuspendEnvelope {
    fields: Map<String, Value>,
}

impl SuspendEnvelope {
    /// Parse a stored suspend-data string.
    ///
    /// Anything that is not a JSON object (invalid JSON, a bare scalar,
    /// an empty or whitespace string) is treated as an empty envelope,
    /// never an error.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(Value::Object(fields)) => Self { fields },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The decoded `progress` field, if present and well-formed.
    #[must_use]
    pub fn progress(&self) -> Option<ProgressDocument> {
        self.fields
            .get("progress")
            .and_then(ProgressDocument::from_value)
    }

    /// Replace the `progress` field, leaving siblings alone.
    pub fn set_progress(&mut self, document: &ProgressDocument) {
        if let Ok(value) = serde_json::to_value(document) {
            self.fields.insert("progress".to_string(), value);
        }
    }

    /// The raw `contact` field, if any.
    #[must_use]
    pub fn contact(&self) -> Option<&Value> {
        self.fields.get("contact")
    }

    /// Replace the `contact` field, leaving siblings alone.
    pub fn set_contact(&mut self, submission: &ContactSubmission) {
        if let Ok(value) = serde_json::to_value(submission) {
            self.fields.insert("contact".to_string(), value);
        }
    }

    /// Serialize the whole envelope back to a suspend-data string.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&Value::Object(self.fields.clone())).unwrap_or_else(|_| "{}".into())
    }
}
