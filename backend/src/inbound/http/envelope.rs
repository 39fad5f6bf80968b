//! Success envelope shared by every JSON endpoint.

use serde::Serialize;
use serde_json::Value;

/// `{ success: true, message, data, meta? }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    message: &'static str,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Value>,
}

impl<T: Serialize> Envelope<T> {
    /// Successful response carrying `data`.
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message,
            data,
            meta: None,
        }
    }

    /// Attach response metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_is_omitted_until_attached() {
        let bare = serde_json::to_value(Envelope::ok("done", json!([]))).expect("json");
        assert_eq!(bare, json!({"success": true, "message": "done", "data": []}));

        let with_meta = serde_json::to_value(
            Envelope::ok("done", json!([])).with_meta(json!({"total_records": 0})),
        )
        .expect("json");
        assert_eq!(with_meta["meta"]["total_records"], 0);
    }
}
