//! Output boundary messages

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::TapState;

/// A message emitted to the downstream pipeline, one JSON object per line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum TapMessage {
    /// One extracted record, forwarded as it arrives.
    #[serde(rename = "RECORD")]
    Record { stream: String, record: Value },
    /// Full checkpoint snapshot, flushed after each stream completes and
    /// once at run end.
    #[serde(rename = "STATE")]
    State { value: TapState },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn record_message_shape() {
        let msg = TapMessage::Record {
            stream: "invoices".into(),
            record: json!({"id": 7, "modified": "2020-01-05"}),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "RECORD",
                "stream": "invoices",
                "record": {"id": 7, "modified": "2020-01-05"},
            })
        );
    }

    #[test]
    fn state_message_shape() {
        let mut state = TapState::new();
        state.set_bookmark("invoices", "2020-01-10");
        let msg = TapMessage::State { value: state };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"type": "STATE", "value": {"invoices": "2020-01-10"}})
        );
    }
}
