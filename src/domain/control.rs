//! Control messages sent by the settings surface to the engine.

use serde::{Deserialize, Serialize};

/// A message from an external settings surface.
///
/// Wire form is a JSON object tagged by `action`:
///
/// ```
/// use feedsieve::domain::ControlMessage;
///
/// let msg = ControlMessage::from_json(r#"{"action": "toggleHideMode"}"#);
/// assert_eq!(msg, Some(ControlMessage::ToggleHideMode));
///
/// let msg = ControlMessage::from_json(r#"{"action": "setEnabled", "enabled": false}"#);
/// assert_eq!(msg, Some(ControlMessage::SetEnabled { enabled: false }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlMessage {
    /// The stored policy changed: reload it and run a full pass.
    #[serde(alias = "filterUpdated")]
    PolicyUpdated,

    /// Flip `hideFiltered` in the stored policy, then run a full pass.
    ToggleHideMode,

    /// Write `enabled` to the stored policy, then run a full pass.
    SetEnabled { enabled: bool },
}

impl ControlMessage {
    /// Parses a control message, returning `None` for unknown or malformed payloads.
    #[must_use]
    pub fn from_json(payload: &str) -> Option<Self> {
        match serde_json::from_str(payload) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!(error = %e, payload_len = payload.len(), "ignoring control message");
                None
            }
        }
    }
}
