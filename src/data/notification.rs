use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const SAVE_SUCCESS_MESSAGE: &str = "Paramètres enregistrés avec succès";
pub const SAVE_FAILURE_MESSAGE: &str = "Erreur lors de l'enregistrement des paramètres";
pub const RESPONSE_PARSE_FAILURE_MESSAGE: &str = "Erreur lors du traitement de la réponse";

/// How long a banner stays visible before auto-dismissing.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Outcome body of a settings submission, the contract of the planner's
/// settings endpoint: `{"success": bool, "error": "..."}`.
#[derive(Serialize, Deserialize, Debug)]
pub struct SaveResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    pub fn ok() -> Self {
        SaveResponse {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        SaveResponse {
            success: false,
            error: Some(error.into()),
        }
    }

    pub fn to_body(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient status banner shown after a settings submission. Expired
/// notifications are dropped on the next UI tick.
#[derive(Clone, Debug)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    shown_at: Instant,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            message: message.into(),
            severity: Severity::Success,
            shown_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            message: message.into(),
            severity: Severity::Error,
            shown_at: Instant::now(),
        }
    }

    /// Maps a settings submission body to a banner:
    /// success → fixed success message; reported failure → its error string,
    /// or the generic failure message; unparseable body → the generic
    /// processing-error message. Never fails.
    pub fn from_save_response(body: &str) -> Self {
        match serde_json::from_str::<SaveResponse>(body) {
            Ok(response) if response.success => Notification::success(SAVE_SUCCESS_MESSAGE),
            Ok(response) => Notification::error(
                response
                    .error
                    .unwrap_or_else(|| SAVE_FAILURE_MESSAGE.to_string()),
            ),
            Err(_) => Notification::error(RESPONSE_PARSE_FAILURE_MESSAGE),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= NOTIFICATION_TTL
    }
}
