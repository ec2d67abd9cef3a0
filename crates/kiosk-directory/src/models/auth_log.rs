use kiosk_core::{AuthEventType, AuthenticationEvent, CardId};
use serde::Serialize;

/// Row appended to the `authentication_logs` table.
///
/// The server assigns `id` and `created_at`; the event timestamp is kept
/// only in the local log line. User columns are omitted entirely for
/// unresolved cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthLogRow<'a> {
    pub eid: &'a CardId,
    pub event_type: AuthEventType,
    pub success: bool,
    pub message: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<&'a str>,
}

impl<'a> From<&'a AuthenticationEvent> for AuthLogRow<'a> {
    fn from(event: &'a AuthenticationEvent) -> Self {
        Self {
            eid: &event.card_id,
            event_type: event.event_type,
            success: event.success,
            message: event.message.as_deref(),
            user_id: event.user_id.as_deref(),
            user_name: event.user_name.as_deref(),
        }
    }
}
