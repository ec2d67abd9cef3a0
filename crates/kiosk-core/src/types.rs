use crate::{Result, error::Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card identifier as reported by a reader and stored in the directory.
///
/// The identifier is trimmed of surrounding whitespace on construction and
/// compared as an exact string afterwards: no case folding, no padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    /// Create a new card identifier with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardId` if the identifier is empty after
    /// trimming. Any other content is kept as read; unknown identifiers are
    /// for the directory to reject.
    pub fn new(raw: &str) -> Result<Self> {
        let id = raw.trim();

        if id.is_empty() {
            return Err(Error::InvalidCardId("empty identifier".to_string()));
        }

        Ok(CardId(id.to_string()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CardId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CardId::new(s)
    }
}

impl TryFrom<String> for CardId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        CardId::new(&value)
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.0
    }
}

/// A user as known by the remote directory.
///
/// Serializes in the kiosk API shape (`rfidCardId`, `phoneNumber`, ...).
/// The scan loop only ever reads `id` and `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "rfidCardId")]
    pub card_id: CardId,
    pub balance: f64,
    #[serde(rename = "phoneNumber", default)]
    pub contact_number: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Kind of authentication event written to the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthEventType {
    /// Card resolved to a user.
    Login,
    /// Card could not be resolved.
    Failed,
}

impl AuthEventType {
    /// Wire name used by the audit log.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuthEventType::Login => "login",
            AuthEventType::Failed => "failed",
        }
    }
}

impl fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuthEventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "login" => Ok(AuthEventType::Login),
            "failed" => Ok(AuthEventType::Failed),
            other => Err(Error::InvalidEventType(other.to_string())),
        }
    }
}

/// One authentication attempt, created once per accepted scan.
///
/// Use [`AuthenticationEvent::login`] or [`AuthenticationEvent::failed`];
/// they keep `success` consistent with `event_type` and fill the user
/// fields only for resolved cards.
///
/// # Examples
///
/// ```
/// use kiosk_core::{AuthEventType, AuthenticationEvent, CardId};
/// use chrono::Utc;
///
/// let card = CardId::new(" 999 ").unwrap();
/// let event = AuthenticationEvent::failed(card, Utc::now());
///
/// assert_eq!(event.event_type, AuthEventType::Failed);
/// assert!(!event.success);
/// assert_eq!(event.message.as_deref(), Some("No user found with EID: 999"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationEvent {
    pub card_id: CardId,
    pub event_type: AuthEventType,
    pub success: bool,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuthenticationEvent {
    /// Successful scan of a card that belongs to `user`.
    #[must_use]
    pub fn login(card_id: CardId, user: &UserRecord, timestamp: DateTime<Utc>) -> Self {
        Self {
            card_id,
            event_type: AuthEventType::Login,
            success: true,
            user_id: Some(user.id.clone()),
            user_name: Some(user.name.clone()),
            message: Some(format!("User {} scanned successfully", user.name)),
            timestamp,
        }
    }

    /// Scan of a card that could not be resolved to a user.
    #[must_use]
    pub fn failed(card_id: CardId, timestamp: DateTime<Utc>) -> Self {
        let message = format!("No user found with EID: {card_id}");
        Self {
            card_id,
            event_type: AuthEventType::Failed,
            success: false,
            user_id: None,
            user_name: None,
            message: Some(message),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn alice() -> UserRecord {
        UserRecord {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            card_id: CardId::new("123").unwrap(),
            balance: 12.5,
            contact_number: "555-0100".to_string(),
            created_at: None,
        }
    }

    #[rstest]
    #[case("123", "123")]
    #[case("  123\n", "123")]
    #[case("\t04ABCDEF ", "04ABCDEF")]
    #[case("abc", "abc")]
    fn test_card_id_trims(#[case] input: &str, #[case] expected: &str) {
        let id = CardId::new(input).unwrap();
        assert_eq!(id.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\r\n\t")]
    fn test_card_id_invalid(#[case] input: &str) {
        assert!(matches!(CardId::new(input), Err(Error::InvalidCardId(_))));
    }

    #[rstest]
    #[case(&"1".repeat(65))]
    #[case("12\u{7}3")]
    #[case("12\u{0}34")]
    fn test_card_id_keeps_unusual_reads(#[case] input: &str) {
        let id = CardId::new(input).unwrap();
        assert_eq!(id.as_str(), input);
    }

    #[test]
    fn test_card_id_is_case_sensitive() {
        let lower = CardId::new("abc").unwrap();
        let upper = CardId::new("ABC").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_card_id_deserialize_validates() {
        let id: CardId = serde_json::from_str("\" 42 \"").unwrap();
        assert_eq!(id.as_str(), "42");

        let empty: std::result::Result<CardId, _> = serde_json::from_str("\"  \"");
        assert!(empty.is_err());
    }

    #[test]
    fn test_login_event() {
        let event = AuthenticationEvent::login(CardId::new("123").unwrap(), &alice(), Utc::now());

        assert_eq!(event.event_type, AuthEventType::Login);
        assert!(event.success);
        assert_eq!(event.user_id.as_deref(), Some("u1"));
        assert_eq!(event.user_name.as_deref(), Some("Alice"));
        assert_eq!(
            event.message.as_deref(),
            Some("User Alice scanned successfully")
        );
    }

    #[test]
    fn test_failed_event() {
        let event = AuthenticationEvent::failed(CardId::new("999").unwrap(), Utc::now());

        assert_eq!(event.event_type, AuthEventType::Failed);
        assert!(!event.success);
        assert!(event.user_id.is_none());
        assert!(event.user_name.is_none());
        assert!(event.message.unwrap().contains("999"));
    }

    #[test]
    fn test_event_type_round_trip_names() {
        assert_eq!("login".parse::<AuthEventType>().unwrap(), AuthEventType::Login);
        assert_eq!("failed".parse::<AuthEventType>().unwrap(), AuthEventType::Failed);
        assert!("logout".parse::<AuthEventType>().is_err());
        assert_eq!(AuthEventType::Failed.to_string(), "failed");
    }

    #[test]
    fn test_user_record_api_format() {
        let json = serde_json::to_value(alice()).unwrap();

        assert_eq!(json["id"], "u1");
        assert_eq!(json["rfidCardId"], "123");
        assert_eq!(json["phoneNumber"], "555-0100");
        assert_eq!(json["balance"], 12.5);
    }
}
