use chrono::{DateTime, Utc};
use kiosk_core::{CardId, UserRecord};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DirectoryError;

/// User row as stored in the `users` table.
///
/// Column names follow the directory schema; `eid` holds the card
/// identifier. Primary keys may be integers or UUIDs depending on how the
/// table was provisioned, so `id` is read as text either way. Every other
/// column may be null or missing; a row without a card is rejected when it
/// is converted, not when it is decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRow {
    #[serde(deserialize_with = "text_or_number")]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "optional_text_or_number")]
    pub eid: Option<String>,

    #[serde(default)]
    pub current_balance: Option<f64>,

    #[serde(default)]
    pub contact_number: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub state: Option<bool>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = DirectoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let eid = row.eid.as_deref().unwrap_or_default();
        let card_id = CardId::new(eid).map_err(|e| {
            DirectoryError::InvalidRecord(format!("user {} has unusable eid: {}", row.id, e))
        })?;

        Ok(UserRecord {
            id: row.id,
            name: row.name.unwrap_or_default(),
            card_id,
            balance: row.current_balance.unwrap_or(0.0),
            contact_number: row.contact_number.unwrap_or_default(),
            created_at: row.created_at,
        })
    }
}

/// Payload for inserting a user.
///
/// # Examples
///
/// ```
/// use kiosk_core::CardId;
/// use kiosk_directory::models::NewUser;
///
/// let user = NewUser::new(CardId::new("123").unwrap(), "Alice")
///     .contact_number("555-0100")
///     .balance(25.0);
///
/// let json = serde_json::to_value(&user).unwrap();
/// assert_eq!(json["eid"], "123");
/// assert_eq!(json["state"], true);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub eid: CardId,
    pub name: String,
    pub contact_number: String,
    pub current_balance: f64,
    pub state: bool,
}

impl NewUser {
    /// Active user with no balance and no contact number.
    pub fn new(card_id: CardId, name: impl Into<String>) -> Self {
        Self {
            eid: card_id,
            name: name.into(),
            contact_number: String::new(),
            current_balance: 0.0,
            state: true,
        }
    }

    /// Set the contact number
    pub fn contact_number(mut self, contact_number: impl Into<String>) -> Self {
        self.contact_number = contact_number.into();
        self
    }

    /// Set the opening balance
    pub fn balance(mut self, balance: f64) -> Self {
        self.current_balance = balance;
        self
    }

    /// Set whether the account is active
    pub fn active(mut self, state: bool) -> Self {
        self.state = state;
        self
    }
}

impl From<&UserRecord> for NewUser {
    fn from(record: &UserRecord) -> Self {
        NewUser::new(record.card_id.clone(), record.name.clone())
            .contact_number(record.contact_number.clone())
            .balance(record.balance)
    }
}

/// Partial update of a user row. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eid: Option<CardId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,
}

impl UserUpdate {
    /// Empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the user
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reassign the card
    pub fn card_id(mut self, card_id: CardId) -> Self {
        self.eid = Some(card_id);
        self
    }

    /// Change the contact number
    pub fn contact_number(mut self, contact_number: impl Into<String>) -> Self {
        self.contact_number = Some(contact_number.into());
        self
    }

    /// Set the balance, clamped at zero
    pub fn balance(mut self, balance: f64) -> Self {
        self.current_balance = Some(clamp_balance(balance));
        self
    }

    /// Activate or deactivate the account
    pub fn active(mut self, state: bool) -> Self {
        self.state = Some(state);
        self
    }

    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.eid.is_none()
            && self.contact_number.is_none()
            && self.current_balance.is_none()
            && self.state.is_none()
    }
}

/// Balances never go negative. `NaN` counts as zero.
pub fn clamp_balance(amount: f64) -> f64 {
    amount.max(0.0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<TextOrNumber> for String {
    fn from(value: TextOrNumber) -> Self {
        match value {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Int(n) => n.to_string(),
            TextOrNumber::Float(n) => n.to_string(),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    TextOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<TextOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_row_to_record() {
        let row: UserRow = serde_json::from_value(json!({
            "id": 7,
            "name": "Alice",
            "eid": "123",
            "current_balance": 12.5,
            "contact_number": "555-0100",
            "created_at": "2025-01-15T12:30:00+00:00",
            "state": true
        }))
        .unwrap();

        let record = UserRecord::try_from(row).unwrap();
        assert_eq!(record.id, "7");
        assert_eq!(record.name, "Alice");
        assert_eq!(record.card_id.as_str(), "123");
        assert_eq!(record.balance, 12.5);
        assert_eq!(record.contact_number, "555-0100");
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_row_missing_optional_columns() {
        let row: UserRow = serde_json::from_value(json!({
            "id": "3f1c2a9e-0000-4000-8000-000000000001",
            "name": "Bob",
            "eid": 456
        }))
        .unwrap();

        let record = UserRecord::try_from(row).unwrap();
        assert_eq!(record.card_id.as_str(), "456");
        assert_eq!(record.balance, 0.0);
        assert_eq!(record.contact_number, "");
        assert!(record.created_at.is_none());
    }

    #[rstest]
    #[case(json!({"id": 1, "name": "Ghost", "eid": "  "}))]
    #[case(json!({"id": 2, "name": "Pending", "eid": null}))]
    #[case(json!({"id": 3, "name": "Unassigned"}))]
    fn test_row_without_card_is_invalid(#[case] value: serde_json::Value) {
        let row: UserRow = serde_json::from_value(value).unwrap();

        assert!(matches!(
            UserRecord::try_from(row),
            Err(DirectoryError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_row_null_name_becomes_empty() {
        let row: UserRow =
            serde_json::from_value(json!({"id": 4, "name": null, "eid": "789"})).unwrap();

        let record = UserRecord::try_from(row).unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.card_id.as_str(), "789");
    }

    #[test]
    fn test_new_user_from_record() {
        let record = UserRecord {
            id: "1".to_string(),
            name: "Alice".to_string(),
            card_id: CardId::new("123").unwrap(),
            balance: 10.0,
            contact_number: "555".to_string(),
            created_at: None,
        };

        let json = serde_json::to_value(NewUser::from(&record)).unwrap();
        assert_eq!(
            json,
            json!({
                "eid": "123",
                "name": "Alice",
                "contact_number": "555",
                "current_balance": 10.0,
                "state": true
            })
        );
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = UserUpdate::new().name("Alice B.");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, json!({"name": "Alice B."}));
        assert!(UserUpdate::new().is_empty());
        assert!(!update.is_empty());
    }

    #[rstest]
    #[case(25.0, 25.0)]
    #[case(0.0, 0.0)]
    #[case(-5.0, 0.0)]
    #[case(f64::NAN, 0.0)]
    fn test_clamp_balance(#[case] amount: f64, #[case] expected: f64) {
        assert_eq!(clamp_balance(amount), expected);
        assert_eq!(UserUpdate::new().balance(amount).current_balance, Some(expected));
    }
}
