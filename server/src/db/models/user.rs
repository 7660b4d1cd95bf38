//! User Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

pub const USER_TABLE: &str = "user";

/// Marketplace role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Farmer,
    Consumer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Farmer => "farmer",
            UserRole::Consumer => "consumer",
        }
    }

    /// Parse a role string from the API. `None` outside the two roles.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "farmer" => Some(UserRole::Farmer),
            "consumer" => Some(UserRole::Consumer),
            _ => None,
        }
    }
}

/// User record
///
/// Created on first verified Telegram login (or first order referencing an
/// unknown telegram id). `telegram_id` carries a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub telegram_id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub farm_description: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Display-friendly user projection used when order references are expanded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBrief {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub telegram_id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

impl From<User> for UserBrief {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            telegram_id: u.telegram_id,
            first_name: u.first_name,
            username: u.username,
            farm_name: u.farm_name,
            location: u.location,
            phone_number: u.phone_number,
            delivery_address: u.delivery_address,
        }
    }
}

/// A user identifier as supplied by callers: either an internal record id
/// (`user:<key>`) or an external Telegram id (numeric).
///
/// Callers built against different identity schemes pass either kind of
/// value interchangeably; the format is sniffed once here instead of being
/// re-guessed at every boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum UserRef {
    Record(RecordId),
    Telegram(i64),
}

impl UserRef {
    /// Parse an identifier string. `None` when the value fits neither
    /// format.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        // Record-id form first: "user:abc123". A bare number never contains
        // a colon, so the two formats cannot shadow each other.
        if let Ok(id) = raw.parse::<RecordId>()
            && id.table() == USER_TABLE
        {
            return Some(UserRef::Record(id));
        }
        raw.parse::<i64>().ok().map(UserRef::Telegram)
    }
}

impl From<i64> for UserRef {
    fn from(telegram_id: i64) -> Self {
        UserRef::Telegram(telegram_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_record_id_form() {
        let r = UserRef::parse("user:abc123").expect("should parse");
        assert!(matches!(r, UserRef::Record(_)));
    }

    #[test]
    fn parses_numeric_as_telegram_id() {
        assert_eq!(UserRef::parse("12345"), Some(UserRef::Telegram(12345)));
        assert_eq!(UserRef::parse(" 42 "), Some(UserRef::Telegram(42)));
    }

    #[test]
    fn rejects_foreign_table_and_garbage() {
        assert_eq!(UserRef::parse("product:abc"), None);
        assert_eq!(UserRef::parse("not-an-id"), None);
        assert_eq!(UserRef::parse(""), None);
    }
}
