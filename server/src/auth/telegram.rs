//! Telegram Mini App identity assertion verification
//!
//! A Mini App hands the backend its `initData` query string. The string is
//! authenticated with HMAC-SHA256: the secret key is
//! `HMAC-SHA256("WebAppData", bot_token)`, and the signed payload is the
//! sorted `key=value` lines of every field except `hash` itself. The user
//! claim travels as a JSON blob in the `user` field.
//!
//! The bot token never leaves this module; only the derived key is kept.

use ring::hmac;
use serde::Deserialize;
use thiserror::Error;

/// Identity claim extracted from verified init data
#[derive(Debug, Clone)]
pub struct TelegramClaim {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Error)]
pub enum InitDataError {
    #[error("No hash in init data")]
    MissingHash,

    #[error("Invalid Telegram data")]
    SignatureMismatch,

    #[error("No user data in init data")]
    MissingUser,

    #[error("Malformed user claim: {0}")]
    BadUserClaim(String),
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: i64,
    first_name: String,
    #[serde(default)]
    username: Option<String>,
}

/// Verifier holding the key derived from the bot token
#[derive(Clone)]
pub struct TelegramAuth {
    key: hmac::Key,
}

impl TelegramAuth {
    pub fn new(bot_token: &str) -> Self {
        let seed = hmac::Key::new(hmac::HMAC_SHA256, b"WebAppData");
        let secret = hmac::sign(&seed, bot_token.as_bytes());
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_ref()),
        }
    }

    /// Verify an initData string and extract the user claim.
    pub fn verify(&self, init_data: &str) -> Result<TelegramClaim, InitDataError> {
        let mut pairs = parse_pairs(init_data);

        let hash_pos = pairs
            .iter()
            .position(|(key, _)| key == "hash")
            .ok_or(InitDataError::MissingHash)?;
        let (_, provided_hash) = pairs.remove(hash_pos);

        // Data-check string: remaining pairs sorted by key, joined by \n
        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
        let data_check = pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n");

        let tag = hmac::sign(&self.key, data_check.as_bytes());
        let expected =
            hex::decode(provided_hash.as_bytes()).map_err(|_| InitDataError::SignatureMismatch)?;
        ring::constant_time::verify_slices_are_equal(tag.as_ref(), &expected)
            .map_err(|_| InitDataError::SignatureMismatch)?;

        let user_json = pairs
            .iter()
            .find(|(key, _)| key == "user")
            .map(|(_, value)| value.as_str())
            .ok_or(InitDataError::MissingUser)?;

        let raw: RawUser = serde_json::from_str(user_json)
            .map_err(|e| InitDataError::BadUserClaim(e.to_string()))?;

        Ok(TelegramClaim {
            id: raw.id,
            first_name: raw.first_name,
            username: raw.username,
        })
    }
}

/// Split and percent-decode the query-string pairs.
fn parse_pairs(init_data: &str) -> Vec<(String, String)> {
    init_data
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
