//! Image Reference Model
//!
//! Maps a content hash to the hosted image URL so repeated uploads of the
//! same bytes are served from the existing host entry.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

pub const IMAGE_REF_TABLE: &str = "image_ref";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// SHA-256 of the compressed JPEG bytes (unique index)
    pub hash: String,
    pub url: String,
    pub size: i64,
    #[serde(default)]
    pub created_at: i64,
}
