use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted short link: code, destination and click counter.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub clicks: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One immutable record of a single redirect event.
///
/// IP, user agent and referrer are stored as opaque strings exactly as
/// received; they are never validated or normalized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Visit {
    pub id: i64,
    pub short_code: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeRequest {
    pub original_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeQuery {
    pub short_url: Option<String>,
}
