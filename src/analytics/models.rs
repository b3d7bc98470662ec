//! Wire models for the statistics endpoint

use serde::Serialize;

use crate::models::{Link, Visit};

/// Public view of a link, camelCase to match the original API consumers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    pub original_url: String,
    pub short_url: String,
    pub url_path: String,
    pub clicks: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Link> for LinkView {
    fn from(link: &Link) -> Self {
        Self {
            original_url: link.original_url.clone(),
            short_url: link.short_url.clone(),
            url_path: link.short_code.clone(),
            clicks: link.clicks,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// From the link's counter, not derived from the visit log. The two
    /// may diverge when a visit append fails after the increment.
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub last_click: Option<i64>,
    pub first_click: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyCount {
    /// UTC calendar date, `YYYY-MM-DD`
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferrerCount {
    pub source: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceCount {
    pub device: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentClick {
    pub timestamp: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl From<&Visit> for RecentClick {
    fn from(visit: &Visit) -> Self {
        Self {
            timestamp: visit.created_at,
            ip_address: visit.ip_address.clone(),
            user_agent: visit.user_agent.clone(),
            referrer: visit.referrer.clone(),
        }
    }
}

/// Full statistics payload for one short code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub url: LinkView,
    pub summary: StatsSummary,
    pub daily_clicks: Vec<DailyCount>,
    pub referrers: Vec<ReferrerCount>,
    pub devices: Vec<DeviceCount>,
    pub recent_clicks: Vec<RecentClick>,
}
