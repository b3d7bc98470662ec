//! Summary statistics computed fresh from the visit log
//!
//! Nothing here is materialized: every stats request re-aggregates the
//! link's visits. The visit log is the raw source of truth for the
//! breakdowns; `totalClicks` alone comes from the link counter.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::analytics::device::{self, Device};
use crate::analytics::models::{
    DailyCount, DeviceCount, LinkView, RecentClick, ReferrerCount, StatsResponse, StatsSummary,
};
use crate::models::{Link, Visit};

/// Visits with an empty or absent referrer are grouped under this source.
pub const DIRECT_REFERRER: &str = "Direct";

/// How many of the newest visits the stats payload carries verbatim.
pub const RECENT_CLICKS_LIMIT: usize = 50;

/// Build the statistics payload for a link from its visit log.
///
/// `visits` must be ordered most-recent-first, as returned by
/// `Storage::visits_for_code`. A link with no visits yields a zeroed
/// summary and empty breakdowns.
pub fn build_stats(link: &Link, visits: &[Visit]) -> StatsResponse {
    let unique_visitors = visits
        .iter()
        .map(|v| v.ip_address.as_deref())
        .collect::<HashSet<_>>()
        .len() as i64;

    // BTreeMap keeps the dates ascending
    let mut daily: BTreeMap<String, i64> = BTreeMap::new();
    for visit in visits {
        if let Some(dt) = DateTime::<Utc>::from_timestamp(visit.created_at, 0) {
            *daily.entry(dt.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
        }
    }

    let mut referrers: HashMap<String, i64> = HashMap::new();
    for visit in visits {
        let source = match visit.referrer.as_deref() {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => DIRECT_REFERRER.to_string(),
        };
        *referrers.entry(source).or_insert(0) += 1;
    }
    let mut referrers: Vec<ReferrerCount> = referrers
        .into_iter()
        .map(|(source, count)| ReferrerCount { source, count })
        .collect();
    referrers.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));

    let mut device_counts: HashMap<Device, i64> = HashMap::new();
    for visit in visits {
        let bucket = device::classify(visit.user_agent.as_deref());
        *device_counts.entry(bucket).or_insert(0) += 1;
    }
    let devices: Vec<DeviceCount> = [Device::Mobile, Device::Tablet, Device::Desktop]
        .iter()
        .filter_map(|d| {
            device_counts.get(d).map(|&count| DeviceCount {
                device: d.as_str().to_string(),
                count,
            })
        })
        .collect();

    let recent_clicks: Vec<RecentClick> = visits
        .iter()
        .take(RECENT_CLICKS_LIMIT)
        .map(RecentClick::from)
        .collect();

    StatsResponse {
        url: LinkView::from(link),
        summary: StatsSummary {
            total_clicks: link.clicks,
            unique_visitors,
            last_click: visits.first().map(|v| v.created_at),
            first_click: visits.last().map(|v| v.created_at),
        },
        daily_clicks: daily
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
        referrers,
        devices,
        recent_clicks,
    }
}
