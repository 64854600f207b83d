//! Graph API response types.
//!
//! Field lists mirror what [`crate::GraphClient`] requests; everything except
//! the object id is optional because the API omits fields that are unset.
//! Timestamps are kept as the raw strings the API returns
//! (`2024-03-01T10:00:00+0000`).

use serde::Deserialize;

/// One page of an edge listing: `{ "data": [...], "paging": {...} }`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub(crate) struct Page<T> {
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Paging {
    /// Absolute URL of the next page; absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// Error envelope: `{ "error": { "message": ..., "type": ..., "code": ... } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

/// Business that owns an ad account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Ad account metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdAccount {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// 1 = active, 2 = disabled, 3 = unsettled, others per Graph docs.
    #[serde(default)]
    pub account_status: Option<i64>,
    /// Account age in days.
    #[serde(default)]
    pub age: Option<f64>,
    /// Lifetime spend in the account currency's minor unit, as a string.
    #[serde(default)]
    pub amount_spent: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default)]
    pub business: Option<BusinessRef>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub timezone_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Campaign {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub stop_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdSet {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ad {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub adset_id: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomAudience {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub approximate_count_lower_bound: Option<i64>,
    #[serde(default)]
    pub approximate_count_upper_bound: Option<i64>,
    /// Free-form object (`{"type": ..., "sub_type": ...}`).
    #[serde(default)]
    pub data_source: Option<serde_json::Value>,
    #[serde(default)]
    pub subtype: Option<String>,
}

/// Creative image in the account's image library. Images are keyed by
/// `hash` in most Graph calls; `id` is `{account}:{hash}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdImage {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

/// One row of account-level insights. The Graph API returns metric values
/// as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsRow {
    #[serde(default)]
    pub impressions: Option<String>,
    #[serde(default)]
    pub clicks: Option<String>,
    #[serde(default)]
    pub spend: Option<String>,
    #[serde(default)]
    pub reach: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub ctr: Option<String>,
    #[serde(default)]
    pub cpm: Option<String>,
    #[serde(default)]
    pub cpp: Option<String>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_stop: Option<String>,
}
