//! HTTP client for the Meta Graph (Marketing) API.
//!
//! Wraps `reqwest` with Graph-specific authentication (`access_token` plus
//! `appsecret_proof` on every request), error-envelope handling, and cursor
//! pagination over account edges. All reads are scoped to a single ad
//! account.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use adpulse_core::AppConfig;

use crate::error::GraphError;
use crate::insights::InsightsWindow;
use crate::probe::ConnectionProbe;
use crate::proof::appsecret_proof;
use crate::types::{
    Ad, AdAccount, AdImage, AdSet, Campaign, CustomAudience, ErrorEnvelope, InsightsRow, Page,
};

const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum number of pages followed per edge before giving up.
/// Prevents infinite loops on cycling cursors.
pub(crate) const MAX_PAGES: usize = 200;

pub const ACCOUNT_FIELDS: &[&str] = &[
    "id",
    "name",
    "account_status",
    "age",
    "amount_spent",
    "balance",
    "business",
    "currency",
    "timezone_name",
];

pub const CAMPAIGN_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "objective",
    "created_time",
    "updated_time",
    "start_time",
    "stop_time",
];

pub const AD_SET_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "campaign_id",
    "created_time",
    "updated_time",
    "start_time",
    "end_time",
];

pub const AD_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "adset_id",
    "campaign_id",
    "created_time",
    "updated_time",
];

pub const CUSTOM_AUDIENCE_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "approximate_count_lower_bound",
    "approximate_count_upper_bound",
    "data_source",
    "subtype",
];

pub const AD_IMAGE_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "created_time",
    "updated_time",
    "width",
    "height",
];

pub const INSIGHTS_FIELDS: &[&str] = &[
    "impressions",
    "clicks",
    "spend",
    "reach",
    "frequency",
    "ctr",
    "cpm",
    "cpp",
];

const PROBE_FIELDS: &[&str] = &["id", "name", "account_status"];

/// Secrets and account identity for one Graph API app/account pair.
#[derive(Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
    pub access_token: String,
    pub ad_account_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[redacted]")
            .field("access_token", &"[redacted]")
            .field("ad_account_id", &self.ad_account_id)
            .finish()
    }
}

impl From<&AppConfig> for Credentials {
    fn from(config: &AppConfig) -> Self {
        Self {
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            access_token: config.access_token.clone(),
            ad_account_id: config.ad_account_id.clone(),
        }
    }
}

/// Authenticated client for one ad account.
///
/// Use [`GraphClient::from_config`] for production or
/// [`GraphClient::with_base_url`] to point at a mock server in tests.
pub struct GraphClient {
    client: Client,
    /// Versioned API root, always ending in `/` (`https://graph.facebook.com/v21.0/`).
    api_root: Url,
    ad_account_id: String,
    access_token: String,
    appsecret_proof: String,
    page_size: u32,
}

impl GraphClient {
    /// Creates a client with a custom base URL and API version.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GraphError::InvalidBaseUrl`] if `base_url` is not a usable URL.
    pub fn with_base_url(
        credentials: &Credentials,
        timeout_secs: u64,
        base_url: &str,
        api_version: &str,
    ) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("adpulse/0.1 (ads-reader)")
            .build()?;

        let mut root = base_url.trim_end_matches('/').to_owned();
        let version = api_version.trim_matches('/');
        if !version.is_empty() {
            root.push('/');
            root.push_str(version);
        }
        root.push('/');

        let api_root = Url::parse(&root).map_err(|e| GraphError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if api_root.cannot_be_a_base() {
            return Err(GraphError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        let appsecret_proof = appsecret_proof(&credentials.app_secret, &credentials.access_token)?;

        tracing::info!(
            app_id = %credentials.app_id,
            account_id = %credentials.ad_account_id,
            api_root = %api_root,
            "Graph API client initialized"
        );

        Ok(Self {
            client,
            api_root,
            ad_account_id: credentials.ad_account_id.clone(),
            access_token: credentials.access_token.clone(),
            appsecret_proof,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Builds a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`GraphClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, GraphError> {
        let client = Self::with_base_url(
            &Credentials::from(config),
            config.request_timeout_secs,
            &config.graph_base_url,
            &config.graph_api_version,
        )?;
        Ok(client.with_page_size(config.page_size))
    }

    /// Sets the `limit` sent with edge listings. Zero is clamped to one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Reads fields of the ad account node itself.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Api`] if the API returns an error envelope.
    /// - [`GraphError::Http`] on network failure.
    /// - [`GraphError::Deserialize`] if the body does not match `T`.
    pub async fn read<T: DeserializeOwned>(&self, fields: &[&str]) -> Result<T, GraphError> {
        let url = self.endpoint_url(&self.ad_account_id, fields, &[])?;
        let body = self.request_json(&url, &self.ad_account_id).await?;
        serde_json::from_value(body).map_err(|e| GraphError::Deserialize {
            context: format!("read({})", self.ad_account_id),
            source: e,
        })
    }

    /// Lists every record on an account edge, following `paging.next` until
    /// the last page.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Api`] if any page returns an error envelope.
    /// - [`GraphError::Http`] on network failure.
    /// - [`GraphError::Deserialize`] if a page does not match `T`.
    /// - [`GraphError::InvalidPagingUrl`] if a next-page URL is malformed or
    ///   leaves the API origin.
    /// - [`GraphError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub async fn list<T: DeserializeOwned>(
        &self,
        edge: &str,
        fields: &[&str],
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, GraphError> {
        let path = format!("{}/{edge}", self.ad_account_id);
        let limit = self.page_size.to_string();
        let mut query = vec![("limit", limit.as_str())];
        query.extend_from_slice(params);

        let mut url = self.endpoint_url(&path, fields, &query)?;
        let mut records = Vec::new();

        for page_number in 1..=MAX_PAGES {
            let body = self.request_json(&url, edge).await?;
            let page: Page<T> =
                serde_json::from_value(body).map_err(|e| GraphError::Deserialize {
                    context: format!("{edge} page {page_number}"),
                    source: e,
                })?;
            records.extend(page.data);

            match page.paging.and_then(|p| p.next) {
                Some(next) => url = self.next_page_url(edge, &next)?,
                None => return Ok(records),
            }
        }

        Err(GraphError::PaginationLimit {
            edge: edge.to_owned(),
            max_pages: MAX_PAGES,
        })
    }

    /// Fetches ad account metadata.
    ///
    /// # Errors
    ///
    /// See [`GraphClient::read`].
    pub async fn get_account_info(&self) -> Result<AdAccount, GraphError> {
        tracing::info!("fetching account information");
        let account: AdAccount = self.read(ACCOUNT_FIELDS).await?;
        tracing::info!(
            account_id = %account.id,
            account_name = account.name.as_deref().unwrap_or_default(),
            status = ?account.account_status,
            "account information retrieved"
        );
        Ok(account)
    }

    /// # Errors
    ///
    /// See [`GraphClient::list`].
    pub async fn get_campaigns(&self) -> Result<Vec<Campaign>, GraphError> {
        let campaigns: Vec<Campaign> = self.list_logged("campaigns", CAMPAIGN_FIELDS).await?;
        for c in &campaigns {
            tracing::debug!(id = %c.id, name = ?c.name, status = ?c.status, "campaign");
        }
        Ok(campaigns)
    }

    /// # Errors
    ///
    /// See [`GraphClient::list`].
    pub async fn get_ad_sets(&self) -> Result<Vec<AdSet>, GraphError> {
        let ad_sets: Vec<AdSet> = self.list_logged("adsets", AD_SET_FIELDS).await?;
        for a in &ad_sets {
            tracing::debug!(id = %a.id, name = ?a.name, status = ?a.status, "ad set");
        }
        Ok(ad_sets)
    }

    /// # Errors
    ///
    /// See [`GraphClient::list`].
    pub async fn get_ads(&self) -> Result<Vec<Ad>, GraphError> {
        let ads: Vec<Ad> = self.list_logged("ads", AD_FIELDS).await?;
        for a in &ads {
            tracing::debug!(id = %a.id, name = ?a.name, status = ?a.status, "ad");
        }
        Ok(ads)
    }

    /// # Errors
    ///
    /// See [`GraphClient::list`].
    pub async fn get_custom_audiences(&self) -> Result<Vec<CustomAudience>, GraphError> {
        let audiences: Vec<CustomAudience> = self
            .list_logged("customaudiences", CUSTOM_AUDIENCE_FIELDS)
            .await?;
        for a in &audiences {
            tracing::debug!(id = %a.id, name = ?a.name, subtype = ?a.subtype, "custom audience");
        }
        Ok(audiences)
    }

    /// # Errors
    ///
    /// See [`GraphClient::list`].
    pub async fn get_ad_images(&self) -> Result<Vec<AdImage>, GraphError> {
        let images: Vec<AdImage> = self.list_logged("adimages", AD_IMAGE_FIELDS).await?;
        for i in &images {
            tracing::debug!(id = %i.id, name = ?i.name, status = ?i.status, "ad image");
        }
        Ok(images)
    }

    /// Fetches account-level insights over `window`.
    ///
    /// # Errors
    ///
    /// See [`GraphClient::list`].
    pub async fn get_insights(
        &self,
        window: InsightsWindow,
    ) -> Result<Vec<InsightsRow>, GraphError> {
        let time_range = window.time_range_param();
        tracing::info!(since = %window.since, until = %window.until, "fetching insights");
        let rows: Vec<InsightsRow> = self
            .list(
                "insights",
                INSIGHTS_FIELDS,
                &[("time_range", time_range.as_str()), ("level", "account")],
            )
            .await?;
        tracing::info!(
            count = rows.len(),
            since = %window.since,
            until = %window.until,
            "insights retrieved"
        );
        Ok(rows)
    }

    /// Reads a minimal field set from the account to confirm the token and
    /// account id are usable. Failures are reported in the probe, not as `Err`.
    pub async fn test_connection(&self) -> ConnectionProbe {
        match self.read::<AdAccount>(PROBE_FIELDS).await {
            Ok(account) => {
                tracing::info!(
                    account_id = %account.id,
                    account_name = account.name.as_deref().unwrap_or_default(),
                    status = ?account.account_status,
                    "Graph API connection test successful"
                );
                ConnectionProbe {
                    success: true,
                    account: Some(account.into()),
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Graph API connection test failed");
                ConnectionProbe {
                    success: false,
                    account: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn list_logged<T: DeserializeOwned>(
        &self,
        edge: &str,
        fields: &[&str],
    ) -> Result<Vec<T>, GraphError> {
        tracing::info!(edge, "fetching edge");
        let records: Vec<T> = self.list(edge, fields, &[]).await?;
        tracing::info!(edge, count = records.len(), "edge retrieved");
        Ok(records)
    }

    /// Builds `{api_root}{path}?fields=..&access_token=..&appsecret_proof=..`
    /// plus any extra query parameters.
    fn endpoint_url(
        &self,
        path: &str,
        fields: &[&str],
        extra: &[(&str, &str)],
    ) -> Result<Url, GraphError> {
        let mut url = self
            .api_root
            .join(path)
            .map_err(|e| GraphError::InvalidBaseUrl {
                url: self.api_root.to_string(),
                reason: format!("cannot join path '{path}': {e}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            if !fields.is_empty() {
                pairs.append_pair("fields", &fields.join(","));
            }
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("access_token", &self.access_token);
            pairs.append_pair("appsecret_proof", &self.appsecret_proof);
        }
        Ok(url)
    }

    /// Validates a `paging.next` URL and makes sure it carries credentials.
    ///
    /// Next links must share the API root's origin so the access token is
    /// never sent elsewhere.
    fn next_page_url(&self, edge: &str, next: &str) -> Result<Url, GraphError> {
        let mut url = Url::parse(next).map_err(|e| GraphError::InvalidPagingUrl {
            edge: edge.to_owned(),
            reason: e.to_string(),
        })?;
        if url.origin() != self.api_root.origin() {
            return Err(GraphError::InvalidPagingUrl {
                edge: edge.to_owned(),
                reason: format!(
                    "origin {} differs from API root",
                    url.origin().ascii_serialization()
                ),
            });
        }

        let has = |key: &str| url.query_pairs().any(|(k, _)| k == key);
        let needs_token = !has("access_token");
        let needs_proof = !has("appsecret_proof");
        if needs_token || needs_proof {
            let mut pairs = url.query_pairs_mut();
            if needs_token {
                pairs.append_pair("access_token", &self.access_token);
            }
            if needs_proof {
                pairs.append_pair("appsecret_proof", &self.appsecret_proof);
            }
        }
        Ok(url)
    }

    /// Sends a GET request and returns the parsed JSON body.
    ///
    /// Graph error envelopes are surfaced as [`GraphError::Api`] regardless
    /// of HTTP status; other non-2xx responses become
    /// [`GraphError::UnexpectedStatus`]. `context` names the node or edge
    /// and is used instead of the URL so tokens stay out of error messages.
    async fn request_json(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<serde_json::Value, GraphError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(redact)?;
        let status = response.status();
        let body = response.text().await.map_err(redact)?;

        if let Some(err) = parse_api_error(&body) {
            return Err(err);
        }
        if !status.is_success() {
            return Err(GraphError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: context.to_owned(),
            });
        }

        serde_json::from_str(&body).map_err(|e| GraphError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

fn redact(err: reqwest::Error) -> GraphError {
    GraphError::Http(err.without_url())
}

fn parse_api_error(body: &str) -> Option<GraphError> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let error = envelope.error;
    Some(GraphError::Api {
        code: error.code.unwrap_or_default(),
        kind: error.kind.unwrap_or_else(|| "Unknown".to_owned()),
        message: error.message,
        fbtrace_id: error.fbtrace_id,
    })
}
