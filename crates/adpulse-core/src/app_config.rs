use std::path::PathBuf;

/// Runtime configuration for the poller, built once at startup and passed
/// explicitly to the client, orchestrator, and trigger.
#[derive(Clone)]
pub struct AppConfig {
    pub app_id: String,
    pub app_secret: String,
    pub access_token: String,
    /// Ad account in Graph API form, always prefixed with `act_`.
    pub ad_account_id: String,
    pub schedule_cron: String,
    pub scheduling_enabled: bool,
    pub log_level: String,
    /// `None` disables file logging.
    pub log_file: Option<PathBuf>,
    pub graph_base_url: String,
    pub graph_api_version: String,
    pub request_timeout_secs: u64,
    /// Upper bound for a single fetch operation; `0` means unbounded.
    pub operation_timeout_secs: u64,
    pub page_size: u32,
    pub insights_days: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[redacted]")
            .field("access_token", &"[redacted]")
            .field("ad_account_id", &self.ad_account_id)
            .field("schedule_cron", &self.schedule_cron)
            .field("scheduling_enabled", &self.scheduling_enabled)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("graph_base_url", &self.graph_base_url)
            .field("graph_api_version", &self.graph_api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .field("page_size", &self.page_size)
            .field("insights_days", &self.insights_days)
            .finish()
    }
}
