use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

const REQUIRED_VARS: [&str; 4] = [
    "META_APP_ID",
    "META_APP_SECRET",
    "META_ACCESS_TOKEN",
    "META_AD_ACCOUNT_ID",
];

const AD_ACCOUNT_PREFIX: &str = "act_";

/// Longest insights lookback accepted, in days (three years).
const MAX_INSIGHTS_DAYS: u32 = 1095;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so tests can
/// drive them with a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    // Empty values count as missing.
    let present = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let missing: Vec<String> = REQUIRED_VARS
        .iter()
        .filter(|var| present(var).is_none())
        .map(|var| (*var).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingEnvVars(missing));
    }

    let ad_account_id = present("META_AD_ACCOUNT_ID").unwrap_or_default();
    if !ad_account_id.starts_with(AD_ACCOUNT_PREFIX) {
        return Err(ConfigError::InvalidEnvVar {
            var: "META_AD_ACCOUNT_ID".to_string(),
            reason: format!("must start with \"{AD_ACCOUNT_PREFIX}\""),
        });
    }

    let page_size = parse_u32("META_PAGE_SIZE", "100")?;
    if page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "META_PAGE_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let insights_days = parse_u32("META_INSIGHTS_DAYS", "7")?;
    if insights_days > MAX_INSIGHTS_DAYS {
        return Err(ConfigError::InvalidEnvVar {
            var: "META_INSIGHTS_DAYS".to_string(),
            reason: format!("must be at most {MAX_INSIGHTS_DAYS}"),
        });
    }

    let log_file = Some(or_default("LOG_FILE", "logs/adpulse.log"))
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        app_id: present("META_APP_ID").unwrap_or_default(),
        app_secret: present("META_APP_SECRET").unwrap_or_default(),
        access_token: present("META_ACCESS_TOKEN").unwrap_or_default(),
        ad_account_id,
        schedule_cron: or_default("SCHEDULE_CRON", "0 */6 * * *"),
        scheduling_enabled: parse_enabled(&or_default("ENABLE_SCHEDULING", "false")),
        log_level: or_default("LOG_LEVEL", "info"),
        log_file,
        graph_base_url: or_default("META_GRAPH_BASE_URL", "https://graph.facebook.com"),
        graph_api_version: or_default("META_GRAPH_API_VERSION", "v21.0"),
        request_timeout_secs: parse_u64("META_REQUEST_TIMEOUT_SECS", "30")?,
        operation_timeout_secs: parse_u64("META_OPERATION_TIMEOUT_SECS", "300")?,
        page_size,
        insights_days,
    })
}

/// Only a literal `true` turns scheduling on; anything else leaves it off.
fn parse_enabled(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated with valid values.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("META_APP_ID", "1234567890");
        m.insert("META_APP_SECRET", "app-secret");
        m.insert("META_ACCESS_TOKEN", "EAAB-token");
        m.insert("META_AD_ACCOUNT_ID", "act_987654321");
        m
    }

    #[test]
    fn build_app_config_lists_every_missing_var() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        match result {
            Err(ConfigError::MissingEnvVars(vars)) => assert_eq!(
                vars,
                vec![
                    "META_APP_ID",
                    "META_APP_SECRET",
                    "META_ACCESS_TOKEN",
                    "META_AD_ACCOUNT_ID"
                ]
            ),
            other => panic!("expected MissingEnvVars, got: {other:?}"),
        }
    }

    #[test]
    fn missing_env_vars_message_joins_names() {
        let err = ConfigError::MissingEnvVars(vec![
            "META_APP_ID".to_string(),
            "META_ACCESS_TOKEN".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "missing required environment variables: META_APP_ID, META_ACCESS_TOKEN"
        );
    }

    #[test]
    fn empty_required_var_counts_as_missing() {
        let mut map = full_env();
        map.insert("META_ACCESS_TOKEN", "");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVars(ref v)) if v == &["META_ACCESS_TOKEN"]),
            "expected MissingEnvVars([META_ACCESS_TOKEN]), got: {result:?}"
        );
    }

    #[test]
    fn ad_account_without_act_prefix_is_rejected() {
        let mut map = full_env();
        map.insert("META_AD_ACCOUNT_ID", "987654321");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "META_AD_ACCOUNT_ID"),
            "expected InvalidEnvVar(META_AD_ACCOUNT_ID), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_all_required_vars() {
        let map = full_env();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.app_id, "1234567890");
        assert_eq!(cfg.ad_account_id, "act_987654321");
        assert_eq!(cfg.schedule_cron, "0 */6 * * *");
        assert!(!cfg.scheduling_enabled);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.log_file, Some(PathBuf::from("logs/adpulse.log")));
        assert_eq!(cfg.graph_base_url, "https://graph.facebook.com");
        assert_eq!(cfg.graph_api_version, "v21.0");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.operation_timeout_secs, 300);
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.insights_days, 7);
    }

    #[test]
    fn scheduling_enabled_only_for_true() {
        let mut map = full_env();
        map.insert("ENABLE_SCHEDULING", "true");
        assert!(build_app_config(lookup_from_map(&map)).unwrap().scheduling_enabled);

        map.insert("ENABLE_SCHEDULING", "TRUE");
        assert!(build_app_config(lookup_from_map(&map)).unwrap().scheduling_enabled);

        map.insert("ENABLE_SCHEDULING", "yes");
        assert!(!build_app_config(lookup_from_map(&map)).unwrap().scheduling_enabled);

        map.insert("ENABLE_SCHEDULING", "1");
        assert!(!build_app_config(lookup_from_map(&map)).unwrap().scheduling_enabled);
    }

    #[test]
    fn schedule_cron_override() {
        let mut map = full_env();
        map.insert("SCHEDULE_CRON", "*/15 * * * *");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.schedule_cron, "*/15 * * * *");
    }

    #[test]
    fn empty_log_file_disables_file_logging() {
        let mut map = full_env();
        map.insert("LOG_FILE", "");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn insights_days_override() {
        let mut map = full_env();
        map.insert("META_INSIGHTS_DAYS", "30");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.insights_days, 30);
    }

    #[test]
    fn insights_days_invalid() {
        let mut map = full_env();
        map.insert("META_INSIGHTS_DAYS", "a week");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "META_INSIGHTS_DAYS"),
            "expected InvalidEnvVar(META_INSIGHTS_DAYS), got: {result:?}"
        );
    }

    #[test]
    fn insights_days_above_limit_is_rejected() {
        let mut map = full_env();
        map.insert("META_INSIGHTS_DAYS", "100000");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, ref reason })
                if var == "META_INSIGHTS_DAYS" && reason == "must be at most 1095"),
            "expected InvalidEnvVar(META_INSIGHTS_DAYS), got: {result:?}"
        );
    }

    #[test]
    fn insights_days_at_limit_is_accepted() {
        let mut map = full_env();
        map.insert("META_INSIGHTS_DAYS", "1095");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.insights_days, 1095);
    }

    #[test]
    fn request_timeout_invalid() {
        let mut map = full_env();
        map.insert("META_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "META_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(META_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut map = full_env();
        map.insert("META_PAGE_SIZE", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "META_PAGE_SIZE"),
            "expected InvalidEnvVar(META_PAGE_SIZE), got: {result:?}"
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("app-secret"));
        assert!(!rendered.contains("EAAB-token"));
        assert!(rendered.contains("act_987654321"));
    }
}
