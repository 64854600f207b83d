//! Trailing date window for account insights.

use chrono::{DateTime, Days, NaiveDate, Utc};

/// Inclusive `[since, until]` range of UTC calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightsWindow {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl InsightsWindow {
    /// Window ending on `now`'s UTC date and starting `days` days earlier.
    #[must_use]
    pub fn trailing(days: u32, now: DateTime<Utc>) -> Self {
        let until = now.date_naive();
        let since = until
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { since, until }
    }

    /// Value for the Graph `time_range` query parameter.
    #[must_use]
    pub fn time_range_param(&self) -> String {
        serde_json::json!({
            "since": self.since.format("%Y-%m-%d").to_string(),
            "until": self.until.format("%Y-%m-%d").to_string(),
        })
        .to_string()
    }
}
