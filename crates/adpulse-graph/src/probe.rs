use serde::Serialize;

use crate::types::AdAccount;

/// Result of a lightweight connectivity check against the ad account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProbe {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<ProbeAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeAccount {
    pub id: String,
    pub name: Option<String>,
    pub account_status: Option<i64>,
}

impl From<AdAccount> for ProbeAccount {
    fn from(account: AdAccount) -> Self {
        Self {
            id: account.id,
            name: account.name,
            account_status: account.account_status,
        }
    }
}
