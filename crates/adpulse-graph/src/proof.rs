//! `appsecret_proof` computation.
//!
//! The Graph API rejects calls from apps with "Require App Secret" enabled
//! unless each request carries the HMAC-SHA256 of the access token, keyed by
//! the app secret, as lowercase hex.

use std::fmt::Write;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::GraphError;

type HmacSha256 = Hmac<Sha256>;

pub(crate) fn appsecret_proof(app_secret: &str, access_token: &str) -> Result<String, GraphError> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .map_err(|e| GraphError::InvalidCredentials(e.to_string()))?;
    mac.update(access_token.as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(digest
        .iter()
        .fold(String::with_capacity(digest.len() * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        }))
}
