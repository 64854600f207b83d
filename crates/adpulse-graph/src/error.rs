use thiserror::Error;

/// Errors returned by the Graph API client.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Network or TLS failure from the underlying HTTP client. The request
    /// URL is stripped before wrapping so access tokens never reach logs.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Graph API returned an `{"error": {...}}` envelope.
    #[error("{message} (code {code}, {kind})")]
    Api {
        code: i64,
        kind: String,
        message: String,
        fbtrace_id: Option<String>,
    },

    /// Non-2xx status without a parseable Graph error body.
    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for {edge}: exceeded {max_pages} pages")]
    PaginationLimit { edge: String, max_pages: usize },

    /// `paging.next` could not be parsed or points at a different origin.
    #[error("invalid paging URL for {edge}: {reason}")]
    InvalidPagingUrl { edge: String, reason: String },

    #[error("invalid Graph API base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}
