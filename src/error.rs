use thiserror::Error;

/// Failures that reach the caller of the extraction core.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// DOM heuristics were the only strategy left but no rendered DOM was supplied.
    #[error("rendered DOM unavailable: {0}")]
    CapabilityUnavailable(String),
}

/// Failures of a single DOM access. Always contained by the caller.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),
}

#[derive(Debug, Error)]
pub enum ShareLinkError {
    #[error("share page request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no shareInfo assignment found on share page")]
    MissingShareInfo,
    #[error("shareInfo is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("shareInfo carries no share id")]
    MissingShareId,
    #[error("could not build landing url: {0}")]
    Url(#[from] url::ParseError),
}
