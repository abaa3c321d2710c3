use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("completion API returned no content")]
    EmptyResponse,

    #[error("invalid JSON in completion: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("completion is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("no API key configured for copy generation")]
    MissingApiKey,
}
