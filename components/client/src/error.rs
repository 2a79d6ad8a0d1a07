#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Unexpected Status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("Unexpected Response Shape")]
    UnexpectedShape,

    #[error("Request Error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}
