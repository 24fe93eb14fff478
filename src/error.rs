use thiserror::Error;

/// A payload for a kind that should notify is missing a field or has it with the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {kind} payload: missing or invalid field `{field}`")]
pub struct MalformedPayload {
    pub kind: &'static str,
    pub field: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request to chat platform failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat platform rejected message ({status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
