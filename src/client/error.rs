use thiserror::Error;

/// Coarse classification used by the UI and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Network,
    Decode,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed directory payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unreadable avatar image: {0}")]
    Image(#[from] image::ImageError),
}

impl FetchError {
    pub fn kind(&self) -> FaultKind {
        match self {
            FetchError::Network(_) | FetchError::Status(_) => FaultKind::Network,
            FetchError::Decode(_) | FetchError::Image(_) => FaultKind::Decode,
        }
    }
}
