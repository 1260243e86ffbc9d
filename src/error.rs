use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Request to {url} returned status {status}")]
    UnexpectedStatus { url: String, status: u16 },
    #[error("Couldn't resolve a URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Cache (de)serialization failed: {0}")]
    Cache(#[from] bincode::Error),
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}
