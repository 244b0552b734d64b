use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("couldn't build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("invalid pacing delay of {0} seconds")]
    Delay(f32),
}
