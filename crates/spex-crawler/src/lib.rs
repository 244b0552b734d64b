mod config;
mod error;
mod fetch;
mod pacing;

pub use config::{CrawlerConfig, OnError, Pacing};
pub use error::FetchError;
pub use fetch::{Fetch, HttpFetcher};
pub use pacing::{Pacer, TokenBucket};
