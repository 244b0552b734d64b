use std::io;

use spex_crawler::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unexpected page structure at {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("no spotlight metrics on {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("brand doesn't exist: {0}")]
    UnknownBrand(String),
}

impl CatalogError {
    pub(crate) fn parse(url: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn extraction(url: &str, reason: impl Into<String>) -> Self {
        Self::Extraction {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("couldn't serialize record for {model_name}: {source}")]
    Json {
        model_name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures that abort a whole brand pass.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("couldn't fetch first listing page of {brand}: {source}")]
    Fetch {
        brand: String,
        #[source]
        source: FetchError,
    },

    #[error("couldn't walk listing of {brand}: {source}")]
    Listing {
        brand: String,
        #[source]
        source: CatalogError,
    },

    #[error("storage failure for {brand}: {source}")]
    Store {
        brand: String,
        #[source]
        source: StoreError,
    },
}
