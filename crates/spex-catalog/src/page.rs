use select::document::Document;
use spex_crawler::{Fetch, FetchError};
use url::Url;

use crate::error::CatalogError;

/// Fetches a page and parses it into a navigable document.
pub async fn fetch_document<F: Fetch>(fetcher: &F, url: &str) -> Result<Document, FetchError> {
    let body = fetcher.fetch(url).await?;
    Ok(Document::from(body.as_str()))
}

/// Resolves `href` against `base`, the way a browser would.
pub(crate) fn absolute(base: &Url, href: &str, page_url: &str) -> Result<String, CatalogError> {
    base.join(href)
        .map(String::from)
        .map_err(|e| CatalogError::parse(page_url, format!("invalid link {href:?}: {e}")))
}
