use lazy_static::lazy_static;
use regex::Regex;
use select::document::Document;
use select::predicate::Name;
use spex_crawler::Fetch;
use url::Url;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::model::Brand;
use crate::page::{absolute, fetch_document};

lazy_static! {
    static ref MODEL_COUNT: Regex = Regex::new(r"\d+").unwrap();
}

/// Fetches the brand index and lists every brand in page order.
pub async fn fetch_brands<F: Fetch>(
    fetcher: &F,
    config: &CatalogConfig,
) -> Result<Vec<Brand>, CatalogError> {
    let url = config
        .brands_url()
        .map_err(|e| CatalogError::parse(config.base_url.as_str(), e.to_string()))?;
    let document = fetch_document(fetcher, url.as_str()).await?;
    let brands = parse_brands(&document, &config.base_url, url.as_str())?;
    log::info!("Found {} brands on {url}", brands.len());
    Ok(brands)
}

/// Reads the brand table of an index page.
///
/// Every cell is expected to hold one anchor whose text is the brand name
/// directly followed by its model count, e.g. `Acer59 devices`.
pub fn parse_brands(
    document: &Document,
    base: &Url,
    page_url: &str,
) -> Result<Vec<Brand>, CatalogError> {
    let table = document
        .find(Name("table"))
        .next()
        .ok_or_else(|| CatalogError::parse(page_url, "no brand table"))?;

    let mut brands = vec![];
    for row in table.find(Name("tr")) {
        for cell in row.find(Name("td")) {
            let href = cell
                .find(Name("a"))
                .next()
                .and_then(|a| a.attr("href"))
                .ok_or_else(|| CatalogError::parse(page_url, "brand cell without link"))?;
            let listing_url = absolute(base, href, page_url)?;

            let text = cell.text();
            let count = MODEL_COUNT.find(&text).ok_or_else(|| {
                CatalogError::parse(page_url, format!("no model count in {text:?}"))
            })?;
            let display_name = text[..count.start()].trim().to_string();
            let advertised_model_count = count.as_str().parse().map_err(|_| {
                CatalogError::parse(page_url, format!("model count out of range in {text:?}"))
            })?;

            brands.push(Brand {
                listing_url,
                display_name,
                advertised_model_count,
            });
        }
    }

    Ok(brands)
}
