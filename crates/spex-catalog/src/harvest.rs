use spex_crawler::{CrawlerConfig, Fetch, FetchError, HttpFetcher, Pacer};

use crate::brands::fetch_brands;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, UpdateError};
use crate::model::Brand;
use crate::store::{JsonLinesStore, Store};
use crate::update::{UpdateOutcome, Updater};

/// Outcome of one brand's pass.
#[derive(Debug)]
pub struct BrandRun {
    pub brand: Brand,
    pub result: Result<UpdateOutcome, UpdateError>,
}

/// Drives update passes over the whole brand index.
#[derive(Debug)]
pub struct Harvester<F, S> {
    updater: Updater<F, S>,
    config: CatalogConfig,
}

impl Harvester<HttpFetcher, JsonLinesStore> {
    /// Must be called from within a tokio runtime, see [`Pacer::new`].
    pub fn from_config(
        crawler_conf: &CrawlerConfig,
        catalog_conf: CatalogConfig,
    ) -> Result<Self, FetchError> {
        let updater = Updater::new(
            HttpFetcher::new(crawler_conf)?,
            JsonLinesStore::new(&catalog_conf.output_dir),
            Pacer::new(crawler_conf.pacing)?,
            catalog_conf.base_url.clone(),
        )
        .retry_failed(catalog_conf.retry_failed)
        .on_page_error(crawler_conf.on_page_error);

        Ok(Self::new(updater, catalog_conf))
    }
}

impl<F, S> Harvester<F, S>
where
    F: Fetch,
    S: Store,
{
    pub fn new(updater: Updater<F, S>, config: CatalogConfig) -> Self {
        Self { updater, config }
    }

    pub fn updater(&self) -> &Updater<F, S> {
        &self.updater
    }

    pub async fn brands(&self) -> Result<Vec<Brand>, CatalogError> {
        fetch_brands(self.updater.fetcher(), &self.config).await
    }

    /// Runs a pass for every brand of the index, or only for `only`.
    ///
    /// Brands are processed in index order and independently: a failed pass
    /// is reported in its [`BrandRun`] and the next brand goes on.
    pub async fn run(&self, only: Option<&str>) -> Result<Vec<BrandRun>, CatalogError> {
        let mut brands = self.brands().await?;
        if let Some(name) = only {
            brands.retain(|b| b.display_name == name);
            if brands.is_empty() {
                return Err(CatalogError::UnknownBrand(name.to_string()));
            }
        }

        let mut runs = Vec::with_capacity(brands.len());
        for brand in brands {
            log::info!(
                "Updating {} ({} models advertised)",
                brand.display_name,
                brand.advertised_model_count
            );
            let result = self.updater.update_brand(&brand).await;
            if let Err(e) = &result {
                log::error!("Skipping brand {}: {e}", brand.display_name);
            }
            runs.push(BrandRun { brand, result });
        }

        Ok(runs)
    }
}
