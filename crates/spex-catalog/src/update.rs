use std::collections::HashSet;

use futures::{pin_mut, StreamExt};
use spex_crawler::{Fetch, OnError, Pacer};
use url::Url;

use crate::error::{CatalogError, StoreError, UpdateError};
use crate::extract::extract;
use crate::listing::{model_stubs, pagination_links, parse_stubs, ListingPage};
use crate::model::{AttributeRecord, Brand, ModelStub};
use crate::page::fetch_document;
use crate::store::{RecordSink, Store};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The brand's stream already holds as many models as the index advertises
    UpToDate { persisted: usize },
    Updated(UpdateReport),
}

impl UpdateOutcome {
    pub fn new_count(&self) -> usize {
        match self {
            Self::UpToDate { .. } => 0,
            Self::Updated(report) => report.new_count,
        }
    }
}

/// Model names already recorded for a brand.
enum Baseline {
    /// The stream holds this many models, as many as the index advertises
    Complete(usize),
    Partial(HashSet<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub brand: String,
    /// Records appended during the pass, failed ones included
    pub new_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    /// Listing errors that were skipped
    pub errors: Vec<String>,
}

/// Runs incremental update passes, one brand at a time.
#[derive(Debug)]
pub struct Updater<F, S> {
    fetcher: F,
    store: S,
    pacer: Pacer,
    base_url: Url,
    retry_failed: bool,
    on_page_error: OnError,
}

impl<F, S> Updater<F, S>
where
    F: Fetch,
    S: Store,
{
    pub fn new(fetcher: F, store: S, pacer: Pacer, base_url: Url) -> Self {
        Self {
            fetcher,
            store,
            pacer,
            base_url,
            retry_failed: false,
            on_page_error: OnError::SkipAndLog,
        }
    }

    /// Leave failed records out of the dedup baseline.
    pub fn retry_failed(mut self, retry_failed: bool) -> Self {
        self.retry_failed = retry_failed;
        self
    }

    pub fn on_page_error(mut self, on_page_error: OnError) -> Self {
        self.on_page_error = on_page_error;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Appends every model of `brand` that its stream doesn't hold yet.
    ///
    /// The brand is abandoned only when its first listing page is unusable or
    /// its stream cannot be read or written. A model whose detail page fails
    /// is still appended, flagged as failed.
    pub async fn update_brand(&self, brand: &Brand) -> Result<UpdateOutcome, UpdateError> {
        let name = &brand.display_name;
        let store_err = |source: StoreError| UpdateError::Store {
            brand: name.clone(),
            source,
        };
        let listing_err = |source: CatalogError| UpdateError::Listing {
            brand: name.clone(),
            source,
        };

        let baseline = match self.baseline(brand).map_err(store_err)? {
            Baseline::Complete(persisted) => return Ok(UpdateOutcome::UpToDate { persisted }),
            Baseline::Partial(names) => names,
        };

        let first = fetch_document(&self.fetcher, &brand.listing_url)
            .await
            .map_err(|source| UpdateError::Fetch {
                brand: name.clone(),
                source,
            })?;
        let first_stubs =
            parse_stubs(&first, &self.base_url, &brand.listing_url).map_err(listing_err)?;
        let rest =
            pagination_links(&first, &self.base_url, &brand.listing_url).map_err(listing_err)?;
        drop(first);

        let mut pages = vec![ListingPage::Parsed(first_stubs)];
        pages.extend(rest.into_iter().map(ListingPage::Pending));
        log::info!("Walking {} listing page(s) of {name}", pages.len());

        let mut sink = self.store.appender(name).map_err(store_err)?;
        let mut report = UpdateReport {
            brand: name.clone(),
            ..Default::default()
        };

        let stubs = model_stubs(&self.fetcher, pages, &self.base_url);
        pin_mut!(stubs);
        while let Some(stub) = stubs.next().await {
            let stub = match stub {
                Ok(stub) => stub,
                Err(e) => match self.on_page_error {
                    OnError::Fail => return Err(listing_err(e)),
                    OnError::SkipAndLog => {
                        log::warn!("Skipping listing entry of {name}: {e}");
                        report.errors.push(e.to_string());
                        continue;
                    }
                },
            };

            if baseline.contains(&stub.display_name) {
                log::debug!("Skipping {}", stub.display_name);
                report.skipped_count += 1;
                continue;
            }

            let record = self.harvest_model(brand, &stub).await;
            sink.append(&record).map_err(store_err)?;
            report.new_count += 1;
            if record.fetch_failed {
                report.failed_count += 1;
            }
        }

        log::info!(
            "{} new models added for {name} ({} failed, {} skipped)",
            report.new_count,
            report.failed_count,
            report.skipped_count
        );
        Ok(UpdateOutcome::Updated(report))
    }

    fn baseline(&self, brand: &Brand) -> Result<Baseline, StoreError> {
        let Some(records) = self.store.read(&brand.display_name)? else {
            return Ok(Baseline::Partial(HashSet::new()));
        };

        let baseline = records
            .into_iter()
            .filter(|r| !(self.retry_failed && r.fetch_failed))
            .map(|r| r.model_name)
            .collect::<HashSet<_>>();

        if baseline.len() == brand.advertised_model_count {
            log::info!(
                "No new models for {} ({} recorded)",
                brand.display_name,
                baseline.len()
            );
            return Ok(Baseline::Complete(baseline.len()));
        }

        Ok(Baseline::Partial(baseline))
    }

    async fn harvest_model(&self, brand: &Brand, stub: &ModelStub) -> AttributeRecord {
        self.pacer.wait().await;

        let attempt = match fetch_document(&self.fetcher, &stub.detail_url).await {
            Ok(document) => extract(&document, brand, stub),
            Err(e) => Err(CatalogError::from(e)),
        };

        match attempt {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{} failed to get attributes: {e}", stub.display_name);
                AttributeRecord::failed(brand, stub, &e)
            }
        }
    }
}
