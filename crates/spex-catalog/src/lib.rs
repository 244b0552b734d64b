mod brands;
mod config;
mod error;
mod extract;
mod harvest;
mod listing;
mod model;
mod page;
mod store;
mod update;

pub use brands::{fetch_brands, parse_brands};
pub use config::CatalogConfig;
pub use error::{CatalogError, StoreError, UpdateError};
pub use extract::extract;
pub use harvest::{BrandRun, Harvester};
pub use listing::{model_stubs, pagination_links, parse_stubs, ListingPage};
pub use model::{AttributeRecord, AttributeValue, Brand, CategoryTree, ModelStub};
pub use page::fetch_document;
pub use store::{JsonLinesStore, JsonLinesWriter, RecordSink, Store};
pub use update::{UpdateOutcome, UpdateReport, Updater};

pub use select;
pub use spex_crawler;
