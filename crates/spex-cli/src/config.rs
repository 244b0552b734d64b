use std::path::Path;

use fs_err::File;
use serde::{Deserialize, Serialize};
use spex_catalog::CatalogConfig;
use spex_crawler::CrawlerConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestConfig {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl HarvestConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Ok(serde_yaml::from_reader(File::open(path)?)?),
            None => Ok(Self::default()),
        }
    }
}
