use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    #[serde(default = "default_brands_path")]
    pub brands_path: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Leave previously failed models out of the dedup baseline so they get
    /// fetched again.
    #[serde(default)]
    pub retry_failed: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            brands_path: default_brands_path(),
            output_dir: default_output_dir(),
            retry_failed: false,
        }
    }
}

impl CatalogConfig {
    pub fn brands_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.brands_path)
    }
}

fn default_base_url() -> Url {
    Url::parse("https://www.gsmarena.com/").expect("valid default base URL")
}

fn default_brands_path() -> String {
    String::from("makers.php3")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("model_attributes")
}
