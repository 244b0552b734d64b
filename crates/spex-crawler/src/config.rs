use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_pacing")]
    pub pacing: Option<Pacing>,

    #[serde(default = "default_on_page_error")]
    pub on_page_error: OnError,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            pacing: default_pacing(),
            on_page_error: default_on_page_error(),
        }
    }
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_user_agent() -> String {
    String::from("Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_pacing() -> Option<Pacing> {
    Some(Pacing::default())
}

fn default_on_page_error() -> OnError {
    OnError::SkipAndLog
}

/// What to do when a listing page after the first one cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OnError {
    Fail,
    SkipAndLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Pacing {
    /// The delay in seconds awaited before each detail page request
    Delay(f32),
    /// The number of detail page requests allowed per second
    PerSecond(NonZeroUsize),
}

impl Default for Pacing {
    fn default() -> Self {
        Self::Delay(3.0)
    }
}
