use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::config::Pacing;
use crate::error::FetchError;

/// Request pacing awaited before every detail page fetch.
#[derive(Debug)]
pub enum Pacer {
    Unpaced,
    Delay(Duration),
    Bucket(TokenBucket),
}

impl Pacer {
    /// Builds the pacer described by the configuration.
    ///
    /// A rate based pacer spawns its refill task, so this must be called
    /// from within a tokio runtime. A delay that is negative, not finite or
    /// too large for a [`Duration`] is rejected.
    pub fn new(pacing: Option<Pacing>) -> Result<Self, FetchError> {
        let pacer = match pacing {
            None => Self::Unpaced,
            Some(Pacing::Delay(secs)) => Self::Delay(
                Duration::try_from_secs_f32(secs).map_err(|_| FetchError::Delay(secs))?,
            ),
            Some(Pacing::PerSecond(n)) => Self::Bucket(TokenBucket::new(n.get())),
        };
        Ok(pacer)
    }

    pub async fn wait(&self) {
        match self {
            Self::Unpaced => (),
            Self::Delay(delay) => sleep(*delay).await,
            Self::Bucket(bucket) => bucket.take().await,
        }
    }
}

#[derive(Debug)]
pub struct TokenBucket {
    permits: Arc<Semaphore>,
    refill: JoinHandle<()>,
}

impl TokenBucket {
    pub fn new(per_second: usize) -> Self {
        let permits = Arc::new(Semaphore::new(per_second));

        let permits_c = permits.clone();
        let refill = tokio::spawn(async move {
            let mut ticks = interval(Duration::from_secs(1));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let available = permits_c.available_permits();
                permits_c.add_permits(per_second.saturating_sub(available));
            }
        });

        Self { permits, refill }
    }

    async fn take(&self) {
        match self.permits.acquire().await {
            Ok(permit) => permit.forget(),
            Err(e) => log::error!("Pacing semaphore closed: {e}"),
        }
    }
}

impl Drop for TokenBucket {
    fn drop(&mut self) {
        self.refill.abort();
    }
}
