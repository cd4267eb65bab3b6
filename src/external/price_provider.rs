use async_trait::async_trait;
use thiserror::Error;

use crate::models::PricePoint;

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,
}

/// Source of daily close history for a ticker. Implementations return the
/// series ascending by date; the statistics engine never refetches or caches.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
    ) -> Result<Vec<PricePoint>, PriceProviderError>;
}
