use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::PricePoint;

/// Random-walk provider for development without network access.
pub struct MockProvider;

#[async_trait]
impl PriceProvider for MockProvider {
    async fn fetch_daily_history(
        &self,
        _ticker: &str,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        let today = Utc::now().date_naive();
        let mut points: Vec<PricePoint> = Vec::new();

        let mut current = 100.0_f64;

        for i in 0..180 {
            current *= 1.0 + (rand::random::<f64>() - 0.5) * 0.02;

            points.push(PricePoint {
                date: today - ChronoDuration::days(i),
                close: current,
            });
        }

        points.sort_by_key(|p| p.date);

        Ok(points)
    }
}
