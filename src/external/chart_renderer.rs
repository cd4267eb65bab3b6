use async_trait::async_trait;
use thiserror::Error;

use crate::models::PricePoint;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart renderer unavailable: {0}")]
    Unavailable(String),

    #[error("chart rendering failed: {0}")]
    Failed(String),
}

/// Renders a price series to a raster image for embedding in the document.
///
/// A render failure is per-item recoverable: the document is produced without
/// the chart, it never aborts a fetch or a submission.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, series: &[PricePoint]) -> Result<Vec<u8>, ChartError>;
}

/// Renderer slot with no engine behind it; the equity section simply omits
/// the chart image.
pub struct DisabledChartRenderer;

#[async_trait]
impl ChartRenderer for DisabledChartRenderer {
    async fn render(&self, _series: &[PricePoint]) -> Result<Vec<u8>, ChartError> {
        Err(ChartError::Unavailable("no chart renderer configured".to_string()))
    }
}
