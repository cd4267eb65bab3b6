use std::sync::Arc;

use crate::external::chart_renderer::ChartRenderer;
use crate::external::document_serializer::DocumentSerializer;
use crate::external::price_provider::PriceProvider;
use crate::services::market_snapshot::MarketSnapshot;

#[derive(Clone)]
pub struct AppState {
    pub price_provider: Arc<dyn PriceProvider>,
    pub serializer: Arc<dyn DocumentSerializer>,
    pub chart_renderer: Arc<dyn ChartRenderer>,
    /// Chart-and-stats state for the currently charted ticker; the only
    /// mutable state in the process.
    pub market: MarketSnapshot,
}
