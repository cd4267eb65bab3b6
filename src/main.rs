use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use cordoba_notes::app;
use cordoba_notes::external::chart_renderer::{ChartRenderer, DisabledChartRenderer};
use cordoba_notes::external::document_serializer::{
    DisabledDocumentSerializer, DocumentSerializer, JsonDocumentSerializer,
};
use cordoba_notes::external::mock_prices::MockProvider;
use cordoba_notes::external::price_provider::PriceProvider;
use cordoba_notes::external::stooq::StooqProvider;
use cordoba_notes::logging::{init_logging, LoggingConfig};
use cordoba_notes::services::market_snapshot::MarketSnapshot;
use cordoba_notes::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env())?;

    let provider_name = std::env::var("PRICE_PROVIDER")
        .unwrap_or_else(|_| "stooq".to_string());

    let price_provider: Arc<dyn PriceProvider> = match provider_name.to_lowercase().as_str() {
        "stooq" => {
            tracing::info!("📊 Using price provider: Stooq");
            Arc::new(StooqProvider::new())
        }
        "mock" => {
            tracing::info!("📊 Using price provider: mock random walk");
            Arc::new(MockProvider)
        }
        _ => {
            panic!("Invalid PRICE_PROVIDER: {}. Must be 'stooq' or 'mock'", provider_name);
        }
    };

    let serializer_name = std::env::var("DOC_SERIALIZER")
        .unwrap_or_else(|_| "json".to_string());

    let serializer: Arc<dyn DocumentSerializer> = match serializer_name.to_lowercase().as_str() {
        "json" => {
            tracing::info!("📄 Using document serializer: JSON reference engine");
            Arc::new(JsonDocumentSerializer)
        }
        "disabled" => {
            tracing::info!("📄 Document serializer disabled; submissions will be rejected");
            Arc::new(DisabledDocumentSerializer)
        }
        _ => {
            panic!(
                "Invalid DOC_SERIALIZER: {}. Must be 'json' or 'disabled'",
                serializer_name
            );
        }
    };

    let renderer_name = std::env::var("CHART_RENDERER")
        .unwrap_or_else(|_| "disabled".to_string());

    let chart_renderer: Arc<dyn ChartRenderer> = match renderer_name.to_lowercase().as_str() {
        "disabled" => Arc::new(DisabledChartRenderer),
        _ => {
            panic!("Invalid CHART_RENDERER: {}. Must be 'disabled'", renderer_name);
        }
    };

    let state = AppState {
        price_provider,
        serializer,
        chart_renderer,
        market: MarketSnapshot::new(),
    };
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Cordoba Notes backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
