pub mod chart_renderer;
pub mod document_serializer;
pub mod mock_prices;
pub mod price_provider;
pub mod stooq;
pub mod upload;
