use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{health, mail, market, notes};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    // The form is a static browser page served from elsewhere.
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/notes", notes::router())
        .nest("/api/market", market::router())
        .nest("/api/mail", mail::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
