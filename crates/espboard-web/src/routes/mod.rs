//! HTTP route handlers of the board overview.
//!
//! Routes are grouped by the tab they feed:
//! - `/api/views`, `/api/cores` - shell and core metadata
//! - `/api/boards/:core` - the ESP8266 and ESP32 board tables
//! - `/api/partitions` - the ESP32 partition scheme view

pub mod boards;
pub mod partitions;
pub mod views;

use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the main Axum router with all routes.
///
/// When `static_dir` is given, requests outside `/api` are served from it.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new().nest("/api", api_routes()).with_state(state);

    let router = match static_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving static UI");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

/// Create /api routes.
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(views::routes())
        .merge(boards::routes())
        .merge(partitions::routes())
}
