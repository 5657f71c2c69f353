//! View and core metadata routes.
//!
//! # Endpoints
//!
//! ### `GET /api/views`
//! The tabs of the viewer in display order.
//!
//! ```json
//! [
//!   { "kind": "info", "link": "Info", "title": "ESP Board Overview" },
//!   { "kind": "esp8266", "link": "ESP8266", "title": "ESP8266 Boards Arduino IDE" }
//! ]
//! ```
//!
//! ### `GET /api/cores`
//! The supported cores with their installed versions.
//!
//! ```json
//! [
//!   {
//!     "core": "esp32",
//!     "version": "3.2.0",
//!     "repository": "https://github.com/espressif/arduino-esp32",
//!     "view": "esp32"
//!   }
//! ]
//! ```

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;

use espboard_core::view::view_descriptors;
use espboard_core::{CoreKind, ViewDescriptor, ViewKind};

use crate::AppState;

/// Core entry of `/api/cores`.
#[derive(Debug, Clone, Serialize)]
pub struct CoreSummary {
    pub core: CoreKind,

    /// Installed version, empty if the core list does not name it.
    pub version: String,

    pub repository: &'static str,

    /// The board table view of the core.
    pub view: ViewKind,
}

/// Create /api/views and /api/cores routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/views", get(get_views))
        .route("/cores", get(get_cores))
}

/// GET /api/views
async fn get_views() -> Json<Vec<ViewDescriptor>> {
    Json(view_descriptors())
}

/// GET /api/cores
async fn get_cores(State(state): State<AppState>) -> Json<Vec<CoreSummary>> {
    let cores = CoreKind::ALL
        .into_iter()
        .map(|core| CoreSummary {
            core,
            version: state.core_version(core).to_string(),
            repository: core.repository(),
            view: ViewKind::for_core(core),
        })
        .collect();
    Json(cores)
}
