//! ESP32 partition scheme routes.
//!
//! # Endpoints
//!
//! ### `GET /api/partitions`
//! Board ids with partition data, in dataset order.
//!
//! ### `GET /api/partitions/:board`
//! The resolved partition view of a board. Without `?scheme=` the board's
//! starting scheme is selected (its `default`, else the first menu scheme).
//! Unknown boards and schemes resolve to empty results, not errors.
//!
//! **Response:**
//! ```json
//! {
//!   "board": "esp32c2",
//!   "schemes": [{ "name": "default", "full_name": "Default 4MB ..." }],
//!   "selected_scheme": "minimal",
//!   "selected_build": "minimal",
//!   "entries": [
//!     {
//!       "name": "nvs", "type": "data", "subtype": "nvs",
//!       "offset": "0x9000", "size": "0x5000",
//!       "offset_dec": 36864, "size_dec": 20480, "offset_size": 57344,
//!       "offset_hex": "0x9000", "size_hex": "0x5000", "color": "#1f77b4"
//!     }
//!   ],
//!   "diagram": { "bars": [...], "total_extent": 2096, "view_box": "0 0 2096 100" }
//! }
//! ```

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use espboard_core::{DiagramLayout, PartitionEntryExtended, PartitionResolver, SchemeOption};

use crate::AppState;

/// Query parameters of the partition view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemeQuery {
    #[serde(default)]
    pub scheme: Option<String>,
}

/// Response of `/api/partitions/:board`.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionView {
    pub board: String,
    pub schemes: Vec<SchemeOption>,
    pub selected_scheme: Option<String>,
    pub selected_build: Option<String>,
    pub entries: Vec<PartitionEntryExtended>,
    pub diagram: DiagramLayout,
}

impl PartitionView {
    fn from_resolver(board: String, resolver: &PartitionResolver<'_>) -> Self {
        Self {
            board,
            schemes: resolver.scheme_options().to_vec(),
            selected_scheme: resolver.selected_scheme().map(str::to_string),
            selected_build: resolver.selected_build().map(str::to_string),
            entries: resolver.rows().to_vec(),
            diagram: resolver.diagram().clone(),
        }
    }
}

/// Create /api/partitions routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/partitions", get(get_boards))
        .route("/partitions/:board", get(get_partitions))
}

/// GET /api/partitions
async fn get_boards(State(state): State<AppState>) -> Json<Vec<String>> {
    let resolver = PartitionResolver::new(&state.partitions, &state.schemes);
    Json(resolver.board_ids().map(str::to_string).collect())
}

/// GET /api/partitions/:board
async fn get_partitions(
    State(state): State<AppState>,
    Path(board): Path<String>,
    Query(query): Query<SchemeQuery>,
) -> Json<PartitionView> {
    debug!(board = %board, scheme = ?query.scheme, "Partition view requested");

    let mut resolver = PartitionResolver::new(&state.partitions, &state.schemes);
    resolver.on_board_change(&board);
    if let Some(scheme) = query.scheme.as_deref() {
        resolver.on_scheme_change(scheme);
    }

    Json(PartitionView::from_resolver(board, &resolver))
}
