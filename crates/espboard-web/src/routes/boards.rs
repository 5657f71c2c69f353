//! Board table routes.
//!
//! # Endpoints
//!
//! ### `GET /api/boards/:core`
//! The board table of `esp8266` or `esp32`. Unknown cores answer `404`.
//!
//! **Query parameters** (all optional):
//! - `filter` - case-insensitive substring matched against every column
//! - `ignore_na` - `true` hides boards without a known built-in LED
//! - `sort` - one of `name`, `board`, `variant`, `led`, `mcu`, `flash_size`
//! - `direction` - `asc` (default) or `desc`
//!
//! Invalid `sort` or `direction` values answer `400`.
//!
//! **Response:**
//! ```json
//! {
//!   "core": "esp8266",
//!   "core_version": "3.1.2",
//!   "total_count": 4,
//!   "filtered_count": 1,
//!   "boards": [
//!     {
//!       "name": "LOLIN(WeMos) D1 R1",
//!       "board": "d1",
//!       "variant": "d1",
//!       "led_builtin": "2",
//!       "mcu": "esp8266",
//!       "flash_size": ["4MB"],
//!       "pins_link": "https://github.com/esp8266/Arduino/blob/3.1.2/variants/d1/pins_arduino.h"
//!     }
//!   ]
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

use espboard_core::{
    pins_arduino_link, BoardInfo, BoardTable, CoreKind, SortDirection, SortSpec,
};

use crate::{ApiError, AppState};

/// Query parameters of the board table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub filter: Option<String>,

    #[serde(default)]
    pub ignore_na: bool,

    #[serde(default)]
    pub sort: Option<String>,

    #[serde(default)]
    pub direction: Option<String>,
}

impl BoardQuery {
    /// The requested sort, if any. `direction` alone is ignored.
    pub fn sort_spec(&self) -> Result<Option<SortSpec>, ApiError> {
        let Some(column) = self.sort.as_deref() else {
            return Ok(None);
        };
        let direction = match self.direction.as_deref() {
            Some(direction) => direction.parse()?,
            None => SortDirection::Asc,
        };
        Ok(Some(SortSpec::new(column.parse()?, direction)))
    }
}

/// One table row.
#[derive(Debug, Clone, Serialize)]
pub struct BoardRow {
    #[serde(flatten)]
    pub board: BoardInfo,

    /// Link to the variant's `pins_arduino.h`
    pub pins_link: String,
}

/// Response of `/api/boards/:core`.
#[derive(Debug, Clone, Serialize)]
pub struct BoardTableResponse {
    pub core: CoreKind,
    pub core_version: String,
    pub total_count: usize,
    pub filtered_count: usize,
    pub boards: Vec<BoardRow>,
}

/// Create /api/boards routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/boards/:core", get(get_boards))
}

/// GET /api/boards/:core
async fn get_boards(
    State(state): State<AppState>,
    Path(core): Path<String>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<BoardTableResponse>, ApiError> {
    let core: CoreKind = core.parse()?;
    let sort = query.sort_spec()?;
    debug!(%core, ?query, "Board table requested");

    let mut table = BoardTable::new(state.boards_for(core));
    table.apply_ignore_na(query.ignore_na);
    if let Some(filter) = query.filter.as_deref() {
        table.apply_filter(filter);
    }
    if let Some(spec) = sort {
        table.sort_data(spec);
    }

    let core_version = state.core_version(core);
    let boards = table
        .rows()
        .iter()
        .map(|board| BoardRow {
            board: (*board).clone(),
            pins_link: pins_arduino_link(core.name(), core_version, &board.variant),
        })
        .collect();

    Ok(Json(BoardTableResponse {
        core,
        core_version: core_version.to_string(),
        total_count: table.total_count(),
        filtered_count: table.filtered_count(),
        boards,
    }))
}
