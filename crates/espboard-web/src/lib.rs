//! # espboard-web
//!
//! JSON API and static file serving for the ESP board overview.
//!
//! ## Architecture
//!
//! The web layer is built on Axum. Every request builds a fresh
//! [`espboard_core::BoardTable`] or [`espboard_core::PartitionResolver`] over
//! the shared, read-only [`Dataset`]; no mutable state crosses requests.
//!
//! - `/api/` - views, cores, board tables and partition schemes
//! - `/` - the built web UI, when a static directory is configured
//!
//! ## Usage
//!
//! ```rust,ignore
//! use espboard_web::create_router;
//!
//! let dataset = Arc::new(Dataset::load(&settings.data_dir())?);
//! let app = create_router(dataset, settings.static_dir());
//!
//! let listener = TcpListener::bind(settings.bind_addr()?).await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::sync::Arc;

use espboard_core::Dataset;

/// Type alias for shared state in Axum handlers.
pub type AppState = Arc<Dataset>;
