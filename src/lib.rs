//! News Reader - a read-only web frontend for crawled news articles
//!
//! This crate serves a front page of recent articles and a detail page per
//! article from a SQLite database filled by an external crawler. Articles are
//! addressed by opaque handles instead of row ids.

pub mod config;
pub mod db;
pub mod error;
pub mod handle;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::db::ArticleStore;
use crate::handle::HandleCodec;
use crate::routes::AppState;

/// Builds the full application: article routes, static files and request
/// tracing, all under the configured prefix.
pub fn app<S: ArticleStore + 'static>(config: &Config, store: S) -> Router {
    let state = Arc::new(AppState {
        store,
        codec: HandleCodec::new(),
        prefix: config.prefix.clone(),
        items: config.items,
    });

    routes::router(state)
        .nest_service(&config.url("/static"), ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
}
