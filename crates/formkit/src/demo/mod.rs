//! A small contact-book server that drives the form helpers end to end.

pub mod config;
pub mod csrf;
pub mod error;
pub mod routes;
pub mod session;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use axum::Router;
use dashmap::DashMap;
use formkit::RenderConfig;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::demo::routes::contact::Contact;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    contacts: DashMap<u64, Contact>,
    next_id: AtomicU64,
    render_config: RenderConfig,
}

impl AppState {
    pub fn new(render_config: RenderConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                contacts: DashMap::new(),
                next_id: AtomicU64::new(1),
                render_config,
            }),
        }
    }

    /// Stored contacts by id.
    pub fn contacts(&self) -> &DashMap<u64, Contact> {
        &self.inner.contacts
    }

    /// Id counter for new contacts.
    pub fn next_id(&self) -> &AtomicU64 {
        &self.inner.next_id
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.inner.render_config
    }
}

/// Build the application router with its session and trace layers.
pub fn build_app(state: AppState, session_layer: SessionManagerLayer<MemoryStore>) -> Router {
    Router::new()
        .merge(routes::contact::router())
        .merge(routes::health::router())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
