// Application state module
// Everything a request handler needs, built once at startup and shared read-only

use std::sync::Arc;

use super::types::Config;
use crate::render::Renderer;
use crate::routing::PathRouter;
use crate::storage::PageStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: PathRouter,
    pub store: PageStore,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    pub fn new(
        config: Config,
        router: PathRouter,
        store: PageStore,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            config,
            router,
            store,
            renderer,
        }
    }

    /// Mount prefix shared by every route and rendered link
    pub fn prefix(&self) -> &str {
        &self.config.application.prefix
    }
}
