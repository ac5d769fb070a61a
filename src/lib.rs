pub mod api;
pub mod client;
pub mod config;
pub mod i18n;
pub mod logic;
pub mod model;
pub mod render;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use logic::{
    AuthError, AuthGuard, MutationError, RequestError, RequestOrchestrator, SharedSecretVerifier,
    TaxonomyMutator, Vocabulary, WeightClass,
};

// Export all model types
pub use model::*;

pub use store::{MemoryStore, PostgresStore, TagStore};

use std::sync::Arc;

use crate::api::{AdminState, ASSETS_PATH};
use crate::config::AppConfig;
use crate::i18n::{SourceCatalog, Translator};
use crate::render::HtmlRenderer;

/// Wire a store into the complete admin application
pub fn build_app<S: TagStore + 'static>(store: Arc<S>, config: &AppConfig) -> axum::Router {
    let translator: Arc<dyn Translator> = Arc::new(SourceCatalog);
    let orchestrator = RequestOrchestrator::new(
        store,
        AuthGuard::new(Arc::new(SharedSecretVerifier::new(config.auth.secret.clone()))),
        Arc::clone(&translator),
        Arc::new(HtmlRenderer::new(translator)),
    );
    let state = Arc::new(AdminState::new(orchestrator, ASSETS_PATH));
    api::routes::create_router::<S>(&config.admin.assets_dir).with_state(state)
}

/// Serve `app` on the configured address until the process stops
pub async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log::info!("Tag admin running on http://{}/admin/tags", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
