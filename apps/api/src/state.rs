use std::sync::Arc;

use crate::batches::materialize::AccountMaterializer;
use crate::config::Config;
use crate::ingest::text::DocumentTextExtractor;
use crate::store::OnboardingStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; every backend choice is made there.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OnboardingStore>,
    pub extractor: Arc<DocumentTextExtractor>,
    /// Owns the credential provisioner and notifier.
    pub materializer: Arc<AccountMaterializer>,
    pub config: Config,
}
