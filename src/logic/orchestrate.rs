use std::sync::Arc;

use crate::i18n::{self, Translator};
use crate::logic::auth::{AuthError, AuthGuard};
use crate::logic::mutate::{MutationError, TaxonomyMutator};
use crate::logic::vocabulary::{weigh, Vocabulary};
use crate::model::{Credentials, MutationRequest, SearchRequest, TagAction, WeightedTerm};
use crate::render::{Notice, PageView, TagListRenderer};
use crate::store::traits::TagStore;

/// Steps a mutation request passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Received,
    AuthChecked,
    Mutated,
    Requeried,
    Rendered,
    Rejected,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error("failed to query the vocabulary: {0}")]
    Store(#[source] anyhow::Error),
}

/// A request that ended in `Rejected`, with the message to show the user
#[derive(Debug)]
pub struct Rejection {
    pub error: RequestError,
    pub message: String,
}

/// Refreshed, weighted view returned after a successful request
#[derive(Debug, Clone)]
pub struct TagsResponse {
    /// Summary of what changed; absent for reads and no-op actions
    pub message: Option<String>,
    pub terms: Vec<WeightedTerm>,
    /// Rendered tag collection
    pub fragment: String,
}

/// Composes auth, mutation, re-query and rendering per request
pub struct RequestOrchestrator<S: TagStore> {
    guard: AuthGuard,
    mutator: TaxonomyMutator<S>,
    vocabulary: Vocabulary<S>,
    translator: Arc<dyn Translator>,
    renderer: Arc<dyn TagListRenderer>,
}

impl<S: TagStore> RequestOrchestrator<S> {
    pub fn new(
        store: Arc<S>,
        guard: AuthGuard,
        translator: Arc<dyn Translator>,
        renderer: Arc<dyn TagListRenderer>,
    ) -> Self {
        Self {
            guard,
            mutator: TaxonomyMutator::new(Arc::clone(&store)),
            vocabulary: Vocabulary::new(store),
            translator,
            renderer,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary<S> {
        &self.vocabulary
    }

    pub fn issue_credentials(&self) -> Credentials {
        self.guard.issue()
    }

    /// Authenticate, apply the action, then return the fresh weighted tree.
    pub async fn handle_mutation(
        &self,
        request: &MutationRequest,
    ) -> Result<TagsResponse, Rejection> {
        trace_phase(RequestPhase::Received, request.action.name());

        if let Err(e) = self.guard.verify_credentials(&request.credentials) {
            return Err(self.reject(e.into()));
        }
        trace_phase(RequestPhase::AuthChecked, request.action.name());

        let message = match &request.action {
            TagAction::Delete { term_ids } => {
                let outcome = self
                    .mutator
                    .delete(term_ids)
                    .await
                    .map_err(|e| self.reject(e.into()))?;
                let names = &outcome.deleted_names;
                let count = names.len().to_string();
                Some(self.translator.translate_plural(
                    i18n::MSG_DELETED_ONE,
                    i18n::MSG_DELETED_MANY,
                    names.len(),
                    &[&names.join(", "), &count],
                ))
            }
            TagAction::Rename { master, term_ids } => {
                let Some(master) = master else {
                    return Err(self.reject(MutationError::MissingCanonicalName.into()));
                };
                let outcome = self
                    .mutator
                    .merge(master, term_ids)
                    .await
                    .map_err(|e| self.reject(e.into()))?;
                let names = &outcome.merged_names;
                (!names.is_empty()).then(|| {
                    self.translator.translate_plural(
                        i18n::MSG_RENAMED_ONE,
                        i18n::MSG_RENAMED_MANY,
                        names.len(),
                        &[&names.join(", "), &outcome.canonical_name],
                    )
                })
            }
            TagAction::Other(action) => {
                log::debug!("Ignoring unsupported tag action {:?}", action);
                None
            }
        };
        trace_phase(RequestPhase::Mutated, request.action.name());

        let terms = self
            .vocabulary
            .tree(self.vocabulary.order())
            .await
            .map_err(|e| self.reject(RequestError::Store(e)))?;
        trace_phase(RequestPhase::Requeried, request.action.name());

        let response = self.respond(message, terms);
        trace_phase(RequestPhase::Rendered, request.action.name());
        Ok(response)
    }

    /// Authenticated, read-only filtered view
    pub async fn handle_search(&self, request: &SearchRequest) -> Result<TagsResponse, Rejection> {
        if let Err(e) = self.guard.verify_credentials(&request.credentials) {
            return Err(self.reject(e.into()));
        }

        let terms = self
            .vocabulary
            .search(&request.search, self.vocabulary.order())
            .await
            .map_err(|e| self.reject(RequestError::Store(e)))?;
        Ok(self.respond(None, terms))
    }

    /// Full admin page with fresh credentials for its follow-up requests
    pub async fn render_page(
        &self,
        notices: &[Notice],
        assets_path: &str,
    ) -> Result<String, Rejection> {
        let terms = self
            .vocabulary
            .tree(self.vocabulary.order())
            .await
            .map_err(|e| self.reject(RequestError::Store(e)))?;
        let weighted = weigh(terms);
        let credentials = self.guard.issue();
        Ok(self.renderer.render_page(&PageView {
            terms: &weighted,
            credentials: &credentials,
            notices,
            assets_path,
        }))
    }

    fn respond(&self, message: Option<String>, terms: crate::model::TermSet) -> TagsResponse {
        let terms = weigh(terms);
        let fragment = self.renderer.render_collection(&terms);
        TagsResponse {
            message,
            terms,
            fragment,
        }
    }

    fn reject(&self, error: RequestError) -> Rejection {
        let key = match &error {
            RequestError::Auth(AuthError::DigestMismatch) => i18n::MSG_AUTH_FAILED,
            RequestError::Mutation(MutationError::MissingCanonicalName) => i18n::MSG_MISSING_NAME,
            _ => i18n::MSG_REQUEST_FAILED,
        };
        match &error {
            RequestError::Auth(_) | RequestError::Mutation(MutationError::MissingCanonicalName) => {
                log::info!("Tag request rejected: {}", error)
            }
            _ => log::error!("Tag request failed: {:#}", error),
        }
        trace_phase(RequestPhase::Rejected, key);
        Rejection {
            message: self.translator.translate(key, &[]),
            error,
        }
    }
}

fn trace_phase(phase: RequestPhase, detail: &str) {
    log::debug!("tags request {:?} ({})", phase, detail);
}
