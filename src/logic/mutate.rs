use std::collections::BTreeSet;
use std::sync::Arc;

use crate::model::{Term, TermId};
use crate::store::traits::TagStore;

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("no canonical name was given for the merge")]
    MissingCanonicalName,
    #[error("term {0} does not exist")]
    UnknownTermId(TermId),
    /// Store failure; `completed` holds the names processed before it
    #[error("store failure after {} completed term(s): {source}", .completed.len())]
    Store {
        completed: Vec<String>,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub canonical_name: String,
    pub merged_names: Vec<String>,
}

/// Bulk delete and merge over the store
///
/// Ids are processed independently in ascending order. Ids that no longer
/// resolve are skipped, which keeps re-submitted batches idempotent.
pub struct TaxonomyMutator<S: TagStore> {
    store: Arc<S>,
}

impl<S: TagStore> TaxonomyMutator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Look up a single term
    pub async fn resolve(&self, id: TermId) -> Result<Term, MutationError> {
        match self.store.get_by_id(id).await {
            Ok(Some(term)) => Ok(term),
            Ok(None) => Err(MutationError::UnknownTermId(id)),
            Err(source) => Err(MutationError::Store {
                completed: Vec::new(),
                source,
            }),
        }
    }

    pub async fn delete(&self, term_ids: &BTreeSet<TermId>) -> Result<DeleteOutcome, MutationError> {
        let mut deleted_names = Vec::with_capacity(term_ids.len());

        for id in term_ids {
            let term = match self.resolve(*id).await {
                Ok(term) => term,
                Err(MutationError::UnknownTermId(id)) => {
                    log::debug!("Skipping delete of unknown term {}", id);
                    continue;
                }
                Err(e) => return Err(with_completed(e, deleted_names)),
            };

            if let Err(source) = self.store.delete_term(&term).await {
                return Err(MutationError::Store {
                    completed: deleted_names,
                    source,
                });
            }
            deleted_names.push(term.display_text);
        }

        log::info!("Deleted {} term(s)", deleted_names.len());
        Ok(DeleteOutcome { deleted_names })
    }

    pub async fn merge(
        &self,
        canonical_name: &str,
        term_ids: &BTreeSet<TermId>,
    ) -> Result<MergeOutcome, MutationError> {
        let canonical_name = canonical_name.trim();
        if canonical_name.is_empty() {
            return Err(MutationError::MissingCanonicalName);
        }

        let mut merged_names = Vec::with_capacity(term_ids.len());
        for id in term_ids {
            match self.resolve(*id).await {
                Ok(term) => merged_names.push(term.display_text),
                Err(MutationError::UnknownTermId(id)) => {
                    log::debug!("Skipping merge of unknown term {}", id);
                }
                Err(e) => return Err(with_completed(e, merged_names)),
            }
        }

        if !merged_names.is_empty() {
            if let Err(source) = self.store.merge(canonical_name, &merged_names).await {
                return Err(MutationError::Store {
                    completed: Vec::new(),
                    source,
                });
            }
            log::info!(
                "Merged {} term(s) into {:?}",
                merged_names.len(),
                canonical_name
            );
        }

        Ok(MergeOutcome {
            canonical_name: canonical_name.to_string(),
            merged_names,
        })
    }
}

fn with_completed(error: MutationError, completed: Vec<String>) -> MutationError {
    match error {
        MutationError::Store { source, .. } => MutationError::Store { completed, source },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TermOrder;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, TaxonomyMutator<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_terms([
            ("A", 3),
            ("B", 4),
            ("C", 1),
            ("Foo", 2),
        ]));
        let mutator = TaxonomyMutator::new(Arc::clone(&store));
        (store, mutator)
    }

    #[tokio::test]
    async fn test_delete_skips_stale_ids() {
        let (store, mutator) = setup();
        let outcome = mutator.delete(&BTreeSet::from([1, 2, 99])).await.unwrap();
        assert_eq!(outcome.deleted_names, vec!["A", "B"]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_store, mutator) = setup();
        let ids = BTreeSet::from([1, 3]);
        let first = mutator.delete(&ids).await.unwrap();
        assert_eq!(first.deleted_names.len(), 2);
        let second = mutator.delete(&ids).await.unwrap();
        assert!(second.deleted_names.is_empty());
    }

    #[tokio::test]
    async fn test_merge_requires_canonical_name() {
        let (store, mutator) = setup();
        let err = mutator.merge("  ", &BTreeSet::from([1, 2])).await.unwrap_err();
        assert!(matches!(err, MutationError::MissingCanonicalName));
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_merge_with_no_ids_is_noop() {
        let (store, mutator) = setup();
        let outcome = mutator.merge("Foo", &BTreeSet::new()).await.unwrap();
        assert!(outcome.merged_names.is_empty());
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_merge_folds_sources_into_canonical() {
        let (store, mutator) = setup();
        let outcome = mutator.merge("Foo", &BTreeSet::from([1, 2, 42])).await.unwrap();
        assert_eq!(outcome.merged_names, vec!["A", "B"]);
        assert_eq!(outcome.canonical_name, "Foo");

        let tree = store.get_tree(TermOrder::DisplayAsc).await.unwrap();
        assert!(tree.iter().all(|t| t.display_text != "A" && t.display_text != "B"));
        let foo = tree.iter().find(|t| t.display_text == "Foo").unwrap();
        assert!(foo.count >= 3 + 4);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_completed_names() {
        use crate::store::failing::FailingStore;

        let store = Arc::new(FailingStore::new(
            MemoryStore::with_terms([("A", 3), ("B", 4), ("C", 1)]),
            1,
        ));
        let mutator = TaxonomyMutator::new(Arc::clone(&store));

        match mutator.delete(&BTreeSet::from([1, 2, 3])).await {
            Err(MutationError::Store { completed, source }) => {
                assert_eq!(completed, vec!["A"]);
                assert!(source.to_string().contains("term 2"));
            }
            other => panic!("expected a store error, got {:?}", other),
        }
        assert_eq!(store.inner().len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_unknown_id() {
        let (_store, mutator) = setup();
        assert!(matches!(
            mutator.resolve(77).await,
            Err(MutationError::UnknownTermId(77))
        ));
    }
}
