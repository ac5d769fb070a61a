use anyhow::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::model::{normalize_searchable, Term, TermId, TermOrder};
use crate::store::traits::TagStore;

#[derive(Debug, Default)]
struct Vocabulary {
    terms: BTreeMap<TermId, Term>,
    next_id: TermId,
}

impl Vocabulary {
    fn allocate_id(&mut self) -> TermId {
        self.next_id += 1;
        self.next_id
    }

    fn ordered(&self, order: TermOrder, keep: impl Fn(&Term) -> bool) -> Vec<Term> {
        let mut terms: Vec<Term> = self.terms.values().filter(|t| keep(t)).cloned().collect();
        order.sort(&mut terms);
        terms
    }
}

/// Process-local store used for development and tests
///
/// Every mutation happens under a single write lock, so a merge is never
/// observed half-applied.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Vocabulary>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terms<'a>(terms: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for (display, count) in terms {
                let id = inner.allocate_id();
                inner.terms.insert(id, Term::new(id, display, count));
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.inner.read().terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl TagStore for MemoryStore {
    async fn get_tree(&self, order: TermOrder) -> Result<Vec<Term>> {
        Ok(self.inner.read().ordered(order, |_| true))
    }

    async fn get_search(&self, query: &str, order: TermOrder) -> Result<Vec<Term>> {
        let needle = normalize_searchable(query);
        Ok(self
            .inner
            .read()
            .ordered(order, |t| t.searchable_text.contains(&needle)))
    }

    async fn max_count(&self) -> Result<u64> {
        Ok(self
            .inner
            .read()
            .terms
            .values()
            .map(|t| t.count)
            .max()
            .unwrap_or(0))
    }

    async fn min_count(&self) -> Result<u64> {
        Ok(self
            .inner
            .read()
            .terms
            .values()
            .map(|t| t.count)
            .min()
            .unwrap_or(0))
    }

    async fn get_by_id(&self, id: TermId) -> Result<Option<Term>> {
        Ok(self.inner.read().terms.get(&id).cloned())
    }

    async fn delete_term(&self, term: &Term) -> Result<()> {
        self.inner.write().terms.remove(&term.id);
        Ok(())
    }

    async fn merge(&self, canonical_name: &str, names: &[String]) -> Result<()> {
        let canonical_searchable = normalize_searchable(canonical_name);
        let mut inner = self.inner.write();

        let sources: Vec<TermId> = inner
            .terms
            .values()
            .filter(|t| names.contains(&t.display_text))
            .map(|t| t.id)
            .collect();
        if sources.is_empty() {
            return Ok(());
        }

        let target_id = inner
            .terms
            .values()
            .find(|t| t.searchable_text == canonical_searchable)
            .map(|t| t.id);

        let absorbed: u64 = sources
            .iter()
            .filter(|id| Some(**id) != target_id)
            .filter_map(|id| inner.terms.remove(id))
            .map(|t| t.count)
            .sum();

        match target_id.and_then(|id| inner.terms.get_mut(&id)) {
            Some(target) => {
                target.count += absorbed;
                target.display_text = canonical_name.to_string();
                target.searchable_text = canonical_searchable;
            }
            None => {
                let id = inner.allocate_id();
                inner
                    .terms
                    .insert(id, Term::new(id, canonical_name, absorbed));
            }
        }

        log::debug!(
            "Merged {} term(s) into {:?}",
            sources.len(),
            canonical_name
        );
        Ok(())
    }

    async fn insert_term(&self, display_text: &str, count: u64) -> Result<Term> {
        let mut inner = self.inner.write();
        let id = inner.allocate_id();
        let term = Term::new(id, display_text, count);
        inner.terms.insert(id, term.clone());
        Ok(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(terms: &[Term]) -> Vec<&str> {
        terms.iter().map(|t| t.display_text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_tree_is_ordered_by_display_text() {
        let store = MemoryStore::with_terms([("pear", 1), ("apple", 4), ("fig", 2)]);
        let tree = store.get_tree(TermOrder::DisplayAsc).await.unwrap();
        assert_eq!(names(&tree), vec!["apple", "fig", "pear"]);
        assert_eq!(store.max_count().await.unwrap(), 4);
        assert_eq!(store.min_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = MemoryStore::with_terms([("Banana", 2), ("Apple", 5), ("bandana", 1)]);
        let found = store.get_search("BAN", TermOrder::DisplayAsc).await.unwrap();
        assert_eq!(names(&found), vec!["Banana", "bandana"]);
    }

    #[tokio::test]
    async fn test_merge_into_new_term_sums_counts() {
        let store = MemoryStore::with_terms([("js", 3), ("javascript", 4), ("rust", 1)]);
        store
            .merge("JavaScript", &["js".to_string(), "javascript".to_string()])
            .await
            .unwrap();

        let tree = store.get_tree(TermOrder::DisplayAsc).await.unwrap();
        assert_eq!(names(&tree), vec!["JavaScript", "rust"]);
        assert_eq!(tree[0].count, 7);
        // "javascript" already carried the canonical searchable text and keeps its id
        assert_eq!(tree[0].id, 2);
    }

    #[tokio::test]
    async fn test_merge_into_unrelated_existing_term() {
        let store = MemoryStore::with_terms([("a", 1), ("b", 2), ("Foo", 10)]);
        store
            .merge("foo", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        let tree = store.get_tree(TermOrder::DisplayAsc).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 3);
        assert_eq!(tree[0].count, 13);
        assert_eq!(tree[0].display_text, "foo");
    }

    #[tokio::test]
    async fn test_merge_with_unknown_names_is_noop() {
        let store = MemoryStore::with_terms([("a", 1)]);
        store.merge("z", &["missing".to_string()]).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_insert() {
        let store = MemoryStore::new();
        let term = store.insert_term("temp", 0).await.unwrap();
        assert_eq!(store.get_by_id(term.id).await.unwrap(), Some(term.clone()));
        store.delete_term(&term).await.unwrap();
        assert!(store.get_by_id(term.id).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
