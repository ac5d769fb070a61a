use anyhow::Result;
use std::sync::Arc;

use crate::logic::weighting::classify;
use crate::model::{Term, TermOrder, TermSet, WeightedTerm};
use crate::store::traits::TagStore;

/// Read side of the vocabulary: ordered queries plus weighting input
pub struct Vocabulary<S: TagStore> {
    store: Arc<S>,
    order: TermOrder,
}

impl<S: TagStore> Clone for Vocabulary<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            order: self.order,
        }
    }
}

impl<S: TagStore> Vocabulary<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            order: TermOrder::DisplayAsc,
        }
    }

    pub fn with_order(mut self, order: TermOrder) -> Self {
        self.order = order;
        self
    }

    /// Order used by callers that don't ask for one
    pub fn order(&self) -> TermOrder {
        self.order
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// All terms in `order`
    pub async fn tree(&self, order: TermOrder) -> Result<TermSet> {
        let mut terms = self.store.get_tree(order).await?;
        order.sort(&mut terms);
        Ok(terms)
    }

    /// Terms matching `query` in `order`; a blank query is the full tree.
    pub async fn search(&self, query: &str, order: TermOrder) -> Result<TermSet> {
        if query.trim().is_empty() {
            return self.tree(order).await;
        }
        let mut terms = self.store.get_search(query, order).await?;
        order.sort(&mut terms);
        Ok(terms)
    }
}

/// `(min, max)` count over the terms actually being shown
pub fn bounds(terms: &[Term]) -> (u64, u64) {
    terms
        .iter()
        .map(|t| t.count)
        .fold(None, |acc, count| match acc {
            None => Some((count, count)),
            Some((min, max)) => Some((min.min(count), max.max(count))),
        })
        .unwrap_or((0, 0))
}

/// Attach a weight class to each term, relative to this set's bounds
pub fn weigh(terms: TermSet) -> Vec<WeightedTerm> {
    let (min, max) = bounds(&terms);
    terms
        .into_iter()
        .map(|term| WeightedTerm {
            weight: classify(term.count, min, max),
            term,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn vocabulary() -> Vocabulary<MemoryStore> {
        Vocabulary::new(Arc::new(MemoryStore::with_terms([
            ("rust", 40),
            ("go", 2),
            ("Rustacean", 5),
            ("python", 100),
            ("c", 0),
        ])))
    }

    #[tokio::test]
    async fn test_empty_search_equals_tree() {
        let vocabulary = vocabulary();
        let tree = vocabulary.tree(TermOrder::DisplayAsc).await.unwrap();
        assert_eq!(vocabulary.search("", TermOrder::DisplayAsc).await.unwrap(), tree);
        assert_eq!(vocabulary.search("   ", TermOrder::DisplayAsc).await.unwrap(), tree);
        assert_eq!(tree.len(), 5);
    }

    #[tokio::test]
    async fn test_tree_order_is_reproducible() {
        let vocabulary = vocabulary();
        let first = vocabulary.tree(TermOrder::DisplayAsc).await.unwrap();
        let second = vocabulary.tree(TermOrder::DisplayAsc).await.unwrap();
        assert_eq!(first, second);
        let names: Vec<&str> = first.iter().map(|t| t.display_text.as_str()).collect();
        assert_eq!(names, vec!["Rustacean", "c", "go", "python", "rust"]);
    }

    #[tokio::test]
    async fn test_search_narrows_bounds() {
        let vocabulary = vocabulary();
        let found = vocabulary.search("RUST", TermOrder::DisplayAsc).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(bounds(&found), (5, 40));

        let tree = vocabulary.tree(TermOrder::DisplayAsc).await.unwrap();
        assert_eq!(bounds(&tree), (0, 100));
    }

    #[test]
    fn test_default_order_is_display_ascending() {
        let vocabulary = vocabulary();
        assert_eq!(vocabulary.order(), TermOrder::DisplayAsc);
        assert_eq!(vocabulary.with_order(TermOrder::DisplayAsc).order(), TermOrder::DisplayAsc);
    }

    #[test]
    fn test_bounds_of_empty_set() {
        assert_eq!(bounds(&[]), (0, 0));
    }

    #[tokio::test]
    async fn test_weights_follow_current_view() {
        let vocabulary = vocabulary();
        let weighted = weigh(vocabulary.tree(TermOrder::DisplayAsc).await.unwrap());
        let python = weighted.iter().find(|w| w.term.display_text == "python").unwrap();
        let c = weighted.iter().find(|w| w.term.display_text == "c").unwrap();
        assert_eq!(python.weight.get(), 6);
        assert_eq!(c.weight.get(), 1);

        // rust is heaviest once the view is narrowed to rust-like terms
        let narrowed = weigh(vocabulary.search("rust", TermOrder::DisplayAsc).await.unwrap());
        let rust = narrowed.iter().find(|w| w.term.display_text == "rust").unwrap();
        assert_eq!(rust.weight.get(), 6);
    }
}
