use crate::model::{Term, TermId, TermOrder};
use anyhow::Result;

/// Persistence contract for the tag vocabulary
///
/// Implementations own term identity and counts. Conflicting writes are
/// serialized by the implementation; callers surface whatever it returns.
#[async_trait::async_trait]
pub trait TagStore: Send + Sync {
    /// All terms in the requested order
    async fn get_tree(&self, order: TermOrder) -> Result<Vec<Term>>;
    /// Terms whose searchable text contains `query`, case-insensitively
    async fn get_search(&self, query: &str, order: TermOrder) -> Result<Vec<Term>>;
    /// Largest count across the whole vocabulary (0 when empty)
    async fn max_count(&self) -> Result<u64>;
    /// Smallest count across the whole vocabulary (0 when empty)
    async fn min_count(&self) -> Result<u64>;
    async fn get_by_id(&self, id: TermId) -> Result<Option<Term>>;
    /// Remove a term and its content associations
    async fn delete_term(&self, term: &Term) -> Result<()>;
    /// Atomically fold the terms named in `names` into one term named `canonical_name`
    async fn merge(&self, canonical_name: &str, names: &[String]) -> Result<()>;
    /// Create a term with an initial count; used for seeding
    async fn insert_term(&self, display_text: &str, count: u64) -> Result<Term>;
}
