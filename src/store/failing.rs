use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::model::{Term, TermId, TermOrder};
use crate::store::memory::MemoryStore;
use crate::store::traits::TagStore;

/// Memory store that fails on demand
pub struct FailingStore {
    inner: MemoryStore,
    /// Deletes allowed to succeed before every further delete fails
    deletes_before_failure: usize,
    deletes: AtomicUsize,
    fail_reads: AtomicBool,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, deletes_before_failure: usize) -> Self {
        Self {
            inner,
            deletes_before_failure,
            deletes: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("connection reset while reading terms");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TagStore for FailingStore {
    async fn get_tree(&self, order: TermOrder) -> Result<Vec<Term>> {
        self.check_reads()?;
        self.inner.get_tree(order).await
    }

    async fn get_search(&self, query: &str, order: TermOrder) -> Result<Vec<Term>> {
        self.check_reads()?;
        self.inner.get_search(query, order).await
    }

    async fn max_count(&self) -> Result<u64> {
        self.inner.max_count().await
    }

    async fn min_count(&self) -> Result<u64> {
        self.inner.min_count().await
    }

    async fn get_by_id(&self, id: TermId) -> Result<Option<Term>> {
        self.inner.get_by_id(id).await
    }

    async fn delete_term(&self, term: &Term) -> Result<()> {
        if self.deletes.fetch_add(1, Ordering::SeqCst) >= self.deletes_before_failure {
            bail!("connection reset while deleting term {}", term.id);
        }
        self.inner.delete_term(term).await
    }

    async fn merge(&self, canonical_name: &str, names: &[String]) -> Result<()> {
        self.inner.merge(canonical_name, names).await
    }

    async fn insert_term(&self, display_text: &str, count: u64) -> Result<Term> {
        self.inner.insert_term(display_text, count).await
    }
}
