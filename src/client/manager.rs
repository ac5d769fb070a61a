use anyhow::Result;

use crate::client::search_cache::{Row, SearchCache};

/// Fetches a fresh row set for a query, e.g. over the authenticated search endpoint
pub trait UpdateTransport {
    fn post(&mut self, url: &str, query: &str) -> Result<Vec<Row>>;
}

/// Per-instance settings for a [`Manager`]
pub struct ManagerOptions {
    /// Class marking rows that take part in quick search
    pub item_class: String,
    pub update_url: String,
    /// Invoked after every successful `update`
    pub after_update: Option<Box<dyn FnMut() + Send>>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            item_class: "item".to_string(),
            update_url: "/admin/tags/search".to_string(),
            after_update: None,
        }
    }
}

impl std::fmt::Debug for ManagerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerOptions")
            .field("item_class", &self.item_class)
            .field("update_url", &self.update_url)
            .field("after_update", &self.after_update.is_some())
            .finish()
    }
}

/// A search facet; only the text of the first one is used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFacet {
    pub text: String,
}

/// Client-side controller for one rendered item list
#[derive(Debug)]
pub struct Manager {
    options: ManagerOptions,
    rows: Vec<Row>,
    cache: SearchCache,
}

impl Manager {
    pub fn new(options: ManagerOptions, rows: Vec<Row>) -> Self {
        Self {
            options,
            rows,
            cache: SearchCache::new(),
        }
    }

    /// Nothing is scanned until the first search.
    pub fn init(&mut self) -> &mut Self {
        self
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    pub fn filter(&mut self, query: &str) -> usize {
        self.cache
            .filter(&mut self.rows, &self.options.item_class, query)
    }

    pub fn quicksearch(&mut self, facets: &[SearchFacet]) -> usize {
        let query = facets.first().map(|f| f.text.as_str()).unwrap_or_default();
        self.filter(query)
    }

    /// Replace the rows with the server's answer for `query`
    ///
    /// The search cache is left as is.
    pub fn update(&mut self, query: &str, transport: &mut dyn UpdateTransport) -> Result<()> {
        self.rows = transport.post(&self.options.update_url, query)?;
        if let Some(callback) = self.options.after_update.as_mut() {
            callback();
        }
        Ok(())
    }
}
