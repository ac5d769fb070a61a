use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::logic::weighting::WeightClass;

pub type TermId = i64;

/// A single vocabulary entry as owned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    /// Text shown to administrators
    pub display_text: String,
    /// Normalized form used for matching and search links
    pub searchable_text: String,
    /// Number of content items carrying this term
    pub count: u64,
}

impl Term {
    pub fn new(id: TermId, display_text: impl Into<String>, count: u64) -> Self {
        let display_text = display_text.into();
        Self {
            id,
            searchable_text: normalize_searchable(&display_text),
            display_text,
            count,
        }
    }
}

/// Ordered, transient view over terms produced by a tree or search query
pub type TermSet = Vec<Term>;

/// Sort keys accepted by the store queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermOrder {
    #[default]
    DisplayAsc,
}

impl TermOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TermOrder::DisplayAsc => r#"term_display COLLATE "C" ASC, id ASC"#,
        }
    }

    /// Sort in place; ties on the sort key are broken by id.
    pub fn sort(&self, terms: &mut [Term]) {
        match self {
            TermOrder::DisplayAsc => terms.sort_by(|a, b| {
                a.display_text
                    .cmp(&b.display_text)
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
    }
}

impl std::fmt::Display for TermOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TermOrder::DisplayAsc => write!(f, "term_display asc"),
        }
    }
}

/// A term paired with the weight class it received for the current view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedTerm {
    #[serde(flatten)]
    pub term: Term,
    pub weight: WeightClass,
}

/// Lowercase, trim and collapse inner whitespace to single spaces.
pub fn normalize_searchable(text: &str) -> String {
    text.split_whitespace().map(str::to_lowercase).join(" ")
}
