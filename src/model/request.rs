use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::model::TermId;

/// Form field prefix carrying a selected term, e.g. `term_42=1`
pub const TERM_FIELD_PREFIX: &str = "term_";

/// Per-request authentication triple sent by the admin page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub digest: String,
}

impl Credentials {
    fn from_form(form: &HashMap<String, String>) -> Self {
        let field = |name: &str| form.get(name).cloned().unwrap_or_default();
        Self {
            nonce: field("nonce"),
            timestamp: field("timestamp"),
            digest: field("digest"),
        }
    }
}

/// Bulk action requested against the vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAction {
    Delete {
        term_ids: BTreeSet<TermId>,
    },
    Rename {
        /// Canonical name the selected terms are merged into
        master: Option<String>,
        term_ids: BTreeSet<TermId>,
    },
    /// Anything else; performs no mutation
    Other(String),
}

impl TagAction {
    pub fn name(&self) -> &str {
        match self {
            TagAction::Delete { .. } => "delete",
            TagAction::Rename { .. } => "rename",
            TagAction::Other(name) => name,
        }
    }
}

/// Parsed mutation request, decoupled from the transport that carried it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    pub credentials: Credentials,
    pub action: TagAction,
}

impl MutationRequest {
    /// Build a request from url-encoded form fields.
    ///
    /// Missing credential fields become empty strings so that they fail
    /// digest verification instead of failing to parse.
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        let term_ids: BTreeSet<TermId> = form
            .iter()
            .filter_map(|(key, value)| parse_term_flag(key, value))
            .collect();

        let action = match form.get("action").map(|a| a.trim()) {
            Some("delete") => TagAction::Delete { term_ids },
            Some("rename") => TagAction::Rename {
                master: form.get("master").cloned(),
                term_ids,
            },
            other => TagAction::Other(other.unwrap_or_default().to_string()),
        };

        Self {
            credentials: Credentials::from_form(form),
            action,
        }
    }
}

/// Query parameters of the authenticated search endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub search: String,
}

/// Returns the term id for a selected `term_<digits>` flag.
fn parse_term_flag(key: &str, value: &str) -> Option<TermId> {
    let digits = key.strip_prefix(TERM_FIELD_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = value.trim();
    if value.is_empty() || value == "0" {
        return None;
    }
    digits.parse().ok()
}
