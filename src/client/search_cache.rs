use crate::model::WeightedTerm;

/// A rendered row the cache can read and show or hide
pub trait RowView {
    fn has_class(&self, class: &str) -> bool;
    fn text_content(&self) -> String;
    fn set_visible(&mut self, visible: bool);
}

/// A row of the rendered tag list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub classes: Vec<String>,
    pub text: String,
    pub visible: bool,
}

impl Row {
    pub fn new<'a>(classes: impl IntoIterator<Item = &'a str>, text: impl Into<String>) -> Self {
        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
            text: text.into(),
            visible: true,
        }
    }

    /// Row for a weighted term, as the tag list renders it
    pub fn from_weighted(item: &WeightedTerm) -> Self {
        Self {
            classes: vec!["item".into(), "tag".into(), item.weight.css_class()],
            text: format!("{}{}", item.term.display_text, item.term.count),
            visible: true,
        }
    }
}

impl RowView for Row {
    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn text_content(&self) -> String {
        self.text.clone()
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Index of the row in the slice that was scanned
    pub row_handle: usize,
    pub normalized_text: String,
}

/// Lowercased row text, captured on the first filter call
///
/// The cache is never refreshed. Rows added, removed or edited after the
/// first call keep filtering against the text captured then.
#[derive(Debug, Clone, Default)]
pub struct SearchCache {
    entries: Option<Vec<CacheEntry>>,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.entries.is_some()
    }

    pub fn entries(&self) -> &[CacheEntry] {
        self.entries.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Show rows whose cached text contains the trimmed, lowercased `query`
    /// and hide the rest. Returns the number of rows left visible.
    pub fn filter<R: RowView>(&mut self, rows: &mut [R], item_class: &str, query: &str) -> usize {
        let entries = self.entries.get_or_insert_with(|| {
            rows.iter()
                .enumerate()
                .filter(|(_, row)| row.has_class(item_class))
                .map(|(row_handle, row)| CacheEntry {
                    row_handle,
                    normalized_text: row.text_content().to_lowercase(),
                })
                .collect()
        });

        let needle = query.trim().to_lowercase();
        let mut visible = 0;
        for entry in entries.iter() {
            let Some(row) = rows.get_mut(entry.row_handle) else {
                continue;
            };
            let matched = entry.normalized_text.contains(&needle);
            row.set_visible(matched);
            if matched {
                visible += 1;
            }
        }
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit_rows() -> Vec<Row> {
        vec![
            Row::new(["item", "tag"], "Apple:5"),
            Row::new(["item", "tag"], "Banana:2"),
            Row::new(["item", "tag"], "Grape:9"),
        ]
    }

    fn visible_texts(rows: &[Row]) -> Vec<&str> {
        rows.iter().filter(|r| r.visible).map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_cache_is_lazy() {
        let cache = SearchCache::new();
        assert!(!cache.is_built());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_filter_then_clear_without_rescan() {
        let mut rows = fruit_rows();
        let mut cache = SearchCache::new();

        assert_eq!(cache.filter(&mut rows, "item", "an"), 1);
        assert_eq!(visible_texts(&rows), vec!["Banana:2"]);
        assert_eq!(cache.len(), 3);

        assert_eq!(cache.filter(&mut rows, "item", ""), 3);
        assert_eq!(visible_texts(&rows), vec!["Apple:5", "Banana:2", "Grape:9"]);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_query_is_trimmed_and_case_folded() {
        let mut rows = fruit_rows();
        let mut cache = SearchCache::new();
        cache.filter(&mut rows, "item", "  GRAPE ");
        assert_eq!(visible_texts(&rows), vec!["Grape:9"]);
    }

    #[test]
    fn test_only_item_rows_are_cached() {
        let mut rows = fruit_rows();
        rows.push(Row::new(["header"], "Banana header"));
        let mut cache = SearchCache::new();
        cache.filter(&mut rows, "item", "zzz");
        assert_eq!(cache.len(), 3);
        assert!(rows[3].visible);
    }

    #[test]
    fn test_rows_built_from_weighted_terms() {
        use crate::logic::weighting::classify;
        use crate::model::Term;

        let item = WeightedTerm {
            term: Term::new(1, "Banana", 2),
            weight: classify(2, 0, 10),
        };
        let mut rows = vec![Row::from_weighted(&item)];
        assert!(rows[0].has_class("wt2"));

        let mut cache = SearchCache::new();
        assert_eq!(cache.filter(&mut rows, "item", "banana2"), 1);
    }

    #[test]
    fn test_cache_goes_stale_when_rows_change() {
        let mut rows = fruit_rows();
        let mut cache = SearchCache::new();
        cache.filter(&mut rows, "item", "");

        rows[0].text = "Cherry:1".into();
        cache.filter(&mut rows, "item", "apple");
        assert_eq!(visible_texts(&rows), vec!["Cherry:1"]);

        rows.truncate(1);
        assert_eq!(cache.filter(&mut rows, "item", ""), 1);
        assert_eq!(cache.len(), 3);
    }
}
