use crate::model::TermOrder;
use crate::store::traits::TagStore;
use anyhow::Result;

/// Demonstration vocabulary with a spread of counts wide enough to hit
/// every weight class
pub const SEED_TERMS: &[(&str, u64)] = &[
    ("Announcements", 3),
    ("Databases", 18),
    ("Design", 9),
    ("Events", 1),
    ("Open Source", 42),
    ("Performance", 27),
    ("Release Notes", 12),
    ("Rust", 64),
    ("Security", 35),
    ("Testing", 21),
    ("Tutorials", 50),
    ("Web", 6),
];

pub async fn load_seed_data<S: TagStore + ?Sized>(store: &S) -> Result<()> {
    if !store.get_tree(TermOrder::default()).await?.is_empty() {
        log::info!("Vocabulary already populated, skipping seed data");
        return Ok(());
    }

    for (name, count) in SEED_TERMS {
        let term = store.insert_term(name, *count).await?;
        log::debug!("Seeded term {} ({}) with count {}", term.id, name, count);
    }

    log::info!("Seeded {} terms", SEED_TERMS.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_populates_empty_store_once() {
        let store = MemoryStore::new();
        load_seed_data(&store).await.unwrap();
        assert_eq!(store.len(), SEED_TERMS.len());

        load_seed_data(&store).await.unwrap();
        assert_eq!(store.len(), SEED_TERMS.len());

        let tree = store.get_tree(TermOrder::DisplayAsc).await.unwrap();
        assert_eq!(tree[0].display_text, "Announcements");
        assert_eq!(store.max_count().await.unwrap(), 64);
    }

    #[tokio::test]
    async fn test_zero_count_vocabulary_is_not_reseeded() {
        let store = MemoryStore::with_terms([("Drafts", 0)]);
        load_seed_data(&store).await.unwrap();
        assert_eq!(store.len(), 1);
    }
}
