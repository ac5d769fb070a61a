use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};

use crate::model::{normalize_searchable, Term, TermId, TermOrder};
use crate::store::traits::TagStore;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS terms (
        id BIGSERIAL PRIMARY KEY,
        term_display TEXT NOT NULL,
        term_searchable TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS terms_searchable_idx ON terms (term_searchable)",
    "CREATE SEQUENCE IF NOT EXISTS content_object_seq",
    "CREATE TABLE IF NOT EXISTS term_objects (
        term_id BIGINT NOT NULL REFERENCES terms (id) ON DELETE CASCADE,
        object_id BIGINT NOT NULL,
        PRIMARY KEY (term_id, object_id)
    )",
];

const TERM_COLUMNS: &str = "SELECT t.id, t.term_display, t.term_searchable, COUNT(o.object_id) AS count
    FROM terms t LEFT JOIN term_objects o ON o.term_id = t.id";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create tables and indexes when missing
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to apply schema statement")?;
        }
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn bounded_count(&self, aggregate: &str) -> Result<u64> {
        let sql = format!(
            "SELECT COALESCE({}(c), 0) AS bound FROM (
                SELECT COUNT(o.object_id) AS c
                FROM terms t LEFT JOIN term_objects o ON o.term_id = t.id
                GROUP BY t.id
            ) per_term",
            aggregate
        );
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .context("Failed to compute term count bound")?;
        let bound: i64 = row.get("bound");
        Ok(bound.max(0) as u64)
    }
}

fn term_from_row(row: PgRow) -> Term {
    let count: i64 = row.get("count");
    Term {
        id: row.get("id"),
        display_text: row.get("term_display"),
        searchable_text: row.get("term_searchable"),
        count: count.max(0) as u64,
    }
}

#[async_trait::async_trait]
impl TagStore for PostgresStore {
    async fn get_tree(&self, order: TermOrder) -> Result<Vec<Term>> {
        let sql = format!("{} GROUP BY t.id ORDER BY {}", TERM_COLUMNS, order.as_sql());
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch term tree")?;
        Ok(rows.into_iter().map(term_from_row).collect())
    }

    async fn get_search(&self, query: &str, order: TermOrder) -> Result<Vec<Term>> {
        let sql = format!(
            "{} WHERE strpos(t.term_searchable, $1) > 0 GROUP BY t.id ORDER BY {}",
            TERM_COLUMNS,
            order.as_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(normalize_searchable(query))
            .fetch_all(&self.pool)
            .await
            .context("Failed to search terms")?;
        Ok(rows.into_iter().map(term_from_row).collect())
    }

    async fn max_count(&self) -> Result<u64> {
        self.bounded_count("MAX").await
    }

    async fn min_count(&self) -> Result<u64> {
        self.bounded_count("MIN").await
    }

    async fn get_by_id(&self, id: TermId) -> Result<Option<Term>> {
        let sql = format!("{} WHERE t.id = $1 GROUP BY t.id", TERM_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch term")?;
        Ok(row.map(term_from_row))
    }

    async fn delete_term(&self, term: &Term) -> Result<()> {
        sqlx::query("DELETE FROM terms WHERE id = $1")
            .bind(term.id)
            .execute(&self.pool)
            .await
            .context("Failed to delete term")?;
        Ok(())
    }

    async fn merge(&self, canonical_name: &str, names: &[String]) -> Result<()> {
        let canonical_searchable = normalize_searchable(canonical_name);
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin merge transaction")?;

        let sources: Vec<TermId> =
            sqlx::query("SELECT id FROM terms WHERE term_display = ANY($1) ORDER BY id FOR UPDATE")
                .bind(names)
                .fetch_all(&mut *tx)
                .await
                .context("Failed to lock merge sources")?
                .into_iter()
                .map(|row| row.get("id"))
                .collect();
        if sources.is_empty() {
            tx.commit().await.context("Failed to commit merge")?;
            return Ok(());
        }

        let existing: Option<TermId> = sqlx::query(
            "SELECT id FROM terms WHERE term_searchable = $1 ORDER BY id LIMIT 1 FOR UPDATE",
        )
        .bind(&canonical_searchable)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to look up canonical term")?
        .map(|row| row.get("id"));

        let target_id: TermId = match existing {
            Some(id) => {
                sqlx::query("UPDATE terms SET term_display = $2, term_searchable = $3 WHERE id = $1")
                    .bind(id)
                    .bind(canonical_name)
                    .bind(&canonical_searchable)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to rename canonical term")?;
                id
            }
            None => sqlx::query(
                "INSERT INTO terms (term_display, term_searchable) VALUES ($1, $2) RETURNING id",
            )
            .bind(canonical_name)
            .bind(&canonical_searchable)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to create canonical term")?
            .get("id"),
        };

        let absorbed: Vec<TermId> = sources.into_iter().filter(|id| *id != target_id).collect();

        sqlx::query(
            "INSERT INTO term_objects (term_id, object_id)
             SELECT $1, object_id FROM term_objects WHERE term_id = ANY($2)
             ON CONFLICT DO NOTHING",
        )
        .bind(target_id)
        .bind(&absorbed)
        .execute(&mut *tx)
        .await
        .context("Failed to re-point term associations")?;

        sqlx::query("DELETE FROM terms WHERE id = ANY($1)")
            .bind(&absorbed)
            .execute(&mut *tx)
            .await
            .context("Failed to remove merged terms")?;

        tx.commit().await.context("Failed to commit merge")?;
        log::debug!(
            "Merged {} term(s) into {:?} (id {})",
            absorbed.len(),
            canonical_name,
            target_id
        );
        Ok(())
    }

    async fn insert_term(&self, display_text: &str, count: u64) -> Result<Term> {
        let mut tx = self.pool.begin().await.context("Failed to begin insert")?;
        let searchable = normalize_searchable(display_text);

        let id: TermId = sqlx::query(
            "INSERT INTO terms (term_display, term_searchable) VALUES ($1, $2) RETURNING id",
        )
        .bind(display_text)
        .bind(&searchable)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert term")?
        .get("id");

        // Placeholder content objects so the derived count matches the request
        sqlx::query(
            "INSERT INTO term_objects (term_id, object_id)
             SELECT $1, nextval('content_object_seq') FROM generate_series(1, $2::bigint)",
        )
        .bind(id)
        .bind(count as i64)
        .execute(&mut *tx)
        .await
        .context("Failed to attach content objects")?;

        tx.commit().await.context("Failed to commit insert")?;

        Ok(Term {
            id,
            display_text: display_text.to_string(),
            searchable_text: searchable,
            count,
        })
    }
}
