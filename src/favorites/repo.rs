use async_trait::async_trait;
use sqlx::PgPool;

use crate::products::repo::Product;

/// Outcome of inserting a (user, product) pair into the relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The pair already existed; surfaced by the store's uniqueness
    /// constraint when a concurrent add slips past the pre-check.
    Duplicate,
}

/// Persistence seam for the favorites relation. The Postgres
/// implementation is the sole mutator; tests substitute an in-memory one.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn product(&self, product_id: i64) -> anyhow::Result<Option<Product>>;
    async fn list(&self, user_id: i64) -> anyhow::Result<Vec<Product>>;
    async fn contains(&self, user_id: i64, product_id: i64) -> anyhow::Result<bool>;
    async fn insert(&self, user_id: i64, product_id: i64) -> anyhow::Result<InsertOutcome>;
    /// Returns whether a pair was actually removed.
    async fn remove(&self, user_id: i64, product_id: i64) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgFavoriteStore {
    pub db: PgPool,
}

#[async_trait]
impl FavoriteStore for PgFavoriteStore {
    async fn product(&self, product_id: i64) -> anyhow::Result<Option<Product>> {
        Product::find_by_id(&self.db, product_id).await
    }

    async fn list(&self, user_id: i64) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT p.id, p.name, p.description, p.price, p.created_at
            FROM products p
            JOIN favorites f ON f.product_id = p.id
            WHERE f.user_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn contains(&self, user_id: i64, product_id: i64) -> anyhow::Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT 1::BIGINT
            FROM favorites
            WHERE user_id = $1 AND product_id = $2
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, user_id: i64, product_id: i64) -> anyhow::Result<InsertOutcome> {
        // ON CONFLICT turns a lost race into the same duplicate outcome
        // the pre-check would have produced.
        let result = sqlx::query(
            r#"
            INSERT INTO favorites (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 1 {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::Duplicate)
        }
    }

    async fn remove(&self, user_id: i64, product_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1 AND product_id = $2
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
