//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! Products referenced by order items cannot be deleted: the foreign key
//! from `order_items.product_id` restricts deletion, preserving sold
//! history (snapshots carry the price, the row carries identity).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ordena_core::{Product, ProductStatus};

const PRODUCT_COLUMNS: &str = "id, title, description, price_cents, category, status, \
                               created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product, assigning a fresh id and timestamps.
    pub async fn insert(
        &self,
        title: &str,
        description: Option<&str>,
        price_cents: i64,
        category: Option<&str>,
        status: ProductStatus,
    ) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            price_cents,
            category: category.map(str::to_string),
            status,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, title = %product.title, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, title, description, price_cents, category, status,
                                  created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Overwrites the mutable fields of a product.
    pub async fn update(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
        price_cents: i64,
        category: Option<&str>,
        status: ProductStatus,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                title = ?2,
                description = ?3,
                price_cents = ?4,
                category = ?5,
                status = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(price_cents)
        .bind(category)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product. Fails with ForeignKeyViolation when order items
    /// still reference it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Case-insensitive substring search on the title.
    pub async fn find_by_title(&self, title: &str) -> DbResult<Vec<Product>> {
        let pattern = format!("%{}%", title.trim().to_lowercase());

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE LOWER(title) LIKE ?1 ORDER BY created_at"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Finds products in a category.
    pub async fn find_by_category(&self, category: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ?1 ORDER BY created_at"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Finds products by catalog status.
    pub async fn find_by_status(&self, status: ProductStatus) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE status = ?1 ORDER BY created_at"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Finds products whose price falls in the inclusive range.
    pub async fn find_by_price_range(
        &self,
        min_cents: i64,
        max_cents: i64,
    ) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE price_cents >= ?1 AND price_cents <= ?2 ORDER BY created_at"
        ))
        .bind(min_cents)
        .bind(max_cents)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo
            .insert("Notebook", Some("i7, 16GB"), 350_000, Some("informatica"), ProductStatus::Active)
            .await
            .unwrap();

        let found = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Notebook");
        assert_eq!(found.price_cents, 350_000);
        assert_eq!(found.status, ProductStatus::Active);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo
            .insert("Mouse", None, 5_000, None, ProductStatus::Active)
            .await
            .unwrap();

        repo.update(&product.id, "Mouse Gamer", None, 7_500, Some("perifericos"), ProductStatus::OutOfStock)
            .await
            .unwrap();

        let found = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Mouse Gamer");
        assert_eq!(found.status, ProductStatus::OutOfStock);

        repo.delete(&product.id).await.unwrap();
        assert!(repo.get_by_id(&product.id).await.unwrap().is_none());

        // Deleting again is NotFound
        assert!(matches!(
            repo.delete(&product.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_by_title_is_case_insensitive() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert("Teclado Mecânico", None, 25_000, None, ProductStatus::Active)
            .await
            .unwrap();

        let found = repo.find_by_title("TECLADO").await.unwrap();
        assert_eq!(found.len(), 1);

        let found = repo.find_by_title("mouse").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_price_range() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert("A", None, 1_000, None, ProductStatus::Active).await.unwrap();
        repo.insert("B", None, 5_000, None, ProductStatus::Active).await.unwrap();
        repo.insert("C", None, 10_000, None, ProductStatus::Active).await.unwrap();

        let found = repo.find_by_price_range(2_000, 10_000).await.unwrap();
        assert_eq!(found.len(), 2);
    }
}
