//! # Catalog Service
//!
//! Product CRUD and catalog queries. Validation runs here; the repository
//! below only touches rows.

use std::sync::Arc;

use tracing::info;

use ordena_core::validation::{validate_price_cents, validate_title};
use ordena_core::{Product, ProductStatus};
use ordena_db::Database;

use crate::error::{ServiceError, ServiceResult};

/// Input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: Option<String>,
    /// Defaults to Active on creation when absent.
    pub status: Option<ProductStatus>,
}

/// Catalog management service.
#[derive(Debug, Clone)]
pub struct ProductService {
    db: Arc<Database>,
}

impl ProductService {
    pub fn new(db: Arc<Database>) -> Self {
        ProductService { db }
    }

    /// Creates a product. New products default to Active unless the input
    /// says otherwise.
    pub async fn create(&self, input: ProductInput) -> ServiceResult<Product> {
        validate_title(&input.title)?;
        validate_price_cents(input.price_cents)?;

        let status = input.status.unwrap_or(ProductStatus::Active);
        let product = self
            .db
            .products()
            .insert(
                input.title.trim(),
                input.description.as_deref(),
                input.price_cents,
                input.category.as_deref(),
                status,
            )
            .await?;

        info!(id = %product.id, title = %product.title, "Product created");
        Ok(product)
    }

    /// Gets a product or fails with NotFound.
    pub async fn get(&self, id: &str) -> ServiceResult<Product> {
        self.db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    /// Lists the whole catalog.
    pub async fn list(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    /// Overwrites a product's mutable fields.
    pub async fn update(&self, id: &str, input: ProductInput) -> ServiceResult<Product> {
        validate_title(&input.title)?;
        validate_price_cents(input.price_cents)?;

        let current = self.get(id).await?;
        let status = input.status.unwrap_or(current.status);

        self.db
            .products()
            .update(
                id,
                input.title.trim(),
                input.description.as_deref(),
                input.price_cents,
                input.category.as_deref(),
                status,
            )
            .await?;

        self.get(id).await
    }

    /// Changes only the catalog status.
    pub async fn set_status(&self, id: &str, status: ProductStatus) -> ServiceResult<Product> {
        let current = self.get(id).await?;

        self.db
            .products()
            .update(
                id,
                &current.title,
                current.description.as_deref(),
                current.price_cents,
                current.category.as_deref(),
                status,
            )
            .await?;

        self.get(id).await
    }

    /// Deletes a product. Products referenced by order items cannot be
    /// deleted; archive them instead.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        match self.db.products().delete(id).await {
            Ok(()) => {
                info!(id, "Product deleted");
                Ok(())
            }
            Err(ordena_db::DbError::ForeignKeyViolation { .. }) => Err(ServiceError::business_rule(
                "product is referenced by existing orders; archive it instead",
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive substring search on the title.
    pub async fn find_by_title(&self, title: &str) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().find_by_title(title).await?)
    }

    /// Exact category match.
    pub async fn find_by_category(&self, category: &str) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().find_by_category(category).await?)
    }

    /// All products in a catalog status.
    pub async fn find_by_status(&self, status: ProductStatus) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().find_by_status(status).await?)
    }

    /// Products with `min <= price_cents <= max`.
    pub async fn find_by_price_range(&self, min: i64, max: i64) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().find_by_price_range(min, max).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
