//! # Product Repository
//!
//! Database operations for products, categories and stock thresholds.
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Atomic Conditional Decrement                              │
//! │                                                                         │
//! │  UPDATE products                                                        │
//! │  SET stock_quantity = stock_quantity - ?qty                             │
//! │  WHERE id = ?id AND stock_quantity >= ?qty                              │
//! │       │                                                                 │
//! │       ├── 1 row affected  → decrement happened, stock never negative   │
//! │       │                                                                 │
//! │       └── 0 rows affected → either product missing (NotFound) or       │
//! │                             stock too low (InsufficientStock)          │
//! │                                                                         │
//! │  The check and the write are ONE statement. Two concurrent sales of    │
//! │  the last unit cannot both pass the check.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockbook_core::{validation, Category, CoreError, Product, StockThreshold};

/// Fields for creating a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category_id: String,
    pub stock_quantity: i64,
    pub price_paise: i64,
    pub gst_rate_bps: u32,
    pub hsn_code: Option<String>,
    pub expiry_date: Option<chrono::NaiveDate>,
}

/// A product joined with its effective low-stock threshold.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LowStockProduct {
    pub id: String,
    pub name: String,
    pub stock_quantity: i64,
    pub threshold: i64,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let product = repo.get_by_id("uuid-here").await?;
/// let low = repo.low_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a category, returning its generated id.
    pub async fn create_category(&self, name: &str) -> DbResult<Category> {
        validation::validate_name(name).map_err(CoreError::from)?;

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };

        sqlx::query("INSERT INTO categories (id, name) VALUES (?1, ?2)")
            .bind(&category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await?;

        debug!(category = %category.name, "Category created");
        Ok(category)
    }

    /// Lists all categories, ordered by name.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    /// Creates a new product.
    pub async fn create(&self, new: NewProduct) -> DbResult<Product> {
        validation::validate_name(&new.name).map_err(CoreError::from)?;
        validation::validate_unit_price(new.price_paise).map_err(CoreError::from)?;
        validation::validate_gst_rate(new.gst_rate_bps).map_err(CoreError::from)?;
        if let Some(hsn) = &new.hsn_code {
            validation::validate_hsn_code(hsn).map_err(CoreError::from)?;
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            category_id: new.category_id,
            stock_quantity: new.stock_quantity,
            price_paise: new.price_paise,
            gst_rate_bps: new.gst_rate_bps,
            hsn_code: new.hsn_code,
            expiry_date: new.expiry_date,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, category_id, stock_quantity, price_paise,
                 gst_rate_bps, hsn_code, expiry_date, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.stock_quantity)
        .bind(product.price_paise)
        .bind(product.gst_rate_bps)
        .bind(&product.hsn_code)
        .bind(product.expiry_date)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(product = %product.name, stock = product.stock_quantity, "Product created");
        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, stock_quantity, price_paise,
                   gst_rate_bps, hsn_code, expiry_date, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(product)
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, stock_quantity, price_paise,
                   gst_rate_bps, hsn_code, expiry_date, created_at, updated_at
            FROM products
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches products by name prefix or substring.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();
        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list(limit).await;
        }

        let pattern = format!("%{}%", query);
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, stock_quantity, price_paise,
                   gst_rate_bps, hsn_code, expiry_date, created_at, updated_at
            FROM products
            WHERE name LIKE ?1
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Updates a product's editable fields.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validation::validate_name(&product.name).map_err(CoreError::from)?;
        validation::validate_unit_price(product.price_paise).map_err(CoreError::from)?;
        validation::validate_gst_rate(product.gst_rate_bps).map_err(CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?2, category_id = ?3, price_paise = ?4, gst_rate_bps = ?5,
                hsn_code = ?6, expiry_date = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.price_paise)
        .bind(product.gst_rate_bps)
        .bind(&product.hsn_code)
        .bind(product.expiry_date)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }
        Ok(())
    }

    /// Atomically decrements stock inside an existing transaction.
    ///
    /// The guard `stock_quantity >= quantity` is part of the UPDATE, so the
    /// check and the write cannot be separated by a concurrent writer.
    ///
    /// ## Failure Modes
    /// - 0 rows affected, product exists → `CoreError::InsufficientStock`
    ///   with the available quantity in the message
    /// - 0 rows affected, product missing → `DbError::NotFound`
    ///
    /// Either way the caller's transaction should be rolled back.
    pub(crate) async fn decrement_stock(
        conn: &mut SqliteConnection,
        product: &Product,
        quantity: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - ?2, updated_at = ?3
            WHERE id = ?1 AND stock_quantity >= ?2
            "#,
        )
        .bind(&product.id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            // Re-read inside the same transaction to report the live quantity
            let available: Option<i64> =
                sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                    .bind(&product.id)
                    .fetch_optional(&mut *conn)
                    .await?;

            return match available {
                Some(available) => Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available,
                    requested: quantity,
                }
                .into()),
                None => Err(DbError::not_found("Product", &product.id)),
            };
        }

        debug!(product = %product.name, quantity, "Stock decremented");
        Ok(())
    }

    /// Increments stock inside an existing transaction (purchases).
    pub(crate) async fn increment_stock(
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }
        Ok(())
    }

    /// Sets (or replaces) a per-product low-stock threshold.
    pub async fn set_threshold(&self, product_id: &str, threshold: i64) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_thresholds (product_id, threshold)
            VALUES (?1, ?2)
            ON CONFLICT (product_id) DO UPDATE SET threshold = excluded.threshold
            "#,
        )
        .bind(product_id)
        .bind(threshold)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns the threshold for a product, if one was configured.
    pub async fn threshold(&self, product_id: &str) -> DbResult<Option<StockThreshold>> {
        let row = sqlx::query_as::<_, StockThreshold>(
            "SELECT product_id, threshold FROM stock_thresholds WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Lists products at or below their low-stock threshold.
    ///
    /// Products without a configured threshold fall back to the default
    /// of 10 units.
    pub async fn low_stock(&self) -> DbResult<Vec<LowStockProduct>> {
        let products = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT p.id, p.name, p.stock_quantity,
                   COALESCE(t.threshold, ?1) AS threshold
            FROM products p
            LEFT JOIN stock_thresholds t ON t.product_id = p.id
            WHERE p.stock_quantity <= COALESCE(t.threshold, ?1)
            ORDER BY p.stock_quantity ASC, p.id ASC
            "#,
        )
        .bind(stockbook_core::DEFAULT_STOCK_THRESHOLD)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
