//! # Purchase Repository
//!
//! Recording purchases from suppliers. Mirrors the sale flow with the
//! stock direction reversed (unconditional increment) and no invoice.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use stockbook_core::billing::{self, LineAmounts, LinePricing};
use stockbook_core::{
    validation, CoreError, GstRate, Money, Payment, PaymentMethod, PurchaseLine,
    PurchaseTransaction,
};

/// One requested line of a purchase.
#[derive(Debug, Clone)]
pub struct PurchaseLineRequest {
    pub product_id: String,
    pub quantity: i64,
    /// Cost price in paise for this purchase.
    pub unit_price_paise: i64,
    /// GST override in basis points; None uses the product's current rate.
    pub gst_rate_bps: Option<u32>,
}

/// A purchase to be recorded.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub supplier_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub lines: Vec<PurchaseLineRequest>,
}

/// Everything produced by a committed purchase.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub transaction: PurchaseTransaction,
    pub lines: Vec<PurchaseLine>,
}

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Records a multi-line purchase atomically.
    ///
    /// Stock is incremented per line; all inserts and increments commit or
    /// roll back as one unit.
    pub async fn record_purchase(&self, request: PurchaseRequest) -> DbResult<PurchaseOutcome> {
        validation::validate_purchase_payment_method(request.payment_method)
            .map_err(CoreError::from)?;

        if request.lines.is_empty() {
            return Err(DbError::QueryFailed(
                "purchase has no line items".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let transaction_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut lines = Vec::with_capacity(request.lines.len());
        let mut amounts: Vec<LineAmounts> = Vec::with_capacity(request.lines.len());

        for line in &request.lines {
            let product = sqlx::query_as::<_, stockbook_core::Product>(
                r#"
                SELECT id, name, category_id, stock_quantity, price_paise,
                       gst_rate_bps, hsn_code, expiry_date, created_at, updated_at
                FROM products
                WHERE id = ?1
                "#,
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;

            let pricing = LinePricing::resolve(
                &product,
                Some(Money::from_paise(line.unit_price_paise)),
                line.gst_rate_bps.map(GstRate::from_bps),
            );
            let computed = billing::compute_line(pricing, line.quantity)?;

            ProductRepository::increment_stock(&mut tx, &product.id, line.quantity).await?;

            lines.push(PurchaseLine {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction_id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                quantity: line.quantity,
                unit_price_paise: pricing.unit_price.paise(),
                gst_rate_bps: pricing.gst_rate.bps(),
                gst_paise: computed.gst_amount.paise(),
                line_total_paise: computed.line_total.paise(),
            });
            amounts.push(computed);
        }

        let totals = billing::aggregate_lines(&amounts);

        let transaction = PurchaseTransaction {
            id: transaction_id.clone(),
            supplier_id: request.supplier_id.clone(),
            payment_method: request.payment_method,
            notes: request.notes.clone(),
            subtotal_paise: totals.subtotal.paise(),
            gst_total_paise: totals.gst_total.paise(),
            total_paise: totals.total.paise(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO purchase_transactions
                (id, supplier_id, payment_method, notes,
                 subtotal_paise, gst_total_paise, total_paise, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.supplier_id)
        .bind(transaction.payment_method)
        .bind(&transaction.notes)
        .bind(transaction.subtotal_paise)
        .bind(transaction.gst_total_paise)
        .bind(transaction.total_paise)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_lines
                    (id, transaction_id, product_id, name_snapshot,
                     quantity, unit_price_paise, gst_rate_bps, gst_paise, line_total_paise)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&line.id)
            .bind(&line.transaction_id)
            .bind(&line.product_id)
            .bind(&line.name_snapshot)
            .bind(line.quantity)
            .bind(line.unit_price_paise)
            .bind(line.gst_rate_bps)
            .bind(line.gst_paise)
            .bind(line.line_total_paise)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            purchase = %transaction.id,
            lines = lines.len(),
            total_paise = transaction.total_paise,
            "Purchase recorded"
        );

        Ok(PurchaseOutcome { transaction, lines })
    }

    /// Records a payment towards a purchase.
    pub async fn record_payment(
        &self,
        purchase_id: &str,
        amount_paise: i64,
        method: PaymentMethod,
        transaction_ref: Option<String>,
    ) -> DbResult<Payment> {
        validation::validate_payment_amount(amount_paise).map_err(CoreError::from)?;

        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM purchase_transactions WHERE id = ?1")
                .bind(purchase_id)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found("PurchaseTransaction", purchase_id));
        }

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            invoice_id: None,
            purchase_id: Some(purchase_id.to_string()),
            amount_paise,
            method,
            transaction_ref,
            paid_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO payments
                (id, invoice_id, purchase_id, amount_paise, method, transaction_ref, paid_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.invoice_id)
        .bind(&payment.purchase_id)
        .bind(payment.amount_paise)
        .bind(payment.method)
        .bind(&payment.transaction_ref)
        .bind(payment.paid_at)
        .execute(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Gets a purchase transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<PurchaseTransaction> {
        let transaction = sqlx::query_as::<_, PurchaseTransaction>(
            r#"
            SELECT id, supplier_id, payment_method, notes,
                   subtotal_paise, gst_total_paise, total_paise, created_at
            FROM purchase_transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("PurchaseTransaction", id))?;

        Ok(transaction)
    }

    /// Lists recent purchases, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<PurchaseTransaction>> {
        let transactions = sqlx::query_as::<_, PurchaseTransaction>(
            r#"
            SELECT id, supplier_id, payment_method, notes,
                   subtotal_paise, gst_total_paise, total_paise, created_at
            FROM purchase_transactions
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Gets the line items of a purchase.
    pub async fn lines(&self, transaction_id: &str) -> DbResult<Vec<PurchaseLine>> {
        let lines = sqlx::query_as::<_, PurchaseLine>(
            r#"
            SELECT id, transaction_id, product_id, name_snapshot,
                   quantity, unit_price_paise, gst_rate_bps, gst_paise, line_total_paise
            FROM purchase_lines
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}
