//! # Sale Repository
//!
//! Recording and reading sales.
//!
//! ## record_sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 One SQL Transaction, All or Nothing                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    for each line:                                                       │
//! │      ├─ load product (NotFound aborts)                                 │
//! │      ├─ resolve pricing (explicit override or product default)         │
//! │      ├─ conditional stock decrement (InsufficientStock aborts)         │
//! │      └─ compute base / GST / line total in integer paise               │
//! │    aggregate totals                                                     │
//! │    insert sale_transactions + sale_lines                               │
//! │    allocate invoice number from the counter                            │
//! │    insert invoice (due = issue + 7 days)                               │
//! │    non-cash method → record immediate full payment, status = paid      │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls back everything: no stock change, no burned         │
//! │  invoice number, no orphan lines.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::invoice::InvoiceRepository;
use crate::repository::product::ProductRepository;
use stockbook_core::billing::{self, LineAmounts, LinePricing};
use stockbook_core::{
    GstRate, Invoice, Money, Payment, PaymentMethod, PaymentStatus, Product, SaleLine,
    SaleTransaction,
};

// =============================================================================
// Request / Outcome Types
// =============================================================================

/// One requested line of a sale.
#[derive(Debug, Clone)]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity: i64,
    /// Price override in paise; None uses the product's current price.
    pub unit_price_paise: Option<i64>,
    /// GST override in basis points; None uses the product's current rate.
    pub gst_rate_bps: Option<u32>,
}

impl SaleLineRequest {
    /// A line sold at the product's current price and GST rate.
    pub fn at_current_price(product_id: impl Into<String>, quantity: i64) -> Self {
        SaleLineRequest {
            product_id: product_id.into(),
            quantity,
            unit_price_paise: None,
            gst_rate_bps: None,
        }
    }
}

/// A sale to be recorded.
#[derive(Debug, Clone)]
pub struct SaleRequest {
    pub customer_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub lines: Vec<SaleLineRequest>,
}

/// Everything produced by a committed sale.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    pub transaction: SaleTransaction,
    pub lines: Vec<SaleLine>,
    pub invoice: Invoice,
    /// Present when a non-cash sale settled immediately in full.
    pub payment: Option<Payment>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
///
/// ## Usage
/// ```rust,ignore
/// let outcome = db.sales().record_sale(SaleRequest {
///     customer_id: None,
///     payment_method: PaymentMethod::Upi,
///     notes: None,
///     lines: vec![SaleLineRequest::at_current_price(product_id, 2)],
/// }).await?;
/// println!("{}", outcome.invoice.invoice_number); // INV000001
/// ```
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a multi-line sale and issues its invoice atomically.
    ///
    /// ## Settlement
    /// Card / UPI / bank-transfer sales settle at the till: a payment for
    /// the full total is recorded in the same transaction and the invoice
    /// starts out `paid`. Cash sales leave the invoice `pending` until a
    /// payment is recorded against it.
    pub async fn record_sale(&self, request: SaleRequest) -> DbResult<SaleOutcome> {
        if request.lines.is_empty() {
            return Err(DbError::QueryFailed("sale has no line items".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let transaction_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut lines = Vec::with_capacity(request.lines.len());
        let mut amounts: Vec<LineAmounts> = Vec::with_capacity(request.lines.len());

        for line in &request.lines {
            let product = Self::load_product(&mut tx, &line.product_id).await?;

            let pricing = LinePricing::resolve(
                &product,
                line.unit_price_paise.map(Money::from_paise),
                line.gst_rate_bps.map(GstRate::from_bps),
            );
            let computed = billing::compute_line(pricing, line.quantity)?;

            ProductRepository::decrement_stock(&mut tx, &product, line.quantity).await?;

            lines.push(SaleLine {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction_id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                hsn_snapshot: product.hsn_code.clone(),
                quantity: line.quantity,
                unit_price_paise: pricing.unit_price.paise(),
                gst_rate_bps: pricing.gst_rate.bps(),
                gst_paise: computed.gst_amount.paise(),
                line_total_paise: computed.line_total.paise(),
            });
            amounts.push(computed);
        }

        let totals = billing::aggregate_lines(&amounts);

        let transaction = SaleTransaction {
            id: transaction_id.clone(),
            customer_id: request.customer_id.clone(),
            payment_method: request.payment_method,
            notes: request.notes.clone(),
            subtotal_paise: totals.subtotal.paise(),
            gst_total_paise: totals.gst_total.paise(),
            total_paise: totals.total.paise(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sale_transactions
                (id, customer_id, payment_method, notes,
                 subtotal_paise, gst_total_paise, total_paise, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.customer_id)
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
                INSERT INTO sale_lines
                    (id, transaction_id, product_id, name_snapshot, hsn_snapshot,
                     quantity, unit_price_paise, gst_rate_bps, gst_paise, line_total_paise)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&line.id)
            .bind(&line.transaction_id)
            .bind(&line.product_id)
            .bind(&line.name_snapshot)
            .bind(&line.hsn_snapshot)
            .bind(line.quantity)
            .bind(line.unit_price_paise)
            .bind(line.gst_rate_bps)
            .bind(line.gst_paise)
            .bind(line.line_total_paise)
            .execute(&mut *tx)
            .await?;
        }

        let invoice_number = InvoiceRepository::allocate_number(&mut tx).await?;

        let mut invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number,
            customer_id: request.customer_id.clone(),
            transaction_id: Some(transaction_id.clone()),
            issue_date: now,
            due_date: billing::due_date(now),
            payment_status: PaymentStatus::Pending,
            notes: request.notes.clone(),
            subtotal_paise: totals.subtotal.paise(),
            gst_total_paise: totals.gst_total.paise(),
            total_paise: totals.total.paise(),
        };
        InvoiceRepository::insert(&mut tx, &invoice).await?;

        // Non-cash methods settle immediately in full
        let payment = if request.payment_method != PaymentMethod::Cash
            && totals.total.is_positive()
        {
            let payment = Payment {
                id: Uuid::new_v4().to_string(),
                invoice_id: Some(invoice.id.clone()),
                purchase_id: None,
                amount_paise: totals.total.paise(),
                method: request.payment_method,
                transaction_ref: None,
                paid_at: now,
            };
            InvoiceRepository::insert_payment(&mut tx, &payment).await?;
            invoice.payment_status =
                InvoiceRepository::refresh_payment_status(&mut tx, &invoice.id).await?;
            Some(payment)
        } else {
            None
        };

        tx.commit().await?;

        info!(
            invoice = %invoice.invoice_number,
            lines = lines.len(),
            total_paise = transaction.total_paise,
            status = ?invoice.payment_status,
            "Sale recorded"
        );

        Ok(SaleOutcome {
            transaction,
            lines,
            invoice,
            payment,
        })
    }

    async fn load_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, stock_quantity, price_paise,
                   gst_rate_bps, hsn_code, expiry_date, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(product)
    }

    /// Gets a sale transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<SaleTransaction> {
        let transaction = sqlx::query_as::<_, SaleTransaction>(
            r#"
            SELECT id, customer_id, payment_method, notes,
                   subtotal_paise, gst_total_paise, total_paise, created_at
            FROM sale_transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("SaleTransaction", id))?;

        Ok(transaction)
    }

    /// Lists recent sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<SaleTransaction>> {
        let transactions = sqlx::query_as::<_, SaleTransaction>(
            r#"
            SELECT id, customer_id, payment_method, notes,
                   subtotal_paise, gst_total_paise, total_paise, created_at
            FROM sale_transactions
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Gets the line items of a sale.
    pub async fn lines(&self, transaction_id: &str) -> DbResult<Vec<SaleLine>> {
        debug!(transaction_id = %transaction_id, "Loading sale lines");
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, transaction_id, product_id, name_snapshot, hsn_snapshot,
                   quantity, unit_price_paise, gst_rate_bps, gst_paise, line_total_paise
            FROM sale_lines
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
