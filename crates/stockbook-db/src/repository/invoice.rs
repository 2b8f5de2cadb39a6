//! # Invoice Repository
//!
//! Invoice persistence, sequential number allocation, and payments.
//!
//! ## Number Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            Counter Allocation (never read-then-write)                   │
//! │                                                                         │
//! │  UPDATE invoice_sequence                                                │
//! │  SET last_number = last_number + 1                                      │
//! │  WHERE id = 1                                                           │
//! │  RETURNING last_number                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  seq = 42 ──► invoice_number(42) ──► "INV000042"                        │
//! │                                                                         │
//! │  Increment and read are ONE statement, executed inside the sale's      │
//! │  transaction. Two concurrent allocations can never observe the same    │
//! │  value; an aborted sale rolls the increment back with everything else. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payment Status
//! Never mutated incrementally. After every recorded payment the status is
//! recomputed from `SUM(payments.amount_paise)` against the invoice total,
//! so replays and corrections converge on the right answer.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockbook_core::billing;
use stockbook_core::{
    validation, CoreError, Invoice, Money, Payment, PaymentMethod, PaymentStatus,
};

const INVOICE_COLUMNS: &str = r#"
    id, invoice_number, customer_id, transaction_id, issue_date, due_date,
    payment_status, notes, subtotal_paise, gst_total_paise, total_paise
"#;

/// Repository for invoice database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InvoiceRepository::new(pool);
/// let invoice = repo.get_by_number("INV000042").await?;
/// let payment = repo.record_payment(&invoice.id, 5000, PaymentMethod::Upi, None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Allocates the next invoice number from the single-row counter.
    ///
    /// Must be called inside the transaction that inserts the invoice: if
    /// the transaction aborts, the increment rolls back and the number is
    /// never burned.
    ///
    /// Fails with `SequenceExhausted` once the counter passes 999999. The
    /// failed increment rolls back with the enclosing transaction, so the
    /// stored counter never exceeds the maximum.
    pub(crate) async fn allocate_number(conn: &mut SqliteConnection) -> DbResult<String> {
        let seq: i64 = sqlx::query_scalar(
            r#"
            UPDATE invoice_sequence
            SET last_number = last_number + 1
            WHERE id = 1
            RETURNING last_number
            "#,
        )
        .fetch_one(&mut *conn)
        .await?;

        let number = billing::invoice_number(seq as u32)?;
        debug!(number = %number, "Invoice number allocated");
        Ok(number)
    }

    /// Inserts an invoice inside an existing transaction.
    pub(crate) async fn insert(conn: &mut SqliteConnection, invoice: &Invoice) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invoices
                (id, invoice_number, customer_id, transaction_id, issue_date, due_date,
                 payment_status, notes, subtotal_paise, gst_total_paise, total_paise)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.customer_id)
        .bind(&invoice.transaction_id)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.payment_status)
        .bind(&invoice.notes)
        .bind(invoice.subtotal_paise)
        .bind(invoice.gst_total_paise)
        .bind(invoice.total_paise)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Gets an invoice by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Invoice> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Invoice", id))?;

        Ok(invoice)
    }

    /// Gets an invoice by its business number (e.g. `INV000042`).
    pub async fn get_by_number(&self, number: &str) -> DbResult<Invoice> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_number = ?1"
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Invoice", number))?;

        Ok(invoice)
    }

    /// Lists invoices, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY invoice_number DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Lists invoices filtered by payment status.
    pub async fn list_by_status(
        &self,
        status: PaymentStatus,
        limit: u32,
    ) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS} FROM invoices
            WHERE payment_status = ?1
            ORDER BY invoice_number DESC
            LIMIT ?2
            "#
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Records a payment against an invoice and refreshes its status.
    ///
    /// Insert and status recompute run in one transaction. The status is
    /// derived from the full payment sum, so recording ₹50 then ₹68 against
    /// a ₹118 invoice moves it pending → partial → paid.
    pub async fn record_payment(
        &self,
        invoice_id: &str,
        amount_paise: i64,
        method: PaymentMethod,
        transaction_ref: Option<String>,
    ) -> DbResult<Payment> {
        validation::validate_payment_amount(amount_paise).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        // Existence check up front for a clean NotFound instead of an FK error
        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM invoices WHERE id = ?1")
                .bind(invoice_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Invoice", invoice_id));
        }

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            invoice_id: Some(invoice_id.to_string()),
            purchase_id: None,
            amount_paise,
            method,
            transaction_ref,
            paid_at: Utc::now(),
        };

        Self::insert_payment(&mut tx, &payment).await?;
        let status = Self::refresh_payment_status(&mut tx, invoice_id).await?;

        tx.commit().await?;

        info!(
            invoice_id = %invoice_id,
            amount_paise,
            status = ?status,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Inserts a payment row inside an existing transaction.
    pub(crate) async fn insert_payment(
        conn: &mut SqliteConnection,
        payment: &Payment,
    ) -> DbResult<()> {
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
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Recomputes an invoice's payment status from the payment sum.
    ///
    /// Idempotent: running it twice with no new payment is a no-op.
    pub(crate) async fn refresh_payment_status(
        conn: &mut SqliteConnection,
        invoice_id: &str,
    ) -> DbResult<PaymentStatus> {
        let (total_paise, paid_paise): (i64, i64) = sqlx::query_as(
            r#"
            SELECT i.total_paise,
                   COALESCE(SUM(p.amount_paise), 0)
            FROM invoices i
            LEFT JOIN payments p ON p.invoice_id = i.id
            WHERE i.id = ?1
            GROUP BY i.id
            "#,
        )
        .bind(invoice_id)
        .fetch_one(&mut *conn)
        .await?;

        let status = billing::payment_status(
            Money::from_paise(total_paise),
            Money::from_paise(paid_paise),
        );

        sqlx::query("UPDATE invoices SET payment_status = ?2 WHERE id = ?1")
            .bind(invoice_id)
            .bind(status)
            .execute(&mut *conn)
            .await?;

        Ok(status)
    }

    /// Returns the sum paid against an invoice.
    pub async fn total_paid(&self, invoice_id: &str) -> DbResult<Money> {
        let paid: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_paise), 0) FROM payments WHERE invoice_id = ?1",
        )
        .bind(invoice_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_paise(paid))
    }

    /// Lists payments recorded against an invoice, oldest first.
    pub async fn payments(&self, invoice_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, invoice_id, purchase_id, amount_paise, method, transaction_ref, paid_at
            FROM payments
            WHERE invoice_id = ?1
            ORDER BY paid_at ASC, id ASC
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}
