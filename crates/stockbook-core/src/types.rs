//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ SaleTransaction │   │    Invoice      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  invoice_number │       │
//! │  │  price_paise    │   │  payment_method │   │  due_date       │       │
//! │  │  gst_rate_bps   │   │  total_paise    │   │  payment_status │       │
//! │  │  stock_quantity │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    GstRate      │   │ PaymentStatus   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Pending        │   │  Cash / Card    │       │
//! │  │  1800 = 18.00%  │   │  Partial / Paid │   │  Upi / BankXfer │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (invoice_number) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::DEFAULT_STOCK_THRESHOLD;

// =============================================================================
// GST Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// GST percentages carry two decimal places (18.00%, 8.25%).
/// 1 basis point = 0.01%, so the rate is an exact integer:
/// 1800 bps = 18.00% (the common slab for electronics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GstRate(u32);

impl GstRate {
    /// Creates a GST rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    /// Creates a GST rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        GstRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero GST rate.
    #[inline]
    pub const fn zero() -> Self {
        GstRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::zero()
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product tracked in inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Category this product belongs to.
    pub category_id: String,

    /// Current stock level. Decremented by sales, incremented by purchases.
    pub stock_quantity: i64,

    /// Selling price in paise (smallest currency unit).
    pub price_paise: i64,

    /// GST rate in basis points (1800 = 18.00%).
    pub gst_rate_bps: u32,

    /// HSN classification code for tax reporting (opaque string).
    pub hsn_code: Option<String>,

    /// Optional expiry date for perishable goods.
    pub expiry_date: Option<NaiveDate>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Returns the GST rate.
    #[inline]
    pub fn gst_rate(&self) -> GstRate {
        GstRate::from_bps(self.gst_rate_bps)
    }

    /// Checks whether stock is at or below the low-stock threshold.
    ///
    /// Products without an explicit `StockThreshold` row fall back to the
    /// default of 10 units.
    pub fn is_low_stock(&self, threshold: Option<i64>) -> bool {
        self.stock_quantity <= threshold.unwrap_or(DEFAULT_STOCK_THRESHOLD)
    }
}

// =============================================================================
// Counterparties
// =============================================================================

/// A customer a sale or invoice may be issued to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    /// GST identification number, if registered.
    pub gstin: Option<String>,
}

/// A supplier purchases are recorded against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gst_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a transaction or payment was settled.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment.
    Card,
    /// Unified Payments Interface transfer.
    Upi,
    /// Direct bank transfer.
    BankTransfer,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Settlement state of an invoice.
///
/// Transitions monotonically pending → partial → paid as payments
/// accumulate. The status is never stored incrementally - it is always
/// recomputed from the full payment sum against the invoice total.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No payment received.
    Pending,
    /// Some, but not all, of the total has been paid.
    Partial,
    /// Total fully settled (or overpaid).
    Paid,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

/// A finalized multi-line sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleTransaction {
    pub id: String,
    /// Optional counterparty; walk-in sales have none.
    pub customer_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Sum of unit_price × quantity over the lines.
    pub subtotal_paise: i64,
    /// Sum of per-line GST amounts.
    pub gst_total_paise: i64,
    /// subtotal + gst_total, equal to the sum of line totals exactly.
    pub total_paise: i64,
    /// Creation timestamp, immutable once set.
    pub created_at: DateTime<Utc>,
}

impl SaleTransaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

/// A line item in a sale.
/// Uses snapshot pattern: pricing is frozen at time of sale, so later
/// product edits never change a recorded transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// HSN code at time of sale (frozen).
    pub hsn_snapshot: Option<String>,
    /// Quantity sold (always positive).
    pub quantity: i64,
    /// Unit price in paise at time of sale (frozen).
    pub unit_price_paise: i64,
    /// GST rate in basis points at time of sale (frozen).
    pub gst_rate_bps: u32,
    /// GST amount for this line, recomputed from the inputs above.
    pub gst_paise: i64,
    /// unit_price × quantity + gst.
    pub line_total_paise: i64,
}

impl SaleLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.line_total_paise)
    }
}

// =============================================================================
// Purchase Transaction
// =============================================================================

/// A multi-line purchase from a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseTransaction {
    pub id: String,
    pub supplier_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub subtotal_paise: i64,
    pub gst_total_paise: i64,
    pub total_paise: i64,
    pub created_at: DateTime<Utc>,
}

/// A line item in a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseLine {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_paise: i64,
    pub gst_rate_bps: u32,
    pub gst_paise: i64,
    pub line_total_paise: i64,
}

// =============================================================================
// Invoice
// =============================================================================

/// A GST invoice issued for a sale transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    /// Business identifier: `INV` + zero-padded 6-digit sequence.
    /// Unique, strictly increasing, immutable once assigned.
    pub invoice_number: String,
    pub customer_id: Option<String>,
    pub transaction_id: Option<String>,
    pub issue_date: DateTime<Utc>,
    /// Always issue_date + 7 days.
    pub due_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub subtotal_paise: i64,
    pub gst_total_paise: i64,
    pub total_paise: i64,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment towards an invoice or a purchase transaction.
///
/// Exactly one of `invoice_id` / `purchase_id` is set. Multiple payments
/// may accumulate against one invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub invoice_id: Option<String>,
    pub purchase_id: Option<String>,
    pub amount_paise: i64,
    pub method: PaymentMethod,
    /// External reference (UPI transaction id, card auth code, etc.).
    pub transaction_ref: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }
}

// =============================================================================
// Stock Threshold
// =============================================================================

/// Per-product low-stock threshold override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockThreshold {
    pub product_id: String,
    pub threshold: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
