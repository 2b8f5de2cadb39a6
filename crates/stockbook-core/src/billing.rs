//! # Billing Engine
//!
//! Deterministic monetary arithmetic for transactions and invoices.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Billing Pipeline                                  │
//! │                                                                         │
//! │  LinePricing (explicit or defaulted from product)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_line() ──► LineAmounts { base, gst_amount, line_total }       │
//! │       │                                                                 │
//! │       ▼  (one per line item)                                            │
//! │  aggregate_lines() ──► TransactionTotals { subtotal, gst_total, total }│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Invoice (number from the sequence, due = issue + 7 days)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  payment_status() recomputed from Σ payments on every change           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `gst_amount` and `line_total` are always recomputed from the current
//!   unit_price/gst_rate/quantity, never stored independently of them.
//! - `subtotal + gst_total == total == Σ line_total` exactly: totals are
//!   integer sums of already-rounded line amounts, with no independent
//!   re-rounding of the sum.
//! - Invoice numbers are strictly increasing and never reused. The pure
//!   functions here format and increment; the atomic allocation that makes
//!   them unique under concurrency lives in the record store.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{GstRate, PaymentStatus, Product};
use crate::{INVOICE_DUE_DAYS, INVOICE_NUMBER_PREFIX, INVOICE_SEQ_DIGITS, MAX_GST_BPS, MAX_INVOICE_SEQ};

// =============================================================================
// Line Pricing
// =============================================================================

/// Pricing inputs for a single line item.
///
/// Two-path construction, decided once at creation time:
/// - [`LinePricing::explicit`] - the caller supplies price and rate
/// - [`LinePricing::from_product`] - defaults copied from the product's
///   current price and GST rate
///
/// The default is resolved exactly once; the line is immutable afterwards
/// and never re-reads the product's price on a later save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePricing {
    pub unit_price: Money,
    pub gst_rate: GstRate,
}

impl LinePricing {
    /// Pricing supplied explicitly by the caller.
    pub const fn explicit(unit_price: Money, gst_rate: GstRate) -> Self {
        LinePricing {
            unit_price,
            gst_rate,
        }
    }

    /// Pricing defaulted from the product's current price and GST rate.
    pub fn from_product(product: &Product) -> Self {
        LinePricing {
            unit_price: product.price(),
            gst_rate: product.gst_rate(),
        }
    }

    /// Resolves optional overrides against a product: any missing half of
    /// the pricing falls back to the product's current value.
    pub fn resolve(
        product: &Product,
        unit_price: Option<Money>,
        gst_rate: Option<GstRate>,
    ) -> Self {
        LinePricing {
            unit_price: unit_price.unwrap_or_else(|| product.price()),
            gst_rate: gst_rate.unwrap_or_else(|| product.gst_rate()),
        }
    }
}

// =============================================================================
// Line Computation
// =============================================================================

/// Derived amounts for one line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// unit_price × quantity, before GST.
    pub base: Money,
    /// GST on the base, rounded half-up to the paisa.
    pub gst_amount: Money,
    /// base + gst_amount.
    pub line_total: Money,
}

/// Computes the derived amounts for a line item.
///
/// ## Constraints
/// - `quantity` > 0
/// - `unit_price` ≥ 0
/// - 0 ≤ `gst_rate` ≤ 100%
///
/// ## Numeric Semantics
/// Fixed-point paise throughout, never binary floating point.
/// `gst_amount = unit_price·quantity·gst_rate/100`, rounded half-up at the
/// paisa; `line_total = unit_price·quantity + gst_amount`.
///
/// ## Example
/// ```rust
/// use stockbook_core::billing::{compute_line, LinePricing};
/// use stockbook_core::money::Money;
/// use stockbook_core::types::GstRate;
///
/// let pricing = LinePricing::explicit(Money::from_paise(5000), GstRate::from_bps(1800));
/// let amounts = compute_line(pricing, 2).unwrap();
/// assert_eq!(amounts.base.paise(), 10_000);      // ₹100.00
/// assert_eq!(amounts.gst_amount.paise(), 1_800); // ₹18.00
/// assert_eq!(amounts.line_total.paise(), 11_800);
/// ```
pub fn compute_line(pricing: LinePricing, quantity: i64) -> CoreResult<LineAmounts> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }
    if pricing.unit_price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "unit_price".to_string(),
        }
        .into());
    }
    if pricing.gst_rate.bps() > MAX_GST_BPS {
        return Err(ValidationError::OutOfRange {
            field: "gst_rate".to_string(),
            min: 0,
            max: MAX_GST_BPS as i64,
        }
        .into());
    }

    let base = pricing.unit_price.multiply_quantity(quantity);
    let gst_amount = base.gst(pricing.gst_rate);

    Ok(LineAmounts {
        base,
        gst_amount,
        line_total: base + gst_amount,
    })
}

// =============================================================================
// Transaction Aggregation
// =============================================================================

/// Per-transaction monetary totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionTotals {
    /// Σ unit_price × quantity.
    pub subtotal: Money,
    /// Σ per-line GST amounts.
    pub gst_total: Money,
    /// subtotal + gst_total.
    pub total: Money,
}

/// Aggregates line amounts into transaction totals.
///
/// The sum is exact: `total` equals `Σ line_total` because every addend is
/// an integer paise amount and no re-rounding happens here.
pub fn aggregate_lines<'a>(amounts: impl IntoIterator<Item = &'a LineAmounts>) -> TransactionTotals {
    let mut totals = TransactionTotals::default();
    for line in amounts {
        totals.subtotal += line.base;
        totals.gst_total += line.gst_amount;
        totals.total += line.line_total;
    }
    totals
}

// =============================================================================
// Invoice Numbering
// =============================================================================

/// Formats a sequence value as an invoice number (`INV` + 6 digits).
///
/// Fails with [`CoreError::SequenceExhausted`] once the value no longer
/// fits the zero-padded 6-digit suffix.
pub fn invoice_number(seq: u32) -> CoreResult<String> {
    if seq > MAX_INVOICE_SEQ {
        return Err(CoreError::SequenceExhausted {
            last: MAX_INVOICE_SEQ,
        });
    }
    Ok(format!(
        "{}{:0width$}",
        INVOICE_NUMBER_PREFIX,
        seq,
        width = INVOICE_SEQ_DIGITS
    ))
}

/// Parses the numeric suffix of an invoice number.
pub fn parse_invoice_number(value: &str) -> CoreResult<u32> {
    let suffix = value
        .strip_prefix(INVOICE_NUMBER_PREFIX)
        .ok_or_else(|| CoreError::InvalidInvoiceNumber {
            value: value.to_string(),
        })?;

    if suffix.len() != INVOICE_SEQ_DIGITS || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidInvoiceNumber {
            value: value.to_string(),
        });
    }

    suffix
        .parse::<u32>()
        .map_err(|_| CoreError::InvalidInvoiceNumber {
            value: value.to_string(),
        })
}

/// Returns the invoice number following `last`.
///
/// With no prior invoice this is the sequence's first value,
/// `INV000001`. Otherwise the numeric suffix of the most recent number is
/// incremented and re-padded. Fails with [`CoreError::SequenceExhausted`]
/// when the increment would exceed 6 digits (999999).
///
/// This function is pure. Uniqueness under concurrent invoice creation is
/// the record store's job: it allocates from a single-row counter with an
/// atomic increment-and-read, never an unguarded read-then-write.
pub fn next_invoice_number(last: Option<&str>) -> CoreResult<String> {
    match last {
        None => invoice_number(1),
        Some(value) => {
            let seq = parse_invoice_number(value)?;
            if seq >= MAX_INVOICE_SEQ {
                return Err(CoreError::SequenceExhausted {
                    last: MAX_INVOICE_SEQ,
                });
            }
            invoice_number(seq + 1)
        }
    }
}

// =============================================================================
// Invoice Dates
// =============================================================================

/// Computes the due date for an invoice issued at `issue_date`.
///
/// Always issue date + 7 days.
pub fn due_date(issue_date: DateTime<Utc>) -> NaiveDate {
    (issue_date + Duration::days(INVOICE_DUE_DAYS)).date_naive()
}

// =============================================================================
// Payment Status
// =============================================================================

/// Derives an invoice's payment status from its total and the sum paid.
///
/// Exact Money comparison, never approximate. Status is recomputed from
/// the full payment sum on every change (idempotent, source-of-truth), not
/// mutated incrementally.
///
/// ## Example
/// ```rust
/// use stockbook_core::billing::payment_status;
/// use stockbook_core::money::Money;
/// use stockbook_core::types::PaymentStatus;
///
/// let total = Money::from_paise(11_800); // ₹118.00
/// assert_eq!(payment_status(total, Money::zero()), PaymentStatus::Pending);
/// assert_eq!(payment_status(total, Money::from_paise(5_000)), PaymentStatus::Partial);
/// assert_eq!(payment_status(total, Money::from_paise(11_800)), PaymentStatus::Paid);
/// ```
pub fn payment_status(invoice_total: Money, total_paid: Money) -> PaymentStatus {
    if total_paid >= invoice_total {
        PaymentStatus::Paid
    } else if total_paid.is_positive() {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

/// Sums a slice of payment amounts and derives the status.
pub fn payment_status_from(invoice_total: Money, payments: &[Money]) -> PaymentStatus {
    let total_paid: Money = payments.iter().copied().sum();
    payment_status(invoice_total, total_paid)
}

// =============================================================================
// Unit Tests
// =============================================================================
