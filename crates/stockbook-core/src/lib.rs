//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate is the **heart** of Stockbook. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Presentation / Export Layer                    │   │
//! │  │   (out of scope: consumes computed totals and reports verbatim)│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ stockbook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  billing  │  │ forecast  │  │   │
//! │  │   │  Product  │  │   Money   │  │ GST math  │  │ OLS trend │  │   │
//! │  │   │  Invoice  │  │  GstCalc  │  │ invoice # │  │ suggests  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbook-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, repositories, counters       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Invoice, Payment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`billing`] - GST line/transaction arithmetic, invoice numbering,
//!   payment-status derivation
//! - [`forecast`] - Linear sales-trend fitting, forecasting, suggestions
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod forecast;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stockbook_core::Money` instead of
// `use stockbook_core::money::Money`

pub use billing::{LineAmounts, LinePricing, TransactionTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use forecast::{DailySales, ProductSales, TrendAnalysis, TrendDirection, TrendModel, TrendReport};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fixed prefix of every invoice number.
pub const INVOICE_NUMBER_PREFIX: &str = "INV";

/// Width of the zero-padded numeric suffix of an invoice number.
pub const INVOICE_SEQ_DIGITS: usize = 6;

/// Largest sequence value the 6-digit suffix can carry. The increment
/// past this fails with `SequenceExhausted` and requires a format
/// migration.
pub const MAX_INVOICE_SEQ: u32 = 999_999;

/// Invoices fall due this many days after their issue date.
pub const INVOICE_DUE_DAYS: i64 = 7;

/// Upper bound on GST rates: 10000 bps = 100.00%.
pub const MAX_GST_BPS: u32 = 10_000;

/// Low-stock threshold applied to products without an explicit
/// `StockThreshold` row.
pub const DEFAULT_STOCK_THRESHOLD: i64 = 10;
