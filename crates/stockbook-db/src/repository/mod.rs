//! # Repository Modules
//!
//! Data access layer, one repository per aggregate.
//!
//! ## Pattern
//! Each repository holds a cloned `SqlitePool` handle (pools are cheap to
//! clone, they share the underlying connections) and exposes async methods
//! returning `DbResult<T>`.
//!
//! Multi-table writes (recording a sale, recording a purchase) run inside
//! a single SQL transaction so they commit or roll back as one unit.

pub mod analytics;
pub mod customer;
pub mod invoice;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod supplier;

pub use analytics::AnalyticsRepository;
pub use customer::CustomerRepository;
pub use invoice::InvoiceRepository;
pub use product::ProductRepository;
pub use purchase::PurchaseRepository;
pub use sale::SaleRepository;
pub use supplier::SupplierRepository;
