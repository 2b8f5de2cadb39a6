//! # Seed Data Generator
//!
//! Populates the database with development data: a product catalogue,
//! a few counterparties, and two weeks of sales so the forecaster has a
//! series to work with.
//!
//! ## Usage
//! ```bash
//! # Default database path (./stockbook_dev.db)
//! cargo run -p stockbook-db --bin seed
//!
//! # Custom path
//! cargo run -p stockbook-db --bin seed -- --db ./data/shop.db
//! ```

use std::env;

use stockbook_core::PaymentMethod;
use stockbook_db::repository::customer::NewCustomer;
use stockbook_db::repository::product::NewProduct;
use stockbook_db::repository::purchase::{PurchaseLineRequest, PurchaseRequest};
use stockbook_db::repository::sale::{SaleLineRequest, SaleRequest};
use stockbook_db::repository::supplier::NewSupplier;
use stockbook_db::{Database, DbConfig};

/// Catalogue: (category, [(name, hsn, price_paise, gst_bps, stock)])
const CATALOGUE: &[(&str, &[(&str, &str, i64, u32, i64)])] = &[
    (
        "Electrical",
        &[
            ("LED Bulb 9W", "8539", 9_900, 1800, 120),
            ("Ceiling Fan 1200mm", "8414", 249_900, 1800, 18),
            ("Extension Board 4-Socket", "8536", 34_900, 1800, 45),
            ("MCB 16A", "8536", 18_500, 1800, 60),
            ("Copper Wire 1.5sqmm (90m)", "8544", 164_900, 1800, 25),
        ],
    ),
    (
        "Stationery",
        &[
            ("Ballpoint Pen (Blue)", "9608", 1_000, 1200, 500),
            ("A4 Notebook 200pg", "4820", 8_500, 1200, 200),
            ("Stapler No. 10", "8472", 12_500, 1800, 35),
            ("Whiteboard Marker", "9608", 3_500, 1200, 150),
        ],
    ),
    (
        "Grocery",
        &[
            ("Toor Dal 1kg", "0713", 16_500, 0, 80),
            ("Basmati Rice 5kg", "1006", 62_500, 500, 40),
            ("Sunflower Oil 1L", "1512", 14_900, 500, 90),
            ("Tea Powder 500g", "0902", 26_000, 500, 55),
            ("Packaged Biscuits", "1905", 3_000, 1800, 300),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./stockbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./stockbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockbook Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalogue
    let mut product_ids = Vec::new();
    for (category_name, products) in CATALOGUE {
        let category = db.products().create_category(category_name).await?;
        for (name, hsn, price_paise, gst_bps, stock) in products.iter() {
            let product = db
                .products()
                .create(NewProduct {
                    name: name.to_string(),
                    category_id: category.id.clone(),
                    stock_quantity: *stock,
                    price_paise: *price_paise,
                    gst_rate_bps: *gst_bps,
                    hsn_code: Some(hsn.to_string()),
                    expiry_date: None,
                })
                .await?;
            product_ids.push(product.id);
        }
    }
    println!("✓ Created {} products", product_ids.len());

    // Counterparties
    let customer = db
        .customers()
        .create(NewCustomer {
            name: "Sharma Traders".to_string(),
            email: Some("accounts@sharmatraders.example".to_string()),
            phone: "+91-98100-00000".to_string(),
            address: "14 Market Road, Pune".to_string(),
            gstin: Some("27AAAPS1111A1Z5".to_string()),
        })
        .await?;

    let supplier = db
        .suppliers()
        .create(NewSupplier {
            name: "Deccan Wholesale".to_string(),
            email: None,
            phone: Some("+91-98200-00000".to_string()),
            address: Some("Warehouse 3, MIDC, Pune".to_string()),
            gst_number: Some("27AABCD2222B1Z4".to_string()),
        })
        .await?;
    println!("✓ Created 1 customer, 1 supplier");

    // Restock purchase
    db.purchases()
        .record_purchase(PurchaseRequest {
            supplier_id: Some(supplier.id.clone()),
            payment_method: PaymentMethod::BankTransfer,
            notes: Some("Opening restock".to_string()),
            lines: vec![
                PurchaseLineRequest {
                    product_id: product_ids[0].clone(),
                    quantity: 50,
                    unit_price_paise: 6_500,
                    gst_rate_bps: None,
                },
                PurchaseLineRequest {
                    product_id: product_ids[9].clone(),
                    quantity: 40,
                    unit_price_paise: 12_000,
                    gst_rate_bps: None,
                },
            ],
        })
        .await?;
    println!("✓ Recorded restock purchase");

    // Two weeks of sales: mixed basket, growing volume so the trend
    // classifier has something to find. All timestamps are "now", so the
    // series lands on one day; real history accrues as the shop runs.
    let mut invoices = 0;
    for day in 0..14u32 {
        let baskets = 1 + day / 4;
        for basket in 0..baskets {
            let idx = ((day + basket) as usize * 3) % product_ids.len();
            let method = if basket % 2 == 0 {
                PaymentMethod::Upi
            } else {
                PaymentMethod::Cash
            };
            let outcome = db
                .sales()
                .record_sale(SaleRequest {
                    customer_id: Some(customer.id.clone()),
                    payment_method: method,
                    notes: None,
                    lines: vec![
                        SaleLineRequest::at_current_price(product_ids[idx].clone(), 2),
                        SaleLineRequest::at_current_price(
                            product_ids[(idx + 1) % product_ids.len()].clone(),
                            1,
                        ),
                    ],
                })
                .await?;
            invoices += 1;
            if invoices == 1 {
                println!("  First invoice: {}", outcome.invoice.invoice_number);
            }
        }
    }
    println!("✓ Recorded {} sales with invoices", invoices);

    let forecast = db.analytics().sales_forecast().await?;
    println!();
    println!("Forecast check:");
    println!("  has_data: {}", forecast.report.has_data);
    for s in &forecast.suggestions {
        println!("  - {}", s);
    }

    println!();
    println!("✓ Seed complete!");
    Ok(())
}
