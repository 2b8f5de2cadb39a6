//! Inventory flow: purchases replenishing stock, supplier payments, and
//! low-stock reporting against thresholds.

use stockbook_core::{CoreError, PaymentMethod};
use stockbook_db::error::DbError;
use stockbook_db::repository::product::NewProduct;
use stockbook_db::repository::purchase::{PurchaseLineRequest, PurchaseRequest};
use stockbook_db::repository::supplier::NewSupplier;
use stockbook_db::{Database, DbConfig};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn seed_product(db: &Database, name: &str, stock: i64) -> String {
    let category = db.products().create_category(&format!("cat-{name}")).await.unwrap();
    db.products()
        .create(NewProduct {
            name: name.to_string(),
            category_id: category.id,
            stock_quantity: stock,
            price_paise: 10_000,
            gst_rate_bps: 1800,
            hsn_code: Some("8539".to_string()),
            expiry_date: None,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn purchase_increments_stock_and_totals_are_exact() {
    let db = test_db().await;
    let product_id = seed_product(&db, "LED Bulb", 5).await;
    let supplier = db
        .suppliers()
        .create(NewSupplier {
            name: "Deccan Wholesale".to_string(),
            email: None,
            phone: None,
            address: None,
            gst_number: None,
        })
        .await
        .unwrap();

    let outcome = db
        .purchases()
        .record_purchase(PurchaseRequest {
            supplier_id: Some(supplier.id),
            payment_method: PaymentMethod::BankTransfer,
            notes: None,
            lines: vec![PurchaseLineRequest {
                product_id: product_id.clone(),
                quantity: 50,
                unit_price_paise: 6_500,
                gst_rate_bps: None,
            }],
        })
        .await
        .unwrap();

    // cost 50 × ₹65.00 = ₹3250.00, GST 18% = ₹585.00
    assert_eq!(outcome.transaction.subtotal_paise, 325_000);
    assert_eq!(outcome.transaction.gst_total_paise, 58_500);
    assert_eq!(outcome.transaction.total_paise, 383_500);

    let product = db.products().get_by_id(&product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 55);

    let lines = db.purchases().lines(&outcome.transaction.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].unit_price_paise, 6_500);
}

#[tokio::test]
async fn upi_purchase_is_rejected_before_anything_commits() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Masala Chai", 5).await;

    let err = db
        .purchases()
        .record_purchase(PurchaseRequest {
            supplier_id: None,
            payment_method: PaymentMethod::Upi,
            notes: None,
            lines: vec![PurchaseLineRequest {
                product_id: product_id.clone(),
                quantity: 10,
                unit_price_paise: 20_000,
                gst_rate_bps: None,
            }],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

    // Other methods stay accepted for the same request shape
    for method in [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::BankTransfer] {
        db.purchases()
            .record_purchase(PurchaseRequest {
                supplier_id: None,
                payment_method: method,
                notes: None,
                lines: vec![PurchaseLineRequest {
                    product_id: product_id.clone(),
                    quantity: 1,
                    unit_price_paise: 20_000,
                    gst_rate_bps: None,
                }],
            })
            .await
            .unwrap();
    }

    let product = db.products().get_by_id(&product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 8);
    assert_eq!(db.purchases().list_recent(10).await.unwrap().len(), 3);
}

#[tokio::test]
async fn purchase_lines_come_back_in_request_order() {
    let db = test_db().await;
    let first = seed_product(&db, "Zip Ties", 5).await;
    let second = seed_product(&db, "Abrasive Paper", 5).await;
    let third = seed_product(&db, "Mounting Tape", 5).await;

    let outcome = db
        .purchases()
        .record_purchase(PurchaseRequest {
            supplier_id: None,
            payment_method: PaymentMethod::Cash,
            notes: None,
            lines: vec![
                PurchaseLineRequest {
                    product_id: first,
                    quantity: 1,
                    unit_price_paise: 1_000,
                    gst_rate_bps: None,
                },
                PurchaseLineRequest {
                    product_id: second,
                    quantity: 2,
                    unit_price_paise: 2_000,
                    gst_rate_bps: None,
                },
                PurchaseLineRequest {
                    product_id: third,
                    quantity: 3,
                    unit_price_paise: 3_000,
                    gst_rate_bps: None,
                },
            ],
        })
        .await
        .unwrap();

    let lines = db.purchases().lines(&outcome.transaction.id).await.unwrap();
    let names: Vec<&str> = lines.iter().map(|l| l.name_snapshot.as_str()).collect();
    assert_eq!(names, ["Zip Ties", "Abrasive Paper", "Mounting Tape"]);
}

#[tokio::test]
async fn purchase_of_unknown_product_rolls_back_entirely() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Stapler", 5).await;

    let err = db
        .purchases()
        .record_purchase(PurchaseRequest {
            supplier_id: None,
            payment_method: PaymentMethod::Cash,
            notes: None,
            lines: vec![
                PurchaseLineRequest {
                    product_id: product_id.clone(),
                    quantity: 10,
                    unit_price_paise: 5_000,
                    gst_rate_bps: None,
                },
                PurchaseLineRequest {
                    product_id: "no-such-product".to_string(),
                    quantity: 1,
                    unit_price_paise: 100,
                    gst_rate_bps: None,
                },
            ],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));

    let product = db.products().get_by_id(&product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 5);
    assert!(db.purchases().list_recent(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn payment_against_purchase_is_recorded() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Tea Powder", 5).await;

    let outcome = db
        .purchases()
        .record_purchase(PurchaseRequest {
            supplier_id: None,
            payment_method: PaymentMethod::Cash,
            notes: None,
            lines: vec![PurchaseLineRequest {
                product_id,
                quantity: 10,
                unit_price_paise: 20_000,
                gst_rate_bps: None,
            }],
        })
        .await
        .unwrap();

    let payment = db
        .purchases()
        .record_payment(
            &outcome.transaction.id,
            100_000,
            PaymentMethod::BankTransfer,
            Some("NEFT-1234".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(payment.purchase_id.as_deref(), Some(outcome.transaction.id.as_str()));
    assert!(payment.invoice_id.is_none());
}

#[tokio::test]
async fn low_stock_uses_default_and_per_product_thresholds() {
    let db = test_db().await;
    let low_default = seed_product(&db, "Whiteboard Marker", 10).await; // at default threshold
    let fine = seed_product(&db, "A4 Notebook", 11).await;
    let custom = seed_product(&db, "Copper Wire", 20).await;

    // 20 units is fine by default, low once the threshold is raised to 25
    db.products().set_threshold(&custom, 25).await.unwrap();

    let low = db.products().low_stock().await.unwrap();
    let ids: Vec<&str> = low.iter().map(|p| p.id.as_str()).collect();
    assert!(ids.contains(&low_default.as_str()));
    assert!(ids.contains(&custom.as_str()));
    assert!(!ids.contains(&fine.as_str()));

    let threshold = db.products().threshold(&custom).await.unwrap().unwrap();
    assert_eq!(threshold.threshold, 25);
}

#[tokio::test]
async fn product_search_matches_substring() {
    let db = test_db().await;
    seed_product(&db, "LED Bulb 9W", 10).await;
    seed_product(&db, "LED Bulb 12W", 10).await;
    seed_product(&db, "Ceiling Fan", 10).await;

    let results = db.products().search("bulb", 20).await.unwrap();
    assert_eq!(results.len(), 2);

    let all = db.products().search("", 20).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn duplicate_category_name_is_a_unique_violation() {
    let db = test_db().await;
    db.products().create_category("Electrical").await.unwrap();
    let err = db.products().create_category("Electrical").await.unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));
}
