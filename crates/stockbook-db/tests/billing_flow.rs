//! End-to-end billing flow: recording sales, invoice numbering under
//! concurrency, stock guarding, and payment-status transitions.

use stockbook_core::{CoreError, Money, PaymentMethod, PaymentStatus};
use stockbook_db::error::DbError;
use stockbook_db::repository::product::NewProduct;
use stockbook_db::repository::sale::{SaleLineRequest, SaleRequest};
use stockbook_db::{Database, DbConfig};

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Creates a category and one product, returning the product id.
async fn seed_product(db: &Database, name: &str, stock: i64, price_paise: i64) -> String {
    let category = db.products().create_category(&format!("cat-{name}")).await.unwrap();
    db.products()
        .create(NewProduct {
            name: name.to_string(),
            category_id: category.id,
            stock_quantity: stock,
            price_paise,
            gst_rate_bps: 1800,
            hsn_code: None,
            expiry_date: None,
        })
        .await
        .unwrap()
        .id
}

fn upi_sale(product_id: &str, quantity: i64) -> SaleRequest {
    SaleRequest {
        customer_id: None,
        payment_method: PaymentMethod::Upi,
        notes: None,
        lines: vec![SaleLineRequest::at_current_price(product_id, quantity)],
    }
}

fn cash_sale(product_id: &str, quantity: i64) -> SaleRequest {
    SaleRequest {
        payment_method: PaymentMethod::Cash,
        ..upi_sale(product_id, quantity)
    }
}

#[tokio::test]
async fn records_sale_with_exact_totals_and_first_invoice_number() {
    let db = test_db().await;
    // ₹50.00 at 18% GST
    let product_id = seed_product(&db, "LED Bulb 9W", 10, 5000).await;

    let outcome = db.sales().record_sale(upi_sale(&product_id, 2)).await.unwrap();

    // base 100.00, GST 18.00, total 118.00
    assert_eq!(outcome.transaction.subtotal_paise, 10_000);
    assert_eq!(outcome.transaction.gst_total_paise, 1_800);
    assert_eq!(outcome.transaction.total_paise, 11_800);

    assert_eq!(outcome.invoice.invoice_number, "INV000001");
    assert_eq!(outcome.invoice.total_paise, 11_800);

    // UPI settles at the till: paid immediately, in full
    assert_eq!(outcome.invoice.payment_status, PaymentStatus::Paid);
    let payment = outcome.payment.expect("non-cash sale settles immediately");
    assert_eq!(payment.amount_paise, 11_800);

    // Stock went 10 → 8
    let product = db.products().get_by_id(&product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 8);

    // Line snapshot froze the pricing
    let lines = db.sales().lines(&outcome.transaction.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].unit_price_paise, 5000);
    assert_eq!(lines[0].gst_rate_bps, 1800);
    assert_eq!(lines[0].line_total_paise, 11_800);
}

#[tokio::test]
async fn sale_total_equals_sum_of_line_totals_exactly() {
    let db = test_db().await;
    // Prices chosen for awkward GST roundings
    let a = seed_product(&db, "Copper Wire", 100, 4_999).await;
    let b = seed_product(&db, "MCB 16A", 100, 33).await;

    let outcome = db
        .sales()
        .record_sale(SaleRequest {
            customer_id: None,
            payment_method: PaymentMethod::Cash,
            notes: None,
            lines: vec![
                SaleLineRequest::at_current_price(&a, 3),
                SaleLineRequest::at_current_price(&b, 7),
            ],
        })
        .await
        .unwrap();

    let lines = db.sales().lines(&outcome.transaction.id).await.unwrap();
    let line_sum: i64 = lines.iter().map(|l| l.line_total_paise).sum();
    assert_eq!(outcome.transaction.total_paise, line_sum);
    assert_eq!(
        outcome.transaction.subtotal_paise + outcome.transaction.gst_total_paise,
        outcome.transaction.total_paise
    );
}

#[tokio::test]
async fn oversell_is_rejected_and_nothing_is_committed() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Ceiling Fan", 3, 249_900).await;

    let err = db.sales().record_sale(upi_sale(&product_id, 5)).await.unwrap_err();
    match err {
        DbError::Core(CoreError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 3);
            assert_eq!(requested, 5);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Stock untouched, no transactions, no invoice, no burned number
    let product = db.products().get_by_id(&product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 3);
    assert!(db.sales().list_recent(10).await.unwrap().is_empty());
    assert!(db.invoices().list(10).await.unwrap().is_empty());

    // The next successful sale still gets the first number
    let outcome = db.sales().record_sale(upi_sale(&product_id, 1)).await.unwrap();
    assert_eq!(outcome.invoice.invoice_number, "INV000001");
}

#[tokio::test]
async fn sale_lines_come_back_in_request_order() {
    let db = test_db().await;
    let first = seed_product(&db, "Washing Soap", 10, 4_500).await;
    let second = seed_product(&db, "Agarbatti", 10, 2_000).await;
    let third = seed_product(&db, "Matchbox", 10, 200).await;

    let outcome = db
        .sales()
        .record_sale(SaleRequest {
            customer_id: None,
            payment_method: PaymentMethod::Cash,
            notes: None,
            lines: vec![
                SaleLineRequest::at_current_price(&first, 1),
                SaleLineRequest::at_current_price(&second, 2),
                SaleLineRequest::at_current_price(&third, 3),
            ],
        })
        .await
        .unwrap();

    let lines = db.sales().lines(&outcome.transaction.id).await.unwrap();
    let names: Vec<&str> = lines.iter().map(|l| l.name_snapshot.as_str()).collect();
    assert_eq!(names, ["Washing Soap", "Agarbatti", "Matchbox"]);
}

#[tokio::test]
async fn racing_sales_over_the_last_unit_sell_it_exactly_once() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Pressure Cooker 5L", 1, 189_900).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let db = db.clone();
        let product_id = product_id.clone();
        handles.push(tokio::spawn(async move {
            db.sales().record_sale(upi_sale(&product_id, 1)).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(DbError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            })) => {
                assert_eq!(available, 0);
                assert_eq!(requested, 1);
            }
            Err(other) => panic!("expected InsufficientStock, got {other:?}"),
        }
    }
    assert_eq!(successes, 1, "exactly one sale may take the last unit");

    let product = db.products().get_by_id(&product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 0);

    // Only the winner produced an invoice, and the loser burned no number
    let invoices = db.invoices().list(10).await.unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].invoice_number, "INV000001");
}

#[tokio::test]
async fn failing_line_rolls_back_earlier_lines_in_same_sale() {
    let db = test_db().await;
    let plenty = seed_product(&db, "Ballpoint Pen", 100, 1_000).await;
    let scarce = seed_product(&db, "Stapler", 1, 12_500).await;

    let err = db
        .sales()
        .record_sale(SaleRequest {
            customer_id: None,
            payment_method: PaymentMethod::Cash,
            notes: None,
            lines: vec![
                SaleLineRequest::at_current_price(&plenty, 10),
                SaleLineRequest::at_current_price(&scarce, 2),
            ],
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Core(CoreError::InsufficientStock { .. })
    ));

    // First line's decrement was rolled back with the rest
    let product = db.products().get_by_id(&plenty).await.unwrap();
    assert_eq!(product.stock_quantity, 100);
}

#[tokio::test]
async fn unknown_product_aborts_the_sale() {
    let db = test_db().await;
    let err = db
        .sales()
        .record_sale(cash_sale("no-such-product", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
async fn concurrent_sales_get_distinct_contiguous_invoice_numbers() {
    let db = test_db().await;
    let product_id = seed_product(&db, "A4 Notebook", 1_000, 8_500).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let db = db.clone();
        let product_id = product_id.clone();
        handles.push(tokio::spawn(async move {
            db.sales()
                .record_sale(cash_sale(&product_id, 1))
                .await
                .unwrap()
                .invoice
                .invoice_number
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap());
    }

    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 8, "every sale must get its own number");

    // Contiguous from INV000001 with no gaps
    let expected: Vec<String> = (1..=8).map(|n| format!("INV{n:06}")).collect();
    assert_eq!(numbers, expected);

    // Stock decremented exactly once per sale
    let product = db.products().get_by_id(&product_id).await.unwrap();
    assert_eq!(product.stock_quantity, 992);
}

#[tokio::test]
async fn cash_invoice_moves_pending_partial_paid_as_payments_accumulate() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Tea Powder", 10, 5_000).await;

    // total = ₹118.00
    let outcome = db.sales().record_sale(cash_sale(&product_id, 2)).await.unwrap();
    let invoice_id = outcome.invoice.id.clone();
    assert_eq!(outcome.invoice.payment_status, PaymentStatus::Pending);
    assert!(outcome.payment.is_none());

    // ₹50.00 → partial
    db.invoices()
        .record_payment(&invoice_id, 5_000, PaymentMethod::Cash, None)
        .await
        .unwrap();
    let invoice = db.invoices().get_by_id(&invoice_id).await.unwrap();
    assert_eq!(invoice.payment_status, PaymentStatus::Partial);

    // + ₹68.00 → paid
    db.invoices()
        .record_payment(&invoice_id, 6_800, PaymentMethod::Cash, None)
        .await
        .unwrap();
    let invoice = db.invoices().get_by_id(&invoice_id).await.unwrap();
    assert_eq!(invoice.payment_status, PaymentStatus::Paid);

    assert_eq!(
        db.invoices().total_paid(&invoice_id).await.unwrap(),
        Money::from_paise(11_800)
    );
    assert_eq!(db.invoices().payments(&invoice_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn invoice_lookup_by_business_number() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Sunflower Oil", 10, 14_900).await;

    let outcome = db.sales().record_sale(cash_sale(&product_id, 1)).await.unwrap();
    let invoice = db.invoices().get_by_number("INV000001").await.unwrap();
    assert_eq!(invoice.id, outcome.invoice.id);

    let err = db.invoices().get_by_number("INV999998").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
async fn payment_amount_must_be_positive() {
    let db = test_db().await;
    let product_id = seed_product(&db, "Biscuits", 10, 3_000).await;
    let outcome = db.sales().record_sale(cash_sale(&product_id, 1)).await.unwrap();

    let err = db
        .invoices()
        .record_payment(&outcome.invoice.id, 0, PaymentMethod::Cash, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Core(CoreError::Validation(_))));

    // Status untouched by the rejected payment
    let invoice = db.invoices().get_by_id(&outcome.invoice.id).await.unwrap();
    assert_eq!(invoice.payment_status, PaymentStatus::Pending);
}
