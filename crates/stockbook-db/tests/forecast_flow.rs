//! Forecast pipeline over real rows: daily aggregation, trend fitting,
//! product rankings, and suggestion generation.

use chrono::{Duration, Utc};
use stockbook_core::TrendDirection;
use stockbook_db::{Database, DbConfig};
use uuid::Uuid;

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Creates a product with a fixed id so ranking tie-breaks are testable.
async fn seed_product_with_id(db: &Database, id: &str, name: &str) {
    let category = db.products().create_category(&format!("cat-{id}")).await.unwrap();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO products
            (id, name, category_id, stock_quantity, price_paise,
             gst_rate_bps, hsn_code, expiry_date, created_at, updated_at)
        VALUES (?1, ?2, ?3, 1000, 5000, 1800, NULL, NULL, ?4, ?4)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(&category.id)
    .bind(now)
    .execute(db.pool())
    .await
    .unwrap();
}

/// Inserts a committed sale of `quantity` units of one product,
/// back-dated by `days_ago`. Bypasses record_sale so the series can span
/// multiple dates.
async fn seed_sale(db: &Database, product_id: &str, quantity: i64, days_ago: i64) {
    let created_at = Utc::now() - Duration::days(days_ago);
    let tx_id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO sale_transactions
            (id, customer_id, payment_method, notes,
             subtotal_paise, gst_total_paise, total_paise, created_at)
        VALUES (?1, NULL, 'cash', NULL, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&tx_id)
    .bind(5000 * quantity)
    .bind(900 * quantity)
    .bind(5900 * quantity)
    .bind(created_at)
    .execute(db.pool())
    .await
    .unwrap();

    sqlx::query(
        r#"
        INSERT INTO sale_lines
            (id, transaction_id, product_id, name_snapshot, hsn_snapshot,
             quantity, unit_price_paise, gst_rate_bps, gst_paise, line_total_paise)
        VALUES (?1, ?2, ?3, 'seeded', NULL, ?4, 5000, 1800, ?5, ?6)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&tx_id)
    .bind(product_id)
    .bind(quantity)
    .bind(900 * quantity)
    .bind(5900 * quantity)
    .execute(db.pool())
    .await
    .unwrap();
}

#[tokio::test]
async fn daily_series_sums_per_date_ascending() {
    let db = test_db().await;
    seed_product_with_id(&db, "prod-a", "LED Bulb").await;

    // Two sales on the same day merge into one point
    seed_sale(&db, "prod-a", 3, 2).await;
    seed_sale(&db, "prod-a", 4, 2).await;
    seed_sale(&db, "prod-a", 10, 1).await;

    let series = db.analytics().daily_sales_series(90).await.unwrap();
    assert_eq!(series.len(), 2);
    assert!(series[0].date < series[1].date);
    assert_eq!(series[0].quantity, 7);
    assert_eq!(series[1].quantity, 10);
}

#[tokio::test]
async fn series_window_excludes_old_sales() {
    let db = test_db().await;
    seed_product_with_id(&db, "prod-a", "LED Bulb").await;

    seed_sale(&db, "prod-a", 5, 120).await; // outside the 90-day window
    seed_sale(&db, "prod-a", 2, 3).await;

    let series = db.analytics().daily_sales_series(90).await.unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].quantity, 2);
}

#[tokio::test]
async fn growing_sales_forecast_is_increasing_with_thirty_nonnegative_values() {
    let db = test_db().await;
    seed_product_with_id(&db, "prod-a", "LED Bulb").await;

    // Quantity climbs by one unit a day over ten days: slope 1.0
    for day in 0..10i64 {
        seed_sale(&db, "prod-a", 5 + day, 10 - day).await;
    }

    let forecast = db.analytics().sales_forecast().await.unwrap();
    let report = &forecast.report;

    assert!(report.has_data);
    assert_eq!(report.trend, Some(TrendDirection::Increasing));
    assert_eq!(report.forecast.len(), 30);
    assert!(report.forecast.iter().all(|&v| v >= 0.0));
    assert_eq!(report.historical_sales.len(), 10);

    // Increasing trend always produces suggestions, growth message first
    assert!(!forecast.suggestions.is_empty());
    assert!(forecast.suggestions[0].contains("growing"));
}

#[tokio::test]
async fn empty_database_yields_single_no_data_suggestion() {
    let db = test_db().await;

    let forecast = db.analytics().sales_forecast().await.unwrap();
    assert!(!forecast.report.has_data);
    assert!(forecast.report.forecast.is_empty());
    assert_eq!(forecast.suggestions.len(), 1);
    assert!(forecast.top_products.is_empty());
    assert!(forecast.underperforming.is_empty());
}

#[tokio::test]
async fn single_day_of_sales_is_insufficient_for_a_trend() {
    let db = test_db().await;
    seed_product_with_id(&db, "prod-a", "LED Bulb").await;
    seed_sale(&db, "prod-a", 8, 1).await;

    let forecast = db.analytics().sales_forecast().await.unwrap();
    assert!(!forecast.report.has_data);
    // But rankings still reflect the one day that exists
    assert_eq!(forecast.top_products.len(), 1);
}

#[tokio::test]
async fn product_rankings_order_and_tiebreak_deterministically() {
    let db = test_db().await;
    seed_product_with_id(&db, "prod-a", "Best Seller").await;
    seed_product_with_id(&db, "prod-b", "Slow Mover B").await;
    seed_product_with_id(&db, "prod-c", "Slow Mover C").await;

    seed_sale(&db, "prod-a", 10, 1).await;
    seed_sale(&db, "prod-b", 3, 1).await;
    seed_sale(&db, "prod-c", 3, 2).await;

    let top = db.analytics().top_products(5).await.unwrap();
    assert_eq!(top[0].name, "Best Seller");
    assert_eq!(top[0].total_sold, 10);
    // Tie on 3 units breaks on product id: prod-b before prod-c
    assert_eq!(top[1].name, "Slow Mover B");
    assert_eq!(top[2].name, "Slow Mover C");

    let under = db.analytics().underperforming_products(5).await.unwrap();
    assert_eq!(under[0].name, "Slow Mover B");
    assert_eq!(under[1].name, "Slow Mover C");
    assert_eq!(under[2].name, "Best Seller");
}

#[tokio::test]
async fn never_sold_products_are_excluded_from_underperformers() {
    let db = test_db().await;
    seed_product_with_id(&db, "prod-a", "Sold Once").await;
    seed_product_with_id(&db, "prod-b", "Dead Stock").await;

    seed_sale(&db, "prod-a", 1, 1).await;

    let under = db.analytics().underperforming_products(5).await.unwrap();
    assert_eq!(under.len(), 1);
    assert_eq!(under[0].name, "Sold Once");
}

#[tokio::test]
async fn dashboard_summary_aggregates_sales_and_stock() {
    let db = test_db().await;
    seed_product_with_id(&db, "prod-a", "LED Bulb").await;
    seed_sale(&db, "prod-a", 2, 1).await;
    seed_sale(&db, "prod-a", 3, 2).await;

    let summary = db.analytics().dashboard_summary().await.unwrap();
    assert_eq!(summary.units_sold, 5);
    assert_eq!(summary.sales_revenue_paise, 5 * 5900);
    assert_eq!(summary.purchase_spend_paise, 0);
    // Seeded product has 1000 units, well above the default threshold
    assert_eq!(summary.low_stock_count, 0);
}
