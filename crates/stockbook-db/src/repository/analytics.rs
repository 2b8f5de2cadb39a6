//! # Analytics Repository
//!
//! Sales aggregation queries feeding the trend forecaster, plus dashboard
//! aggregates.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Forecast Orchestration                              │
//! │                                                                         │
//! │  sale_lines ──GROUP BY date──► Vec<DailySales>   (90-day window)       │
//! │       │                              │                                  │
//! │       │                              ▼                                  │
//! │       │                        fit_trend()  (pure, in-process)         │
//! │       │                              │                                  │
//! │  rankings (top / underperforming)    │                                  │
//! │       │                              ▼                                  │
//! │       └──────────► generate_suggestions() ──► SalesForecast            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The SQL side only aggregates; the regression and the suggestion rules
//! live in stockbook-core and never touch the database.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockbook_core::forecast::{
    fit_trend, generate_suggestions, DailySales, ProductSales, TrendReport,
};

/// Number of days of history fed to the forecaster.
pub const SERIES_WINDOW_DAYS: u32 = 90;

/// Complete forecast payload: trend report, suggestions, and the product
/// rankings the suggestions were parameterized with.
#[derive(Debug, Clone, Serialize)]
pub struct SalesForecast {
    pub report: TrendReport,
    pub suggestions: Vec<String>,
    pub top_products: Vec<ProductSales>,
    pub underperforming: Vec<ProductSales>,
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DashboardSummary {
    /// Total units sold across all sales.
    pub units_sold: i64,
    /// GST-inclusive sales revenue in paise.
    pub sales_revenue_paise: i64,
    /// GST-inclusive purchase spend in paise.
    pub purchase_spend_paise: i64,
    /// Products at or below their low-stock threshold.
    pub low_stock_count: i64,
}

/// Repository for sales analytics queries.
///
/// ## Usage
/// ```rust,ignore
/// let forecast = db.analytics().sales_forecast().await?;
/// for s in &forecast.suggestions {
///     println!("- {s}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    /// Creates a new AnalyticsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    /// Total units sold per day over the trailing window, ascending by
    /// date. Days with no sales produce no row.
    pub async fn daily_sales_series(&self, days_back: u32) -> DbResult<Vec<DailySales>> {
        let modifier = format!("-{} days", days_back);

        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT date(t.created_at) AS day, SUM(l.quantity) AS quantity
            FROM sale_lines l
            INNER JOIN sale_transactions t ON t.id = l.transaction_id
            WHERE date(t.created_at) >= date('now', ?1)
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(modifier)
        .fetch_all(&self.pool)
        .await?;

        debug!(days = rows.len(), "Loaded daily sales series");
        Ok(rows
            .into_iter()
            .map(|(date, quantity)| DailySales { date, quantity })
            .collect())
    }

    /// Best-selling products by total quantity, descending.
    ///
    /// Ties break on product id ascending so the ranking is deterministic.
    pub async fn top_products(&self, limit: u32) -> DbResult<Vec<ProductSales>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT p.name, SUM(l.quantity) AS total_sold
            FROM sale_lines l
            INNER JOIN products p ON p.id = l.product_id
            GROUP BY p.id
            ORDER BY total_sold DESC, p.id ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, total_sold)| ProductSales { name, total_sold })
            .collect())
    }

    /// Worst-selling products by total quantity, ascending.
    ///
    /// Products with no recorded sales at all are excluded (they do not
    /// appear in sale_lines), so this ranks slow movers, not dead stock.
    pub async fn underperforming_products(&self, limit: u32) -> DbResult<Vec<ProductSales>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT p.name, SUM(l.quantity) AS total_sold
            FROM sale_lines l
            INNER JOIN products p ON p.id = l.product_id
            GROUP BY p.id
            ORDER BY total_sold ASC, p.id ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, total_sold)| ProductSales { name, total_sold })
            .collect())
    }

    /// Runs the full forecast pipeline over the trailing 90 days.
    pub async fn sales_forecast(&self) -> DbResult<SalesForecast> {
        let series = self.daily_sales_series(SERIES_WINDOW_DAYS).await?;
        let top = self.top_products(5).await?;
        let underperforming = self.underperforming_products(5).await?;

        let analysis = fit_trend(&series);
        let suggestions = generate_suggestions(&analysis, &top, &underperforming);
        let report = TrendReport::from(&analysis);

        debug!(
            has_data = report.has_data,
            suggestions = suggestions.len(),
            "Forecast computed"
        );

        Ok(SalesForecast {
            report,
            suggestions,
            top_products: top,
            underperforming,
        })
    }

    /// Headline dashboard aggregates.
    pub async fn dashboard_summary(&self) -> DbResult<DashboardSummary> {
        let units_sold: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM sale_lines")
                .fetch_one(&self.pool)
                .await?;

        let sales_revenue_paise: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total_paise), 0) FROM sale_transactions")
                .fetch_one(&self.pool)
                .await?;

        let purchase_spend_paise: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total_paise), 0) FROM purchase_transactions")
                .fetch_one(&self.pool)
                .await?;

        let low_stock_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM products p
            LEFT JOIN stock_thresholds t ON t.product_id = p.id
            WHERE p.stock_quantity <= COALESCE(t.threshold, ?1)
            "#,
        )
        .bind(stockbook_core::DEFAULT_STOCK_THRESHOLD)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardSummary {
            units_sold,
            sales_revenue_paise,
            purchase_spend_paise,
            low_stock_count,
        })
    }
}
