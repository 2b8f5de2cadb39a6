//! # Trend Forecaster
//!
//! Fits a linear trend to a daily sales series and produces a forward
//! forecast plus rule-based textual suggestions.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Forecasting Pipeline                                 │
//! │                                                                         │
//! │  TrendSeries [(date, quantity), ...] strictly increasing dates         │
//! │       │                                                                 │
//! │       ├── < 2 points ──► TrendAnalysis::InsufficientData               │
//! │       │                   (a normal result, NOT an error)               │
//! │       ▼                                                                 │
//! │  fit_trend(): OLS of quantity on day-offset from the first date        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TrendModel { slope, intercept, avg, R², classification }              │
//! │       │                                                                 │
//! │       ├── forecast(30): line evaluated 30 days past the last point,    │
//! │       │                 clamped to ≥ 0                                 │
//! │       └── generate_suggestions(): fixed template table keyed by the    │
//! │                                   classification                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole module is synchronous and deterministic: the same input
//! series always yields the same model, forecast, and suggestions. State
//! is recomputed fresh on every request from current data; nothing here
//! caches or persists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Tuning Constants
// =============================================================================
// Fixed constants of the design, named so tests can target them precisely.

/// Slope (units/day) above which the trend classifies as increasing.
pub const SLOPE_INCREASING_THRESHOLD: f64 = 0.5;

/// Slope (units/day) below which the trend classifies as decreasing.
pub const SLOPE_DECREASING_THRESHOLD: f64 = -0.5;

/// Average daily sales below which the low-volume suggestion is appended.
pub const LOW_VOLUME_DAILY_SALES: f64 = 10.0;

/// Days of forecast produced past the last observed point.
pub const FORECAST_HORIZON_DAYS: usize = 30;

/// Minimum distinct dates required to fit a trend.
pub const MIN_TREND_POINTS: usize = 2;

// =============================================================================
// Series Input
// =============================================================================

/// One aggregated day of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub quantity: i64,
}

// =============================================================================
// Trend Model
// =============================================================================

/// Trend classification derived from the fitted slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    fn classify(slope: f64) -> Self {
        if slope > SLOPE_INCREASING_THRESHOLD {
            TrendDirection::Increasing
        } else if slope < SLOPE_DECREASING_THRESHOLD {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

/// A fitted linear trend over a daily sales series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    /// Units/day change of the fitted line.
    pub slope: f64,
    /// Fitted quantity at the first observed date.
    pub intercept: f64,
    /// Mean observed quantity over the series.
    pub avg_daily_sales: f64,
    /// (slope / avg_daily_sales) × 100 when the mean is positive, else 0.
    ///
    /// NOTE: this is a percent-per-day growth proxy, not a true
    /// percentage growth rate; it is not bounded to [-100, 100]. The
    /// formula is preserved verbatim for compatibility with existing
    /// consumers.
    pub growth_rate: f64,
    /// R² goodness-of-fit of the regression.
    pub model_score: f64,
    /// Classification of the slope against the fixed thresholds.
    pub trend: TrendDirection,
    /// Day-offset of the last observed point (days since the first date).
    pub last_offset: i64,
    /// Observed quantities, in date order.
    pub historical: Vec<f64>,
}

impl TrendModel {
    /// Evaluates the fitted line `horizon_days` past the last observation.
    ///
    /// Produces exactly `horizon_days` values in chronological order, each
    /// clamped to a minimum of 0 (sales counts cannot be negative).
    pub fn forecast(&self, horizon_days: usize) -> Vec<f64> {
        (1..=horizon_days as i64)
            .map(|i| {
                let day = (self.last_offset + i) as f64;
                (self.intercept + self.slope * day).max(0.0)
            })
            .collect()
    }
}

/// Outcome of a trend fit.
///
/// Fewer than two distinct dates is a normal, expected condition and is
/// modelled as a value rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub enum TrendAnalysis {
    /// Not enough history to fit a line.
    InsufficientData,
    /// A fitted model.
    Fitted(TrendModel),
}

impl TrendAnalysis {
    pub fn has_data(&self) -> bool {
        matches!(self, TrendAnalysis::Fitted(_))
    }

    pub fn model(&self) -> Option<&TrendModel> {
        match self {
            TrendAnalysis::Fitted(model) => Some(model),
            TrendAnalysis::InsufficientData => None,
        }
    }
}

// =============================================================================
// Fitting
// =============================================================================

/// Fits an ordinary least-squares line to a daily sales series.
///
/// The series must be ordered by date with no duplicate dates (aggregated
/// beforehand). Each date is converted to an integer day-offset from the
/// series' first date, and quantity is regressed on the offset.
///
/// Returns [`TrendAnalysis::InsufficientData`] for fewer than
/// [`MIN_TREND_POINTS`] distinct dates.
pub fn fit_trend(series: &[DailySales]) -> TrendAnalysis {
    if series.len() < MIN_TREND_POINTS {
        return TrendAnalysis::InsufficientData;
    }

    let first_date = series[0].date;
    let xs: Vec<f64> = series
        .iter()
        .map(|d| (d.date - first_date).num_days() as f64)
        .collect();
    let ys: Vec<f64> = series.iter().map(|d| d.quantity as f64).collect();

    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        sxx += (x - x_mean) * (x - x_mean);
        sxy += (x - x_mean) * (y - y_mean);
    }

    // sxx is zero only if every offset is identical, which a
    // duplicate-free series of length >= 2 cannot produce.
    if sxx == 0.0 {
        return TrendAnalysis::InsufficientData;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    // R² = 1 - SS_res / SS_tot. A constant series has SS_tot = 0; score
    // 1.0 when the residuals are also zero, else 0.0 (sklearn behaviour).
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        let predicted = intercept + slope * x;
        ss_res += (y - predicted) * (y - predicted);
        ss_tot += (y - y_mean) * (y - y_mean);
    }
    let model_score = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    let avg_daily_sales = y_mean;
    let growth_rate = if avg_daily_sales > 0.0 {
        (slope / avg_daily_sales) * 100.0
    } else {
        0.0
    };

    TrendAnalysis::Fitted(TrendModel {
        slope,
        intercept,
        avg_daily_sales,
        growth_rate,
        model_score,
        trend: TrendDirection::classify(slope),
        last_offset: (series[series.len() - 1].date - first_date).num_days(),
        historical: ys,
    })
}

// =============================================================================
// Suggestions
// =============================================================================

/// A product's total historical sales, used to parameterize suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub name: String,
    pub total_sold: i64,
}

fn join_first_two(products: &[ProductSales]) -> String {
    products
        .iter()
        .take(2)
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generates rule-based suggestions from a trend analysis.
///
/// ## Rule Table
/// - No data: exactly one fixed message prompting more data collection.
/// - Increasing: 3 fixed templates (one parameterized by |growth_rate|
///   at one decimal place).
/// - Decreasing: 4 fixed templates (one parameterized likewise).
/// - Stable: 3 fixed templates.
/// - Top sellers / underperformers present: one message each, naming the
///   first two products comma-joined.
/// - avg_daily_sales < [`LOW_VOLUME_DAILY_SALES`]: one additional
///   low-volume message, regardless of classification.
///
/// Output order is deterministic for a given input.
pub fn generate_suggestions(
    analysis: &TrendAnalysis,
    top_products: &[ProductSales],
    underperforming: &[ProductSales],
) -> Vec<String> {
    let model = match analysis {
        TrendAnalysis::InsufficientData => {
            return vec![
                "Record more sales data to get trend insights and forecasts.".to_string(),
            ];
        }
        TrendAnalysis::Fitted(model) => model,
    };

    let mut suggestions = Vec::new();
    let rate = model.growth_rate.abs();

    match model.trend {
        TrendDirection::Increasing => {
            suggestions.push(format!(
                "Great news! Your sales are growing at {rate:.1}% per day. \
                 Keep up the momentum by maintaining your current strategies."
            ));
            suggestions.push(
                "Consider increasing inventory for top-selling products to avoid stock-outs."
                    .to_string(),
            );
            suggestions.push(
                "Scale up your marketing efforts to capitalize on this positive trend."
                    .to_string(),
            );
        }
        TrendDirection::Decreasing => {
            suggestions.push(format!(
                "Sales are declining at {rate:.1}% per day. \
                 Time to take action to reverse this trend."
            ));
            suggestions.push("Run promotional campaigns or discounts to boost sales.".to_string());
            suggestions.push(
                "Analyze customer feedback to identify and address any issues.".to_string(),
            );
            suggestions.push(
                "Review your product mix and consider introducing new products.".to_string(),
            );
        }
        TrendDirection::Stable => {
            suggestions.push("Sales are stable. Consider strategies to drive growth:".to_string());
            suggestions.push(
                "Launch targeted marketing campaigns to reach new customers.".to_string(),
            );
            suggestions.push(
                "Introduce bundle offers or loyalty programs to increase sales.".to_string(),
            );
        }
    }

    if !top_products.is_empty() {
        suggestions.push(format!(
            "Your top sellers are: {}. Ensure adequate stock and consider creating similar products.",
            join_first_two(top_products)
        ));
    }

    if !underperforming.is_empty() {
        suggestions.push(format!(
            "Products needing attention: {}. Consider promotional pricing or product improvements.",
            join_first_two(underperforming)
        ));
    }

    if model.avg_daily_sales < LOW_VOLUME_DAILY_SALES {
        suggestions.push(
            "Daily sales volume is relatively low. Focus on customer acquisition and market expansion."
                .to_string(),
        );
    }

    suggestions
}

// =============================================================================
// Presentation Report
// =============================================================================

/// Flat trend report consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub has_data: bool,
    /// Set only when there is no data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendDirection>,
    pub slope: f64,
    pub growth_rate: f64,
    pub avg_daily_sales: f64,
    pub model_score: f64,
    /// Exactly [`FORECAST_HORIZON_DAYS`] values when has_data is true.
    pub forecast: Vec<f64>,
    pub historical_sales: Vec<f64>,
}

impl From<&TrendAnalysis> for TrendReport {
    fn from(analysis: &TrendAnalysis) -> Self {
        match analysis {
            TrendAnalysis::InsufficientData => TrendReport {
                has_data: false,
                message: Some(
                    "Insufficient sales data for prediction. Need at least 2 days of sales history."
                        .to_string(),
                ),
                trend: None,
                slope: 0.0,
                growth_rate: 0.0,
                avg_daily_sales: 0.0,
                model_score: 0.0,
                forecast: Vec::new(),
                historical_sales: Vec::new(),
            },
            TrendAnalysis::Fitted(model) => TrendReport {
                has_data: true,
                message: None,
                trend: Some(model.trend),
                slope: model.slope,
                growth_rate: model.growth_rate,
                avg_daily_sales: model.avg_daily_sales,
                model_score: model.model_score,
                forecast: model.forecast(FORECAST_HORIZON_DAYS),
                historical_sales: model.historical.clone(),
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn series(start: (i32, u32, u32), quantities: &[i64]) -> Vec<DailySales> {
        let first = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
        quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| DailySales {
                date: first + chrono::Duration::days(i as i64),
                quantity: q,
            })
            .collect()
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        assert_eq!(fit_trend(&[]), TrendAnalysis::InsufficientData);
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let s = series((2026, 1, 1), &[5]);
        assert_eq!(fit_trend(&s), TrendAnalysis::InsufficientData);
    }

    #[test]
    fn test_unit_slope_classifies_increasing() {
        // [(day0,5),(day1,6),...,(day9,14)] → slope exactly 1/day
        let s = series((2026, 1, 1), &[5, 6, 7, 8, 9, 10, 11, 12, 13, 14]);
        let analysis = fit_trend(&s);
        let model = analysis.model().expect("should fit");

        assert!((model.slope - 1.0).abs() < 1e-9);
        assert_eq!(model.trend, TrendDirection::Increasing);
        assert!((model.model_score - 1.0).abs() < 1e-9);
        assert!((model.avg_daily_sales - 9.5).abs() < 1e-9);

        let forecast = model.forecast(FORECAST_HORIZON_DAYS);
        assert_eq!(forecast.len(), 30);
        assert!(forecast.iter().all(|&v| v >= 0.0));
        // Line continues: day 10 predicts 15
        assert!((forecast[0] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_steep_decline_classifies_decreasing_and_clamps() {
        let s = series((2026, 1, 1), &[30, 25, 20, 15, 10]);
        let model = fit_trend(&s).model().cloned().expect("should fit");

        assert_eq!(model.trend, TrendDirection::Decreasing);
        let forecast = model.forecast(FORECAST_HORIZON_DAYS);
        assert_eq!(forecast.len(), 30);
        // Slope -5/day from 10 hits zero and must be clamped there
        assert!(forecast.iter().all(|&v| v >= 0.0));
        assert_eq!(*forecast.last().unwrap(), 0.0);
    }

    #[test]
    fn test_flat_series_is_stable_with_perfect_score() {
        let s = series((2026, 1, 1), &[8, 8, 8, 8]);
        let model = fit_trend(&s).model().cloned().expect("should fit");

        assert_eq!(model.trend, TrendDirection::Stable);
        assert!((model.slope - 0.0).abs() < 1e-9);
        // Constant series: zero residuals → score 1.0
        assert!((model.model_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_slope_is_stable_at_threshold() {
        // Slope of exactly 0.5 is NOT increasing (strict inequality)
        let s = series((2026, 1, 1), &[10, 10, 11, 11, 12]);
        let model = fit_trend(&s).model().cloned().expect("should fit");
        assert!((model.slope - 0.5).abs() < 1e-9);
        assert_eq!(model.trend, TrendDirection::Stable);
    }

    #[test]
    fn test_growth_rate_proxy() {
        let s = series((2026, 1, 1), &[5, 6, 7, 8, 9, 10, 11, 12, 13, 14]);
        let model = fit_trend(&s).model().cloned().expect("should fit");
        // slope 1, mean 9.5 → 10.526…% per day
        assert!((model.growth_rate - (1.0 / 9.5) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_growth_rate_zero_when_no_volume() {
        let s = series((2026, 1, 1), &[0, 0, 0]);
        let model = fit_trend(&s).model().cloned().expect("should fit");
        assert_eq!(model.growth_rate, 0.0);
    }

    #[test]
    fn test_gapped_dates_use_day_offsets() {
        // Two points four days apart: slope is (9-5)/4 = 1, not 4
        let d0 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let s = vec![
            DailySales { date: d0, quantity: 5 },
            DailySales {
                date: d0 + chrono::Duration::days(4),
                quantity: 9,
            },
        ];
        let model = fit_trend(&s).model().cloned().expect("should fit");
        assert!((model.slope - 1.0).abs() < 1e-9);
        assert_eq!(model.last_offset, 4);
    }

    #[test]
    fn test_no_data_suggestions_single_message() {
        let suggestions = generate_suggestions(&TrendAnalysis::InsufficientData, &[], &[]);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].contains("Record more sales data"));
    }

    #[test]
    fn test_stable_suggestions_mention_stable() {
        let s = series((2026, 1, 1), &[20, 20, 20, 20]);
        let analysis = fit_trend(&s);
        let suggestions = generate_suggestions(&analysis, &[], &[]);
        assert!(suggestions.iter().any(|m| m.contains("stable")));
    }

    #[test]
    fn test_suggestions_name_first_two_products() {
        let s = series((2026, 1, 1), &[20, 21, 22, 23, 24]);
        let analysis = fit_trend(&s);

        let top = vec![
            ProductSales { name: "LED Bulb 9W".to_string(), total_sold: 120 },
            ProductSales { name: "Extension Board".to_string(), total_sold: 90 },
            ProductSales { name: "Ceiling Fan".to_string(), total_sold: 60 },
        ];
        let under = vec![ProductSales { name: "Desk Lamp".to_string(), total_sold: 2 }];

        let suggestions = generate_suggestions(&analysis, &top, &under);
        assert!(suggestions
            .iter()
            .any(|m| m.contains("LED Bulb 9W, Extension Board") && !m.contains("Ceiling Fan")));
        assert!(suggestions.iter().any(|m| m.contains("Desk Lamp")));
    }

    #[test]
    fn test_low_volume_message_appended() {
        // avg 4/day < 10 → low-volume message regardless of trend
        let s = series((2026, 1, 1), &[3, 4, 4, 5]);
        let analysis = fit_trend(&s);
        let suggestions = generate_suggestions(&analysis, &[], &[]);
        assert!(suggestions.iter().any(|m| m.contains("volume is relatively low")));

        // avg 20/day → no low-volume message
        let s = series((2026, 1, 1), &[20, 20, 20, 20]);
        let analysis = fit_trend(&s);
        let suggestions = generate_suggestions(&analysis, &[], &[]);
        assert!(!suggestions.iter().any(|m| m.contains("volume is relatively low")));
    }

    #[test]
    fn test_growth_rate_formatted_one_decimal() {
        let s = series((2026, 1, 1), &[5, 6, 7, 8, 9, 10, 11, 12, 13, 14]);
        let suggestions = generate_suggestions(&fit_trend(&s), &[], &[]);
        // 10.526…% rendered as 10.5%
        assert!(suggestions[0].contains("10.5% per day"));
    }

    #[test]
    fn test_report_shape() {
        let s = series((2026, 1, 1), &[5, 6, 7]);
        let report = TrendReport::from(&fit_trend(&s));
        assert!(report.has_data);
        assert_eq!(report.forecast.len(), FORECAST_HORIZON_DAYS);
        assert_eq!(report.historical_sales, vec![5.0, 6.0, 7.0]);
        assert!(report.message.is_none());

        let empty = TrendReport::from(&TrendAnalysis::InsufficientData);
        assert!(!empty.has_data);
        assert!(empty.message.is_some());
        assert!(empty.forecast.is_empty());
    }
}
