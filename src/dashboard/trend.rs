//! The trailing monthly trend of income and expenses.

use std::collections::HashMap;

use crate::{
    category::CategoryType,
    dashboard::models::{MonthlyAggregation, MonthlyComparison, MonthlyData},
    period::YearMonth,
};

/// The number of months shown in the trend, including the current month.
pub const TREND_MONTHS: usize = 6;

/// Builds one entry per month for the `months_count` months ending with `anchor`.
///
/// Every month starts at zero so months without transactions still appear. Aggregates
/// for months outside the window are ignored.
///
/// # Arguments
/// * `aggregations` - Raw totals per month and category type, in any order
/// * `anchor` - The last month of the window
/// * `months_count` - The number of months in the window
///
/// # Returns
/// Exactly `months_count` entries, oldest first.
pub(super) fn build_monthly_comparison(
    aggregations: &[MonthlyAggregation],
    anchor: YearMonth,
    months_count: usize,
) -> MonthlyComparison {
    let window = anchor.trailing(months_count);
    let mut totals: HashMap<YearMonth, (f64, f64)> =
        window.iter().map(|&month| (month, (0.0, 0.0))).collect();

    for aggregation in aggregations {
        let Some((income, expenses)) = totals.get_mut(&aggregation.month) else {
            continue;
        };

        match aggregation.category_type {
            CategoryType::Income => *income += aggregation.total,
            CategoryType::Expense => *expenses += aggregation.total,
        }
    }

    let months = window
        .into_iter()
        .map(|month| {
            let (income, expenses) = totals.get(&month).copied().unwrap_or_default();

            MonthlyData {
                month: u8::from(month.month()),
                year: month.year(),
                label: month.short_label(),
                income,
                expenses,
            }
        })
        .collect();

    MonthlyComparison { months }
}
