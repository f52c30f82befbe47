//! The raw aggregates read from the store and the dashboard built from them.

use serde::Serialize;

use crate::{category::CategoryType, database_id::CategoryId, period::YearMonth};

// ============================================================================
// STORE AGGREGATES
// ============================================================================

/// Income and expense totals for one date range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodSummary {
    /// The sum of income transactions.
    pub total_income: f64,
    /// The sum of expense transactions.
    pub total_expenses: f64,
}

/// The total of one category type in one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyAggregation {
    /// The month the transactions fall in.
    pub month: YearMonth,
    /// Whether `total` is income or expenses.
    pub category_type: CategoryType,
    /// The sum of the transactions.
    pub total: f64,
}

/// The total spent in one expense category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAggregation {
    /// The ID of the category.
    pub category_id: CategoryId,
    /// The name of the category.
    pub category_name: String,
    /// The colour of the category.
    pub category_color: String,
    /// The sum of the category's transactions.
    pub total_amount: f64,
}

/// Totals and counts of the recurring transactions in a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecurringSummary {
    /// The sum of recurring income.
    pub total_income: f64,
    /// The sum of recurring expenses.
    pub total_expenses: f64,
    /// The number of recurring income transactions.
    pub income_count: u64,
    /// The number of recurring expense transactions.
    pub expenses_count: u64,
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// The direction a value moved between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// The value went up by more than the dead zone.
    Up,
    /// The value went down by more than the dead zone.
    Down,
    /// The value stayed within the dead zone.
    Stable,
}

/// A value in the selected period compared against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageComparison {
    /// The value in the selected period.
    pub current: f64,
    /// The value in the previous period.
    pub previous: f64,
    /// The change from `previous` to `current` as a percentage, rounded to 2 decimal places.
    pub percentage_change: f64,
    /// The direction of the change.
    pub trend: Trend,
}

/// Income minus expenses for the selected period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceMetric {
    /// Income minus expenses.
    pub balance: f64,
    /// The balance compared against the previous period.
    pub comparison: PercentageComparison,
}

/// Total income for the selected period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeMetric {
    /// The sum of income transactions.
    pub total_income: f64,
    /// Income compared against the previous period.
    pub comparison: PercentageComparison,
}

/// Total expenses for the selected period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseMetric {
    /// The sum of expense transactions.
    pub total_expenses: f64,
    /// Expenses compared against the previous period.
    pub comparison: PercentageComparison,
}

/// Income and expenses for one month of the trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyData {
    /// The month number, 1 to 12.
    pub month: u8,
    /// The four digit year.
    pub year: i32,
    /// A short label such as `Jan 2025`.
    pub label: String,
    /// The sum of income in the month.
    pub income: f64,
    /// The sum of expenses in the month.
    pub expenses: f64,
}

/// Income and expenses for each month of the trailing window, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyComparison {
    /// One entry per month, including months without transactions.
    pub months: Vec<MonthlyData>,
}

/// The share of expenses spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryExpense {
    /// The ID of the category.
    pub category_id: CategoryId,
    /// The name of the category.
    pub category_name: String,
    /// The colour of the category.
    pub category_color: String,
    /// The amount spent in the category.
    pub amount: f64,
    /// `amount` as a percentage of total expenses, rounded to 2 decimal places.
    pub percentage: f64,
}

/// Expenses broken down by category, largest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensesByCategory {
    /// Categories with at least one expense in the period.
    pub categories: Vec<CategoryExpense>,
    /// The sum of all expenses in the period.
    pub total_expenses: f64,
}

/// The number of recurring transactions of each type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecurringCounts {
    /// Recurring income transactions.
    pub income: u64,
    /// Recurring expense transactions.
    pub expenses: u64,
}

/// The expected totals for the month after the selected period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextMonthPrediction {
    /// The expected expenses.
    pub predicted_expenses: f64,
    /// The expected income.
    pub predicted_income: f64,
    /// The expected income minus expenses.
    pub predicted_balance: f64,
    /// The recurring transactions the prediction is based on.
    pub recurring_transactions_count: RecurringCounts,
}

/// The summary of one month shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Income minus expenses.
    pub balance: BalanceMetric,
    /// Total income.
    pub income: IncomeMetric,
    /// Total expenses.
    pub expenses: ExpenseMetric,
    /// The six month trend ending with the current month.
    pub monthly_comparison: MonthlyComparison,
    /// Expenses broken down by category.
    pub expenses_by_category: ExpensesByCategory,
    /// The expected totals for next month.
    pub next_month_prediction: NextMonthPrediction,
}
