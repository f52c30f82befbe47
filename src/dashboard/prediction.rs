//! Predicts next month by carrying this month's recurring transactions forward.

use crate::dashboard::models::{NextMonthPrediction, RecurringCounts, RecurringSummary};

/// Assumes every recurring transaction of the period repeats unchanged next month.
///
/// There is no decay or seasonality.
pub(super) fn predict_next_month(summary: RecurringSummary) -> NextMonthPrediction {
    NextMonthPrediction {
        predicted_expenses: summary.total_expenses,
        predicted_income: summary.total_income,
        predicted_balance: summary.total_income - summary.total_expenses,
        recurring_transactions_count: RecurringCounts {
            income: summary.income_count,
            expenses: summary.expenses_count,
        },
    }
}
