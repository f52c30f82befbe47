//! Period over period comparisons for the dashboard metrics.

use crate::dashboard::models::{
    BalanceMetric, ExpenseMetric, IncomeMetric, PercentageComparison, PeriodSummary, Trend,
};

/// Changes within this many percentage points of zero count as stable.
const TREND_DEAD_ZONE: f64 = 0.01;

/// Round `value` to 2 decimal places.
pub(super) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compares a value against its value in the previous period.
///
/// A change from zero to a positive value is reported as 100% up, and from zero to zero
/// or a negative value as no change. Otherwise the change is relative to `previous`, sign
/// included, so a negative `previous` flips the sign of the change.
///
/// # Returns
/// The comparison with the change rounded to 2 decimal places. The trend is decided
/// from the unrounded change.
pub(super) fn compare(current: f64, previous: f64) -> PercentageComparison {
    let change = if previous == 0.0 {
        if current > 0.0 { 100.0 } else { 0.0 }
    } else {
        (current - previous) / previous * 100.0
    };

    let trend = if change > TREND_DEAD_ZONE {
        Trend::Up
    } else if change < -TREND_DEAD_ZONE {
        Trend::Down
    } else {
        Trend::Stable
    };

    PercentageComparison {
        current,
        previous,
        percentage_change: round2(change),
        trend,
    }
}

/// Compares the balance, i.e. income minus expenses, of two periods.
pub(super) fn balance_metric(current: PeriodSummary, previous: PeriodSummary) -> BalanceMetric {
    let current_balance = current.total_income - current.total_expenses;
    let previous_balance = previous.total_income - previous.total_expenses;

    BalanceMetric {
        balance: current_balance,
        comparison: compare(current_balance, previous_balance),
    }
}

/// Compares the income of two periods.
pub(super) fn income_metric(current: PeriodSummary, previous: PeriodSummary) -> IncomeMetric {
    IncomeMetric {
        total_income: current.total_income,
        comparison: compare(current.total_income, previous.total_income),
    }
}

/// Compares the expenses of two periods.
pub(super) fn expense_metric(current: PeriodSummary, previous: PeriodSummary) -> ExpenseMetric {
    ExpenseMetric {
        total_expenses: current.total_expenses,
        comparison: compare(current.total_expenses, previous.total_expenses),
    }
}
