//! Builds the dashboard from the store's aggregates.

use time::OffsetDateTime;

use crate::{
    Error,
    dashboard::{
        breakdown::format_expenses_by_category,
        comparison::{balance_metric, expense_metric, income_metric},
        models::DashboardResponse,
        prediction::predict_next_month,
        store::DashboardStore,
        trend::{TREND_MONTHS, build_monthly_comparison},
    },
    period::{YearMonth, resolve_period},
    user::UserID,
};

/// Narrows what the dashboard reports on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardFilters {
    /// The month to report on. Defaults to the month containing `now`.
    pub period: Option<YearMonth>,
}

/// Build the dashboard for one user.
///
/// The balance, income, expenses, category breakdown and prediction cover the selected
/// month. The monthly trend always ends with the month containing `now`, whichever month
/// is selected.
///
/// # Arguments
/// * `store` - Where the aggregates are read from
/// * `user_id` - The user to report on
/// * `filters` - The selected month
/// * `now` - The current time, used for the default month and the trend
///
/// # Errors
/// Returns the first error from the store, or [Error::InvalidPeriod] if a month in range
/// cannot be represented.
pub async fn get_dashboard(
    store: &impl DashboardStore,
    user_id: UserID,
    filters: DashboardFilters,
    now: OffsetDateTime,
) -> Result<DashboardResponse, Error> {
    let period = resolve_period(filters.period, now)?;
    let trend_anchor = YearMonth::containing(now);

    let (current, previous, monthly, categories, recurring) = tokio::try_join!(
        store.period_summary(user_id, period.current_range),
        store.period_summary(user_id, period.previous_range),
        store.monthly_aggregations(user_id, trend_anchor, TREND_MONTHS),
        store.expenses_by_category(user_id, period.current_range),
        store.recurring_summary(user_id, period.current_range),
    )?;

    Ok(DashboardResponse {
        balance: balance_metric(current, previous),
        income: income_metric(current, previous),
        expenses: expense_metric(current, previous),
        monthly_comparison: build_monthly_comparison(&monthly, trend_anchor, TREND_MONTHS),
        expenses_by_category: format_expenses_by_category(categories, current.total_expenses),
        next_month_prediction: predict_next_month(recurring),
    })
}
