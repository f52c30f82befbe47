//! The route handler for the dashboard.

use axum::{Extension, extract::State};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    dashboard::{
        models::DashboardResponse,
        service::{DashboardFilters, get_dashboard},
    },
    extract::ApiQuery,
    period::parse_period,
    response::ApiResponse,
    user::UserID,
};

/// The query string for the dashboard.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// The month to report on as an `MMYYYY` token.
    period: Option<String>,
}

/// Get the dashboard for the logged in user.
pub async fn get_dashboard_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(query): ApiQuery<DashboardQuery>,
) -> Result<ApiResponse<DashboardResponse>, Error> {
    let filters = DashboardFilters {
        period: parse_period(query.period.as_deref())?,
    };

    let dashboard = get_dashboard(
        &state.dashboard_store,
        user_id,
        filters,
        OffsetDateTime::now_utc(),
    )
    .await
    .inspect_err(|error| tracing::error!("could not build dashboard for {user_id}: {error}"))?;

    Ok(ApiResponse::success(dashboard))
}
