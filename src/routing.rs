//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    extract::FromRef,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};

use crate::{
    AppState,
    auth::{AuthState, auth_guard},
    category::{create_category, delete_category, get_categories, update_category},
    dashboard::get_dashboard_endpoint,
    endpoints,
    logging::logging_middleware,
    response::ErrorResponse,
    transaction::{
        create_transaction_endpoint, delete_transaction, get_transaction, get_transaction_periods,
        get_transactions, update_transaction,
    },
    user::{change_password, get_profile, log_in, log_out, register_user, update_profile},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(log_in))
        .route(endpoints::LOG_OUT, post(log_out));

    let protected_routes = Router::new()
        .route(endpoints::PROFILE, get(get_profile).patch(update_profile))
        .route(endpoints::PASSWORD, put(change_password))
        .route(endpoints::CATEGORIES, get(get_categories))
        .route(endpoints::POST_CATEGORY, post(create_category))
        .route(
            endpoints::CATEGORY,
            patch(update_category).delete(delete_category),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_PERIODS, get(get_transaction_periods))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint))
        .layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (
        StatusCode::IM_A_TEAPOT,
        Json(ErrorResponse::new("I'm a teapot")),
    )
        .into_response()
}

/// The JSON error for any route that does not exist.
async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Route not found")),
    )
        .into_response()
}
