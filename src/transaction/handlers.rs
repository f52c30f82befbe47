//! Route handlers for listing, recording and editing transactions.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    AppState, Error,
    category::{CategoryStore, CategoryType},
    database_id::{CategoryId, TransactionId},
    extract::{ApiJson, ApiPath, ApiQuery},
    pagination::Pagination,
    period::{YearMonth, parse_period},
    response::ApiResponse,
    transaction::{
        Transaction, TransactionWithCategory,
        query::TransactionFilter,
        store::{TransactionStore, TransactionUpdate},
    },
    user::UserID,
};

/// The longest description a transaction may have, in characters.
const MAX_DESCRIPTION_LENGTH: usize = 500;
/// The longest search text accepted when listing transactions, in characters.
const MAX_SEARCH_LENGTH: usize = 100;

/// The query string for listing transactions.
///
/// Every field is kept as text so that bad paging values can fall back to the defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    period: Option<String>,
    category_id: Option<String>,
    search: Option<String>,
    #[serde(rename = "type")]
    category_type: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

/// The data for recording a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    category_id: CategoryId,
    amount: f64,
    description: String,
    date: String,
    is_recurring: bool,
}

/// The fields of a transaction that may be changed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionForm {
    category_id: Option<CategoryId>,
    amount: Option<f64>,
    description: Option<String>,
    date: Option<String>,
    is_recurring: Option<bool>,
}

/// One page of transactions with the count and sum of every match.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    transactions: Vec<TransactionWithCategory>,
    count: u64,
    sum: f64,
    pagination: Pagination,
}

/// A month the user has transactions in.
#[derive(Debug, PartialEq, Serialize)]
pub struct AvailablePeriod {
    /// The `MMYYYY` token that selects the month.
    value: String,
    year: i32,
    month: u8,
    /// E.g. `January 2025`.
    label: String,
}

impl From<YearMonth> for AvailablePeriod {
    fn from(period: YearMonth) -> Self {
        Self {
            value: period.token(),
            year: period.year(),
            month: u8::from(period.month()),
            label: period.long_label(),
        }
    }
}

fn parse_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::Validation("Amount must be a positive number".to_owned()))
    }
}

fn parse_description(raw_description: &str) -> Result<String, Error> {
    let description = raw_description.trim();

    if description.is_empty() {
        return Err(Error::Validation("Description cannot be empty".to_owned()));
    }

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(Error::Validation(format!(
            "Description must not exceed {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }

    Ok(description.to_owned())
}

fn parse_date(raw_date: &str) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::parse(raw_date.trim(), &Rfc3339)
        .map_err(|_| Error::Validation("Date must be a valid ISO 8601 date".to_owned()))
}

fn parse_search(raw_search: Option<&str>) -> Result<Option<String>, Error> {
    let Some(search) = raw_search.map(str::trim).filter(|search| !search.is_empty()) else {
        return Ok(None);
    };

    if search.chars().count() > MAX_SEARCH_LENGTH {
        return Err(Error::Validation(format!(
            "Search query must not exceed {MAX_SEARCH_LENGTH} characters"
        )));
    }

    Ok(Some(search.to_owned()))
}

fn parse_category_id(raw_category_id: Option<&str>) -> Result<Option<CategoryId>, Error> {
    match raw_category_id.map(str::trim) {
        None | Some("") => Ok(None),
        Some(category_id) => category_id
            .parse()
            .map(Some)
            .map_err(|_| Error::Validation("Category ID must be an integer".to_owned())),
    }
}

fn get_own_transaction(
    state: &AppState,
    user_id: UserID,
    transaction_id: TransactionId,
) -> Result<TransactionWithCategory, Error> {
    state
        .transaction_store
        .get(user_id, transaction_id)
        .map_err(|error| match error {
            Error::NotFound => Error::TransactionNotFound,
            error => error,
        })
}

fn get_visible_category_type(
    state: &AppState,
    user_id: UserID,
    category_id: CategoryId,
) -> Result<CategoryType, Error> {
    state
        .category_store
        .get(user_id, category_id)
        .map(|category| category.category_type)
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCategory,
            error => error,
        })
}

/// List the user's transactions for a month, optionally filtered, one page at a time.
///
/// The month defaults to the current UTC month.
pub async fn get_transactions(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(query): ApiQuery<TransactionListQuery>,
) -> Result<ApiResponse<TransactionPage>, Error> {
    let period = parse_period(query.period.as_deref())?
        .unwrap_or_else(|| YearMonth::containing(OffsetDateTime::now_utc()));
    let page = state
        .pagination_config
        .page_request(query.page.as_deref(), query.limit.as_deref());

    let filter = TransactionFilter {
        range: period.range()?,
        category_id: parse_category_id(query.category_id.as_deref())?,
        search: parse_search(query.search.as_deref())?,
        // Unknown types are ignored rather than rejected.
        category_type: query
            .category_type
            .as_deref()
            .and_then(|category_type| category_type.parse().ok()),
    };

    let transactions = state.transaction_store.list(user_id, &filter, page)?;
    let totals = state.transaction_store.totals(user_id, &filter)?;

    Ok(ApiResponse::success(TransactionPage {
        transactions,
        count: totals.count,
        sum: totals.sum,
        pagination: Pagination::new(page, totals.count),
    }))
}

/// Record a transaction in one of the categories visible to the user.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<impl IntoResponse, Error> {
    let amount = parse_amount(form.amount)?;
    let description = parse_description(&form.description)?;
    let date = parse_date(&form.date)?;

    get_visible_category_type(&state, user_id, form.category_id)?;

    let transaction = state
        .transaction_store
        .create(
            Transaction::build(user_id, form.category_id, amount, date, &description)
                .recurring(form.is_recurring),
        )
        .inspect_err(|error| tracing::error!("Could not create transaction: {error}"))?;

    Ok((StatusCode::CREATED, ApiResponse::success(transaction)))
}

/// List the months that have transactions, newest first.
pub async fn get_transaction_periods(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<ApiResponse<Vec<AvailablePeriod>>, Error> {
    let periods = state.transaction_store.periods(user_id)?;

    Ok(ApiResponse::success(
        periods.into_iter().map(AvailablePeriod::from).collect(),
    ))
}

/// Get one of the user's transactions with its category.
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
) -> Result<ApiResponse<TransactionWithCategory>, Error> {
    get_own_transaction(&state, user_id, transaction_id).map(ApiResponse::success)
}

/// Change some of the fields of one of the user's transactions.
///
/// A transaction may only move to a category of the same type.
pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    ApiJson(form): ApiJson<UpdateTransactionForm>,
) -> Result<ApiResponse<Transaction>, Error> {
    let update = TransactionUpdate {
        category_id: form.category_id,
        amount: form.amount.map(parse_amount).transpose()?,
        description: form.description.as_deref().map(parse_description).transpose()?,
        date: form.date.as_deref().map(parse_date).transpose()?,
        is_recurring: form.is_recurring,
    };

    if update.is_empty() {
        return Err(Error::Validation(
            "At least one field must be provided for update".to_owned(),
        ));
    }

    let existing = get_own_transaction(&state, user_id, transaction_id)?;

    if let Some(category_id) = update.category_id
        && category_id != existing.transaction.category_id
    {
        let current_type = existing.category.category_type;

        if get_visible_category_type(&state, user_id, category_id)? != current_type {
            return Err(Error::CategoryTypeMismatch(current_type));
        }
    }

    state
        .transaction_store
        .update(user_id, transaction_id, update)
        .map(ApiResponse::success)
}

/// Delete one of the user's transactions.
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
) -> Result<Response, Error> {
    state.transaction_store.delete(user_id, transaction_id)?;
    tracing::info!("User {user_id} deleted transaction {transaction_id}");

    Ok(StatusCode::NO_CONTENT.into_response())
}
