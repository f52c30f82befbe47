//! Route handlers for listing and managing income and expense categories.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::{Category, CategoryName, CategoryStore, CategoryType, Color},
    database_id::CategoryId,
    extract::{ApiJson, ApiPath, ApiQuery},
    response::ApiResponse,
    user::UserID,
};

/// The query string for listing categories.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    category_type: Option<CategoryType>,
}

/// The data for creating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    name: String,
    #[serde(rename = "type")]
    category_type: CategoryType,
    color: String,
}

/// The fields of a category that may be changed.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryForm {
    name: Option<String>,
    color: Option<String>,
}

fn get_visible_category(
    state: &AppState,
    user_id: UserID,
    category_id: CategoryId,
) -> Result<Category, Error> {
    state
        .category_store
        .get(user_id, category_id)
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCategory,
            error => error,
        })
}

/// List the default categories and the user's own categories, optionally of one type.
pub async fn get_categories(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> Result<ApiResponse<Vec<Category>>, Error> {
    state
        .category_store
        .get_by_type(user_id, query.category_type)
        .map(ApiResponse::success)
}

/// Create a category owned by the user.
///
/// Fails with 409 if the user already has a category with the same name and type.
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<CategoryForm>,
) -> Result<impl IntoResponse, Error> {
    let name = CategoryName::new(&form.name)?;
    let color = Color::new(&form.color)?;

    if state
        .category_store
        .name_exists(user_id, &name, form.category_type)?
    {
        return Err(Error::DuplicateCategoryName(
            name.to_string(),
            form.category_type,
        ));
    }

    let category = state
        .category_store
        .create(user_id, name, form.category_type, color)
        .inspect_err(|error| tracing::error!("Could not create category: {error}"))?;

    Ok((StatusCode::CREATED, ApiResponse::success(category)))
}

/// Rename or recolour one of the user's categories.
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(category_id): ApiPath<CategoryId>,
    ApiJson(form): ApiJson<UpdateCategoryForm>,
) -> Result<ApiResponse<Category>, Error> {
    if form.name.is_none() && form.color.is_none() {
        return Err(Error::Validation(
            "At least one field (name or color) must be provided".to_owned(),
        ));
    }

    let name = form.name.as_deref().map(CategoryName::new).transpose()?;
    let color = form.color.as_deref().map(Color::new).transpose()?;

    let existing = get_visible_category(&state, user_id, category_id)?;

    if existing.is_default {
        return Err(Error::DefaultCategoryReadOnly);
    }

    if let Some(name) = &name
        && *name != existing.name
        && state
            .category_store
            .name_exists(user_id, name, existing.category_type)?
    {
        return Err(Error::DuplicateCategoryName(
            name.to_string(),
            existing.category_type,
        ));
    }

    state
        .category_store
        .update(user_id, category_id, name, color)
        .map(ApiResponse::success)
}

/// Delete one of the user's categories.
///
/// Categories that still have transactions cannot be deleted.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(category_id): ApiPath<CategoryId>,
) -> Result<Response, Error> {
    let existing = get_visible_category(&state, user_id, category_id)?;

    if existing.is_default {
        return Err(Error::DefaultCategoryReadOnly);
    }

    state.category_store.delete(user_id, category_id)?;
    tracing::info!("User {user_id} deleted category {category_id}");

    Ok(StatusCode::NO_CONTENT.into_response())
}
