use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{ApiError, RequestError};
use crate::store::Ingredient;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DrinkCreate {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Partial update body. A key that is absent (or null) leaves the field
/// untouched; a body carrying neither key is rejected.
#[derive(Debug, Deserialize)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

/// GET /drinks - public listing, short views
pub async fn list_drinks(State(state): State<AppState>) -> Result<Json<Value>, RequestError> {
    let drinks = state.store.list_ordered_by_id().await.map_err(|err| {
        warn!("listing drinks failed: {err}");
        ApiError::unprocessable()
    })?;

    let views: Vec<Value> = drinks.iter().map(|d| d.short()).collect();
    Ok(Json(json!({ "success": true, "drinks": views })))
}

/// GET /drinks-detail - long views, requires `get:drinks-detail`
pub async fn list_drinks_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, RequestError> {
    state.verifier.authorize(&headers, "get:drinks-detail").await?;

    let drinks = state.store.list_all().await.map_err(|err| {
        warn!("listing drink details failed: {err}");
        ApiError::bad_request()
    })?;

    let views: Vec<Value> = drinks.iter().map(|d| d.long()).collect();
    Ok(Json(json!({ "success": true, "drinks": views })))
}

/// POST /drinks - create a drink, requires `post:drinks`
pub async fn create_drink(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<DrinkCreate>, JsonRejection>,
) -> Result<Json<Value>, RequestError> {
    state.verifier.authorize(&headers, "post:drinks").await?;

    let Json(body) = body.map_err(|_| ApiError::bad_request())?;

    let drink = state
        .store
        .insert(&body.title, &body.recipe)
        .await
        .map_err(|err| {
            warn!("creating drink failed: {err}");
            ApiError::bad_request()
        })?;

    Ok(Json(json!({ "success": true, "drinks": [drink.long()] })))
}

/// PATCH /drinks/:id - partial update, requires `patch:drinks`
pub async fn update_drink(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Result<Json<DrinkPatch>, JsonRejection>,
) -> Result<Json<Value>, RequestError> {
    state.verifier.authorize(&headers, "patch:drinks").await?;

    let Json(patch) = body.map_err(|_| ApiError::unprocessable())?;

    // Unknown id is reported before any field is inspected.
    let mut drink = state
        .store
        .get_by_id(id)
        .await
        .map_err(|err| {
            warn!("loading drink {id} failed: {err}");
            ApiError::unprocessable()
        })?
        .ok_or_else(ApiError::not_found)?;

    if patch.title.is_none() && patch.recipe.is_none() {
        return Err(ApiError::unprocessable().into());
    }
    if let Some(title) = patch.title {
        drink.title = title;
    }
    if let Some(recipe) = patch.recipe {
        drink.recipe = recipe;
    }

    state.store.update(&drink).await.map_err(|err| {
        warn!("updating drink {id} failed: {err}");
        ApiError::unprocessable()
    })?;

    Ok(Json(json!({ "success": true, "drinks": [drink.long()] })))
}

/// DELETE /drinks/:id - remove a drink, requires `delete:drinks`
pub async fn delete_drink(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, RequestError> {
    state.verifier.authorize(&headers, "delete:drinks").await?;

    state.store.delete(id).await.map_err(|err| {
        warn!("deleting drink {id} failed: {err}");
        ApiError::unprocessable()
    })?;

    Ok(Json(json!({ "success": true, "delete": id })))
}
