//! 請求處理：解析請求、呼叫 Catalog、決定狀態碼

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::core::catalog::View;
use crate::domain::model::{EntityKind, NewPizza, NewRestaurant};
use crate::utils::error::ServiceError;
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

type Created = (StatusCode, Json<View>);

fn entity_id(path: Result<Path<i64>, PathRejection>, kind: EntityKind) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::UnknownRoute(kind.display_name()))
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(body) = payload?;
    Ok(body)
}

fn decode<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body).map_err(|e| ServiceError::validation(e.to_string()).into())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_restaurants(State(state): State<AppState>) -> ApiResult<Json<Vec<View>>> {
    Ok(Json(state.catalog.list_restaurants().await?))
}

pub async fn get_restaurant(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<View>> {
    let id = entity_id(path, EntityKind::Restaurant)?;
    Ok(Json(state.catalog.restaurant_detail(id).await?))
}

pub async fn delete_restaurant(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = entity_id(path, EntityKind::Restaurant)?;
    state.catalog.delete_restaurant(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_restaurant(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Created> {
    let new: NewRestaurant = decode(json_body(payload)?)?;
    let view = state.catalog.create_restaurant(new).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_pizzas(State(state): State<AppState>) -> ApiResult<Json<Vec<View>>> {
    Ok(Json(state.catalog.list_pizzas().await?))
}

pub async fn create_pizza(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Created> {
    let new: NewPizza = decode(json_body(payload)?)?;
    let view = state.catalog.create_pizza(new).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn delete_pizza(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = entity_id(path, EntityKind::Pizza)?;
    state.catalog.delete_pizza(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_restaurant_pizza(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Created> {
    let body = json_body(payload)?;
    let view = state.catalog.create_restaurant_pizza(&body).await?;
    Ok((StatusCode::CREATED, Json(view)))
}
