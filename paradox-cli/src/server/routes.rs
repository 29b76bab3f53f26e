use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use paradox_lib::wire::{
    HealthResponse, LoginRequest, LoginResponse, MessageBody, SubscribeRequest,
    SubscribeResponse,
};
use paradox_lib::{Error, Item, ItemPatch, NewItem, Subscriber};
use tracing::{info, warn};

use super::error::{ApiError, OrFail};
use super::metrics::metrics;
use super::state::AppState;

type AppResult<T> = Result<T, ApiError>;

// ── Health ───────────────────────────────────────────────────

pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive".to_string(),
        timestamp: paradox_lib::id::now(),
    })
}

// ── Items ────────────────────────────────────────────────────

pub async fn handle_active_items(State(state): State<Arc<AppState>>) -> Json<Vec<Item>> {
    Json(state.catalog.active_items().await)
}

pub async fn handle_all_items(State(state): State<Arc<AppState>>) -> Json<Vec<Item>> {
    Json(state.catalog.all_items().await)
}

pub async fn handle_get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Item>> {
    let item = state.catalog.item(&id).await.or_fail("Failed to read item")?;
    Ok(Json(item))
}

pub async fn handle_create_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let Json(fields) = payload?;
    let item = state
        .catalog
        .create_item(fields)
        .await
        .or_fail("Failed to create item")?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn handle_update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ItemPatch>, JsonRejection>,
) -> AppResult<Json<Item>> {
    let Json(patch) = payload?;
    let item = state
        .catalog
        .update_item(&id, patch)
        .await
        .or_fail("Failed to update item")?;
    Ok(Json(item))
}

pub async fn handle_delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageBody>> {
    state
        .catalog
        .delete_item(&id)
        .await
        .or_fail("Failed to delete item")?;
    Ok(Json(MessageBody {
        message: "Item deleted successfully".to_string(),
    }))
}

// ── Subscribers ──────────────────────────────────────────────

pub async fn handle_subscribers(State(state): State<Arc<AppState>>) -> Json<Vec<Subscriber>> {
    Json(state.catalog.subscribers().await)
}

pub async fn handle_subscribe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SubscribeResponse>)> {
    let Json(request) = payload?;
    let subscriber = state
        .catalog
        .subscribe(&request.email)
        .await
        .or_fail("Failed to subscribe")?;
    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            message: "Subscribed successfully".to_string(),
            subscriber,
        }),
    ))
}

pub async fn handle_delete_subscriber(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageBody>> {
    state
        .catalog
        .delete_subscriber(&id)
        .await
        .or_fail("Failed to delete subscriber")?;
    Ok(Json(MessageBody {
        message: "Subscriber deleted successfully".to_string(),
    }))
}

// ── Auth ─────────────────────────────────────────────────────

pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    match state
        .verifier
        .verify(&request.username, &request.password)
        .await
    {
        Ok(token) => {
            metrics().login_total.with_label_values(&["ok"]).inc();
            info!("Admin login for {}", request.username);
            (
                StatusCode::OK,
                Json(LoginResponse {
                    success: true,
                    token,
                    message: "Authentication successful".to_string(),
                }),
            )
                .into_response()
        }
        Err(Error::Unauthorized) => {
            metrics().login_total.with_label_values(&["denied"]).inc();
            warn!("Rejected admin login for {:?}", request.username);
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Invalid credentials",
                })),
            )
                .into_response()
        }
        Err(e) => {
            metrics().login_total.with_label_values(&["error"]).inc();
            ApiError::from_catalog(e, "Failed to check credentials").into_response()
        }
    }
}
