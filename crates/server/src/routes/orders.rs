//! Order handlers. Every handler resolves the caller with [`RequireIdentity`].

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use order_keeper_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireIdentity;
use crate::models::Order;
use crate::services::orders::OrderUpdateInput;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Create-order request body. A missing status means `pending`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub status: OrderStatus,
}

/// Update-order request body.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// `?id=N` query for fetching a single order.
#[derive(Debug, Deserialize)]
pub struct OrderIdQuery {
    pub id: Option<String>,
}

/// Create-order response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub id: OrderId,
    pub message: String,
}

/// List-orders response body.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub message: String,
}

/// Acknowledgement for update and delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an order owned by the caller.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    RequireIdentity(user): RequireIdentity,
    payload: std::result::Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>)> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let id = state.orders().create(user, req.status).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            id,
            message: "Order created successfully".to_string(),
        }),
    ))
}

/// List the caller's orders.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireIdentity(user): RequireIdentity,
) -> Result<Json<OrderListResponse>> {
    let orders = state.orders().list(user).await?;

    Ok(Json(OrderListResponse {
        orders,
        message: "Orders retrieved successfully".to_string(),
    }))
}

/// Fetch one order by `?id=N`.
#[instrument(skip(state, query))]
pub async fn get_by_query(
    State(state): State<AppState>,
    RequireIdentity(user): RequireIdentity,
    query: std::result::Result<Query<OrderIdQuery>, QueryRejection>,
) -> Result<Json<Order>> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let raw = query
        .id
        .ok_or_else(|| AppError::Validation("missing order id".to_string()))?;
    let id = parse_order_id(&raw)?;

    Ok(Json(state.orders().get_by_id(user, id).await?))
}

/// Fetch one order by path ID.
#[instrument(skip(state))]
pub async fn get_by_path(
    State(state): State<AppState>,
    RequireIdentity(user): RequireIdentity,
    Path(raw): Path<String>,
) -> Result<Json<Order>> {
    let id = parse_order_id(&raw)?;

    Ok(Json(state.orders().get_by_id(user, id).await?))
}

/// Update an order's status.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    RequireIdentity(user): RequireIdentity,
    Path(raw): Path<String>,
    payload: std::result::Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let id = parse_order_id(&raw)?;
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    state
        .orders()
        .update(user, id, OrderUpdateInput { status: req.status })
        .await?;

    Ok(Json(MessageResponse {
        message: "Order updated successfully".to_string(),
    }))
}

/// Delete an order.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireIdentity(user): RequireIdentity,
    Path(raw): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_order_id(&raw)?;

    state.orders().delete(user, id).await?;

    Ok(Json(MessageResponse {
        message: "Order deleted successfully".to_string(),
    }))
}

fn parse_order_id(raw: &str) -> Result<OrderId> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("invalid order id: {raw:?}")))
}
