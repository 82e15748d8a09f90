use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::dispatch::assignment::complete_delivery;
use crate::error::AppError;
use crate::geo::Coordinate;
use crate::models::order::Order;
use crate::models::rider::Rider;
use crate::models::user::Capability;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/riders", post(create_rider).get(list_riders))
        .route("/riders/:id/location", patch(update_location))
        .route("/riders/:id/delivered", post(mark_delivered))
        .route("/riders/:id/deliveries", get(list_deliveries))
}

#[derive(Deserialize)]
pub struct CreateRiderRequest {
    pub user_id: Uuid,
    pub location: Coordinate,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: Coordinate,
}

async fn create_rider(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRiderRequest>,
) -> Result<Json<Rider>, AppError> {
    payload.location.validate()?;

    let user = state
        .users
        .get(payload.user_id)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", payload.user_id)))?;

    if !user.role.allows(Capability::DeliverOrders) {
        return Err(AppError::Forbidden(
            "user is not registered as a rider".to_string(),
        ));
    }

    let rider = Rider {
        id: Uuid::new_v4(),
        user_id: user.id,
        name: user.full_name(),
        phone: user.phone,
        location: payload.location,
        available: true,
        current_order: None,
        updated_at: Utc::now(),
    };

    state.riders.insert(rider.clone());
    state
        .metrics
        .available_riders
        .set(state.riders.available_count() as i64);

    info!(rider_id = %rider.id, "rider profile created");
    Ok(Json(rider))
}

async fn list_riders(State(state): State<Arc<AppState>>) -> Json<Vec<Rider>> {
    Json(state.riders.list())
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Rider>, AppError> {
    payload.location.validate()?;

    let rider = state
        .riders
        .update_location(id, payload.location)
        .ok_or_else(|| AppError::NotFound(format!("rider {} not found", id)))?;

    Ok(Json(rider))
}

async fn mark_delivered(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let order = complete_delivery(&state, id)?;
    state
        .metrics
        .available_riders
        .set(state.riders.available_count() as i64);

    info!(rider_id = %id, order_id = %order.id, "order delivered");
    Ok(Json(json!({
        "message": "order marked as delivered",
        "order_id": order.id,
    })))
}

async fn list_deliveries(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    if state.riders.get(id).is_none() {
        return Err(AppError::NotFound(format!("rider {} not found", id)));
    }

    Ok(Json(state.orders.list_delivered_for_rider(id)))
}
