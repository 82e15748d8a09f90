use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderLine};
use crate::models::user::Capability;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/customers/:id/orders", get(list_customer_orders))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Deserialize)]
pub struct OrderLineRequest {
    pub item: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Serialize)]
pub struct OrderSummary {
    pub order: Order,
    pub total_value: u64,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest(
            "order must contain at least one item".to_string(),
        ));
    }

    let customer = state
        .users
        .get(payload.customer_id)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", payload.customer_id)))?;

    if !customer.role.allows(Capability::PlaceOrders) {
        return Err(AppError::Forbidden(
            "user may not place orders".to_string(),
        ));
    }

    if state.restaurants.get(payload.restaurant_id).is_none() {
        return Err(AppError::NotFound(format!(
            "restaurant {} not found",
            payload.restaurant_id
        )));
    }

    let mut lines = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let menu_item = state
            .restaurants
            .find_menu_item(payload.restaurant_id, &line.item)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "no menu item named '{}' at this restaurant",
                    line.item
                ))
            })?;

        if line.quantity == 0 {
            return Err(AppError::BadRequest(format!(
                "quantity for '{}' must be > 0",
                line.item
            )));
        }

        lines.push(OrderLine {
            menu_item_id: menu_item.id,
            item: menu_item.item,
            price: menu_item.price,
            quantity: line.quantity,
        });
    }

    let order = Order {
        id: Uuid::new_v4(),
        customer_id: customer.id,
        restaurant_id: payload.restaurant_id,
        items: lines,
        placed: true,
        delivered: false,
        assigned_rider: None,
        created_at: Utc::now(),
    };

    state.orders.insert(order.clone());
    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order))
}

async fn list_customer_orders(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<OrderSummary>>, AppError> {
    if state.users.get(id).is_none() {
        return Err(AppError::NotFound(format!("user {} not found", id)));
    }

    let summaries = state
        .orders
        .list_for_customer(id)
        .into_iter()
        .map(|order| OrderSummary {
            total_value: order.total_value(),
            order,
        })
        .collect();

    Ok(Json(summaries))
}
