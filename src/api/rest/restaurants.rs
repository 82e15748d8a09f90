use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use chrono::{NaiveTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dispatch::assignment::AssignedRider;
use crate::dispatch::policy::dispatch_order;
use crate::error::AppError;
use crate::geo::Coordinate;
use crate::models::restaurant::{MenuItem, Restaurant};
use crate::models::user::Capability;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/restaurants", post(create_restaurant))
        .route("/restaurants/suggestions", post(suggest_restaurants))
        .route("/restaurants/:id", patch(update_restaurant))
        .route(
            "/restaurants/:id/menu",
            post(add_menu_item).get(get_menu),
        )
        .route("/restaurants/:id/cuisines", post(add_cuisine))
        .route(
            "/restaurant/nearest-rider/:restaurant_id/:order_id",
            get(nearest_rider),
        )
}

#[derive(Deserialize)]
pub struct CreateRestaurantRequest {
    pub manager_id: Uuid,
    pub name: String,
    pub phone: String,
    pub location: Coordinate,
    #[serde(default)]
    pub cuisines: Vec<String>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
}

#[derive(Deserialize)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<Coordinate>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
}

#[derive(Deserialize)]
pub struct AddMenuItemRequest {
    pub item: String,
    pub price: u32,
}

#[derive(Deserialize)]
pub struct AddCuisineRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct SuggestionRequest {
    pub kind_of_food: String,
    pub desired_time: NaiveTime,
}

async fn create_restaurant(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<Json<Restaurant>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    payload.location.validate()?;

    let manager = state
        .users
        .get(payload.manager_id)
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", payload.manager_id)))?;

    if !manager.role.allows(Capability::ManageRestaurant) {
        return Err(AppError::Forbidden(
            "user may not manage restaurants".to_string(),
        ));
    }

    let restaurant = Restaurant {
        id: Uuid::new_v4(),
        manager_id: manager.id,
        name: payload.name,
        phone: payload.phone,
        location: payload.location,
        cuisines: payload.cuisines,
        opening_time: payload.opening_time,
        closing_time: payload.closing_time,
        created_at: Utc::now(),
    };

    state.restaurants.insert(restaurant.clone());
    Ok(Json(restaurant))
}

async fn update_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> Result<Json<Restaurant>, AppError> {
    if let Some(location) = &payload.location {
        location.validate()?;
    }

    let restaurant = state
        .restaurants
        .update(
            id,
            payload.name,
            payload.phone,
            payload.location,
            payload.opening_time,
            payload.closing_time,
        )
        .ok_or_else(|| AppError::NotFound(format!("restaurant {} not found", id)))?;

    Ok(Json(restaurant))
}

async fn add_cuisine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddCuisineRequest>,
) -> Result<Json<Restaurant>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("cuisine cannot be empty".to_string()));
    }

    let restaurant = state.restaurants.add_cuisine(id, payload.name)?;
    Ok(Json(restaurant))
}

async fn suggest_restaurants(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SuggestionRequest>,
) -> Json<Vec<Restaurant>> {
    Json(
        state
            .restaurants
            .suggest(&payload.kind_of_food, payload.desired_time),
    )
}

async fn add_menu_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMenuItemRequest>,
) -> Result<Json<MenuItem>, AppError> {
    if payload.item.trim().is_empty() {
        return Err(AppError::BadRequest("item cannot be empty".to_string()));
    }

    if state.restaurants.get(id).is_none() {
        return Err(AppError::NotFound(format!("restaurant {} not found", id)));
    }

    let menu_item = state.restaurants.upsert_menu_item(id, payload.item, payload.price);
    Ok(Json(menu_item))
}

async fn get_menu(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MenuItem>>, AppError> {
    if state.restaurants.get(id).is_none() {
        return Err(AppError::NotFound(format!("restaurant {} not found", id)));
    }

    Ok(Json(state.restaurants.menu_for(id)))
}

/// The dispatch entry point: finds the nearest available rider within an
/// expanding radius of the restaurant and assigns the order to that
/// rider.
async fn nearest_rider(
    State(state): State<Arc<AppState>>,
    Path((restaurant_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AssignedRider>, AppError> {
    let restaurant = state.restaurants.get(restaurant_id).ok_or_else(|| {
        AppError::NotFound(format!("restaurant {} not found", restaurant_id))
    })?;

    let start = Instant::now();
    match dispatch_order(&state, &restaurant, order_id) {
        Ok(outcome) => {
            let elapsed = start.elapsed().as_secs_f64();
            state
                .metrics
                .dispatch_latency_seconds
                .with_label_values(&["success"])
                .observe(elapsed);
            state
                .metrics
                .dispatches_total
                .with_label_values(&["success"])
                .inc();
            state.metrics.dispatch_radius_km.observe(outcome.radius_km);
            state
                .metrics
                .available_riders
                .set(state.riders.available_count() as i64);

            info!(
                order_id = %order_id,
                restaurant_id = %restaurant_id,
                radius_km = outcome.radius_km,
                "order assigned to rider"
            );
            Ok(Json(outcome.rider))
        }
        Err(err) => {
            let elapsed = start.elapsed().as_secs_f64();
            state
                .metrics
                .dispatch_latency_seconds
                .with_label_values(&["error"])
                .observe(elapsed);
            state
                .metrics
                .dispatches_total
                .with_label_values(&["error"])
                .inc();

            warn!(order_id = %order_id, error = %err, "dispatch failed");
            Err(err)
        }
    }
}
