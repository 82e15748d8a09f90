use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::Order;
use crate::models::restaurant::Restaurant;
use crate::state::AppState;
use crate::store::{BindOutcome, ClaimOutcome};

/// Rider summary returned to the restaurant after a successful dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct AssignedRider {
    pub name: String,
    pub phone_number: String,
    pub latitude: f64,
    pub longitude: f64,
    pub order_id: Uuid,
    pub restaurant_name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("order {0} not found")]
    OrderNotFound(Uuid),

    #[error("order has already been delivered")]
    OrderAlreadyDelivered,

    #[error("order is already assigned to another rider")]
    OrderAlreadyAssigned,

    #[error("rider {0} not found")]
    RiderNotFound(Uuid),

    #[error("rider was claimed by a concurrent assignment")]
    RiderClaimed,

    #[error("rider has no active order to complete")]
    NoActiveOrder,
}

impl From<AssignmentError> for AppError {
    fn from(err: AssignmentError) -> Self {
        match err {
            AssignmentError::OrderNotFound(_) | AssignmentError::RiderNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            AssignmentError::OrderAlreadyDelivered => AppError::OrderAlreadyDelivered,
            AssignmentError::OrderAlreadyAssigned | AssignmentError::RiderClaimed => {
                AppError::Conflict(err.to_string())
            }
            AssignmentError::NoActiveOrder => AppError::BadRequest(err.to_string()),
        }
    }
}

/// Binds `rider_id` to `order_id` exclusively and exactly once.
///
/// The rider claim and the order bind are each conditional updates under
/// their store's entry lock; a failure on the order side rolls the claim
/// back, so no exit path leaves a rider marked busy without an order.
pub fn assign(
    state: &AppState,
    order_id: Uuid,
    rider_id: Uuid,
    restaurant: &Restaurant,
) -> Result<AssignedRider, AssignmentError> {
    let order = state
        .orders
        .get(order_id)
        .ok_or(AssignmentError::OrderNotFound(order_id))?;

    if order.delivered {
        return Err(AssignmentError::OrderAlreadyDelivered);
    }

    let rider = match state.riders.claim(rider_id, order_id) {
        ClaimOutcome::Claimed(rider) => rider,
        ClaimOutcome::AlreadyClaimed => return Err(AssignmentError::RiderClaimed),
        ClaimOutcome::NotFound => return Err(AssignmentError::RiderNotFound(rider_id)),
    };

    match state.orders.bind_rider(order_id, rider_id) {
        BindOutcome::Bound => {}
        BindOutcome::AlreadyDelivered => {
            state.riders.release(rider_id);
            return Err(AssignmentError::OrderAlreadyDelivered);
        }
        BindOutcome::AlreadyAssigned => {
            state.riders.release(rider_id);
            return Err(AssignmentError::OrderAlreadyAssigned);
        }
        BindOutcome::NotFound => {
            state.riders.release(rider_id);
            return Err(AssignmentError::OrderNotFound(order_id));
        }
    }

    Ok(AssignedRider {
        name: rider.name,
        phone_number: rider.phone,
        latitude: rider.location.latitude,
        longitude: rider.location.longitude,
        order_id,
        restaurant_name: restaurant.name.clone(),
    })
}

/// The rider's own delivery-completion action: marks the current order
/// delivered exactly once and returns the rider to the available pool.
pub fn complete_delivery(state: &AppState, rider_id: Uuid) -> Result<Order, AssignmentError> {
    let rider = state
        .riders
        .get(rider_id)
        .ok_or(AssignmentError::RiderNotFound(rider_id))?;

    let order_id = rider.current_order.ok_or(AssignmentError::NoActiveOrder)?;

    // The delivered flag flips at most once; a concurrent completion for
    // the same order loses here and mutates nothing.
    if !state.orders.mark_delivered(order_id) {
        return Err(AssignmentError::OrderAlreadyDelivered);
    }

    state.riders.finish_delivery(rider_id);

    state
        .orders
        .get(order_id)
        .ok_or(AssignmentError::OrderNotFound(order_id))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    use super::{AssignmentError, assign, complete_delivery};
    use crate::dispatch::policy::RadiusPolicy;
    use crate::geo::Coordinate;
    use crate::models::order::Order;
    use crate::models::restaurant::Restaurant;
    use crate::models::rider::Rider;
    use crate::state::AppState;

    const BERLIN: Coordinate = Coordinate {
        latitude: 52.52,
        longitude: 13.405,
    };

    fn state_with_fixtures() -> (AppState, Restaurant) {
        let state = AppState::new(RadiusPolicy::default());
        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            manager_id: Uuid::new_v4(),
            name: "Trattoria".to_string(),
            phone: "5551234567".to_string(),
            location: BERLIN,
            cuisines: vec!["Italian".to_string()],
            opening_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            closing_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            created_at: Utc::now(),
        };
        state.restaurants.insert(restaurant.clone());
        (state, restaurant)
    }

    fn add_rider(state: &AppState, id_seed: u128) -> Uuid {
        let rider = Rider {
            id: Uuid::from_u128(id_seed),
            user_id: Uuid::new_v4(),
            name: "Kay Courier".to_string(),
            phone: "5559876543".to_string(),
            location: BERLIN,
            available: true,
            current_order: None,
            updated_at: Utc::now(),
        };
        let id = rider.id;
        state.riders.insert(rider);
        id
    }

    fn add_order(state: &AppState, restaurant_id: Uuid, delivered: bool) -> Uuid {
        let order = Order {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            restaurant_id,
            items: Vec::new(),
            placed: true,
            delivered,
            assigned_rider: None,
            created_at: Utc::now(),
        };
        let id = order.id;
        state.orders.insert(order);
        id
    }

    #[test]
    fn assign_claims_rider_and_binds_order() {
        let (state, restaurant) = state_with_fixtures();
        let rider_id = add_rider(&state, 1);
        let order_id = add_order(&state, restaurant.id, false);

        let assigned = assign(&state, order_id, rider_id, &restaurant).unwrap();

        assert_eq!(assigned.order_id, order_id);
        assert_eq!(assigned.restaurant_name, "Trattoria");
        assert_eq!(assigned.phone_number, "5559876543");

        let rider = state.riders.get(rider_id).unwrap();
        assert!(!rider.available);
        assert_eq!(rider.current_order, Some(order_id));
        assert_eq!(
            state.orders.get(order_id).unwrap().assigned_rider,
            Some(rider_id)
        );
    }

    #[test]
    fn delivered_order_is_rejected_without_mutation() {
        let (state, restaurant) = state_with_fixtures();
        let rider_id = add_rider(&state, 1);
        let order_id = add_order(&state, restaurant.id, true);

        let err = assign(&state, order_id, rider_id, &restaurant).unwrap_err();
        assert_eq!(err, AssignmentError::OrderAlreadyDelivered);

        let rider = state.riders.get(rider_id).unwrap();
        assert!(rider.available);
        assert_eq!(rider.current_order, None);
    }

    #[test]
    fn busy_rider_reports_lost_race() {
        let (state, restaurant) = state_with_fixtures();
        let rider_id = add_rider(&state, 1);
        let first_order = add_order(&state, restaurant.id, false);
        let second_order = add_order(&state, restaurant.id, false);

        assign(&state, first_order, rider_id, &restaurant).unwrap();

        let err = assign(&state, second_order, rider_id, &restaurant).unwrap_err();
        assert_eq!(err, AssignmentError::RiderClaimed);
    }

    #[test]
    fn second_rider_for_same_order_is_rolled_back() {
        let (state, restaurant) = state_with_fixtures();
        let first = add_rider(&state, 1);
        let second = add_rider(&state, 2);
        let order_id = add_order(&state, restaurant.id, false);

        assign(&state, order_id, first, &restaurant).unwrap();

        let err = assign(&state, order_id, second, &restaurant).unwrap_err();
        assert_eq!(err, AssignmentError::OrderAlreadyAssigned);

        // The losing rider is released back to the pool.
        let loser = state.riders.get(second).unwrap();
        assert!(loser.available);
        assert_eq!(loser.current_order, None);
    }

    #[test]
    fn missing_order_reports_not_found() {
        let (state, restaurant) = state_with_fixtures();
        let rider_id = add_rider(&state, 1);
        let ghost = Uuid::new_v4();

        let err = assign(&state, ghost, rider_id, &restaurant).unwrap_err();
        assert_eq!(err, AssignmentError::OrderNotFound(ghost));
    }

    #[test]
    fn complete_delivery_frees_rider_and_marks_order() {
        let (state, restaurant) = state_with_fixtures();
        let rider_id = add_rider(&state, 1);
        let order_id = add_order(&state, restaurant.id, false);
        assign(&state, order_id, rider_id, &restaurant).unwrap();

        let delivered = complete_delivery(&state, rider_id).unwrap();
        assert!(delivered.delivered);

        let rider = state.riders.get(rider_id).unwrap();
        assert!(rider.available);
        assert_eq!(rider.current_order, None);

        // Nothing left to complete.
        let err = complete_delivery(&state, rider_id).unwrap_err();
        assert_eq!(err, AssignmentError::NoActiveOrder);
    }

    #[test]
    fn complete_delivery_without_order_is_rejected() {
        let (state, _restaurant) = state_with_fixtures();
        let rider_id = add_rider(&state, 1);

        let err = complete_delivery(&state, rider_id).unwrap_err();
        assert_eq!(err, AssignmentError::NoActiveOrder);
    }
}
