use uuid::Uuid;

use crate::dispatch::assignment::{AssignedRider, AssignmentError, assign};
use crate::error::AppError;
use crate::geo::nearest_within;
use crate::models::restaurant::Restaurant;
use crate::state::AppState;

/// Expanding-radius search parameters. The defaults match the observed
/// order pattern: most orders find a rider within 1 km, and widening in
/// 0.2 km steps up to 2 km trades search cost against success
/// probability without scanning the whole rider pool unranged.
#[derive(Debug, Clone, Copy)]
pub struct RadiusPolicy {
    pub initial_km: f64,
    pub step_km: f64,
    pub max_km: f64,
}

impl Default for RadiusPolicy {
    fn default() -> Self {
        Self {
            initial_km: 1.0,
            step_km: 0.2,
            max_km: 2.0,
        }
    }
}

impl RadiusPolicy {
    /// Number of search rounds: ceil((max - initial) / step) + 1.
    pub fn steps(&self) -> usize {
        if self.step_km <= 0.0 || self.max_km <= self.initial_km {
            return 1;
        }
        ((self.max_km - self.initial_km) / self.step_km).ceil() as usize + 1
    }

    /// The bounded, ascending radius schedule, capped at `max_km`. Radii
    /// are derived by index rather than accumulated, so float error
    /// cannot add or drop a round.
    pub fn schedule(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.steps())
            .map(move |round| (self.initial_km + self.step_km * round as f64).min(self.max_km))
    }
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub rider: AssignedRider,
    pub radius_km: f64,
}

/// Finds the nearest available rider for `order_id` within an expanding
/// radius around the restaurant and assigns the order to that rider.
///
/// Each round takes a fresh availability snapshot and attempts the
/// single nearest candidate. A lost claim race retries at the current
/// radius with a fresh snapshot: the claimed rider is no longer
/// available, so the candidate pool shrinks with every lost race and the
/// loop terminates. Terminal failures (order delivered, missing order)
/// propagate immediately.
pub fn dispatch_order(
    state: &AppState,
    restaurant: &Restaurant,
    order_id: Uuid,
) -> Result<DispatchOutcome, AppError> {
    for radius_km in state.dispatch.schedule() {
        loop {
            let candidates = state.riders.list_available();
            let ranked = nearest_within(&restaurant.location, &candidates, radius_km);

            let Some(nearest) = ranked.first() else {
                break;
            };

            match assign(state, order_id, nearest.rider_id, restaurant) {
                Ok(rider) => return Ok(DispatchOutcome { rider, radius_km }),
                Err(AssignmentError::RiderClaimed) => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    Err(AppError::NoRiderInRange)
}
