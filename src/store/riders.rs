use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::geo::Coordinate;
use crate::models::rider::Rider;

/// Outcome of the conditional claim. `AlreadyClaimed` means the rider was
/// taken between the availability snapshot and the claim attempt.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    Claimed(Rider),
    AlreadyClaimed,
    NotFound,
}

/// Rider records keyed by rider id. All availability transitions happen
/// under the map's per-entry lock, so claim and release are atomic with
/// respect to concurrent dispatch requests.
#[derive(Default)]
pub struct RiderStore {
    inner: DashMap<Uuid, Rider>,
}

impl RiderStore {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    pub fn insert(&self, rider: Rider) {
        self.inner.insert(rider.id, rider);
    }

    pub fn get(&self, id: Uuid) -> Option<Rider> {
        self.inner.get(&id).map(|entry| entry.value().clone())
    }

    pub fn list(&self) -> Vec<Rider> {
        self.inner
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Snapshot of available riders with their last-known coordinates.
    /// The snapshot goes stale immediately; callers must treat a
    /// subsequent failed claim as a lost race, not an error.
    pub fn list_available(&self) -> Vec<(Uuid, Coordinate)> {
        self.inner
            .iter()
            .filter(|entry| entry.value().available)
            .map(|entry| (entry.value().id, entry.value().location))
            .collect()
    }

    pub fn available_count(&self) -> usize {
        self.inner
            .iter()
            .filter(|entry| entry.value().available)
            .count()
    }

    /// Location updates are last-write-wins; they race freely with
    /// dispatch reads.
    pub fn update_location(&self, id: Uuid, location: Coordinate) -> Option<Rider> {
        let mut rider = self.inner.get_mut(&id)?;
        rider.location = location;
        rider.updated_at = Utc::now();
        Some(rider.clone())
    }

    /// Conditional update: set `available = false` and bind the order
    /// only if the rider is still available.
    pub fn claim(&self, rider_id: Uuid, order_id: Uuid) -> ClaimOutcome {
        let Some(mut rider) = self.inner.get_mut(&rider_id) else {
            return ClaimOutcome::NotFound;
        };

        if !rider.available {
            return ClaimOutcome::AlreadyClaimed;
        }

        rider.available = false;
        rider.current_order = Some(order_id);
        rider.updated_at = Utc::now();
        ClaimOutcome::Claimed(rider.clone())
    }

    /// Rolls a claim back. Used when the order-side bind fails after the
    /// rider was already claimed.
    pub fn release(&self, rider_id: Uuid) {
        if let Some(mut rider) = self.inner.get_mut(&rider_id) {
            rider.available = true;
            rider.current_order = None;
            rider.updated_at = Utc::now();
        }
    }

    /// Returns the rider to the available pool after delivery and yields
    /// the completed order id, or `None` if the rider holds no order.
    pub fn finish_delivery(&self, rider_id: Uuid) -> Option<Uuid> {
        let mut rider = self.inner.get_mut(&rider_id)?;
        let order_id = rider.current_order.take()?;
        rider.available = true;
        rider.updated_at = Utc::now();
        Some(order_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
