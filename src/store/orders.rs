use dashmap::DashMap;
use uuid::Uuid;

use crate::models::order::Order;

/// Outcome of the conditional rider bind on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Bound,
    AlreadyDelivered,
    AlreadyAssigned,
    NotFound,
}

#[derive(Default)]
pub struct OrderStore {
    inner: DashMap<Uuid, Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    pub fn insert(&self, order: Order) {
        self.inner.insert(order.id, order);
    }

    pub fn get(&self, id: Uuid) -> Option<Order> {
        self.inner.get(&id).map(|entry| entry.value().clone())
    }

    /// Binds a rider to the order under the entry lock. Rejects orders
    /// that are delivered or already bound to a different rider, which
    /// is what keeps an order from ever holding two riders.
    pub fn bind_rider(&self, order_id: Uuid, rider_id: Uuid) -> BindOutcome {
        let Some(mut order) = self.inner.get_mut(&order_id) else {
            return BindOutcome::NotFound;
        };

        if order.delivered {
            return BindOutcome::AlreadyDelivered;
        }
        if order.assigned_rider.is_some_and(|bound| bound != rider_id) {
            return BindOutcome::AlreadyAssigned;
        }

        order.assigned_rider = Some(rider_id);
        BindOutcome::Bound
    }

    /// Flips `delivered` at most once; returns false if the order is
    /// missing or was already delivered.
    pub fn mark_delivered(&self, order_id: Uuid) -> bool {
        let Some(mut order) = self.inner.get_mut(&order_id) else {
            return false;
        };

        if order.delivered {
            return false;
        }

        order.delivered = true;
        true
    }

    pub fn list_for_customer(&self, customer_id: Uuid) -> Vec<Order> {
        self.inner
            .iter()
            .filter(|entry| entry.value().customer_id == customer_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn list_delivered_for_rider(&self, rider_id: Uuid) -> Vec<Order> {
        self.inner
            .iter()
            .filter(|entry| {
                entry.value().delivered && entry.value().assigned_rider == Some(rider_id)
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{BindOutcome, OrderStore};
    use crate::models::order::Order;

    fn order(id_seed: u128) -> Order {
        Order {
            id: Uuid::from_u128(id_seed),
            customer_id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            items: Vec::new(),
            placed: true,
            delivered: false,
            assigned_rider: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn bind_rejects_second_rider() {
        let store = OrderStore::new();
        store.insert(order(1));
        let order_id = Uuid::from_u128(1);

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert_eq!(store.bind_rider(order_id, first), BindOutcome::Bound);
        assert_eq!(
            store.bind_rider(order_id, second),
            BindOutcome::AlreadyAssigned
        );

        // Re-binding the same rider is a no-op, not a conflict.
        assert_eq!(store.bind_rider(order_id, first), BindOutcome::Bound);
    }

    #[test]
    fn bind_rejects_delivered_order() {
        let store = OrderStore::new();
        store.insert(order(1));
        let order_id = Uuid::from_u128(1);

        assert!(store.mark_delivered(order_id));
        assert_eq!(
            store.bind_rider(order_id, Uuid::new_v4()),
            BindOutcome::AlreadyDelivered
        );
    }

    #[test]
    fn mark_delivered_flips_only_once() {
        let store = OrderStore::new();
        store.insert(order(1));
        let order_id = Uuid::from_u128(1);

        assert!(store.mark_delivered(order_id));
        assert!(!store.mark_delivered(order_id));
        assert!(!store.mark_delivered(Uuid::new_v4()));
    }

    #[test]
    fn delivered_orders_filtered_by_rider() {
        let store = OrderStore::new();
        let rider = Uuid::new_v4();

        store.insert(order(1));
        store.insert(order(2));
        store.insert(order(3));

        store.bind_rider(Uuid::from_u128(1), rider);
        store.mark_delivered(Uuid::from_u128(1));
        store.bind_rider(Uuid::from_u128(2), rider);
        store.mark_delivered(Uuid::from_u128(3));

        let delivered = store.list_delivered_for_rider(rider);
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].id, Uuid::from_u128(1));
    }
}
