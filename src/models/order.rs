use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: Uuid,
    pub item: String,
    pub price: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub items: Vec<OrderLine>,
    pub placed: bool,
    pub delivered: bool,
    pub assigned_rider: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn total_value(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.price) * u64::from(line.quantity))
            .sum()
    }
}
