use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub manager_id: Uuid,
    pub name: String,
    pub phone: String,
    pub location: Coordinate,
    pub cuisines: Vec<String>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl Restaurant {
    pub fn open_at(&self, time: NaiveTime) -> bool {
        self.opening_time <= time && self.closing_time >= time
    }

    pub fn serves(&self, kind_of_food: &str) -> bool {
        self.cuisines
            .iter()
            .any(|cuisine| cuisine.eq_ignore_ascii_case(kind_of_food))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub item: String,
    pub price: u32,
}
