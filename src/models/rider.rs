use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// A rider profile. `available == false` always implies `current_order`
/// is set; only the assignment transaction and the rider's own delivery
/// completion flip these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub location: Coordinate,
    pub available: bool,
    pub current_order: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}
