pub mod orders;
pub mod restaurants;
pub mod riders;
pub mod users;

pub use orders::{BindOutcome, OrderStore};
pub use restaurants::RestaurantStore;
pub use riders::{ClaimOutcome, RiderStore};
pub use users::UserStore;
