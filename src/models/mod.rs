pub mod order;
pub mod restaurant;
pub mod rider;
pub mod user;
