pub mod assignment;
pub mod policy;
