//! 领域层

pub mod audit;
pub mod repositories;
pub mod user;
pub mod value_objects;
