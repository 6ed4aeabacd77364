//! 基础设施层

pub mod audit;
pub mod cache;
pub mod persistence;
