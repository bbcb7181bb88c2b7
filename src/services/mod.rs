//! Business logic services.

pub mod cache;
pub mod dashboard;
pub mod export;
pub mod refresher;
pub mod route_catalog;
pub mod stats;
