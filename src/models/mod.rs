//! Vendor record types and request models for the dashboard.

pub mod attendance;
pub mod branch;
pub mod de;
pub mod delivery;
pub mod query;
pub mod receipt;
pub mod route;
pub mod sales;
