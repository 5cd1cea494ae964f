//! Backend-owned entities the frontend holds transient copies of.

pub mod booking;
pub mod event;
pub mod location;
pub mod types;
pub mod user;
