//! DTO modules that bridge services with templates.

pub mod admin;
pub mod events;
