//! Process-level models.

pub mod config;
