//! Shared constants for telesync.

pub mod app;
pub mod defaults;
pub mod texts;
