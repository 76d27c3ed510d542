//! Dashboard Shared Types
//!
//! This crate contains the organization and session types shared by the
//! dashboard services.

pub mod types;

pub use types::*;
