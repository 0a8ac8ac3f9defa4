//! # wasend-core
//!
//! Core types, traits, configuration, and error handling for the wasend node.

pub mod config;
pub mod credentials;
pub mod error;
pub mod item;
pub mod params;
pub mod traits;
