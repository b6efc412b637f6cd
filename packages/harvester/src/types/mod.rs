//! Data types shared across the pool.

pub mod config;
pub mod job;
pub mod record;
pub mod stats;
