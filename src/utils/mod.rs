//! Utility functions

pub mod time;

pub use time::{format_latency, latency_ticks, now_utc};
