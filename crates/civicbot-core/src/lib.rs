//! civicbot-core: Shared records, reply decoding, and configuration for civicbot.
//!
//! This crate provides the pieces every other civicbot crate agrees on:
//! - The two records decoded from model replies (SQL generation, chart selection)
//! - Lenient JSON decoding of free-text model replies
//! - Configuration loading (file + environment)
//! - Common error types

pub mod config;
pub mod decode;
pub mod error;
pub mod types;

pub use config::CivicConfig;
pub use decode::decode_reply;
pub use error::CoreError;
pub use types::{ChartSelectResponse, ChartType, DataEntry, SqlResponse};
