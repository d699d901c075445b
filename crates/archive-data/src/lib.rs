//! Data ingestion and aggregation layer for Social Archive.
//!
//! Repairs and parses message archives into ordered [`MessageRecord`]s,
//! buckets them into daily, hourly and monthly activity, and reconciles
//! following/followers lists.
//!
//! [`MessageRecord`]: archive_core::models::MessageRecord

pub mod aggregator;
pub mod analysis;
pub mod follows;
pub mod reader;
pub mod repair;

pub use archive_core as core;
