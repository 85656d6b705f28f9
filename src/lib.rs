//! Stagehand - automatic stage advancement for Notion project boards.
//!
//! This library provides the core functionality for the `stagehand` CLI tool:
//! record models for the Notion databases, a record-store client, and the
//! advancement engine that moves projects to their next stage once every
//! task in the current stage is complete.

pub mod advance;
pub mod config;
pub mod models;
pub mod schema;
pub mod store;

/// Library-level error type for Stagehand operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("NOTION_TOKEN not found in environment variables")]
    MissingToken,

    #[error("record {record} has no usable '{property}' property")]
    MissingProperty { record: String, property: String },

    #[error("Record store error: {0}")]
    Store(#[from] store::StoreError),
}

/// Result type alias for Stagehand operations.
pub type Result<T> = std::result::Result<T, Error>;
