//! Shared action group domain primitives.
//!
//! This crate owns the Bedrock action group event/response contract, the
//! per-variant operation registry and the embedded OpenAPI schema documents.
//! It intentionally excludes AWS SDK and Lambda runtime concerns.
//! See `crates/bedrock_actions_core/README.md` for ownership boundaries.

pub mod contract;
pub mod operations;
pub mod registry;
pub mod schema;
