//! AWS-oriented adapters and handlers for the Bedrock action group.
//!
//! This crate owns runtime integration details (the Lambda handler, the
//! wall-clock adapter and environment configuration) on top of the pure
//! contract in `bedrock_actions_core`.
//! See `crates/bedrock_actions_lambda/README.md` for ownership boundaries.

pub mod adapters;
pub mod config;
pub mod handlers;
