//! # St2 API
//!
//! HTTP client for the StackStorm execution API.
//! This crate handles authentication (token exchange or static API key),
//! the generic request verbs, and polling of long-running executions.

pub mod auth;
pub mod client;
pub mod errors;
pub mod executions;
pub mod sdk;

// Re-export common types for convenience
pub use auth::{CredentialMode, Credentials};
pub use client::*;
pub use errors::*;
pub use sdk::*;

// Re-export core types that API consumers will need
pub use st2_core::{ExecutionStatus, ResponseValue, St2Error};
