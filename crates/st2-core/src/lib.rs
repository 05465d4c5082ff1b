//! # St2 Core
//!
//! Core domain types for the StackStorm execution API client.
//!
//! This crate contains pure logic with no I/O dependencies:
//! - Decoded response values
//! - Execution status sentinels
//! - Polling schedule (interval clamping and timeout accounting)
//! - Error definitions

pub mod errors;
pub mod models;
pub mod polling;

// Re-export commonly used types
pub use errors::{Result, St2Error};
pub use models::{ExecutionStatus, ResponseValue};
pub use polling::{PollDecision, PollSchedule, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL};
