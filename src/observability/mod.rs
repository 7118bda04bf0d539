//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging through `tracing`; library code only emits events
//! - The binary owns subscriber setup
//! - Secrets never appear in log fields

pub mod logging;
