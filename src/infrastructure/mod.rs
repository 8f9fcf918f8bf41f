//! Infrastructure layer for the iiko relay
//!
//! Process-level concerns that sit outside request handling.

pub mod telemetry;
