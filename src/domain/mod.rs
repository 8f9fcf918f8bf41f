//! Domain types for the iiko relay
//!
//! The relay has no business entities of its own; what lives here are the
//! validated configuration values every other layer depends on.

pub mod config_types;

pub use config_types::*;
