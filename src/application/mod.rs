//! Application bootstrap
//!
//! Binds the listener, wires the relay service and runs the server until a
//! shutdown signal arrives.

pub mod app;

pub use app::Application;
