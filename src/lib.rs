//! iiko relay - keeps an iiko `apiLogin` server-side
//!
//! The relay exchanges the login for access tokens on behalf of a public
//! website and forwards the website's authenticated calls to the iiko API.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod proxy;

pub use application::Application;
pub use error::{Error, Result};
