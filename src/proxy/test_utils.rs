//! Test utilities for relay module testing
//!
//! This module provides utilities to make testing relay components easier,
//! including test configurations, a ready-made router and response helpers.
