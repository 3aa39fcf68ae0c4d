//! Integration tests for the media gateway
//!
//! This crate contains end-to-end tests that exercise the full stack:
//! - TOML configuration loading
//! - Registry construction through backend factories
//! - Fallback resolution, webhooks, statistics and the catalog
//!
//! All backends are in-memory mock servers, so no network is needed:
//!
//! ```bash
//! cargo test -p mediagate-tests
//! ```
//!
//! # Test Structure
//!
//! - `gateway_test.rs` - Gateway operations over several mock servers
//! - `health_test.rs` - Connection health, reconnects and the sweep
//! - `config_test.rs` - Loading configuration files

// This crate only contains tests, no library code
