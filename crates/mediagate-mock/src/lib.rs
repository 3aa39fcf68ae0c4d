//! mediagate-mock - In-memory media-server backend
//!
//! Implements [`MediaServerBackend`](mediagate_core::MediaServerBackend)
//! over a fixed catalog loaded from configuration, with switches for
//! simulating outages, slow servers and transient failures. Used by the
//! gateway's tests and by `mediagated` when no real servers are configured.

mod config;
mod factory;
mod server;

pub use config::{MockLibrary, MockMovie, MockServerConfig, MockShow};
pub use factory::MockBackendFactory;
pub use server::MockMediaServer;
