//! mediagate-core - Core traits and types for the media-server gateway
//!
//! This crate provides the abstractions that let different media-server
//! products (Plex, Emby, Jellyfin, test doubles, ...) sit behind one
//! capability interface that the gateway orchestrates.

pub mod backend;
pub mod config;
pub mod error;
pub mod models;

pub use backend::{BackendFactory, MediaServerBackend};
pub use config::ServerConfig;
pub use error::{BackendError, BackendResult, ConfigError};
pub use models::*;
