//! mediagate-gateway - Unified access to multiple media-server instances
//!
//! This crate provides the `MediaGateway` that puts any number of named
//! media-server connections behind one interface: existence lookup,
//! library enumeration, statistics, webhook decoding and playback lists.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          MediaGateway                            │
//! │                                                                  │
//! │  ┌──────────────┐ ┌───────────────┐ ┌────────────┐ ┌──────────┐  │
//! │  │ Existence    │ │ WebhookRouter │ │ Statistics │ │ Library  │  │
//! │  │ Resolver     │ │               │ │ Aggregator │ │ Catalog  │  │
//! │  └──────┬───────┘ └───────┬───────┘ └─────┬──────┘ └────┬─────┘  │
//! │         └─────────────────┴───────┬───────┴─────────────┘        │
//! │                                   ▼                              │
//! │                 ┌──────────────────────────────────┐             │
//! │                 │ InstanceRegistry (config order)  │             │
//! │                 │  ServerInstance: health + calls  │             │
//! │                 └────────────────┬─────────────────┘             │
//! │              ┌───────────────────┼───────────────────┐           │
//! │              ▼                   ▼                   ▼           │
//! │     ┌────────────────┐  ┌────────────────┐  ┌────────────────┐   │
//! │     │ Plex backend   │  │ Emby backend   │  │ Mock backend   │   │
//! │     └────────────────┘  └────────────────┘  └────────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use mediagate_gateway::{GatewayConfig, MediaGateway, spawn_reconnect_sweep};
//!
//! let config = GatewayConfig::load("mediagate.toml")?;
//! let gateway = Arc::new(MediaGateway::from_config(&config, &factories).await);
//! let _sweep = spawn_reconnect_sweep(gateway.clone(), config.gateway.sweep_interval());
//!
//! let media = MediaInfo::movie("Nightfall").with_year(2021).with_tmdb_id(555);
//! if let Some(exist) = gateway.resolve_existence(&media, None).await {
//!     println!("already on {}", exist.server);
//! }
//! ```

mod catalog;
mod config;
mod existence;
mod gateway;
mod instance;
mod race;
mod registry;
mod statistics;
mod sweep;
mod webhook;

pub use catalog::{LibraryCatalog, DEFAULT_LIST_COUNT};
pub use config::{FallbackMode, GatewayConfig, GatewaySettings};
pub use existence::ExistenceResolver;
pub use gateway::{ConnectivityReport, InstanceHealth, MediaGateway};
pub use instance::{HealthState, ServerInstance};
pub use registry::InstanceRegistry;
pub use statistics::StatisticsAggregator;
pub use sweep::{spawn_reconnect_sweep, SweepHandle, MIN_SWEEP_INTERVAL};
pub use webhook::WebhookRouter;

// Re-export core types for convenience
pub use mediagate_core::{
    BackendError, BackendFactory, BackendResult, ConfigError, ExistMediaInfo, MediaInfo,
    MediaServerBackend, ServerConfig,
};
