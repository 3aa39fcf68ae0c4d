//! Shared data models for media-server backends

mod library;
mod media;
mod statistic;
mod webhook;

pub use library::*;
pub use media::*;
pub use statistic::*;
pub use webhook::*;
