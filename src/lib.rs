//! # hue_animator
//!
//! An async Rust library for driving Philips Hue lights through randomized
//! animation effects over the bridge's REST API.
//!
//! The crate has two layers:
//!
//! - [`BridgeClient`] validates a bridge once at construction and then turns
//!   lights on and off, sets colors and lists lights. Every input is checked
//!   before a request is made.
//! - [`AnimationEngine`] owns a set of named effects (ranges for speed, hue,
//!   brightness and saturation) and a list of lights, and keeps applying
//!   randomly chosen effects until told to stop.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use hue_animator::{
//!     AnimationEngine, BridgeClient, BridgeConnection, HttpTransport, LightId, StopSignal,
//! };
//!
//! async fn animate() -> Result<(), Box<dyn std::error::Error>> {
//!     let conn = BridgeConnection::new("192.168.1.2", "s3cr3t")?;
//!     let bridge = Arc::new(BridgeClient::connect(conn, HttpTransport::new()?).await?);
//!
//!     let effects = std::fs::read_to_string("animations.json")?;
//!     let lights = vec![LightId::parse("1")?, LightId::parse("2")?];
//!     let mut engine = AnimationEngine::new(bridge, lights, &effects, 10, 50)?;
//!
//!     // Runs until the signal is stopped from elsewhere.
//!     engine.run(&StopSignal::new()).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Validated Commands**: hue (0-65535), brightness and saturation (0-254)
//!   are range checked with [`ColorCommand`] before anything is sent
//! - **Effect Files**: JSON effect documents validated by [`AnimationConfig`]
//! - **Reproducible Runs**: inject a seeded random source with
//!   [`AnimationEngine::with_rng`]
//! - **Event Sinks**: failures go to an [`EventSink`]; use [`LogSink`] for the
//!   `log` facade or [`EventHistory`] for a bounded in-memory record
//! - **Pluggable Transport**: anything implementing [`Transport`]; the default
//!   [`HttpTransport`] uses reqwest
//! - **Environment Settings**: [`Settings::from_env`] reads the bridge address,
//!   token, lights and duration bounds
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime
//! - `http` (default): reqwest-backed [`HttpTransport`] (requires tokio)
//! - `cli`: the `hue-animate` binary

mod bridge;
mod config;
mod engine;
mod errors;
mod history;
mod payload;
pub mod runtime;
mod settings;
mod status;
mod transport;
mod types;

// Re-export public API
pub use bridge::{BridgeClient, BridgeConnection};
pub use config::{AnimationConfig, AnimationDefinition, Bound, EffectKey};
pub use engine::{AnimationEngine, EffectRun, RunReport, StopSignal};
pub use errors::{
    ConfigError, ConnectionError, Error, SettingsError, TransportError, ValidationError,
};
pub use history::{
    Event, EventHistory, EventSink, HistoryEntry, HistorySummary, LogSink, Source,
};
pub use payload::StateUpdate;
pub use settings::Settings;
pub use status::{BridgeApiError, LightDescriptor, LightState, bridge_errors};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::Transport;
pub use types::{ColorCommand, EffectRange, LightId, PowerMode};
