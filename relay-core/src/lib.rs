//! Core library for the `weather-relay` companion.
//!
//! This crate defines:
//! - Configuration of the fixed location and provider endpoint
//! - The provider abstraction and the weather.gov `MapClick` client
//! - The device channel abstraction used to reach the wearable
//! - `WeatherRelay`, the fetch/parse/send pipeline, and the host event loop
//!   that triggers it
//!
//! It is used by the `weather-relay` binary, but the relay itself takes all of
//! its collaborators as values so it can be driven from any host.

pub mod channel;
pub mod config;
pub mod error;
pub mod host;
pub mod model;
pub mod provider;
pub mod relay;
pub mod schedule;

pub use channel::{DeviceChannel, MpscChannel};
pub use config::RelayConfig;
pub use error::RelayError;
pub use host::HostEvent;
pub use model::{Location, OutboundMessage, Temperature, WeatherReading};
pub use provider::{WeatherProvider, nws::NwsProvider};
pub use relay::WeatherRelay;
pub use schedule::RefreshSchedule;
