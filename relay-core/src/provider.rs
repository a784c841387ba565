use crate::{
    error::RelayError,
    model::{Location, WeatherReading},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod nws;

/// Source of current conditions for a location.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// One request, one reading. Never returns a partially filled reading.
    async fn current_reading(&self, location: Location) -> Result<WeatherReading, RelayError>;
}
