use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    channel::DeviceChannel,
    error::RelayError,
    model::{Location, OutboundMessage},
    provider::WeatherProvider,
};

/// Fetch current conditions for a fixed location and forward them to the
/// wearable.
///
/// Holds no mutable state; concurrent refreshes are independent of each other.
#[derive(Debug, Clone)]
pub struct WeatherRelay {
    provider: Arc<dyn WeatherProvider>,
    channel: Arc<dyn DeviceChannel>,
    location: Location,
}

impl WeatherRelay {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        channel: Arc<dyn DeviceChannel>,
        location: Location,
    ) -> Self {
        Self { provider, channel, location }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Fetch, map and send once, returning what was delivered.
    ///
    /// The message is only built from a complete reading, so any error before
    /// the send means nothing reached the device.
    pub async fn try_refresh(&self) -> Result<OutboundMessage, RelayError> {
        let reading = self.provider.current_reading(self.location).await?;
        let message = OutboundMessage::from(reading);

        self.channel.send(message.clone()).await?;

        Ok(message)
    }

    /// Fire-and-forget refresh: outcomes are logged, never returned.
    pub async fn refresh_weather(&self) {
        match self.try_refresh().await {
            Ok(message) => info!(
                location = %self.location,
                temperature = %message.temperature,
                conditions = %message.conditions,
                "weather info sent to device"
            ),
            Err(e) if e.is_before_send() => {
                warn!(location = %self.location, error = %e, "weather refresh abandoned")
            }
            Err(e) => warn!(location = %self.location, error = %e, "error sending weather info to device"),
        }
    }

    /// Run `refresh_weather` on its own task.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let relay = Arc::clone(self);
        tokio::spawn(async move { relay.refresh_weather().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        channel::MpscChannel,
        model::{Temperature, WeatherReading},
    };
    use async_trait::async_trait;

    #[derive(Debug)]
    struct FixedProvider(Option<WeatherReading>);

    #[async_trait]
    impl WeatherProvider for FixedProvider {
        async fn current_reading(&self, _location: Location) -> Result<WeatherReading, RelayError> {
            self.0
                .clone()
                .ok_or_else(|| RelayError::Config("no reading available".into()))
        }
    }

    fn boston() -> Location {
        Location::new(42.358429, -71.059769).unwrap()
    }

    fn reading() -> WeatherReading {
        WeatherReading {
            temperature: Temperature::Text("72".into()),
            conditions: "Clear".into(),
        }
    }

    #[tokio::test]
    async fn sends_mapped_reading() {
        let (channel, mut rx) = MpscChannel::new(4);
        let relay = WeatherRelay::new(
            Arc::new(FixedProvider(Some(reading()))),
            Arc::new(channel),
            boston(),
        );

        let sent = relay.try_refresh().await.unwrap();
        assert_eq!(sent.conditions, "Clear");

        let delivered = rx.recv().await.unwrap();
        assert_eq!(
            serde_json::to_value(&delivered).unwrap(),
            serde_json::json!({"TEMPERATURE": "72", "CONDITIONS": "Clear"})
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn provider_failure_sends_nothing() {
        let (channel, mut rx) = MpscChannel::new(4);
        let relay = WeatherRelay::new(Arc::new(FixedProvider(None)), Arc::new(channel), boston());

        let err = relay.try_refresh().await.unwrap_err();
        assert!(err.is_before_send());

        relay.refresh_weather().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_failure_is_reported_not_raised() {
        let (channel, rx) = MpscChannel::new(4);
        drop(rx);
        let relay = Arc::new(WeatherRelay::new(
            Arc::new(FixedProvider(Some(reading()))),
            Arc::new(channel),
            boston(),
        ));

        let err = relay.try_refresh().await.unwrap_err();
        assert!(!err.is_before_send());

        relay.spawn_refresh().await.expect("refresh task must not panic");
    }
}
