use async_trait::async_trait;
use std::fmt::Debug;
use tokio::sync::mpsc;

use crate::{error::RelayError, model::OutboundMessage};

/// Outbound message path to the wearable.
///
/// `send` resolves once the transport has accepted or rejected the message.
#[async_trait]
pub trait DeviceChannel: Send + Sync + Debug {
    async fn send(&self, message: OutboundMessage) -> Result<(), RelayError>;
}

/// Channel backed by a bounded tokio queue; the receiving half is the device
/// transport. Sending fails once the receiver is gone.
#[derive(Debug, Clone)]
pub struct MpscChannel {
    tx: mpsc::Sender<OutboundMessage>,
}

impl MpscChannel {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl DeviceChannel for MpscChannel {
    async fn send(&self, message: OutboundMessage) -> Result<(), RelayError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| RelayError::Send("device channel closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Temperature;

    fn message() -> OutboundMessage {
        OutboundMessage {
            temperature: Temperature::Text("72".into()),
            conditions: "Clear".into(),
        }
    }

    #[tokio::test]
    async fn delivers_to_receiver() {
        let (channel, mut rx) = MpscChannel::new(1);

        channel.send(message()).await.unwrap();

        assert_eq!(rx.recv().await, Some(message()));
    }

    #[tokio::test]
    async fn fails_when_receiver_dropped() {
        let (channel, rx) = MpscChannel::new(1);
        drop(rx);

        let err = channel.send(message()).await.unwrap_err();
        assert!(matches!(err, RelayError::Send(_)));
    }
}
