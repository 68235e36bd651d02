use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tangle_frame::TimeTrack;
use tokio::sync::mpsc;

use crate::criteria::Criteria;
use crate::error::Result;

/// Device chosen by a select operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionInfo {
    /// Advertised controller name.
    pub name: String,
    /// Hardware address, `aa:bb:cc:dd:ee:ff`.
    pub mac: String,
    /// Transport that performed the selection (e.g. `bluetooth`, `serial`).
    pub connector: String,
}

/// Device the connector is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectInfo {
    /// Advertised controller name.
    pub name: String,
    /// Hardware address, `aa:bb:cc:dd:ee:ff`.
    pub mac: String,
    /// Transport that owns the connection.
    pub connector: String,
}

/// Firmware update phase reported by a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtaStatus {
    Begin,
    Success,
    Fail,
}

/// Side-signal raised by a connector outside of any capability call.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorSignal {
    /// The link to the device came up.
    Connected,
    /// The link to the device went down.
    Disconnected,
    /// Network-directed bytes received from the device.
    Received(Bytes),
    /// Firmware update phase change.
    OtaStatus(OtaStatus),
    /// Firmware update progress in percent, `0.0..=100.0`.
    OtaProgress(f64),
}

/// Sending half of a connector signal channel.
///
/// Cheap to clone; connectors keep one and call [`SignalSender::send`]
/// whenever the link changes state or data arrives.
#[derive(Debug, Clone)]
pub struct SignalSender {
    inner: mpsc::UnboundedSender<ConnectorSignal>,
}

impl SignalSender {
    /// Raise a signal. Signals raised after the receiver is gone are dropped.
    pub fn send(&self, signal: ConnectorSignal) {
        if self.inner.send(signal).is_err() {
            tracing::trace!("connector signal dropped: receiver closed");
        }
    }

    /// Whether the receiving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Receiving half of a connector signal channel.
#[derive(Debug)]
pub struct SignalReceiver {
    inner: mpsc::UnboundedReceiver<ConnectorSignal>,
}

impl SignalReceiver {
    /// Wait for the next signal. Returns `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<ConnectorSignal> {
        self.inner.recv().await
    }

    /// Take a signal without waiting.
    pub fn try_recv(&mut self) -> Option<ConnectorSignal> {
        self.inner.try_recv().ok()
    }
}

/// Create a connected signal sender/receiver pair.
pub fn signal_channel() -> (SignalSender, SignalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SignalSender { inner: tx }, SignalReceiver { inner: rx })
}

/// Capability interface every transport adapter implements.
///
/// All operations are asynchronous and must settle. Failures carry a
/// connector-specific reason that is forwarded verbatim to the caller.
#[async_trait::async_trait]
pub trait Connector: Send {
    /// Short transport name used in logs.
    fn kind(&self) -> &'static str;

    /// Hand the connector the sender it must use for side-signals.
    ///
    /// Called once, before any capability call is made.
    fn attach(&mut self, _signals: SignalSender) {}

    /// Prompt-style selection of a device matching `criteria`.
    async fn select(
        &mut self,
        criteria: &Criteria,
        timeout: Duration,
    ) -> Result<Option<SelectionInfo>>;

    /// Scan for `scan_period` and pick the best device matching `criteria`.
    async fn auto_select(
        &mut self,
        criteria: &Criteria,
        scan_period: Duration,
        timeout: Duration,
    ) -> Result<Option<SelectionInfo>>;

    /// Currently selected device, if any.
    async fn selected(&mut self) -> Result<Option<SelectionInfo>>;

    /// Forget the current selection.
    async fn unselect(&mut self) -> Result<()>;

    /// Connect to the selected device.
    async fn connect(&mut self, timeout: Duration, legacy: bool) -> Result<ConnectInfo>;

    /// Currently connected device, if any.
    async fn connected(&mut self) -> Result<Option<ConnectInfo>>;

    /// Tear the link down. The connector raises [`ConnectorSignal::Disconnected`].
    async fn disconnect(&mut self) -> Result<()>;

    /// Reliably deliver network-directed bytes.
    async fn deliver(&mut self, payload: &[u8]) -> Result<()>;

    /// Best-effort transmit of network-directed bytes.
    async fn transmit(&mut self, payload: &[u8]) -> Result<()>;

    /// Send a device-directed request, optionally waiting for its response.
    async fn request(&mut self, payload: &[u8], expect_response: bool) -> Result<Bytes>;

    /// Push the controller clock to the device.
    async fn set_clock(&mut self, clock: &TimeTrack) -> Result<()>;

    /// Read the controller clock from the device.
    async fn get_clock(&mut self) -> Result<TimeTrack>;

    /// Stream a firmware image to the device, raising OTA side-signals.
    async fn update_firmware(&mut self, firmware: &[u8]) -> Result<()>;

    /// Release every resource held by the connector.
    async fn destroy(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signals_arrive_in_order() {
        let (tx, mut rx) = signal_channel();
        tx.send(ConnectorSignal::Connected);
        tx.send(ConnectorSignal::Received(Bytes::from_static(&[1, 2])));
        tx.send(ConnectorSignal::Disconnected);

        assert_eq!(rx.recv().await, Some(ConnectorSignal::Connected));
        assert_eq!(
            rx.recv().await,
            Some(ConnectorSignal::Received(Bytes::from_static(&[1, 2])))
        );
        assert_eq!(rx.recv().await, Some(ConnectorSignal::Disconnected));
    }

    #[test]
    fn send_after_receiver_dropped_is_silent() {
        let (tx, rx) = signal_channel();
        drop(rx);
        assert!(tx.is_closed());
        tx.send(ConnectorSignal::Connected);
    }

    #[test]
    fn ota_status_serializes_lowercase() {
        let json = serde_json::to_string(&OtaStatus::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }
}
