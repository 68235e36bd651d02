use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use tangle_frame::Event;
use tangle_transport::OtaStatus;

/// Notification published to application listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceEvent {
    Connected,
    Disconnected,
    /// A network event, decoded from received or locally echoed bytes.
    Event(Event),
    /// The show timeline was replaced by a remote state.
    Timeline { millis: i64, paused: bool },
    /// TNGL bytecode seen on the network.
    Tngl(Bytes),
    /// Controller configuration seen on the network.
    Config(Bytes),
    RssiData { mac: String, rssi: i16 },
    PeerConnected { mac: String },
    PeerDisconnected { mac: String },
    OtaStatus(OtaStatus),
    /// Firmware update progress in percent.
    OtaProgress(f64),
    /// Estimated time until the firmware update completes.
    OtaTimeleft(Duration),
}

/// Last event seen per `(label, id)` pair.
#[derive(Debug, Clone, Default)]
pub struct EventHistory {
    events: BTreeMap<(String, u8), Event>,
}

impl EventHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `event`, replacing any earlier one with the same key.
    pub fn record(&mut self, event: Event) {
        self.events.insert(event.key(), event);
    }

    pub fn get(&self, label: &str, id: u8) -> Option<&Event> {
        self.events.get(&(label.to_string(), id))
    }

    /// Cached events ordered by label, then id.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
