//! Connector side-signals and the network decode loop.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tangle_frame::{decode_network, NetworkMessage};
use tangle_transport::{ConnectorSignal, OtaStatus, SignalReceiver};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::events::InterfaceEvent;
use crate::interface::{lock, Handle, Shared};

/// Forward connector signals until cancelled.
pub(crate) async fn pump(handle: Handle, mut signals: SignalReceiver, cancel: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            signal = signals.recv() => match signal {
                Some(signal) => handle_signal(&handle, &cancel, signal),
                None => break,
            },
        }
    }
    debug!("signal pump stopped");
}

pub(crate) fn handle_signal(handle: &Handle, cancel: &CancellationToken, signal: ConnectorSignal) {
    let shared = &handle.shared;
    match signal {
        ConnectorSignal::Connected => on_connected(shared),
        ConnectorSignal::Disconnected => {
            if on_disconnected(shared) {
                schedule_reconnect(handle, cancel);
            }
        }
        ConnectorSignal::Received(bytes) => ingest(shared, &bytes),
        ConnectorSignal::OtaStatus(status) => {
            if status == OtaStatus::Begin {
                lock(&shared.ota).reset();
            }
            shared.publish(InterfaceEvent::OtaStatus(status));
        }
        ConnectorSignal::OtaProgress(percent) => {
            let timeleft = lock(&shared.ota).sample(Instant::now(), percent);
            shared.publish(InterfaceEvent::OtaProgress(percent));
            if let Some(timeleft) = timeleft {
                shared.publish(InterfaceEvent::OtaTimeleft(timeleft));
            }
        }
    }
}

/// Raise the connect guard. A repeated connected signal is ignored.
pub(crate) fn on_connected(shared: &Shared) {
    if set_guard(shared, true) {
        info!("connected");
        shared.publish(InterfaceEvent::Connected);
    } else {
        warn!("connected signal while already connected; ignored");
    }
}

/// Lower the connect guard. Returns whether the state changed.
fn on_disconnected(shared: &Shared) -> bool {
    if set_guard(shared, false) {
        info!("disconnected");
        shared.publish(InterfaceEvent::Disconnected);
        true
    } else {
        warn!("disconnected signal while already disconnected; ignored");
        false
    }
}

fn set_guard(shared: &Shared, connected: bool) -> bool {
    shared.connection.send_if_modified(|state| {
        if *state == connected {
            false
        } else {
            *state = connected;
            true
        }
    })
}

fn schedule_reconnect(handle: &Handle, cancel: &CancellationToken) {
    let interval = handle.shared.config.reconnection_interval;
    if interval.is_zero() || !handle.shared.reconnect.load(Ordering::Acquire) {
        return;
    }

    let handle = handle.clone();
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
        if !handle.shared.reconnect.load(Ordering::Acquire) || handle.shared.is_connected() {
            return;
        }

        info!(after = ?interval, "reconnecting");
        match handle
            .connect(handle.shared.config.reconnect_timeout, false)
            .await
        {
            Ok(info) => info!(name = %info.name, mac = %info.mac, "reconnected"),
            Err(err) => warn!(reason = err.reason(), "reconnect failed"),
        }
    });
}

/// Decode a network byte stream and apply every message in it.
///
/// The stream is decoded in full first; a framing error drops the whole
/// stream and nothing is applied.
pub(crate) fn ingest(shared: &Shared, bytes: &[u8]) {
    let messages = match decode_network(bytes) {
        Ok(messages) => messages,
        Err(err) => {
            error!(error = %err, len = bytes.len(), "network stream dropped");
            return;
        }
    };

    for message in messages {
        match message {
            NetworkMessage::Event(event) => {
                debug!(label = %event.label, id = event.id, kind = event.value.kind(), "event");
                lock(&shared.history).record(event.clone());
                shared.publish(InterfaceEvent::Event(event));
            }
            NetworkMessage::SetTimeline(state) => {
                let clock = shared.clock();
                let (millis, paused) = {
                    let mut timeline = lock(&shared.timeline);
                    timeline.apply_remote(&state, &clock);
                    (timeline.millis(), timeline.paused())
                };
                shared.publish(InterfaceEvent::Timeline { millis, paused });
            }
            NetworkMessage::TnglBytes(bytecode) => shared.publish(InterfaceEvent::Tngl(bytecode)),
            NetworkMessage::ConfBytes(config) => shared.publish(InterfaceEvent::Config(config)),
            NetworkMessage::Rssi { mac, rssi } => {
                shared.publish(InterfaceEvent::RssiData { mac, rssi })
            }
            NetworkMessage::PeerConnected { mac } => {
                shared.publish(InterfaceEvent::PeerConnected { mac })
            }
            NetworkMessage::PeerDisconnected { mac } => {
                shared.publish(InterfaceEvent::PeerDisconnected { mac })
            }
        }
    }
}

/// Linear time-left estimate from the last two OTA progress samples.
#[derive(Debug, Default)]
pub(crate) struct OtaEstimator {
    last: Option<(Instant, f64)>,
}

impl OtaEstimator {
    pub(crate) fn reset(&mut self) {
        self.last = None;
    }

    pub(crate) fn sample(&mut self, now: Instant, percent: f64) -> Option<Duration> {
        let (then, before) = self.last.replace((now, percent))?;
        let elapsed = now.saturating_duration_since(then).as_secs_f64();
        let gained = percent - before;
        if elapsed <= 0.0 || gained <= 0.0 {
            return None;
        }
        let remaining = (100.0 - percent).max(0.0) * elapsed / gained;
        Some(Duration::from_secs_f64(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimator_needs_two_rising_samples() {
        let start = Instant::now();
        let mut ota = OtaEstimator::default();
        assert_eq!(ota.sample(start, 10.0), None);
        assert_eq!(
            ota.sample(start + Duration::from_secs(2), 20.0),
            Some(Duration::from_secs(16))
        );
        assert_eq!(ota.sample(start + Duration::from_secs(3), 20.0), None);
    }

    #[test]
    fn estimator_reset_forgets_history() {
        let start = Instant::now();
        let mut ota = OtaEstimator::default();
        ota.sample(start, 50.0);
        ota.reset();
        assert_eq!(ota.sample(start + Duration::from_secs(1), 60.0), None);
    }
}
