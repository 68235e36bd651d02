//! Application-level operations built on the raw queue primitives.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tangle_frame::request::{
    encode_config_write, encode_request, parse_config, parse_fingerprint, parse_fw_version,
    parse_response, parse_timeline,
};
use tangle_frame::{
    encode_emit_event, encode_set_timeline, encode_tngl_bytes, Color, Event, EventValue,
    RequestKind, TimeTrack,
};

use crate::error::{InterfaceError, Result};
use crate::interface::{lock, Interface};
use crate::work::Pending;

/// Coalescing label used by [`Interface::sync_timeline`].
pub const TIMELINE_LABEL: &str = "TMLN";

impl Interface {
    /// Emit `value` under `label` to controller `id`, stamped with the
    /// current timeline.
    ///
    /// Unless `force_delivery` is set, a still-queued emit for the same
    /// `(label, id)` is replaced.
    pub fn emit(&self, label: &str, value: EventValue, id: u8, force_delivery: bool) -> Pending<()> {
        let timestamp = self.timeline().millis() as i32;
        let event = Event::new(label, value, id).with_timestamp(timestamp);
        let payload = match encode_emit_event(&event, false) {
            Ok(payload) => payload,
            Err(err) => return Pending::failed(err.into()),
        };
        let coalesce = (!force_delivery).then(|| format!("E{label}{id}"));
        self.execute(payload, coalesce.as_deref())
    }

    pub fn emit_event(&self, label: &str, id: u8, force_delivery: bool) -> Pending<()> {
        self.emit(label, EventValue::None, id, force_delivery)
    }

    pub fn emit_timestamp_event(&self, label: &str, value: i32, id: u8, force_delivery: bool) -> Pending<()> {
        self.emit(label, EventValue::Timestamp(value), id, force_delivery)
    }

    pub fn emit_color_event(&self, label: &str, value: Color, id: u8, force_delivery: bool) -> Pending<()> {
        self.emit(label, EventValue::Color(value), id, force_delivery)
    }

    /// `value` is clamped to `-100.0..=100.0` on the wire.
    pub fn emit_percentage_event(&self, label: &str, value: f64, id: u8, force_delivery: bool) -> Pending<()> {
        self.emit(label, EventValue::Percentage(value), id, force_delivery)
    }

    pub fn emit_label_event(&self, label: &str, value: &str, id: u8, force_delivery: bool) -> Pending<()> {
        self.emit(label, EventValue::Label(value.to_string()), id, force_delivery)
    }

    /// Re-emit every cached event lazily.
    ///
    /// Resends are queued without a coalescing label, so a newer emit still
    /// waiting in the queue for the same stream is never replaced by them.
    pub fn resend_all(&self) -> impl Future<Output = Result<()>> + Send + 'static {
        let events: Vec<Event> = lock(&self.handle.shared.history).iter().cloned().collect();
        let pending: Vec<Pending<()>> = events
            .iter()
            .map(|event| match encode_emit_event(event, true) {
                Ok(payload) => self.execute(payload, None),
                Err(err) => Pending::failed(err.into()),
            })
            .collect();
        async move {
            for item in pending {
                item.await?;
            }
            Ok(())
        }
    }

    /// Broadcast the local timeline, stamped with the interface clock.
    pub fn sync_timeline(&self) -> Pending<()> {
        let state = self.timeline().to_state(&self.clock());
        match encode_set_timeline(&state) {
            Ok(payload) => self.execute(payload, Some(TIMELINE_LABEL)),
            Err(err) => Pending::failed(err.into()),
        }
    }

    /// Deliver compiled TNGL bytecode to the network.
    pub fn upload_tngl(&self, bytecode: &[u8]) -> Pending<()> {
        match encode_tngl_bytes(bytecode) {
            Ok(payload) => self.deliver(payload),
            Err(err) => Pending::failed(err.into()),
        }
    }

    pub fn request_firmware_version(&self) -> impl Future<Output = Result<String>> + Send + 'static {
        let (id, pending) = self.simple_request(RequestKind::FwVersion, true);
        async move {
            let response = pending.await?;
            let body = parse_response(RequestKind::FwVersion, id, &response)?;
            Ok(parse_fw_version(body)?)
        }
    }

    /// Network fingerprint as lowercase hex.
    pub fn request_fingerprint(&self) -> impl Future<Output = Result<String>> + Send + 'static {
        let (id, pending) = self.simple_request(RequestKind::Fingerprint, true);
        async move {
            let response = pending.await?;
            let body = parse_response(RequestKind::Fingerprint, id, &response)?;
            Ok(parse_fingerprint(body)?)
        }
    }

    /// Read the device timeline and adopt it locally.
    pub fn request_timeline(&self) -> impl Future<Output = Result<TimeTrack>> + Send + 'static {
        let (id, pending) = self.simple_request(RequestKind::Timeline, true);
        let shared = Arc::clone(&self.handle.shared);
        async move {
            let response = pending.await?;
            let body = parse_response(RequestKind::Timeline, id, &response)?;
            let state = parse_timeline(body)?;
            let clock = shared.clock();
            let mut timeline = lock(&shared.timeline);
            timeline.apply_remote(&state, &clock);
            Ok(timeline.clone())
        }
    }

    /// Ask the device to reboot. Resolves once the request is sent.
    pub fn reboot_device(&self) -> impl Future<Output = Result<()>> + Send + 'static {
        let (_, pending) = self.simple_request(RequestKind::Reboot, false);
        async move {
            pending.await?;
            Ok(())
        }
    }

    pub fn read_config(&self) -> impl Future<Output = Result<Bytes>> + Send + 'static {
        let (id, pending) = self.simple_request(RequestKind::ConfigRead, true);
        async move {
            let response = pending.await?;
            let body = parse_response(RequestKind::ConfigRead, id, &response)?;
            Ok(parse_config(body)?)
        }
    }

    pub fn write_config(&self, config: &[u8]) -> impl Future<Output = Result<()>> + Send + 'static {
        let (id, pending) = self.device_request(
            RequestKind::ConfigWrite,
            |id| encode_config_write(id, config),
            true,
        );
        async move {
            let response = pending.await?;
            parse_response(RequestKind::ConfigWrite, id, &response)?;
            Ok(())
        }
    }

    fn simple_request(&self, kind: RequestKind, expect_response: bool) -> (u32, Pending<Bytes>) {
        self.device_request(kind, |id| encode_request(kind, id, &[]), expect_response)
    }

    fn device_request(
        &self,
        kind: RequestKind,
        encode: impl FnOnce(u32) -> tangle_frame::Result<Bytes>,
        expect_response: bool,
    ) -> (u32, Pending<Bytes>) {
        let id = self.handle.shared.next_request_id();
        let pending = match encode(id) {
            Ok(payload) => self.request(payload, expect_response),
            Err(err) => {
                tracing::debug!(request = ?kind, error = %err, "request not encoded");
                Pending::failed(InterfaceError::from(err))
            }
        };
        (id, pending)
    }
}
