use bytes::Bytes;

use crate::error::{FrameError, Result};
use crate::event::{Color, Event, EventValue};
use crate::flags::network;
use crate::reader::BufferReader;
use crate::writer::BufferWriter;

/// Size of an event label on the wire.
pub const LABEL_SIZE: usize = 5;

/// Size of a hardware address on the wire.
pub const MAC_SIZE: usize = 6;

/// Bit in the SET_TIMELINE flags byte marking a paused timeline.
pub const TIMELINE_PAUSED_BIT: u8 = 1 << 4;

/// Raw value that `100.0 %` maps to.
const PERCENTAGE_RANGE: f64 = i32::MAX as f64;

/// Largest emit-event message: flag + 5-byte value + label + timestamp + id.
const MAX_EVENT_SIZE: usize = 1 + 5 + LABEL_SIZE + 4 + 1;

/// Timeline state as carried by SET_TIMELINE and timeline responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineState {
    /// Sender clock at the moment the state was captured (wrapping millis).
    pub clock_timestamp: u32,
    /// Timeline position in millis.
    pub timeline_timestamp: i32,
    pub paused: bool,
}

impl TimelineState {
    pub(crate) fn read(reader: &mut BufferReader<'_>) -> Result<Self> {
        let clock_timestamp = reader.read_u32()?;
        let timeline_timestamp = reader.read_i32()?;
        let flags = reader.read_u8()?;
        Ok(Self {
            clock_timestamp,
            timeline_timestamp,
            paused: flags & TIMELINE_PAUSED_BIT != 0,
        })
    }

    fn write(&self, writer: &mut BufferWriter) -> Result<()> {
        writer.write_u32(self.clock_timestamp)?;
        writer.write_i32(self.timeline_timestamp)?;
        writer.write_u8(if self.paused { TIMELINE_PAUSED_BIT } else { 0 })
    }
}

/// One decoded network-directed message.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkMessage {
    ConfBytes(Bytes),
    TnglBytes(Bytes),
    SetTimeline(TimelineState),
    Event(Event),
    Rssi { mac: String, rssi: i16 },
    PeerConnected { mac: String },
    PeerDisconnected { mac: String },
}

/// Map a percentage in `[-100, 100]` onto the signed 32-bit range.
///
/// Values outside the interval are clamped first; the result is truncated.
pub fn percentage_to_raw(percentage: f64) -> i32 {
    let clamped = percentage.clamp(-100.0, 100.0);
    (clamped / 100.0 * PERCENTAGE_RANGE) as i32
}

/// Inverse of [`percentage_to_raw`], rounded to 6 decimal digits.
pub fn raw_to_percentage(raw: i32) -> f64 {
    let percentage = raw as f64 * 100.0 / PERCENTAGE_RANGE;
    (percentage * 1e6).round() / 1e6
}

/// NUL-padded, truncated 5-byte label.
pub fn encode_label(label: &str) -> [u8; LABEL_SIZE] {
    let mut out = [0u8; LABEL_SIZE];
    let used = label.len().min(LABEL_SIZE);
    out[..used].copy_from_slice(&label.as_bytes()[..used]);
    out
}

/// Longest run of word characters (`[A-Za-z0-9_]`) in a raw label; the
/// first one wins a tie.
pub fn decode_label(raw: &[u8]) -> String {
    raw.split(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
        .fold(&[][..], |longest, run| if run.len() > longest.len() { run } else { longest })
        .iter()
        .map(|&b| b as char)
        .collect()
}

/// Encode an emit-event message.
///
/// Layout: `[flag][value][label:5][timestamp:4, omitted when lazy][id:1]`.
/// An event without a timestamp is always encoded lazily.
pub fn encode_emit_event(event: &Event, lazy: bool) -> Result<Bytes> {
    let timestamp = if lazy { None } else { event.timestamp };
    let lazy = timestamp.is_none();
    let mut writer = BufferWriter::new(MAX_EVENT_SIZE);

    match &event.value {
        EventValue::None => {
            writer.write_flag(pick(lazy, network::EMIT_LAZY_EVENT, network::EMIT_EVENT))?;
        }
        EventValue::Timestamp(value) => {
            writer.write_flag(pick(
                lazy,
                network::EMIT_LAZY_TIMESTAMP_EVENT,
                network::EMIT_TIMESTAMP_EVENT,
            ))?;
            writer.write_i32(*value)?;
        }
        EventValue::Color(color) => {
            writer.write_flag(pick(
                lazy,
                network::EMIT_LAZY_COLOR_EVENT,
                network::EMIT_COLOR_EVENT,
            ))?;
            writer.write_slice(&color.to_bytes())?;
        }
        EventValue::Percentage(value) => {
            writer.write_flag(pick(
                lazy,
                network::EMIT_LAZY_PERCENTAGE_EVENT,
                network::EMIT_PERCENTAGE_EVENT,
            ))?;
            writer.write_i32(percentage_to_raw(*value))?;
        }
        EventValue::Label(value) => {
            writer.write_flag(pick(
                lazy,
                network::EMIT_LAZY_LABEL_EVENT,
                network::EMIT_LABEL_EVENT,
            ))?;
            writer.write_string(value, LABEL_SIZE)?;
        }
    }

    writer.write_string(&event.label, LABEL_SIZE)?;
    if let Some(timestamp) = timestamp {
        writer.write_i32(timestamp)?;
    }
    writer.write_u8(event.id)?;
    Ok(writer.to_bytes())
}

/// Encode a SET_TIMELINE message.
pub fn encode_set_timeline(state: &TimelineState) -> Result<Bytes> {
    let mut writer = BufferWriter::new(10);
    writer.write_flag(network::SET_TIMELINE)?;
    state.write(&mut writer)?;
    Ok(writer.to_bytes())
}

/// Wrap compiled bytecode in a TNGL_BYTES message.
pub fn encode_tngl_bytes(bytecode: &[u8]) -> Result<Bytes> {
    encode_length_prefixed(network::TNGL_BYTES, bytecode)
}

/// Wrap raw configuration in a CONF_BYTES message.
pub fn encode_conf_bytes(config: &[u8]) -> Result<Bytes> {
    encode_length_prefixed(network::CONF_BYTES, config)
}

fn encode_length_prefixed(flag: u8, payload: &[u8]) -> Result<Bytes> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        FrameError::InvalidPayload(format!("payload too large ({} bytes)", payload.len()))
    })?;
    let mut writer = BufferWriter::new(1 + 4 + payload.len());
    writer.write_flag(flag)?;
    writer.write_u32(len)?;
    writer.write_slice(payload)?;
    Ok(writer.to_bytes())
}

/// Walk a network byte stream message by message.
///
/// The whole stream is decoded before anything is returned: an unknown
/// leading flag or a truncated payload fails the entire pass.
pub fn decode_network(data: &[u8]) -> Result<Vec<NetworkMessage>> {
    let mut reader = BufferReader::new(data);
    let mut messages = Vec::new();

    while !reader.is_empty() {
        let offset = reader.position();
        let flag = reader.read_flag()?;
        let message = match flag {
            network::CONF_BYTES => {
                let len = reader.read_u32()? as usize;
                NetworkMessage::ConfBytes(Bytes::copy_from_slice(reader.read_bytes(len)?))
            }
            network::TNGL_BYTES => {
                let len = reader.read_u32()? as usize;
                NetworkMessage::TnglBytes(Bytes::copy_from_slice(reader.read_bytes(len)?))
            }
            network::SET_TIMELINE => NetworkMessage::SetTimeline(TimelineState::read(&mut reader)?),
            network::EMIT_EVENT..=network::EMIT_LAZY_LABEL_EVENT => {
                NetworkMessage::Event(decode_event(flag, &mut reader)?)
            }
            network::RSSI_DATA => {
                let mac = read_mac(&mut reader)?;
                let rssi = reader.read_i16()?;
                NetworkMessage::Rssi { mac, rssi }
            }
            network::PEER_CONNECTED => NetworkMessage::PeerConnected {
                mac: read_mac(&mut reader)?,
            },
            network::PEER_DISCONNECTED => NetworkMessage::PeerDisconnected {
                mac: read_mac(&mut reader)?,
            },
            _ => return Err(FrameError::UnknownFlag { flag, offset }),
        };
        tracing::trace!(flag = network::name(flag), offset, "decoded network message");
        messages.push(message);
    }

    Ok(messages)
}

fn decode_event(flag: u8, reader: &mut BufferReader<'_>) -> Result<Event> {
    // lazy siblings are the even flags of each pair
    let lazy = (flag - network::EMIT_EVENT) % 2 == 1;
    let value = match flag {
        network::EMIT_EVENT | network::EMIT_LAZY_EVENT => EventValue::None,
        network::EMIT_TIMESTAMP_EVENT | network::EMIT_LAZY_TIMESTAMP_EVENT => {
            EventValue::Timestamp(reader.read_i32()?)
        }
        network::EMIT_COLOR_EVENT | network::EMIT_LAZY_COLOR_EVENT => {
            let rgb = reader.read_bytes(3)?;
            EventValue::Color(Color::new(rgb[0], rgb[1], rgb[2]))
        }
        network::EMIT_PERCENTAGE_EVENT | network::EMIT_LAZY_PERCENTAGE_EVENT => {
            EventValue::Percentage(raw_to_percentage(reader.read_i32()?))
        }
        _ => EventValue::Label(decode_label(reader.read_bytes(LABEL_SIZE)?)),
    };
    let label = decode_label(reader.read_bytes(LABEL_SIZE)?);
    let timestamp = if lazy {
        None
    } else {
        Some(reader.read_i32()?)
    };
    let id = reader.read_u8()?;
    Ok(Event {
        value,
        label,
        timestamp,
        id,
    })
}

fn read_mac(reader: &mut BufferReader<'_>) -> Result<String> {
    let raw = reader.read_bytes(MAC_SIZE)?;
    Ok(raw
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":"))
}

fn pick(lazy: bool, lazy_flag: u8, flag: u8) -> u8 {
    if lazy {
        lazy_flag
    } else {
        flag
    }
}
