//! Binary codec and wire format for Tangle LED networks.
//!
//! Every message on the wire starts with a one-byte flag followed by a
//! flag-specific payload. Two disjoint flag namespaces exist:
//! - device-directed request/response opcodes ([`flags::device`])
//! - network-directed broadcast opcodes ([`flags::network`])
//!
//! Compiled TNGL bytecode uses a third table ([`flags::tngl`]) inside the
//! `TNGL_BYTES` payload. All multi-byte integers are little-endian and every
//! read or write is bounds-checked.

pub mod codec;
pub mod error;
pub mod event;
pub mod flags;
pub mod reader;
pub mod request;
pub mod time_track;
pub mod writer;

pub use codec::{
    decode_label, decode_network, encode_conf_bytes, encode_emit_event, encode_label,
    encode_set_timeline, encode_tngl_bytes, percentage_to_raw, raw_to_percentage,
    NetworkMessage, TimelineState, LABEL_SIZE,
};
pub use error::{FrameError, Result};
pub use event::{Color, Event, EventValue, BROADCAST_ID};
pub use reader::BufferReader;
pub use request::RequestKind;
pub use time_track::{now_millis, TimeTrack};
pub use writer::BufferWriter;
