use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{FrameError, Result};

/// Destination id addressing every controller in the network.
pub const BROADCAST_ID: u8 = 255;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Result<Self> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FrameError::InvalidPayload(format!(
                "invalid color literal '{text}'"
            )));
        }
        let channel = |at: usize| {
            u8::from_str_radix(&hex[at..at + 2], 16)
                .map_err(|err| FrameError::InvalidPayload(err.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Payload carried by an emitted event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum EventValue {
    None,
    Timestamp(i32),
    Color(Color),
    /// Percentage in `-100.0..=100.0`.
    Percentage(f64),
    Label(String),
}

impl EventValue {
    /// Short name of the payload kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Timestamp(_) => "timestamp",
            Self::Color(_) => "color",
            Self::Percentage(_) => "percentage",
            Self::Label(_) => "label",
        }
    }
}

/// A network event, as emitted or decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(flatten)]
    pub value: EventValue,
    /// Event label, at most five word characters.
    pub label: String,
    /// Timeline timestamp; `None` for lazy events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i32>,
    /// Destination controller id.
    pub id: u8,
}

impl Event {
    pub fn new(label: impl Into<String>, value: EventValue, id: u8) -> Self {
        Self {
            value,
            label: label.into(),
            timestamp: None,
            id,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Key identifying the logical stream this event belongs to.
    pub fn key(&self) -> (String, u8) {
        (self.label.clone(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_roundtrip() {
        let color = Color::from_hex("#ff8000").unwrap();
        assert_eq!(color, Color::new(0xFF, 0x80, 0x00));
        assert_eq!(color.to_string(), "#ff8000");
        assert!(Color::from_hex("#ff80").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn event_serializes_flat() {
        let event = Event::new("evt1", EventValue::Percentage(10.5), 3).with_timestamp(42);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "percentage",
                "value": 10.5,
                "label": "evt1",
                "timestamp": 42,
                "id": 3
            })
        );
    }

    #[test]
    fn lazy_none_event_omits_optional_fields() {
        let event = Event::new("tick", EventValue::None, BROADCAST_ID);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "none");
        assert!(json.get("timestamp").is_none());
        assert_eq!(json["id"], 255);
    }

    #[test]
    fn color_event_serializes_hex() {
        let event = Event::new("paint", EventValue::Color(Color::WHITE), 0);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["value"], "#ffffff");
    }
}
