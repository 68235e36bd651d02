use std::io::Read;

use serde::Serialize;
use tangle_frame::{decode_network, Event, NetworkMessage};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{parse_hex, print_json, print_table, to_hex, OutputFormat};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum MessageOutput<'a> {
    ConfBytes {
        size: usize,
        hex: String,
    },
    TnglBytes {
        size: usize,
        hex: String,
    },
    SetTimeline {
        clock_timestamp: u32,
        timeline_timestamp: i32,
        paused: bool,
    },
    Event(&'a Event),
    Rssi {
        mac: &'a str,
        rssi: i16,
    },
    PeerConnected {
        mac: &'a str,
    },
    PeerDisconnected {
        mac: &'a str,
    },
}

impl<'a> From<&'a NetworkMessage> for MessageOutput<'a> {
    fn from(message: &'a NetworkMessage) -> Self {
        match message {
            NetworkMessage::ConfBytes(bytes) => Self::ConfBytes {
                size: bytes.len(),
                hex: to_hex(bytes),
            },
            NetworkMessage::TnglBytes(bytes) => Self::TnglBytes {
                size: bytes.len(),
                hex: to_hex(bytes),
            },
            NetworkMessage::SetTimeline(state) => Self::SetTimeline {
                clock_timestamp: state.clock_timestamp,
                timeline_timestamp: state.timeline_timestamp,
                paused: state.paused,
            },
            NetworkMessage::Event(event) => Self::Event(event),
            NetworkMessage::Rssi { mac, rssi } => Self::Rssi { mac, rssi: *rssi },
            NetworkMessage::PeerConnected { mac } => Self::PeerConnected { mac },
            NetworkMessage::PeerDisconnected { mac } => Self::PeerDisconnected { mac },
        }
    }
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let hex = if args.hex == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| io_error("failed reading stdin", err))?;
        text
    } else {
        args.hex
    };
    let bytes = parse_hex(&hex)?;
    let messages = decode_network(&bytes).map_err(|err| frame_error("decode failed", err))?;
    let outputs: Vec<MessageOutput<'_>> = messages.iter().map(MessageOutput::from).collect();

    match format {
        OutputFormat::Json => print_json(&outputs),
        OutputFormat::Table => print_table(
            &["#", "MESSAGE"],
            messages
                .iter()
                .enumerate()
                .map(|(index, message)| vec![index.to_string(), summary(message)])
                .collect(),
        ),
        OutputFormat::Pretty | OutputFormat::Raw => {
            for message in &messages {
                println!("{}", summary(message));
            }
        }
    }

    Ok(SUCCESS)
}

fn summary(message: &NetworkMessage) -> String {
    match message {
        NetworkMessage::ConfBytes(bytes) => format!("config ({} bytes)", bytes.len()),
        NetworkMessage::TnglBytes(bytes) => format!("tngl ({} bytes)", bytes.len()),
        NetworkMessage::SetTimeline(state) => format!(
            "timeline at={}ms paused={} clock={}",
            state.timeline_timestamp, state.paused, state.clock_timestamp
        ),
        NetworkMessage::Event(event) => {
            let value = match &event.value {
                tangle_frame::EventValue::None => String::new(),
                tangle_frame::EventValue::Timestamp(ms) => format!(" {ms}ms"),
                tangle_frame::EventValue::Color(color) => format!(" {color}"),
                tangle_frame::EventValue::Percentage(p) => format!(" {p}%"),
                tangle_frame::EventValue::Label(label) => format!(" ${label}"),
            };
            let at = event
                .timestamp
                .map(|ts| format!(" @{ts}ms"))
                .unwrap_or_default();
            format!("event ${} -> {}{value}{at}", event.label, event.id)
        }
        NetworkMessage::Rssi { mac, rssi } => format!("rssi {mac} {rssi}dBm"),
        NetworkMessage::PeerConnected { mac } => format!("peer connected {mac}"),
        NetworkMessage::PeerDisconnected { mac } => format!("peer disconnected {mac}"),
    }
}
