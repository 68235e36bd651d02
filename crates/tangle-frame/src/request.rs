//! Device-directed request builders and response parsers.

use bytes::Bytes;

use crate::codec::TimelineState;
use crate::error::{FrameError, Result};
use crate::flags::device;
use crate::reader::BufferReader;
use crate::writer::BufferWriter;

/// Size of the firmware version string in a FW_VERSION response.
pub const FW_VERSION_SIZE: usize = 32;

/// Size of the network fingerprint in a FINGERPRINT response.
pub const FINGERPRINT_SIZE: usize = 32;

/// Device request kinds with a request/response flag pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Adopt,
    ConfigRead,
    ConfigWrite,
    Timeline,
    Fingerprint,
    FwVersion,
    Reboot,
    Disconnect,
}

impl RequestKind {
    pub const fn request_flag(self) -> u8 {
        match self {
            Self::Adopt => device::ADOPT_REQUEST,
            Self::ConfigRead => device::CONFIG_READ_REQUEST,
            Self::ConfigWrite => device::CONFIG_WRITE_REQUEST,
            Self::Timeline => device::TIMELINE_REQUEST,
            Self::Fingerprint => device::FINGERPRINT_REQUEST,
            Self::FwVersion => device::FW_VERSION_REQUEST,
            Self::Reboot => device::REBOOT_REQUEST,
            Self::Disconnect => device::DISCONNECT_REQUEST,
        }
    }

    pub const fn response_flag(self) -> u8 {
        match self {
            Self::Adopt => device::ADOPT_RESPONSE,
            Self::ConfigRead => device::CONFIG_READ_RESPONSE,
            Self::ConfigWrite => device::CONFIG_WRITE_RESPONSE,
            Self::Timeline => device::TIMELINE_RESPONSE,
            Self::Fingerprint => device::FINGERPRINT_RESPONSE,
            Self::FwVersion => device::FW_VERSION_RESPONSE,
            Self::Reboot => device::REBOOT_RESPONSE,
            Self::Disconnect => device::DISCONNECT_RESPONSE,
        }
    }
}

/// Build `[flag][u32 request_id][body]`.
pub fn encode_request(kind: RequestKind, request_id: u32, body: &[u8]) -> Result<Bytes> {
    let mut writer = BufferWriter::new(1 + 4 + body.len());
    writer.write_flag(kind.request_flag())?;
    writer.write_u32(request_id)?;
    writer.write_slice(body)?;
    Ok(writer.to_bytes())
}

/// Build a CONFIG_WRITE request carrying `config` length-prefixed.
pub fn encode_config_write(request_id: u32, config: &[u8]) -> Result<Bytes> {
    let len = u32::try_from(config.len())
        .map_err(|_| FrameError::InvalidPayload("config too large".to_string()))?;
    let mut body = BufferWriter::new(4 + config.len());
    body.write_u32(len)?;
    body.write_slice(config)?;
    encode_request(RequestKind::ConfigWrite, request_id, body.as_bytes())
}

/// Validate a response header and return a reader positioned at its body.
///
/// Checks the response flag, the echoed request id and the error code.
pub fn parse_response(
    kind: RequestKind,
    request_id: u32,
    response: &[u8],
) -> Result<BufferReader<'_>> {
    let mut reader = BufferReader::new(response);
    let flag = reader.read_flag()?;
    let response_id = reader.read_u32()?;
    if flag != kind.response_flag() || response_id != request_id {
        return Err(FrameError::ResponseMismatch {
            expected: kind.response_flag(),
            flag,
            request_id,
            response_id,
        });
    }
    let code = reader.read_u8()?;
    if code != 0 {
        return Err(FrameError::DeviceError { flag, code });
    }
    Ok(reader)
}

pub fn parse_fw_version(mut body: BufferReader<'_>) -> Result<String> {
    let version = body.read_string(FW_VERSION_SIZE)?;
    Ok(version.trim().to_string())
}

/// Fingerprint rendered as lowercase hex.
pub fn parse_fingerprint(mut body: BufferReader<'_>) -> Result<String> {
    let raw = body.read_bytes(FINGERPRINT_SIZE)?;
    Ok(raw.iter().map(|b| format!("{b:02x}")).collect())
}

pub fn parse_timeline(mut body: BufferReader<'_>) -> Result<TimelineState> {
    TimelineState::read(&mut body)
}

pub fn parse_config(mut body: BufferReader<'_>) -> Result<Bytes> {
    let len = body.read_u32()? as usize;
    Ok(Bytes::copy_from_slice(body.read_bytes(len)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(kind: RequestKind, id: u32, code: u8, body: &[u8]) -> Vec<u8> {
        let mut out = vec![kind.response_flag()];
        out.extend_from_slice(&id.to_le_bytes());
        out.push(code);
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn request_layout() {
        let bytes = encode_request(RequestKind::FwVersion, 0x0102_0304, &[]).unwrap();
        assert_eq!(bytes.as_ref(), &[device::FW_VERSION_REQUEST, 4, 3, 2, 1]);
    }

    #[test]
    fn fw_version_response() {
        let mut body = [0u8; FW_VERSION_SIZE];
        body[..19].copy_from_slice(b"TNGL_0.10.2_2024011");
        let raw = response(RequestKind::FwVersion, 9, 0, &body);
        let reader = parse_response(RequestKind::FwVersion, 9, &raw).unwrap();
        assert_eq!(parse_fw_version(reader).unwrap(), "TNGL_0.10.2_2024011");
    }

    #[test]
    fn mismatched_id_is_rejected() {
        let raw = response(RequestKind::Reboot, 1, 0, &[]);
        let err = parse_response(RequestKind::Reboot, 2, &raw).unwrap_err();
        assert!(matches!(err, FrameError::ResponseMismatch { .. }));
    }

    #[test]
    fn device_error_code_is_surfaced() {
        let raw = response(RequestKind::ConfigWrite, 3, 5, &[]);
        let err = parse_response(RequestKind::ConfigWrite, 3, &raw).unwrap_err();
        assert_eq!(
            err,
            FrameError::DeviceError {
                flag: device::CONFIG_WRITE_RESPONSE,
                code: 5
            }
        );
    }

    #[test]
    fn timeline_and_config_bodies() {
        let mut body = Vec::new();
        body.extend_from_slice(&77u32.to_le_bytes());
        body.extend_from_slice(&1234i32.to_le_bytes());
        body.push(0);
        let raw = response(RequestKind::Timeline, 1, 0, &body);
        let state = parse_timeline(parse_response(RequestKind::Timeline, 1, &raw).unwrap()).unwrap();
        assert_eq!(state.clock_timestamp, 77);
        assert_eq!(state.timeline_timestamp, 1234);
        assert!(!state.paused);

        let raw = response(RequestKind::ConfigRead, 2, 0, &[2, 0, 0, 0, b'{', b'}']);
        let config = parse_config(parse_response(RequestKind::ConfigRead, 2, &raw).unwrap()).unwrap();
        assert_eq!(config.as_ref(), b"{}");
    }

    #[test]
    fn fingerprint_is_hex() {
        let raw = response(RequestKind::Fingerprint, 4, 0, &[0xAB; FINGERPRINT_SIZE]);
        let print = parse_fingerprint(parse_response(RequestKind::Fingerprint, 4, &raw).unwrap()).unwrap();
        assert_eq!(print.len(), 64);
        assert!(print.starts_with("abab"));
    }

    #[test]
    fn config_write_is_length_prefixed() {
        let bytes = encode_config_write(1, b"cfg").unwrap();
        assert_eq!(bytes[0], device::CONFIG_WRITE_REQUEST);
        assert_eq!(&bytes[5..9], &3u32.to_le_bytes());
        assert_eq!(&bytes[9..], b"cfg");
    }
}
