/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// A write would run past the end of a fixed-capacity buffer.
    #[error("buffer overflow (requested {requested} bytes, {available} available)")]
    BufferOverflow { requested: usize, available: usize },

    /// A read would run past the end of the input.
    #[error("read out of range (requested {requested} bytes, {available} available)")]
    OutOfRange { requested: usize, available: usize },

    /// The stream contains a flag this decoder does not know.
    #[error("unknown flag 0x{flag:02x} at offset {offset}")]
    UnknownFlag { flag: u8, offset: usize },

    /// A payload is well-framed but its content is invalid.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A device response does not answer the request it was matched against.
    #[error("response mismatch (expected flag {expected} id {request_id}, got flag {flag} id {response_id})")]
    ResponseMismatch {
        expected: u8,
        flag: u8,
        request_id: u32,
        response_id: u32,
    },

    /// The device answered with a non-zero error code.
    #[error("device returned error code {code} for flag {flag}")]
    DeviceError { flag: u8, code: u8 },
}

pub type Result<T> = std::result::Result<T, FrameError>;
