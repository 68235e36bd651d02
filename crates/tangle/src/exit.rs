use std::fmt;
use std::io;

use tangle_compiler::CompileError;
use tangle_frame::FrameError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::BufferOverflow { .. } => CliError::new(INTERNAL, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn compile_error(context: &str, err: CompileError) -> CliError {
    match err {
        // the bytecode buffer ran out; the program is too large, not malformed
        CompileError::Frame(FrameError::BufferOverflow { .. }) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        CompileError::Frame(err) => frame_error(context, err),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_program_is_invalid_data() {
        let err = compile_error(
            "compile failed",
            CompileError::Frame(FrameError::BufferOverflow {
                requested: 5,
                available: 1,
            }),
        );
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(
            err.message,
            "compile failed: bytecode buffer: buffer overflow (requested 5 bytes, 1 available)"
        );
    }

    #[test]
    fn missing_file_is_failure() {
        let err = io_error(
            "read failed",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code, FAILURE);
    }
}
