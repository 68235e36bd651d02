use tangle_frame::FrameError;

/// Errors that can occur while compiling TNGL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A literal token could not be converted to bytecode.
    #[error("invalid {kind} literal '{text}'")]
    InvalidLiteral { kind: &'static str, text: String },

    /// The bytecode buffer ran out of room.
    #[error("bytecode buffer: {0}")]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, CompileError>;
