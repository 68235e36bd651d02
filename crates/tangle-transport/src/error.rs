/// Errors reported by connector implementations.
///
/// The dispatcher forwards these verbatim as the rejection of the work item
/// that triggered the connector call, so [`TransportError::reason`] is the
/// string application code branches on.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connector-specific failure, carrying the connector's own reason string.
    #[error("{0}")]
    Rejected(String),

    /// The device is not (or no longer) connected.
    #[error("DeviceDisconnected")]
    Disconnected,

    /// No device has been selected yet.
    #[error("DeviceNotSelected")]
    NotSelected,

    /// The connector gave up waiting on the device.
    #[error("ConnectionTimeout")]
    Timeout,

    /// The connector does not implement this capability.
    #[error("NotSupported")]
    NotSupported,

    /// An I/O error occurred on the underlying link.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Clone for TransportError {
    fn clone(&self) -> Self {
        match self {
            Self::Rejected(reason) => Self::Rejected(reason.clone()),
            Self::Disconnected => Self::Disconnected,
            Self::NotSelected => Self::NotSelected,
            Self::Timeout => Self::Timeout,
            Self::NotSupported => Self::NotSupported,
            Self::Io(err) => Self::Io(std::io::Error::new(err.kind(), err.to_string())),
        }
    }
}

impl TransportError {
    /// Build a rejection from any connector reason string.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Short machine-readable reason for this failure.
    pub fn reason(&self) -> &str {
        match self {
            Self::Rejected(reason) => reason,
            Self::Disconnected => "DeviceDisconnected",
            Self::NotSelected => "DeviceNotSelected",
            Self::Timeout => "ConnectionTimeout",
            Self::NotSupported => "NotSupported",
            Self::Io(_) => "IoError",
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_reason_is_verbatim() {
        let err = TransportError::rejected("WriteFailed");
        assert_eq!(err.reason(), "WriteFailed");
        assert_eq!(err.to_string(), "WriteFailed");
    }

    #[test]
    fn io_errors_have_stable_reason() {
        let err: TransportError = std::io::Error::other("pipe closed").into();
        assert_eq!(err.reason(), "IoError");
        assert!(err.to_string().contains("pipe closed"));
    }

    #[test]
    fn clone_keeps_io_kind_and_message() {
        let err: TransportError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed").into();
        let TransportError::Io(copy) = err.clone() else {
            panic!("expected io error");
        };
        assert_eq!(copy.kind(), std::io::ErrorKind::BrokenPipe);
        assert!(copy.to_string().contains("pipe closed"));
    }
}
