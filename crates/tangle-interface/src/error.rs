use tangle_frame::FrameError;
use tangle_transport::TransportError;

/// Errors that can occur in interface operations.
///
/// The `Display` form of the queue-policy variants is the bare reason string,
/// matching [`InterfaceError::reason`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum InterfaceError {
    /// Connect timeout below the one second minimum.
    #[error("InvalidTimeout")]
    InvalidTimeout,

    /// A select or auto-select is already queued or running.
    #[error("SelectingInProgress")]
    SelectingInProgress,

    /// A connect is already queued or running.
    #[error("ConnectingInProgress")]
    ConnectingInProgress,

    /// The worker popped an item while no connector was assigned.
    #[error("ConnectorNotAssigned")]
    ConnectorNotAssigned,

    /// A newer item of the same kind replaced this one in the queue.
    #[error("Superseded")]
    Superseded,

    /// The interface shut down before the item was serviced.
    #[error("InterfaceClosed")]
    InterfaceClosed,

    /// Failure reported by the connector.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A payload could not be encoded, or a response could not be parsed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

impl InterfaceError {
    /// Short machine-readable reason callers branch on.
    ///
    /// Connector failures keep the connector's own reason string.
    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidTimeout => "InvalidTimeout",
            Self::SelectingInProgress => "SelectingInProgress",
            Self::ConnectingInProgress => "ConnectingInProgress",
            Self::ConnectorNotAssigned => "ConnectorNotAssigned",
            Self::Superseded => "Superseded",
            Self::InterfaceClosed => "InterfaceClosed",
            Self::Transport(err) => err.reason(),
            Self::Frame(FrameError::DeviceError { .. }) => "DeviceError",
            Self::Frame(FrameError::ResponseMismatch { .. }) => "ResponseMismatch",
            Self::Frame(_) => "FrameError",
        }
    }
}

pub type Result<T> = std::result::Result<T, InterfaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_reasons_match_display() {
        for err in [
            InterfaceError::InvalidTimeout,
            InterfaceError::SelectingInProgress,
            InterfaceError::ConnectingInProgress,
            InterfaceError::ConnectorNotAssigned,
            InterfaceError::Superseded,
            InterfaceError::InterfaceClosed,
        ] {
            assert_eq!(err.to_string(), err.reason());
        }
    }

    #[test]
    fn transport_reason_is_forwarded() {
        let err = InterfaceError::from(TransportError::rejected("UserCanceledSelection"));
        assert_eq!(err.reason(), "UserCanceledSelection");
        assert_eq!(err.to_string(), "UserCanceledSelection");
    }

    #[test]
    fn device_errors_have_their_own_reason() {
        let err = InterfaceError::from(FrameError::DeviceError { flag: 236, code: 3 });
        assert_eq!(err.reason(), "DeviceError");
    }
}
