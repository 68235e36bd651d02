//! Transport-agnostic connector abstraction.
//!
//! Every concrete transport (Bluetooth, serial, socket bridge, simulator)
//! implements the [`Connector`] capability trait. The dispatcher in
//! `tangle-interface` only ever talks to a `Box<dyn Connector>` and never
//! inspects which transport sits behind it.
//!
//! Connectors report asynchronous side-signals (connection state changes,
//! inbound network bytes, firmware update progress) through the
//! [`SignalSender`] handed to them by [`Connector::attach`].

pub mod criteria;
pub mod error;
pub mod traits;

pub use criteria::{Criteria, Criterion, DeviceAdvertisement};
pub use error::{Result, TransportError};
pub use traits::{
    signal_channel, ConnectInfo, Connector, ConnectorSignal, OtaStatus, SelectionInfo,
    SignalReceiver, SignalSender,
};
