//! Command queue and dispatcher for a Tangle controller.
//!
//! An [`Interface`] turns application calls into queued work items and
//! services them one at a time on a single worker task that owns the active
//! [`Connector`](tangle_transport::Connector). Connector side-signals drive
//! the connect guard, automatic reconnection and the network decode loop;
//! results reach the application through [`Interface::subscribe`].
//!
//! Ordering is strict FIFO with two exceptions: a labelled `execute`
//! replaces a still-queued `execute` with the same label, and consecutive
//! `execute` items are merged into one delivery up to
//! [`InterfaceConfig::chunk_size`] bytes.

pub mod config;
pub mod error;
pub mod events;
mod intents;
pub mod interface;
mod signals;
mod work;
mod worker;

pub use config::InterfaceConfig;
pub use error::{InterfaceError, Result};
pub use events::{EventHistory, InterfaceEvent};
pub use intents::TIMELINE_LABEL;
pub use interface::{Interface, MIN_CONNECT_TIMEOUT};
pub use work::Pending;
