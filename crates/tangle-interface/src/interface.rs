use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tangle_frame::{Event, TimeTrack};
use tangle_transport::{signal_channel, ConnectInfo, Connector, ConnectorSignal, Criteria, SelectionInfo};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::InterfaceConfig;
use crate::error::InterfaceError;
use crate::events::{EventHistory, InterfaceEvent};
use crate::signals::{self, OtaEstimator};
use crate::work::{Pending, Reply, Work};
use crate::worker::Worker;

/// Shortest connect timeout accepted by [`Interface::connect`].
pub const MIN_CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared by the handle, the worker and the signal pump.
pub(crate) struct Shared {
    pub(crate) config: InterfaceConfig,
    pub(crate) selecting: AtomicBool,
    pub(crate) connecting: AtomicBool,
    pub(crate) reconnect: AtomicBool,
    /// Connect guard; flips only on connected/disconnected signals.
    pub(crate) connection: watch::Sender<bool>,
    pub(crate) clock: Mutex<TimeTrack>,
    pub(crate) timeline: Mutex<TimeTrack>,
    pub(crate) history: Mutex<EventHistory>,
    pub(crate) ota: Mutex<OtaEstimator>,
    events: broadcast::Sender<InterfaceEvent>,
    request_id: AtomicU32,
}

impl Shared {
    pub(crate) fn new(config: InterfaceConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (connection, _) = watch::channel(false);
        Self {
            config,
            selecting: AtomicBool::new(false),
            connecting: AtomicBool::new(false),
            reconnect: AtomicBool::new(false),
            connection,
            clock: Mutex::new(TimeTrack::new(0, false)),
            timeline: Mutex::new(TimeTrack::new(0, true)),
            history: Mutex::new(EventHistory::new()),
            ota: Mutex::new(OtaEstimator::default()),
            events,
            request_id: AtomicU32::new(1),
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        *self.connection.borrow()
    }

    pub(crate) fn clock(&self) -> TimeTrack {
        lock(&self.clock).clone()
    }

    pub(crate) fn timeline(&self) -> TimeTrack {
        lock(&self.timeline).clone()
    }

    pub(crate) fn publish(&self, event: InterfaceEvent) {
        trace!(?event, "publish");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub(crate) fn next_request_id(&self) -> u32 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Cloneable enqueue side of the interface.
#[derive(Clone)]
pub(crate) struct Handle {
    queue: mpsc::UnboundedSender<Work>,
    pub(crate) shared: Arc<Shared>,
}

impl Handle {
    pub(crate) fn enqueue<T>(&self, make: impl FnOnce(Reply<T>) -> Work) -> Pending<T> {
        let (reply, pending) = Pending::channel();
        let work = make(reply);
        trace!(kind = work.kind(), "enqueue");
        if let Err(mpsc::error::SendError(work)) = self.queue.send(work) {
            work.reject(InterfaceError::InterfaceClosed);
        }
        pending
    }

    pub(crate) fn connect(&self, timeout: Duration, legacy: bool) -> Pending<ConnectInfo> {
        if timeout < MIN_CONNECT_TIMEOUT {
            return Pending::failed(InterfaceError::InvalidTimeout);
        }
        if self.shared.connecting.swap(true, Ordering::AcqRel) {
            return Pending::failed(InterfaceError::ConnectingInProgress);
        }
        self.enqueue(|reply| Work::Connect {
            timeout,
            legacy,
            reply,
        })
    }

    fn begin_select(&self) -> Result<(), InterfaceError> {
        self.shared.reconnect.store(false, Ordering::Release);
        if self.shared.selecting.swap(true, Ordering::AcqRel) {
            return Err(InterfaceError::SelectingInProgress);
        }
        Ok(())
    }
}

/// Client-side handle to one Tangle controller.
///
/// Every operation is queued and serviced in order by a single worker task
/// that owns the active [`Connector`]. Enqueueing never blocks; each call
/// returns a [`Pending`] that settles once the worker has run the item.
///
/// Must be created inside a Tokio runtime. Dropping the interface stops the
/// worker; items still queued reject with [`InterfaceError::InterfaceClosed`].
pub struct Interface {
    pub(crate) handle: Handle,
    cancel: CancellationToken,
}

impl Interface {
    pub fn new(config: InterfaceConfig) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = signal_channel();
        let shared = Arc::new(Shared::new(config));
        let cancel = CancellationToken::new();
        let handle = Handle {
            queue: queue_tx,
            shared: Arc::clone(&shared),
        };

        let worker = Worker::new(queue_rx, Arc::clone(&shared), signal_tx, cancel.clone());
        tokio::spawn(worker.run());
        tokio::spawn(signals::pump(handle.clone(), signal_rx, cancel.clone()));
        debug!("interface started");

        Self { handle, cancel }
    }

    pub fn config(&self) -> &InterfaceConfig {
        &self.handle.shared.config
    }

    /// Replace the active connector, tearing the previous one down first.
    pub fn assign_connector(&self, connector: Box<dyn Connector>) -> Pending<()> {
        self.handle
            .enqueue(|reply| Work::AssignConnector { connector, reply })
    }

    /// Let the connector prompt for a device matching `criteria`.
    ///
    /// Disables automatic reconnection. Fails with
    /// [`InterfaceError::SelectingInProgress`] while another selection is
    /// queued or running.
    pub fn select(&self, criteria: impl Into<Criteria>, timeout: Duration) -> Pending<Option<SelectionInfo>> {
        if let Err(err) = self.handle.begin_select() {
            return Pending::failed(err);
        }
        let criteria = criteria.into();
        self.handle.enqueue(|reply| Work::Select {
            criteria,
            timeout,
            reply,
        })
    }

    /// Scan for `scan_period` and pick a device matching `criteria`.
    pub fn auto_select(
        &self,
        criteria: impl Into<Criteria>,
        scan_period: Duration,
        timeout: Duration,
    ) -> Pending<Option<SelectionInfo>> {
        if let Err(err) = self.handle.begin_select() {
            return Pending::failed(err);
        }
        let criteria = criteria.into();
        self.handle.enqueue(|reply| Work::AutoSelect {
            criteria,
            scan_period,
            timeout,
            reply,
        })
    }

    pub fn selected(&self) -> Pending<Option<SelectionInfo>> {
        self.handle.enqueue(|reply| Work::Selected { reply })
    }

    pub fn unselect(&self) -> Pending<()> {
        self.handle.enqueue(|reply| Work::Unselect { reply })
    }

    /// Connect to the selected device.
    ///
    /// `timeout` below [`MIN_CONNECT_TIMEOUT`] is rejected immediately. On
    /// success automatic reconnection is enabled and the device clock is
    /// read; an unreadable clock is replaced with a fresh one.
    pub fn connect(&self, timeout: Duration, legacy: bool) -> Pending<ConnectInfo> {
        self.handle.connect(timeout, legacy)
    }

    pub fn connected(&self) -> Pending<Option<ConnectInfo>> {
        self.handle.enqueue(|reply| Work::Connected { reply })
    }

    /// Disconnect and resolve only after the link reports it is down.
    pub fn disconnect(&self) -> Pending<()> {
        self.handle.shared.reconnect.store(false, Ordering::Release);
        self.handle.enqueue(|reply| Work::Disconnect { reply })
    }

    /// Reliably send network bytes. Sent bytes are echoed into the local
    /// event stream.
    pub fn deliver(&self, payload: impl Into<Bytes>) -> Pending<()> {
        let payload = payload.into();
        self.handle.enqueue(|reply| Work::Deliver { payload, reply })
    }

    /// Best-effort send of network bytes, echoed like [`deliver`](Self::deliver).
    pub fn transmit(&self, payload: impl Into<Bytes>) -> Pending<()> {
        let payload = payload.into();
        self.handle.enqueue(|reply| Work::Transmit { payload, reply })
    }

    /// Queue network bytes for batched delivery.
    ///
    /// A `label` makes the item replace any still-queued execute with the
    /// same label; the replaced item resolves successfully without being sent.
    pub fn execute(&self, payload: impl Into<Bytes>, label: Option<&str>) -> Pending<()> {
        let payload = payload.into();
        let label = label.map(str::to_string);
        self.handle.enqueue(|reply| Work::Execute {
            payload,
            label,
            reply,
        })
    }

    /// Send a device-directed request; resolves with the raw response.
    pub fn request(&self, payload: impl Into<Bytes>, expect_response: bool) -> Pending<Bytes> {
        let payload = payload.into();
        self.handle.enqueue(|reply| Work::Request {
            payload,
            expect_response,
            reply,
        })
    }

    /// Push the interface clock to the device.
    pub fn set_clock(&self) -> Pending<()> {
        self.handle.enqueue(|reply| Work::SetClock { reply })
    }

    /// Stream a firmware image. Progress arrives as `Ota*` events.
    pub fn update_firmware(&self, firmware: impl Into<Bytes>) -> Pending<()> {
        let firmware = firmware.into();
        self.handle
            .enqueue(|reply| Work::UpdateFirmware { firmware, reply })
    }

    /// Disconnect and release the active connector.
    pub fn destroy_connector(&self) -> Pending<()> {
        self.handle.enqueue(|reply| Work::DestroyConnector { reply })
    }

    /// Whether the connect guard is up.
    pub fn is_connected(&self) -> bool {
        self.handle.shared.is_connected()
    }

    /// Snapshot of the controller clock.
    pub fn clock(&self) -> TimeTrack {
        self.handle.shared.clock()
    }

    /// Snapshot of the show timeline.
    pub fn timeline(&self) -> TimeTrack {
        self.handle.shared.timeline()
    }

    /// Run `f` against the show timeline.
    pub fn with_timeline<R>(&self, f: impl FnOnce(&mut TimeTrack) -> R) -> R {
        f(&mut lock(&self.handle.shared.timeline))
    }

    /// Copy of the last-event cache.
    pub fn history(&self) -> Vec<Event> {
        lock(&self.handle.shared.history).iter().cloned().collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InterfaceEvent> {
        self.handle.shared.events.subscribe()
    }

    /// Process a connector side-signal immediately.
    pub fn dispatch_signal(&self, signal: ConnectorSignal) {
        signals::handle_signal(&self.handle, &self.cancel, signal);
    }

    /// Stop the worker and the signal pump.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Interface {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interface")
            .field("connected", &self.is_connected())
            .field("config", self.config())
            .finish()
    }
}
