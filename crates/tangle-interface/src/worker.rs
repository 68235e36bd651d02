use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tangle_frame::request::encode_request;
use tangle_frame::{RequestKind, TimeTrack};
use tangle_transport::{ConnectInfo, Connector, SignalSender};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{InterfaceError, Result};
use crate::interface::{lock, Shared};
use crate::signals;
use crate::work::{settle, Reply, Work, WorkQueue};

/// The single task that owns the queue and the active connector.
///
/// Items are serviced one at a time; no two connector calls ever overlap.
pub(crate) struct Worker {
    rx: mpsc::UnboundedReceiver<Work>,
    queue: WorkQueue,
    connector: Option<Box<dyn Connector>>,
    shared: Arc<Shared>,
    signals: SignalSender,
    cancel: CancellationToken,
}

impl Worker {
    pub(crate) fn new(
        rx: mpsc::UnboundedReceiver<Work>,
        shared: Arc<Shared>,
        signals: SignalSender,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            rx,
            queue: WorkQueue::default(),
            connector: None,
            shared,
            signals,
            cancel,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            let first = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                work = self.rx.recv() => match work {
                    Some(work) => work,
                    None => break,
                },
            };
            self.queue.push(first);
            coalesce_window(self.shared.config.coalesce_window).await;
            self.absorb();

            while let Some(work) = self.queue.pop() {
                if self.cancel.is_cancelled() {
                    work.reject(InterfaceError::InterfaceClosed);
                    break;
                }
                self.dispatch(work).await;
                self.absorb();
            }
        }

        self.rx.close();
        self.absorb();
        self.queue.clear(InterfaceError::InterfaceClosed);
        debug!("interface worker stopped");
    }

    fn absorb(&mut self) {
        while let Ok(work) = self.rx.try_recv() {
            self.queue.push(work);
        }
    }

    async fn dispatch(&mut self, work: Work) {
        debug!(kind = work.kind(), queued = self.queue.len(), "dispatch");

        match work {
            Work::AssignConnector { connector, reply } => {
                self.assign(connector).await;
                settle(reply, Ok(()));
            }
            Work::DestroyConnector { reply } => {
                self.shared.reconnect.store(false, Ordering::Release);
                let result = match self.connector.take() {
                    Some(mut connector) => teardown(connector.as_mut(), &self.shared).await,
                    None => Err(InterfaceError::ConnectorNotAssigned),
                };
                settle(reply, result);
            }
            work => match self.connector.as_deref_mut() {
                Some(connector) => {
                    service(connector, &self.shared, &mut self.queue, &self.cancel, work).await
                }
                None => {
                    release_in_flight(&self.shared, &work);
                    work.reject(InterfaceError::ConnectorNotAssigned);
                }
            },
        }
    }

    async fn assign(&mut self, mut connector: Box<dyn Connector>) {
        if let Some(mut previous) = self.connector.take() {
            self.shared.reconnect.store(false, Ordering::Release);
            if let Err(err) = teardown(previous.as_mut(), &self.shared).await {
                warn!(reason = err.reason(), kind = previous.kind(), "previous connector teardown failed");
            }
        }
        connector.attach(self.signals.clone());
        info!(kind = connector.kind(), "connector assigned");
        self.connector = Some(connector);
    }
}

/// Give a burst of synchronous enqueues a chance to land before draining.
async fn coalesce_window(window: std::time::Duration) {
    if window.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(window).await;
    }
}

/// Clear the in-flight flag `work` holds, if any.
fn release_in_flight(shared: &Shared, work: &Work) {
    match work {
        Work::Select { .. } | Work::AutoSelect { .. } => {
            shared.selecting.store(false, Ordering::Release)
        }
        Work::Connect { .. } => shared.connecting.store(false, Ordering::Release),
        _ => {}
    }
}

/// Clear `flag`, then settle. The flag drops first so a caller woken by the
/// reply can immediately start another operation of the same kind.
fn finish<T>(flag: &AtomicBool, reply: Reply<T>, result: Result<T>) {
    flag.store(false, Ordering::Release);
    settle(reply, result);
}

async fn service(
    connector: &mut dyn Connector,
    shared: &Shared,
    queue: &mut WorkQueue,
    cancel: &CancellationToken,
    work: Work,
) {
    match work {
        Work::Select {
            criteria,
            timeout,
            reply,
        } => {
            let result = connector.select(&criteria, timeout).await;
            finish(&shared.selecting, reply, result.map_err(Into::into));
        }
        Work::AutoSelect {
            criteria,
            scan_period,
            timeout,
            reply,
        } => {
            let result = connector.auto_select(&criteria, scan_period, timeout).await;
            finish(&shared.selecting, reply, result.map_err(Into::into));
        }
        Work::Selected { reply } => settle(reply, connector.selected().await.map_err(Into::into)),
        Work::Unselect { reply } => settle(reply, connector.unselect().await.map_err(Into::into)),
        Work::Connect {
            timeout,
            legacy,
            reply,
        } => {
            shared.reconnect.store(true, Ordering::Release);
            let result = connect(connector, shared, timeout, legacy).await;
            finish(&shared.connecting, reply, result);
        }
        Work::Connected { reply } => settle(reply, connector.connected().await.map_err(Into::into)),
        Work::Disconnect { reply } => {
            shared.reconnect.store(false, Ordering::Release);
            let state = shared.connection.subscribe();
            send_disconnect_request(connector, shared).await;
            let result = match connector.disconnect().await {
                Ok(()) => wait_disconnected(state, cancel).await,
                Err(err) => Err(err.into()),
            };
            settle(reply, result);
        }
        Work::Deliver { payload, reply } => {
            let result = connector.deliver(&payload).await.map_err(InterfaceError::from);
            if result.is_ok() {
                signals::ingest(shared, &payload);
            }
            settle(reply, result);
        }
        Work::Transmit { payload, reply } => {
            let result = connector.transmit(&payload).await.map_err(InterfaceError::from);
            if result.is_ok() {
                signals::ingest(shared, &payload);
            }
            settle(reply, result);
        }
        Work::Execute { payload, reply, .. } => {
            let mut batch = payload.to_vec();
            let mut replies = vec![reply];
            queue.take_batch(&mut batch, &mut replies, shared.config.chunk_size);
            debug!(items = replies.len(), len = batch.len(), "execute batch");

            let result = connector.deliver(&batch).await.map_err(InterfaceError::from);
            if result.is_ok() {
                signals::ingest(shared, &batch);
            }
            for reply in replies {
                settle(reply, result.clone());
            }
        }
        Work::Request {
            payload,
            expect_response,
            reply,
        } => settle(
            reply,
            connector
                .request(&payload, expect_response)
                .await
                .map_err(Into::into),
        ),
        Work::SetClock { reply } => {
            let clock = shared.clock();
            settle(reply, connector.set_clock(&clock).await.map_err(Into::into));
        }
        Work::UpdateFirmware { firmware, reply } => settle(
            reply,
            connector.update_firmware(&firmware).await.map_err(Into::into),
        ),
        work @ (Work::AssignConnector { .. } | Work::DestroyConnector { .. }) => {
            // lifecycle items swap the connector and never reach a live one
            warn!(kind = work.kind(), "lifecycle item routed to the connector; rejected");
            work.reject(InterfaceError::ConnectorNotAssigned);
        }
    }
}

async fn connect(
    connector: &mut dyn Connector,
    shared: &Shared,
    timeout: std::time::Duration,
    legacy: bool,
) -> Result<ConnectInfo> {
    let info = connector.connect(timeout, legacy).await?;

    if !shared.is_connected() {
        warn!(kind = connector.kind(), "connect finished without a connected signal; raising it");
        signals::on_connected(shared);
    }

    match connector.get_clock().await {
        Ok(clock) => {
            debug!(millis = clock.millis(), "device clock read");
            *lock(&shared.clock) = clock;
        }
        Err(err) => {
            warn!(reason = err.reason(), "device clock unreadable; pushing a fresh clock");
            let clock = TimeTrack::new(0, false);
            *lock(&shared.clock) = clock.clone();
            if let Err(err) = connector.set_clock(&clock).await {
                warn!(reason = err.reason(), "pushing fresh clock failed");
            }
        }
    }

    Ok(info)
}

/// Ask the device to drop the link. Failures are ignored.
async fn send_disconnect_request(connector: &mut dyn Connector, shared: &Shared) {
    let payload = match encode_request(RequestKind::Disconnect, shared.next_request_id(), &[]) {
        Ok(payload) => payload,
        Err(err) => {
            debug!(error = %err, "disconnect request not encoded");
            return;
        }
    };
    if let Err(err) = connector.request(&payload, false).await {
        debug!(reason = err.reason(), "disconnect request failed; ignored");
    }
}

async fn wait_disconnected(mut state: watch::Receiver<bool>, cancel: &CancellationToken) -> Result<()> {
    let wait = async {
        loop {
            let connected = *state.borrow_and_update();
            if !connected || state.changed().await.is_err() {
                break;
            }
        }
    };
    tokio::select! {
        _ = cancel.cancelled() => Err(InterfaceError::InterfaceClosed),
        _ = wait => Ok(()),
    }
}

async fn teardown(connector: &mut dyn Connector, shared: &Shared) -> Result<()> {
    send_disconnect_request(connector, shared).await;
    if let Err(err) = connector.disconnect().await {
        debug!(reason = err.reason(), "disconnect during teardown failed; ignored");
    }
    connector.destroy().await?;
    Ok(())
}
