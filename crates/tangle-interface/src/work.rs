//! Queued work items and the queue that orders them.
//!
//! Every public interface operation becomes one [`Work`] value carrying its
//! operands and a one-shot reply channel. The caller keeps the receiving end
//! wrapped in a [`Pending`] future.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use tangle_transport::{ConnectInfo, Connector, Criteria, SelectionInfo};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{InterfaceError, Result};

pub(crate) type Reply<T> = oneshot::Sender<Result<T>>;

/// One queued operation.
pub(crate) enum Work {
    AssignConnector {
        connector: Box<dyn Connector>,
        reply: Reply<()>,
    },
    Select {
        criteria: Criteria,
        timeout: Duration,
        reply: Reply<Option<SelectionInfo>>,
    },
    AutoSelect {
        criteria: Criteria,
        scan_period: Duration,
        timeout: Duration,
        reply: Reply<Option<SelectionInfo>>,
    },
    Selected {
        reply: Reply<Option<SelectionInfo>>,
    },
    Unselect {
        reply: Reply<()>,
    },
    Connect {
        timeout: Duration,
        legacy: bool,
        reply: Reply<ConnectInfo>,
    },
    Connected {
        reply: Reply<Option<ConnectInfo>>,
    },
    Disconnect {
        reply: Reply<()>,
    },
    Deliver {
        payload: Bytes,
        reply: Reply<()>,
    },
    Transmit {
        payload: Bytes,
        reply: Reply<()>,
    },
    Execute {
        payload: Bytes,
        label: Option<String>,
        reply: Reply<()>,
    },
    Request {
        payload: Bytes,
        expect_response: bool,
        reply: Reply<Bytes>,
    },
    SetClock {
        reply: Reply<()>,
    },
    UpdateFirmware {
        firmware: Bytes,
        reply: Reply<()>,
    },
    DestroyConnector {
        reply: Reply<()>,
    },
}

impl Work {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::AssignConnector { .. } => "assign_connector",
            Self::Select { .. } => "select",
            Self::AutoSelect { .. } => "auto_select",
            Self::Selected { .. } => "selected",
            Self::Unselect { .. } => "unselect",
            Self::Connect { .. } => "connect",
            Self::Connected { .. } => "connected",
            Self::Disconnect { .. } => "disconnect",
            Self::Deliver { .. } => "deliver",
            Self::Transmit { .. } => "transmit",
            Self::Execute { .. } => "execute",
            Self::Request { .. } => "request",
            Self::SetClock { .. } => "set_clock",
            Self::UpdateFirmware { .. } => "update_firmware",
            Self::DestroyConnector { .. } => "destroy_connector",
        }
    }

    /// Settle the item with `err` without running it.
    pub(crate) fn reject(self, err: InterfaceError) {
        match self {
            Self::AssignConnector { reply, .. }
            | Self::Unselect { reply }
            | Self::Disconnect { reply }
            | Self::Deliver { reply, .. }
            | Self::Transmit { reply, .. }
            | Self::Execute { reply, .. }
            | Self::SetClock { reply }
            | Self::UpdateFirmware { reply, .. }
            | Self::DestroyConnector { reply } => settle(reply, Err(err)),
            Self::Select { reply, .. } | Self::AutoSelect { reply, .. } | Self::Selected { reply } => {
                settle(reply, Err(err))
            }
            Self::Connect { reply, .. } => settle(reply, Err(err)),
            Self::Connected { reply } => settle(reply, Err(err)),
            Self::Request { reply, .. } => settle(reply, Err(err)),
        }
    }
}

/// Send `result` to the caller. A caller that stopped waiting is not an error.
pub(crate) fn settle<T>(reply: Reply<T>, result: Result<T>) {
    let _ = reply.send(result);
}

/// FIFO of work items with the queue's two replacement rules.
///
/// * An execute item with a coalescing label replaces any queued execute
///   with the same label; the replaced item resolves successfully.
/// * At most one set-clock and one destroy-connector item are queued; an
///   older duplicate is rejected with [`InterfaceError::Superseded`].
#[derive(Default)]
pub(crate) struct WorkQueue {
    items: VecDeque<Work>,
}

impl WorkQueue {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn push(&mut self, work: Work) {
        match &work {
            Work::Execute {
                label: Some(label), ..
            } => {
                let label = label.clone();
                self.remove_where(
                    |queued| matches!(queued, Work::Execute { label: Some(l), .. } if *l == label),
                    |replaced| {
                        debug!(label = %label, "execute coalesced");
                        if let Work::Execute { reply, .. } = replaced {
                            settle(reply, Ok(()));
                        }
                    },
                );
            }
            Work::SetClock { .. } => self.remove_where(
                |queued| matches!(queued, Work::SetClock { .. }),
                |replaced| replaced.reject(InterfaceError::Superseded),
            ),
            Work::DestroyConnector { .. } => self.remove_where(
                |queued| matches!(queued, Work::DestroyConnector { .. }),
                |replaced| replaced.reject(InterfaceError::Superseded),
            ),
            _ => {}
        }
        self.items.push_back(work);
    }

    pub(crate) fn pop(&mut self) -> Option<Work> {
        self.items.pop_front()
    }

    /// Pop queued execute items and append their payloads to `batch` while
    /// the total stays within `ceiling`. Stops at the first item that is not
    /// an execute or would not fit; that item stays at the front.
    pub(crate) fn take_batch(
        &mut self,
        batch: &mut Vec<u8>,
        replies: &mut Vec<Reply<()>>,
        ceiling: usize,
    ) {
        while let Some(Work::Execute { payload, .. }) = self.items.front() {
            if batch.len() + payload.len() > ceiling {
                break;
            }
            let Some(Work::Execute { payload, reply, .. }) = self.items.pop_front() else {
                break;
            };
            batch.extend_from_slice(&payload);
            replies.push(reply);
        }
    }

    /// Reject and drop every queued item.
    pub(crate) fn clear(&mut self, err: InterfaceError) {
        for work in self.items.drain(..) {
            work.reject(err.clone());
        }
    }

    fn remove_where(&mut self, matches: impl Fn(&Work) -> bool, mut on_removed: impl FnMut(Work)) {
        let mut kept = VecDeque::with_capacity(self.items.len());
        for work in self.items.drain(..) {
            if matches(&work) {
                on_removed(work);
            } else {
                kept.push_back(work);
            }
        }
        self.items = kept;
    }
}

/// Future resolving with the outcome of one queued operation.
///
/// Dropping it does not cancel the operation; the worker still services the
/// item and discards the result.
#[must_use = "the operation is queued either way; await the Pending to observe its outcome"]
pub struct Pending<T> {
    state: PendingState<T>,
}

enum PendingState<T> {
    Waiting(oneshot::Receiver<Result<T>>),
    Failed(Option<InterfaceError>),
}

impl<T> Pending<T> {
    pub(crate) fn channel() -> (Reply<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                state: PendingState::Waiting(rx),
            },
        )
    }

    /// A future that is already rejected with `err`.
    pub(crate) fn failed(err: InterfaceError) -> Self {
        Self {
            state: PendingState::Failed(Some(err)),
        }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            PendingState::Waiting(rx) => Pin::new(rx)
                .poll(cx)
                .map(|received| received.unwrap_or(Err(InterfaceError::InterfaceClosed))),
            PendingState::Failed(err) => {
                Poll::Ready(Err(err.take().unwrap_or(InterfaceError::InterfaceClosed)))
            }
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            PendingState::Waiting(_) => "waiting",
            PendingState::Failed(_) => "failed",
        };
        f.debug_struct("Pending").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execute(payload: &'static [u8], label: Option<&str>) -> (Work, Pending<()>) {
        let (reply, pending) = Pending::channel();
        (
            Work::Execute {
                payload: Bytes::from_static(payload),
                label: label.map(str::to_string),
                reply,
            },
            pending,
        )
    }

    fn payload_of(work: &Work) -> &[u8] {
        match work {
            Work::Execute { payload, .. } => payload,
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn same_label_replaces_and_resolves_predecessor() {
        let mut queue = WorkQueue::default();
        let (first, first_pending) = execute(b"one", Some("X"));
        let (second, _second_pending) = execute(b"two", Some("X"));
        queue.push(first);
        queue.push(second);

        assert_eq!(queue.len(), 1);
        assert!(first_pending.await.is_ok());
        assert_eq!(payload_of(&queue.pop().unwrap()), b"two");
    }

    #[test]
    fn unlabelled_and_distinct_labels_are_kept() {
        let mut queue = WorkQueue::default();
        queue.push(execute(b"a", None).0);
        queue.push(execute(b"b", None).0);
        queue.push(execute(b"c", Some("X")).0);
        queue.push(execute(b"d", Some("Y")).0);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn replacement_moves_item_to_the_back() {
        let mut queue = WorkQueue::default();
        queue.push(execute(b"x1", Some("X")).0);
        queue.push(execute(b"plain", None).0);
        queue.push(execute(b"x2", Some("X")).0);
        assert_eq!(payload_of(&queue.pop().unwrap()), b"plain");
        assert_eq!(payload_of(&queue.pop().unwrap()), b"x2");
    }

    #[tokio::test]
    async fn duplicate_set_clock_is_superseded() {
        let mut queue = WorkQueue::default();
        let (reply, older) = Pending::<()>::channel();
        queue.push(Work::SetClock { reply });
        let (reply, _newer) = Pending::<()>::channel();
        queue.push(Work::SetClock { reply });

        assert_eq!(queue.len(), 1);
        assert!(matches!(older.await, Err(InterfaceError::Superseded)));
    }

    #[test]
    fn batch_stops_at_ceiling_and_non_execute() {
        let mut queue = WorkQueue::default();
        queue.push(execute(b"bbb", None).0);
        queue.push(execute(b"cccc", None).0);
        let (reply, _pending) = Pending::<()>::channel();
        queue.push(Work::Unselect { reply });

        let mut batch = b"aaa".to_vec();
        let mut replies = Vec::new();
        queue.take_batch(&mut batch, &mut replies, 8);
        assert_eq!(batch, b"aaabbb");
        assert_eq!(replies.len(), 1);
        assert_eq!(payload_of(&queue.pop().unwrap()), b"cccc");

        let mut batch = b"cccc".to_vec();
        queue.take_batch(&mut batch, &mut replies, 64);
        assert_eq!(batch, b"cccc");
        assert_eq!(queue.pop().unwrap().kind(), "unselect");
    }

    #[tokio::test]
    async fn dropped_reply_means_closed() {
        let (reply, pending) = Pending::<u8>::channel();
        drop(reply);
        assert!(matches!(pending.await, Err(InterfaceError::InterfaceClosed)));
    }

    #[tokio::test]
    async fn failed_pending_resolves_immediately() {
        let pending = Pending::<()>::failed(InterfaceError::InvalidTimeout);
        assert!(matches!(pending.await, Err(InterfaceError::InvalidTimeout)));
    }
}
