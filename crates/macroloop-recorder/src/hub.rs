//! Input event fan-out
//!
//! One OS listener publishes into an `InputHub`; every consumer (corner
//! capture, recorder streams, the replay stop listener) holds its own
//! `Subscription`. Dropping a subscription detaches it.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use macroloop_core::{InputEvent, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CAPACITY: usize = 10_000;

/// Anything that can hand out input subscriptions.
pub trait InputSource {
    fn subscribe_with_capacity(&self, capacity: usize) -> Result<Subscription>;

    fn subscribe(&self) -> Result<Subscription> {
        self.subscribe_with_capacity(DEFAULT_CAPACITY)
    }
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    subscribers: Vec<(u64, Sender<InputEvent>)>,
    closed: bool,
}

#[derive(Clone, Default)]
pub struct InputHub {
    inner: Arc<Mutex<HubInner>>,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, capacity: usize) -> Subscription {
        let (tx, rx) = bounded(capacity);
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        // A closed hub hands out subscriptions that are already disconnected.
        if !inner.closed {
            inner.subscribers.push((id, tx));
        }
        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver to every subscriber without blocking. Returns the number of
    /// subscribers that accepted the event.
    pub fn publish(&self, event: InputEvent) -> usize {
        let mut inner = self.inner.lock();
        let mut delivered = 0;
        inner.subscribers.retain(|(id, tx)| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(subscriber = id, "subscriber queue full, event dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
        delivered
    }

    /// Disconnect every subscriber; later subscriptions start disconnected.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl InputSource for InputHub {
    fn subscribe_with_capacity(&self, capacity: usize) -> Result<Subscription> {
        Ok(self.attach(capacity))
    }
}

/// Receiving end of one hub subscription.
pub struct Subscription {
    id: u64,
    rx: Receiver<InputEvent>,
    hub: Weak<Mutex<HubInner>>,
}

impl Subscription {
    /// Blocking receive; `None` once the feed is closed.
    pub fn recv(&self) -> Option<InputEvent> {
        self.rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<InputEvent> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> std::result::Result<InputEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.lock().subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Shared cancellation flag. One writer side (stop key, Ctrl+C), polled by
/// the loop that owns the work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
