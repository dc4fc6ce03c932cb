//! Stream subscriptions.
//!
//! [`Subscriptions`] tracks which streams are active on which devices and
//! guarantees at most one handler per stream kind per device. Handlers run
//! on the backend's delivery thread, so anything they share with the caller
//! goes through a lock; [`Observed`] and [`SampleStream`] are the two
//! ready-made hand-offs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, TrySendError};

use crate::backend::{DeviceBackend, SampleSink};
use crate::device::{DeviceHandle, StreamClaims};
use crate::types::{
    DeviceId, GazeData, Notification, StreamKind, StreamSample, TimeSyncData, UserPositionGuide,
};
use crate::{GazeError, Result};

/// Capacity of the channel behind [`Subscriptions::subscribe_channel`].
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A typed view of one stream kind.
pub trait Stream: 'static {
    type Sample: Send + 'static;
    const KIND: StreamKind;

    fn extract(sample: StreamSample) -> Option<Self::Sample>;
}

pub struct GazeStream;
pub struct TimeSyncStream;
pub struct UserPositionStream;
pub struct NotificationStream;

impl Stream for GazeStream {
    type Sample = GazeData;
    const KIND: StreamKind = StreamKind::Gaze;

    fn extract(sample: StreamSample) -> Option<GazeData> {
        match sample {
            StreamSample::Gaze(data) => Some(data),
            _ => None,
        }
    }
}

impl Stream for TimeSyncStream {
    type Sample = TimeSyncData;
    const KIND: StreamKind = StreamKind::TimeSync;

    fn extract(sample: StreamSample) -> Option<TimeSyncData> {
        match sample {
            StreamSample::TimeSync(data) => Some(data),
            _ => None,
        }
    }
}

impl Stream for UserPositionStream {
    type Sample = UserPositionGuide;
    const KIND: StreamKind = StreamKind::UserPositionGuide;

    fn extract(sample: StreamSample) -> Option<UserPositionGuide> {
        match sample {
            StreamSample::UserPositionGuide(data) => Some(data),
            _ => None,
        }
    }
}

impl Stream for NotificationStream {
    type Sample = Notification;
    const KIND: StreamKind = StreamKind::Notifications;

    fn extract(sample: StreamSample) -> Option<Notification> {
        match sample {
            StreamSample::Notification(data) => Some(data),
            _ => None,
        }
    }
}

/// Identity of one active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct ActiveStream {
    device: DeviceId,
    serial: String,
    kind: StreamKind,
    backend: Arc<dyn DeviceBackend>,
    claims: Arc<StreamClaims>,
}

/// Registry of active stream subscriptions.
///
/// Dropping it unsubscribes everything that is still active.
pub struct Subscriptions {
    active: Mutex<HashMap<SubscriptionId, ActiveStream>>,
    next_id: AtomicU64,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribe `handler` to stream `S` on `device`.
    ///
    /// Fails with `AlreadySubscribed` if `S` is already active on the device;
    /// the existing handler is left in place.
    pub fn subscribe<S, F>(&self, device: &DeviceHandle, handler: F) -> Result<SubscriptionId>
    where
        S: Stream,
        F: Fn(S::Sample) + Send + Sync + 'static,
    {
        let sink: SampleSink = Arc::new(move |sample| {
            if let Some(sample) = S::extract(sample) {
                handler(sample);
            }
        });
        self.subscribe_raw(device, S::KIND, sink)
    }

    /// Untyped form of [`Subscriptions::subscribe`].
    ///
    /// The stream kind is claimed on the device handle itself, so two
    /// `Subscriptions` on the same device cannot both hold it.
    pub fn subscribe_raw(
        &self,
        device: &DeviceHandle,
        kind: StreamKind,
        sink: SampleSink,
    ) -> Result<SubscriptionId> {
        let claims = device.stream_claims();
        if !claims.try_claim(kind) {
            return Err(GazeError::AlreadySubscribed {
                kind,
                serial: device.serial_number().to_string(),
            });
        }

        // No local lock across the round trip; the claim reserves the slot.
        if let Err(e) = device.backend().subscribe(device.id(), kind, sink) {
            claims.release(kind);
            return Err(e);
        }

        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(
            id,
            ActiveStream {
                device: device.id(),
                serial: device.serial_number().to_string(),
                kind,
                backend: device.shared_backend(),
                claims,
            },
        );
        log::info!(
            "Subscribed to {} data for eye tracker with serial number {} ({})",
            kind,
            device.serial_number(),
            id
        );
        Ok(id)
    }

    /// Subscribe and get a guard that unsubscribes when dropped.
    pub fn subscribe_scoped<S, F>(
        &self,
        device: &DeviceHandle,
        handler: F,
    ) -> Result<SubscriptionGuard<'_>>
    where
        S: Stream,
        F: Fn(S::Sample) + Send + Sync + 'static,
    {
        let id = self.subscribe::<S, F>(device, handler)?;
        Ok(SubscriptionGuard {
            subscriptions: self,
            id: Some(id),
        })
    }

    /// Subscribe and publish every sample into a shared [`Observed`] cell.
    pub fn subscribe_observed<S>(
        &self,
        device: &DeviceHandle,
    ) -> Result<(SubscriptionId, Arc<Observed<S::Sample>>)>
    where
        S: Stream,
        S::Sample: Clone,
    {
        let observed = Arc::new(Observed::new());
        let cell = observed.clone();
        let id = self.subscribe::<S, _>(device, move |sample| cell.publish(sample))?;
        Ok((id, observed))
    }

    /// Subscribe and receive samples through a bounded channel.
    ///
    /// When the receiver falls behind by `capacity` samples, newer samples
    /// are dropped rather than blocking the delivery thread.
    pub fn subscribe_channel<S: Stream>(
        &self,
        device: &DeviceHandle,
        capacity: usize,
    ) -> Result<(SubscriptionId, SampleStream<S::Sample>)> {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        let kind = S::KIND;
        let id = self.subscribe::<S, _>(device, move |sample| {
            if let Err(e) = sender.try_send(sample) {
                match e {
                    TrySendError::Full(_) => {
                        log::trace!("{} channel full, dropping sample", kind);
                    }
                    TrySendError::Disconnected(_) => {
                        log::trace!("{} receiver gone, dropping sample", kind);
                    }
                }
            }
        })?;
        Ok((id, SampleStream { receiver }))
    }

    /// Stop a subscription. Unknown or already stopped ids succeed without
    /// side effects.
    ///
    /// The subscription is considered inactive locally as soon as this is
    /// called, even if the device then reports a failure.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        // Release the lock before the backend call: it may wait for the
        // delivery thread, whose handler may be waiting on this lock.
        let removed = self.lock().remove(&id);
        let Some(stream) = removed else {
            log::debug!("{} is not active, nothing to unsubscribe", id);
            return Ok(());
        };

        let result = stream.backend.unsubscribe(stream.device, stream.kind);
        // Released only after the device call so a new subscriber cannot
        // race the outgoing one.
        stream.claims.release(stream.kind);

        match result {
            Ok(()) => {
                log::info!(
                    "Unsubscribed from {} data for eye tracker with serial number {}",
                    stream.kind,
                    stream.serial
                );
                Ok(())
            }
            Err(e) => {
                log::warn!(
                    "Failed unsubscribing from {} data on {}: {}",
                    stream.kind,
                    stream.serial,
                    e
                );
                Err(e)
            }
        }
    }

    /// Unsubscribe everything. Every subscription gets an attempt; the first
    /// failure is returned.
    pub fn unsubscribe_all(&self) -> Result<()> {
        let ids: Vec<SubscriptionId> = self.lock().keys().copied().collect();
        let mut first_err = None;
        for id in ids {
            if let Err(e) = self.unsubscribe(id) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn is_active(&self, device: &DeviceHandle, kind: StreamKind) -> bool {
        self.lock()
            .values()
            .any(|s| s.device == device.id() && s.kind == kind)
    }

    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SubscriptionId, ActiveStream>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Subscriptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        if let Err(e) = self.unsubscribe_all() {
            log::warn!("Unsubscribe during teardown failed: {}", e);
        }
    }
}

/// Unsubscribes on drop unless [`SubscriptionGuard::unsubscribe`] was called.
pub struct SubscriptionGuard<'a> {
    subscriptions: &'a Subscriptions,
    id: Option<SubscriptionId>,
}

impl SubscriptionGuard<'_> {
    pub fn id(&self) -> Option<SubscriptionId> {
        self.id
    }

    /// Unsubscribe now and report the result.
    pub fn unsubscribe(mut self) -> Result<()> {
        match self.id.take() {
            Some(id) => self.subscriptions.unsubscribe(id),
            None => Ok(()),
        }
    }
}

impl Drop for SubscriptionGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            if let Err(e) = self.subscriptions.unsubscribe(id) {
                log::warn!("Unsubscribe of {} on scope exit failed: {}", id, e);
            }
        }
    }
}

/// How long and how often [`Observed::wait_until`] re-checks its predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    /// `None` waits until the predicate holds.
    pub timeout: Option<Duration>,
}

impl WaitPolicy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: None,
        }
    }
}

struct Slot<T> {
    latest: Option<T>,
    count: u64,
}

/// Latest-value cell written by a delivery thread and read by the caller.
pub struct Observed<T> {
    slot: Mutex<Slot<T>>,
    updated: Condvar,
}

impl<T: Clone> Observed<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                latest: None,
                count: 0,
            }),
            updated: Condvar::new(),
        }
    }

    pub fn publish(&self, value: T) {
        let mut slot = self.lock();
        slot.latest = Some(value);
        slot.count += 1;
        drop(slot);
        self.updated.notify_all();
    }

    pub fn latest(&self) -> Option<T> {
        self.lock().latest.clone()
    }

    /// Number of values published so far.
    pub fn count(&self) -> u64 {
        self.lock().count
    }

    /// Block until the latest value satisfies `predicate` and return it.
    ///
    /// The predicate is re-evaluated on every publish and at least once per
    /// poll interval. Fails with `Timeout` once `policy.timeout` elapses.
    pub fn wait_until(&self, predicate: impl Fn(&T) -> bool, policy: WaitPolicy) -> Result<T> {
        let deadline = policy.timeout.map(|t| Instant::now() + t);
        let mut slot = self.lock();

        loop {
            if let Some(value) = slot.latest.as_ref() {
                if predicate(value) {
                    return Ok(value.clone());
                }
            }

            let mut wait = policy.poll_interval;
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(GazeError::Timeout);
                }
                wait = wait.min(deadline - now);
            }

            slot = self
                .updated
                .wait_timeout(slot, wait)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Default for Observed<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of [`Subscriptions::subscribe_channel`].
pub struct SampleStream<T> {
    receiver: Receiver<T>,
}

impl<T> SampleStream<T> {
    /// Receive the next sample (blocks until available).
    pub fn recv(&self) -> Result<T> {
        self.receiver.recv().map_err(|_| GazeError::StreamClosed)
    }

    /// Try to receive a sample without blocking.
    pub fn try_recv(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<T> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => GazeError::Timeout,
            RecvTimeoutError::Disconnected => GazeError::StreamClosed,
        })
    }

    /// Samples currently buffered.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
