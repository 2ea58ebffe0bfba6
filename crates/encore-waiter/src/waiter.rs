use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::error::WaiterError;
use crate::pending::{
    lock_unpoisoned, PendingWait, TimeoutAction, TypedAction, TypedPredicate, WaitState,
};

/// Event emitted by the host when its gateway session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayShutdown;

/// Public struct `WaiterConfig` used across encore components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaiterConfig {
    /// Shut the registry down when a [`GatewayShutdown`] event is dispatched.
    pub shutdown_on_gateway_shutdown: bool,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            shutdown_on_gateway_shutdown: true,
        }
    }
}

/// Snapshot of the registry's lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaiterStats {
    pub registered: u64,
    pub fulfilled: u64,
    pub expired: u64,
    pub cancelled: u64,
    pub predicate_panics: u64,
    pub action_panics: u64,
    pub timeout_panics: u64,
}

#[derive(Debug, Default)]
struct WaiterCounters {
    registered: AtomicU64,
    fulfilled: AtomicU64,
    expired: AtomicU64,
    cancelled: AtomicU64,
    predicate_panics: AtomicU64,
    action_panics: AtomicU64,
    timeout_panics: AtomicU64,
}

impl WaiterCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> WaiterStats {
        WaiterStats {
            registered: self.registered.load(Ordering::Relaxed),
            fulfilled: self.fulfilled.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            predicate_panics: self.predicate_panics.load(Ordering::Relaxed),
            action_panics: self.action_panics.load(Ordering::Relaxed),
            timeout_panics: self.timeout_panics.load(Ordering::Relaxed),
        }
    }
}

/// A one-shot subscription for events of type `T`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use encore_waiter::{EventWaiter, WaitRequest, WaiterConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let waiter = EventWaiter::new(WaiterConfig::default()).expect("inside a runtime");
/// let request = WaitRequest::new(|value: &u32| *value == 3, |value: &u32| println!("got {value}"))
///     .timeout(Duration::from_secs(60))
///     .on_timeout(|| println!("gave up"));
/// let handle = waiter.register(request).expect("register");
/// assert_eq!(waiter.dispatch(&3_u32), 1);
/// assert!(!handle.is_pending());
/// # }
/// ```
pub struct WaitRequest<T> {
    predicate: TypedPredicate<T>,
    action: TypedAction<T>,
    timeout: Option<Duration>,
    on_timeout: Option<TimeoutAction>,
}

impl<T: Any + Send + Sync> WaitRequest<T> {
    pub fn new<P, A>(predicate: P, action: A) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
        A: FnOnce(&T) + Send + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            action: Box::new(action),
            timeout: None,
            on_timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_timeout<F>(mut self, on_timeout: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_timeout = Some(Box::new(on_timeout));
        self
    }
}

/// Result of an async [`EventWaiter::wait_for`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Matched(T),
    TimedOut,
}

#[derive(Debug)]
struct WaiterInner {
    config: WaiterConfig,
    runtime: Handle,
    waits: Mutex<BTreeMap<u64, Arc<PendingWait>>>,
    shut_down: AtomicBool,
    next_id: AtomicU64,
    counters: WaiterCounters,
}

impl WaiterInner {
    fn remove(&self, id: u64) {
        lock_unpoisoned(&self.waits).remove(&id);
    }

    fn expire(&self, wait: &PendingWait) {
        if !wait.claim(WaitState::Expired) {
            return;
        }
        self.remove(wait.id());
        WaiterCounters::bump(&self.counters.expired);
        tracing::debug!(
            wait_id = wait.id(),
            event_type = wait.event_type_name(),
            "wait expired"
        );
        drop(wait.take_action());
        if let Some(on_timeout) = wait.take_on_timeout() {
            if catch_unwind(AssertUnwindSafe(on_timeout)).is_err() {
                WaiterCounters::bump(&self.counters.timeout_panics);
                tracing::warn!(wait_id = wait.id(), "wait timeout callback panicked");
            }
        }
    }
}

/// Registry of one-shot "wake me when" subscriptions.
///
/// The event source calls [`EventWaiter::dispatch`] for every event it
/// produces, from any thread. Each registered wait ends in exactly one of
/// fulfilled (action ran), expired (timeout callback ran) or cancelled
/// (nothing ran). The registry lock is never held while user callbacks run,
/// so actions may register new waits.
#[derive(Debug, Clone)]
pub struct EventWaiter {
    inner: Arc<WaiterInner>,
}

impl EventWaiter {
    /// Creates a waiter whose timeouts run on the current Tokio runtime.
    pub fn new(config: WaiterConfig) -> Result<Self, WaiterError> {
        let runtime = Handle::try_current().map_err(|_| WaiterError::NoRuntime)?;
        Ok(Self::with_handle(config, runtime))
    }

    pub fn with_handle(config: WaiterConfig, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(WaiterInner {
                config,
                runtime,
                waits: Mutex::new(BTreeMap::new()),
                shut_down: AtomicBool::new(false),
                next_id: AtomicU64::new(1),
                counters: WaiterCounters::default(),
            }),
        }
    }

    /// Adds a wait. Rejected once the waiter has been shut down.
    pub fn register<T>(&self, request: WaitRequest<T>) -> Result<WaitHandle, WaiterError>
    where
        T: Any + Send + Sync,
    {
        if request.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(WaiterError::InvalidTimeout);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let wait = Arc::new(PendingWait::new::<T>(
            id,
            request.predicate,
            request.action,
            request.on_timeout,
        ));
        {
            let mut waits = lock_unpoisoned(&self.inner.waits);
            // Checked under the registry lock so shutdown cannot miss this insert.
            if self.inner.shut_down.load(Ordering::SeqCst) {
                return Err(WaiterError::ShutDown);
            }
            waits.insert(id, Arc::clone(&wait));
        }
        WaiterCounters::bump(&self.inner.counters.registered);

        if let Some(timeout) = request.timeout {
            let registry = Arc::downgrade(&self.inner);
            let timed = Arc::clone(&wait);
            let timer = self.inner.runtime.spawn(async move {
                tokio::time::sleep(timeout).await;
                match registry.upgrade() {
                    Some(inner) => inner.expire(&timed),
                    None => {
                        if timed.claim(WaitState::Cancelled) {
                            timed.discard_callbacks();
                        }
                    }
                }
            });
            wait.set_timer(timer);
        }

        tracing::debug!(
            wait_id = id,
            event_type = wait.event_type_name(),
            timeout_ms = request
                .timeout
                .map(|timeout| u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
            "wait registered"
        );
        Ok(WaitHandle {
            wait,
            registry: Arc::downgrade(&self.inner),
        })
    }

    /// Offers `event` to every pending wait registered for its exact type.
    ///
    /// Returns how many waits this call fulfilled. A panicking predicate or
    /// action is logged and skipped; the remaining waits are still offered
    /// the event.
    pub fn dispatch<E>(&self, event: &E) -> usize
    where
        E: Any + Send + Sync,
    {
        let event_type = TypeId::of::<E>();
        if self.inner.config.shutdown_on_gateway_shutdown
            && event_type == TypeId::of::<GatewayShutdown>()
        {
            self.shutdown();
            return 0;
        }
        if self.is_shut_down() {
            return 0;
        }

        let candidates: Vec<Arc<PendingWait>> = lock_unpoisoned(&self.inner.waits)
            .values()
            .filter(|wait| wait.accepts(event_type))
            .cloned()
            .collect();

        let event: &dyn Any = event;
        let mut fulfilled = 0;
        for wait in candidates {
            if wait.state().is_terminal() {
                continue;
            }
            let matched = match catch_unwind(AssertUnwindSafe(|| wait.test(event))) {
                Ok(matched) => matched,
                Err(_) => {
                    WaiterCounters::bump(&self.inner.counters.predicate_panics);
                    tracing::warn!(
                        wait_id = wait.id(),
                        event_type = wait.event_type_name(),
                        "wait predicate panicked"
                    );
                    continue;
                }
            };
            if !matched || !wait.claim(WaitState::Fulfilled) {
                continue;
            }

            self.inner.remove(wait.id());
            wait.cancel_timer();
            WaiterCounters::bump(&self.inner.counters.fulfilled);
            fulfilled += 1;
            tracing::debug!(
                wait_id = wait.id(),
                event_type = wait.event_type_name(),
                "wait fulfilled"
            );

            drop(wait.take_on_timeout());
            if let Some(action) = wait.take_action() {
                if catch_unwind(AssertUnwindSafe(|| action(event))).is_err() {
                    WaiterCounters::bump(&self.inner.counters.action_panics);
                    tracing::warn!(wait_id = wait.id(), "wait action panicked");
                }
            }
        }
        fulfilled
    }

    /// Drops every pending wait without running its callbacks and rejects
    /// later registrations.
    pub fn shutdown(&self) {
        let drained = {
            let mut waits = lock_unpoisoned(&self.inner.waits);
            self.inner.shut_down.store(true, Ordering::SeqCst);
            std::mem::take(&mut *waits)
        };

        let mut dropped = 0_usize;
        for wait in drained.into_values() {
            if wait.claim(WaitState::Cancelled) {
                wait.cancel_timer();
                wait.discard_callbacks();
                WaiterCounters::bump(&self.inner.counters.cancelled);
                dropped += 1;
            }
        }
        tracing::info!(dropped, "event waiter shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::SeqCst)
    }

    pub fn pending_count(&self) -> usize {
        lock_unpoisoned(&self.inner.waits).len()
    }

    pub fn stats(&self) -> WaiterStats {
        self.inner.counters.snapshot()
    }

    /// Registers a wait and suspends until it matches or times out.
    ///
    /// Dropping the returned future cancels the wait. Shutdown or an explicit
    /// cancel resolve it with [`WaiterError::Cancelled`].
    pub async fn wait_for<T, P>(
        &self,
        predicate: P,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome<T>, WaiterError>
    where
        T: Any + Clone + Send + Sync,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.subscribe(predicate, timeout)?.outcome().await
    }

    /// Registers a wait now and hands back its outcome to await later.
    ///
    /// Events dispatched between this call and the first poll of
    /// [`Subscription::outcome`] are already matched against the predicate.
    pub fn subscribe<T, P>(
        &self,
        predicate: P,
        timeout: Option<Duration>,
    ) -> Result<Subscription<T>, WaiterError>
    where
        T: Any + Clone + Send + Sync,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Some(sender)));

        let on_match = Arc::clone(&slot);
        let mut request = WaitRequest::new(predicate, move |event: &T| {
            if let Some(sender) = lock_unpoisoned(&on_match).take() {
                let _ = sender.send(WaitOutcome::Matched(event.clone()));
            }
        });
        match timeout {
            Some(timeout) => {
                request = request.timeout(timeout).on_timeout(move || {
                    if let Some(sender) = lock_unpoisoned(&slot).take() {
                        let _ = sender.send(WaitOutcome::TimedOut);
                    }
                });
            }
            None => drop(slot),
        }

        let handle = self.register(request)?;
        Ok(Subscription {
            receiver,
            registration: CancelOnDrop(handle),
        })
    }
}

/// A registered wait whose outcome has not been collected yet.
///
/// Dropping it cancels the wait.
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: oneshot::Receiver<WaitOutcome<T>>,
    registration: CancelOnDrop,
}

impl<T> Subscription<T> {
    pub async fn outcome(self) -> Result<WaitOutcome<T>, WaiterError> {
        let Self {
            receiver,
            registration: _cancel_on_drop,
        } = self;
        receiver.await.map_err(|_| WaiterError::Cancelled)
    }
}

/// Caller-side view of one registered wait.
#[derive(Debug, Clone)]
pub struct WaitHandle {
    wait: Arc<PendingWait>,
    registry: Weak<WaiterInner>,
}

impl WaitHandle {
    pub fn id(&self) -> u64 {
        self.wait.id()
    }

    pub fn state(&self) -> WaitState {
        self.wait.state()
    }

    pub fn is_pending(&self) -> bool {
        !self.state().is_terminal()
    }

    /// Claims the wait as cancelled so neither callback ever runs.
    ///
    /// Returns false when the wait already matched, expired or was cancelled.
    pub fn cancel(&self) -> bool {
        if !self.wait.claim(WaitState::Cancelled) {
            return false;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.wait.id());
            WaiterCounters::bump(&registry.counters.cancelled);
        }
        self.wait.cancel_timer();
        self.wait.discard_callbacks();
        tracing::debug!(wait_id = self.wait.id(), "wait cancelled");
        true
    }
}

#[derive(Debug)]
struct CancelOnDrop(WaitHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
