use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::task::JoinHandle;

/// Lifecycle of one registered wait. Every wait ends in exactly one
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Pending,
    Fulfilled,
    Expired,
    Cancelled,
}

impl WaitState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Fulfilled => 1,
            Self::Expired => 2,
            Self::Cancelled => 3,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Fulfilled,
            2 => Self::Expired,
            3 => Self::Cancelled,
            _ => Self::Pending,
        }
    }
}

pub(crate) type TypedPredicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
pub(crate) type TypedAction<T> = Box<dyn FnOnce(&T) + Send>;
pub(crate) type TimeoutAction = Box<dyn FnOnce() + Send>;

type ErasedPredicate = Box<dyn Fn(&dyn Any) -> bool + Send + Sync>;
type ErasedAction = Box<dyn FnOnce(&dyn Any) + Send>;

/// One outstanding subscription with its type-erased callbacks.
///
/// `state` is the claim: only the caller whose compare-exchange moves it out
/// of `Pending` may run a callback or drop them.
pub(crate) struct PendingWait {
    id: u64,
    event_type: TypeId,
    event_type_name: &'static str,
    predicate: ErasedPredicate,
    action: Mutex<Option<ErasedAction>>,
    on_timeout: Mutex<Option<TimeoutAction>>,
    state: AtomicU8,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl PendingWait {
    pub(crate) fn new<T: Any>(
        id: u64,
        predicate: TypedPredicate<T>,
        action: TypedAction<T>,
        on_timeout: Option<TimeoutAction>,
    ) -> Self {
        let predicate: ErasedPredicate = Box::new(move |event: &dyn Any| {
            event
                .downcast_ref::<T>()
                .is_some_and(|event| predicate(event))
        });
        let action: ErasedAction = Box::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<T>() {
                action(event);
            }
        });
        Self {
            id,
            event_type: TypeId::of::<T>(),
            event_type_name: std::any::type_name::<T>(),
            predicate,
            action: Mutex::new(Some(action)),
            on_timeout: Mutex::new(on_timeout),
            state: AtomicU8::new(WaitState::Pending.to_u8()),
            timer: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn event_type_name(&self) -> &'static str {
        self.event_type_name
    }

    pub(crate) fn accepts(&self, event_type: TypeId) -> bool {
        self.event_type == event_type
    }

    pub(crate) fn state(&self) -> WaitState {
        WaitState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn test(&self, event: &dyn Any) -> bool {
        (self.predicate)(event)
    }

    /// Moves the wait from `Pending` to `outcome`; false when another path won.
    pub(crate) fn claim(&self, outcome: WaitState) -> bool {
        self.state
            .compare_exchange(
                WaitState::Pending.to_u8(),
                outcome.to_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    pub(crate) fn take_action(&self) -> Option<ErasedAction> {
        lock_unpoisoned(&self.action).take()
    }

    pub(crate) fn take_on_timeout(&self) -> Option<TimeoutAction> {
        lock_unpoisoned(&self.on_timeout).take()
    }

    /// Drops both callbacks without running them.
    pub(crate) fn discard_callbacks(&self) {
        drop(self.take_action());
        drop(self.take_on_timeout());
    }

    pub(crate) fn set_timer(&self, timer: JoinHandle<()>) {
        *lock_unpoisoned(&self.timer) = Some(timer);
        // A match or shutdown may have claimed the wait before the handle landed.
        if self.state().is_terminal() {
            self.cancel_timer();
        }
    }

    pub(crate) fn cancel_timer(&self) {
        if let Some(timer) = lock_unpoisoned(&self.timer).take() {
            timer.abort();
        }
    }
}

impl fmt::Debug for PendingWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWait")
            .field("id", &self.id)
            .field("event_type", &self.event_type_name)
            .field("state", &self.state())
            .finish()
    }
}

/// Locks `mutex`, recovering the guard if a previous holder panicked.
pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
