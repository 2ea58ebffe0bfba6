//! One-shot, predicate-based event waiting.
//!
//! Components register "wake me when an event of type `T` satisfies this
//! predicate", optionally with a timeout. The host event source feeds every
//! event through [`EventWaiter::dispatch`]. A per-wait atomic claim decides
//! whether the match path, the timeout path, an explicit cancel, or shutdown
//! owns the wait, so exactly one outcome happens exactly once.

mod error;
mod pending;
mod waiter;

pub use error::WaiterError;
pub use pending::{lock_unpoisoned, WaitState};
pub use waiter::{
    EventWaiter, GatewayShutdown, Subscription, WaitHandle, WaitOutcome, WaitRequest, WaiterConfig,
    WaiterStats,
};
