//! Disambiguation menus built on the finder and the event waiter.
//!
//! A lookup that yields several candidates is rendered as a short numbered
//! [`SelectionMenu`]; [`begin_choice`] registers the reply wait before the menu
//! is shown, and [`PendingChoice::resolve`] then parks until the
//! requesting author answers in the same channel, cancels, or runs out of time.

mod events;
mod guard;
mod menu;
mod prompt;
mod resolution;
mod selection;

pub use events::MessageReceived;
pub use guard::{FlowGuard, FlowPermit};
pub use menu::{SelectionMenu, DEFAULT_MAX_MENU_OPTIONS};
pub use prompt::{begin_choice, choose_one, Choice, MenuError, PendingChoice, SelectionRequest};
pub use resolution::Resolution;
pub use selection::{parse_selection, Selection, CANCEL_KEYWORD};
