//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. They are notifications: clients learn ids and results
//! without polling, but the registry remains the source of truth.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{LifecycleEvent, ResolutionEvent};
