mod bus;
mod events;

pub use bus::{BusEvent, EventBus};
pub use events::*;

/// Callback returned by subscriptions; calling it removes the subscription
pub type Unsubscribe = Box<dyn FnOnce()>;
