//! Change notifications from the studio session to whoever displays it.

mod bus;
mod events;
mod handlers;

pub use bus::{EventBus, SubscriptionId};
pub use events::StudioEvent;
pub use handlers::LoggingEventHandler;

/// Receives every event emitted on the bus it is subscribed to
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &StudioEvent);
}
