mod bus;
mod events;

pub use bus::EventBus;
pub use events::SceneEvent;

/// Receives scene notifications, e.g. a panel enabling its layer controls
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &SceneEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&SceneEvent) + Send,
{
    fn handle_event(&mut self, event: &SceneEvent) {
        self(event)
    }
}
