//! Notifications for geometry created by the tools.

use std::sync::mpsc;

use jointbox_scene::EntityId;

/// Something observers of the scene may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryEvent {
    /// A tool committed a new group.
    Finalized {
        /// The new group.
        group: EntityId,
        /// Its name.
        name: String,
        /// Its description (the creating tool).
        description: String,
    },
}

/// Receiver of [`GeometryEvent`]s.
pub trait EventSink {
    /// Deliver one event.
    fn emit(&mut self, event: GeometryEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GeometryEvent) {}
}

impl EventSink for Vec<GeometryEvent> {
    fn emit(&mut self, event: GeometryEvent) {
        self.push(event);
    }
}

impl EventSink for mpsc::Sender<GeometryEvent> {
    fn emit(&mut self, event: GeometryEvent) {
        if self.send(event).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn event() -> GeometryEvent {
        let mut arena: SlotMap<EntityId, ()> = SlotMap::with_key();
        GeometryEvent::Finalized {
            group: arena.insert(()),
            name: "Joint".into(),
            description: "Labeled Joint".into(),
        }
    }

    #[test]
    fn test_channel_sink() {
        let (mut tx, rx) = mpsc::channel();
        tx.emit(event());
        assert_eq!(rx.try_recv(), Ok(event()));
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (mut tx, rx) = mpsc::channel();
        drop(rx);
        tx.emit(event());
    }
}
