//! Editor notifications and their fan-out to subscribers

use crossbeam_channel::{Receiver, Sender};

use crate::domain::Rect;

/// Notifications published by the capture editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// The gesture crossed the drag threshold
    StartDragging(Rect),
    /// Selection after a processed drag move
    Dragging(Rect),
    EndDragging,
    /// Press and release without crossing the threshold
    EndMoving,
    /// Hover state changed
    Moving,
    Reset,
    PointerReleased,
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&EditorEvent)>;

/// Synchronous fan-out to callbacks and channel receivers
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
    channels: Vec<Sender<EditorEvent>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("callbacks", &self.callbacks.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl EventBus {
    pub fn subscribe(&mut self, callback: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if the id was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    /// Unbounded receiver of every future event. Dropped receivers are pruned.
    pub fn channel(&mut self) -> Receiver<EditorEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.channels.push(tx);
        rx
    }

    pub fn emit(&mut self, event: EditorEvent) {
        log::trace!("editor event {:?}", event);
        for (_, callback) in &mut self.callbacks {
            callback(&event);
        }
        self.channels.retain(|tx| tx.send(event).is_ok());
    }
}
