use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::types::ConsentPreferences;

#[derive(Clone, Debug, PartialEq)]
pub enum ConsentEvent {
    Changed(ConsentPreferences),
    Cleared,
}

type Listener = Rc<dyn Fn(&ConsentEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// In-page publish/subscribe for consent changes.
#[derive(Clone, Default)]
pub struct ConsentBus {
    listeners: Rc<RefCell<Listeners>>,
}

impl ConsentBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ConsentEvent) + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn publish(&self, event: ConsentEvent) {
        // Snapshot first: listeners may subscribe or unsubscribe while running.
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        log::debug!("Publishing {:?} to {} listener(s)", event, snapshot.len());
        for listener in snapshot {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

/// Unsubscribes when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}
