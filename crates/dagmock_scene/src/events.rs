// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session change notifications.
//!
//! Subscribers register a callback for one [`EventKind`] and are invoked
//! synchronously, in subscription order, before the mutating session call
//! returns. The observer list is shared through an [`Rc`] so a callback may
//! keep a handle to it; emitting from inside a callback is a no-op.

use crate::connection::Connection;
use crate::node::NodeId;
use crate::port::PortId;
use indexmap::IndexSet;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Event categories a subscriber can listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A node was created
    NodeAdded,
    /// A node was removed
    NodeRemoved,
    /// A port was created
    PortAdded,
    /// A port was removed
    PortRemoved,
    /// Two ports were connected
    ConnectionAdded,
    /// Two ports were disconnected
    ConnectionRemoved,
}

/// A change to the session. Paths are captured when the event is emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A node was created
    NodeAdded {
        /// The new node
        node: NodeId,
        /// Its dag path
        path: String,
    },
    /// A node is being removed; its ports are already gone
    NodeRemoved {
        /// The removed node
        node: NodeId,
        /// Its last dag path
        path: String,
    },
    /// A port was created
    PortAdded {
        /// The new port
        port: PortId,
        /// Owning node
        node: NodeId,
        /// Port path
        path: String,
    },
    /// A port is being removed; its connections are already gone
    PortRemoved {
        /// The removed port
        port: PortId,
        /// Owning node
        node: NodeId,
        /// Last port path
        path: String,
    },
    /// Two ports were connected
    ConnectionAdded {
        /// The new connection
        connection: Connection,
        /// Source port path
        src: String,
        /// Destination port path
        dst: String,
    },
    /// Two ports are being disconnected
    ConnectionRemoved {
        /// The removed connection
        connection: Connection,
        /// Source port path
        src: String,
        /// Destination port path
        dst: String,
    },
}

impl SessionEvent {
    /// Category of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NodeAdded { .. } => EventKind::NodeAdded,
            Self::NodeRemoved { .. } => EventKind::NodeRemoved,
            Self::PortAdded { .. } => EventKind::PortAdded,
            Self::PortRemoved { .. } => EventKind::PortRemoved,
            Self::ConnectionAdded { .. } => EventKind::ConnectionAdded,
            Self::ConnectionRemoved { .. } => EventKind::ConnectionRemoved,
        }
    }
}

/// Handle returned by [`Observers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&SessionEvent)>;

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    callback: Callback,
}

/// Per-session observer list
#[derive(Default)]
pub struct Observers {
    subscribers: RefCell<Vec<Subscriber>>,
    // Subscriptions made while the list is being dispatched
    pending: RefCell<Vec<Subscriber>>,
    blocked: RefCell<IndexSet<EventKind>>,
    emitting: Cell<bool>,
    next_id: Cell<u64>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.len())
            .field("blocked", &self.blocked.borrow())
            .field("emitting", &self.emitting.get())
            .finish()
    }
}

impl Observers {
    /// Create an empty observer list
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Register a callback for one kind of event
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl FnMut(&SessionEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let subscriber = Subscriber {
            id,
            kind,
            callback: Box::new(callback),
        };
        match self.subscribers.try_borrow_mut() {
            Ok(mut subscribers) => subscribers.push(subscriber),
            Err(_) => self.pending.borrow_mut().push(subscriber),
        }
        id
    }

    /// Drop a subscription. Returns false if it was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut pending = self.pending.borrow_mut();
        if let Some(index) = pending.iter().position(|s| s.id == id) {
            pending.remove(index);
            return true;
        }
        match self.subscribers.try_borrow_mut() {
            Ok(mut subscribers) => {
                let before = subscribers.len();
                subscribers.retain(|s| s.id != id);
                subscribers.len() != before
            }
            Err(_) => {
                tracing::warn!("Cannot unsubscribe {:?} while dispatching", id);
                false
            }
        }
    }

    /// Suppress or resume delivery of one kind of event
    pub fn block(&self, kind: EventKind, blocked: bool) {
        let mut set = self.blocked.borrow_mut();
        if blocked {
            set.insert(kind);
        } else {
            set.shift_remove(&kind);
        }
    }

    /// Whether a kind of event is currently suppressed
    pub fn is_blocked(&self, kind: EventKind) -> bool {
        self.blocked.borrow().contains(&kind)
    }

    /// Whether a dispatch is in progress
    pub fn is_emitting(&self) -> bool {
        self.emitting.get()
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        let pending = self.pending.borrow().len();
        match self.subscribers.try_borrow() {
            Ok(subscribers) => subscribers.len() + pending,
            Err(_) => pending,
        }
    }

    /// Whether nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an event of this kind would reach anyone
    pub fn wants(&self, kind: EventKind) -> bool {
        if self.emitting.get() || self.is_blocked(kind) {
            return false;
        }
        self.subscribers
            .try_borrow()
            .is_ok_and(|subscribers| subscribers.iter().any(|s| s.kind == kind))
    }

    /// Deliver an event to every subscriber of its kind
    pub fn emit(&self, event: &SessionEvent) {
        let kind = event.kind();
        if self.is_blocked(kind) {
            return;
        }
        if self.emitting.get() {
            tracing::trace!("Suppressed nested {:?} emission", kind);
            return;
        }
        let Ok(mut subscribers) = self.subscribers.try_borrow_mut() else {
            return;
        };

        self.emitting.set(true);
        for subscriber in subscribers.iter_mut().filter(|s| s.kind == kind) {
            (subscriber.callback)(event);
        }
        subscribers.append(&mut self.pending.borrow_mut());
        self.emitting.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_added() -> SessionEvent {
        SessionEvent::NodeAdded {
            node: NodeId::new(),
            path: "|A".to_string(),
        }
    }

    #[test]
    fn test_callbacks_filtered_by_kind() {
        let observers = Observers::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        observers.subscribe(EventKind::NodeAdded, move |event| {
            sink.borrow_mut().push(event.kind());
        });
        let sink = Rc::clone(&seen);
        observers.subscribe(EventKind::NodeRemoved, move |event| {
            sink.borrow_mut().push(event.kind());
        });

        observers.emit(&node_added());
        assert_eq!(*seen.borrow(), vec![EventKind::NodeAdded]);
        assert!(observers.wants(EventKind::NodeAdded));
        assert!(!observers.wants(EventKind::PortAdded));
    }

    #[test]
    fn test_unsubscribe_and_block() {
        let observers = Observers::new();
        let count = Rc::new(Cell::new(0));

        let counter = Rc::clone(&count);
        let id = observers.subscribe(EventKind::NodeAdded, move |_| {
            counter.set(counter.get() + 1);
        });

        observers.block(EventKind::NodeAdded, true);
        assert!(observers.is_blocked(EventKind::NodeAdded));
        observers.emit(&node_added());
        assert_eq!(count.get(), 0);

        observers.block(EventKind::NodeAdded, false);
        observers.emit(&node_added());
        assert_eq!(count.get(), 1);

        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.emit(&node_added());
        assert_eq!(count.get(), 1);
        assert!(observers.is_empty());
    }

    #[test]
    fn test_nested_emission_is_suppressed() {
        let observers = Observers::new();
        let count = Rc::new(Cell::new(0));

        let handle = Rc::clone(&observers);
        let counter = Rc::clone(&count);
        observers.subscribe(EventKind::NodeAdded, move |event| {
            counter.set(counter.get() + 1);
            handle.emit(event);
        });

        observers.emit(&node_added());
        assert_eq!(count.get(), 1);
        assert!(!observers.is_emitting());
    }

    #[test]
    fn test_subscribe_during_dispatch() {
        let observers = Observers::new();
        let late_calls = Rc::new(Cell::new(0));

        let handle = Rc::clone(&observers);
        let late = Rc::clone(&late_calls);
        observers.subscribe(EventKind::NodeAdded, move |_| {
            let late = Rc::clone(&late);
            handle.subscribe(EventKind::NodeAdded, move |_| late.set(late.get() + 1));
        });

        observers.emit(&node_added());
        assert_eq!(late_calls.get(), 0);
        assert_eq!(observers.len(), 2);

        observers.emit(&node_added());
        assert_eq!(late_calls.get(), 1);
    }
}
