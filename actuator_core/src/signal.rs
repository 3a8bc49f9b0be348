//! Edge-triggered boolean lines shared between the actuator and its host.
//!
//! A `DigitalSignal` is a cheap handle (`Rc`) to a single boolean level.
//! Writes that do not change the level are ignored; a change notifies every
//! subscriber exactly once with the resulting [`Edge`].
//!
//! Subscribers run synchronously on the writer's stack. A callback must not
//! write the signal it is subscribed to; such a nested write updates the level
//! but is not delivered to the subscribers currently being notified.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Level change delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Activated,
    Deactivated,
}

impl Edge {
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Activated)
    }
}

/// Handle returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(Edge)>;

struct Inner {
    symbol: String,
    active: Cell<bool>,
    next_id: Cell<u64>,
    observers: RefCell<Vec<(SubscriptionId, Observer)>>,
}

#[derive(Clone)]
pub struct DigitalSignal {
    inner: Rc<Inner>,
}

impl fmt::Debug for DigitalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalSignal")
            .field("symbol", &self.inner.symbol)
            .field("active", &self.inner.active.get())
            .finish_non_exhaustive()
    }
}

impl DigitalSignal {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(Inner {
                symbol: symbol.into(),
                active: Cell::new(false),
                next_id: Cell::new(0),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.inner.symbol
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Drive the line high. Returns the edge when the level changed.
    pub fn on(&self) -> Option<Edge> {
        self.set(true)
    }

    /// Drive the line low. Returns the edge when the level changed.
    pub fn off(&self) -> Option<Edge> {
        self.set(false)
    }

    /// Idempotent level write.
    pub fn set(&self, active: bool) -> Option<Edge> {
        if self.inner.active.replace(active) == active {
            return None;
        }
        let edge = if active {
            Edge::Activated
        } else {
            Edge::Deactivated
        };
        self.notify(edge);
        Some(edge)
    }

    fn notify(&self, edge: Edge) {
        let mut running = std::mem::take(&mut *self.inner.observers.borrow_mut());
        for (_, observer) in &mut running {
            observer(edge);
        }
        // Keep subscriptions registered from inside a callback.
        let mut slot = self.inner.observers.borrow_mut();
        let added = std::mem::take(&mut *slot);
        running.extend(added);
        *slot = running;
    }

    /// Observe every edge (the "received" notification).
    pub fn subscribe(&self, observer: impl FnMut(Edge) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Box::new(observer)));
        id
    }

    /// Observe rising edges only.
    pub fn on_activated(&self, mut f: impl FnMut() + 'static) -> SubscriptionId {
        self.subscribe(move |edge| {
            if edge == Edge::Activated {
                f();
            }
        })
    }

    /// Observe falling edges only.
    pub fn on_deactivated(&self, mut f: impl FnMut() + 'static) -> SubscriptionId {
        self.subscribe(move |edge| {
            if edge == Edge::Deactivated {
                f();
            }
        })
    }

    /// Returns false when the id was not (or no longer) registered.
    /// Observers that are mid-dispatch are not visible here, so an observer
    /// cannot remove itself from inside its own callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_writes_notify_once() {
        let s = DigitalSignal::new("max");
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        s.subscribe(move |_| h.set(h.get() + 1));

        assert_eq!(s.on(), Some(Edge::Activated));
        assert_eq!(s.on(), None);
        assert_eq!(s.set(true), None);
        assert_eq!(hits.get(), 1);
        assert_eq!(s.off(), Some(Edge::Deactivated));
        assert_eq!(s.off(), None);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn filtered_subscribers_see_their_edge_only() {
        let s = DigitalSignal::new("in");
        let ups = Rc::new(Cell::new(0));
        let downs = Rc::new(Cell::new(0));
        let (u, d) = (ups.clone(), downs.clone());
        s.on_activated(move || u.set(u.get() + 1));
        s.on_deactivated(move || d.set(d.get() + 1));
        s.on();
        s.off();
        s.on();
        assert_eq!((ups.get(), downs.get()), (2, 1));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let s = DigitalSignal::new("in");
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = s.subscribe(move |_| h.set(h.get() + 1));
        assert!(s.unsubscribe(id));
        assert!(!s.unsubscribe(id));
        s.on();
        assert_eq!(hits.get(), 0);
        assert_eq!(s.subscriber_count(), 0);
    }

    #[test]
    fn clones_share_the_level() {
        let a = DigitalSignal::new("ready");
        let b = a.clone();
        b.on();
        assert!(a.is_active());
        assert!(!DigitalSignal::new("ready").is_active());
    }
}
