#![forbid(unsafe_code)]

//! Navigation events and the listener registry.
//!
//! After every successful `forward`/`back` the [`Director`](crate::Director)
//! publishes a [`NavigationEvent`] carrying the new step index and the
//! direction of travel. Observers (progress bars, slide counters) register
//! through [`EventBus::subscribe`] and keep the returned [`Subscription`]
//! alive for as long as they want to be called.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: a `Subscription` stored forever keeps its listener
//!   registered. Dead entries are pruned lazily on publish.
//! - **Re-entrant navigation**: listeners receive the event by value and no
//!   borrow of the bus is held while they run.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Direction of a single step transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// `+1` forward, `-1` backward.
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        })
    }
}

/// Emitted after each completed step transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationEvent {
    /// Step index after the transition.
    pub step: usize,
    pub direction: Direction,
}

type ListenerRc = Rc<dyn Fn(&NavigationEvent)>;
type ListenerWeak = Weak<dyn Fn(&NavigationEvent)>;

/// Guard keeping a listener registered. Drop it to unsubscribe.
#[must_use = "dropping the subscription unsubscribes the listener"]
pub struct Subscription {
    _guard: ListenerRc,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Listener registry owned by the director.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<ListenerWeak>>,
    published: std::cell::Cell<u64>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_count", &self.listeners.borrow().len())
            .field("published", &self.published.get())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; called in registration order.
    pub fn subscribe(&self, listener: impl Fn(&NavigationEvent) + 'static) -> Subscription {
        let strong: ListenerRc = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::downgrade(&strong));
        Subscription { _guard: strong }
    }

    /// Deliver `event` to every live listener and prune dead ones.
    pub fn publish(&self, event: NavigationEvent) {
        self.published.set(self.published.get() + 1);
        let live: Vec<ListenerRc> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|w| w.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            listener(&event);
        }
    }

    /// Registered listeners, including dead ones not yet pruned.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Total events published.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published.get()
    }
}
