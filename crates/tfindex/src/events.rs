//! Change notification and query cancellation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle returned by [`ChangeEmitter::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut()>;

/// Synchronous, payload-free change event.
///
/// Listeners run in subscription order on the thread that fires the event.
/// They receive nothing, so a listener cannot reach back into the emitter's
/// owner while it is being mutated.
#[derive(Default)]
pub struct ChangeEmitter {
    listeners: Vec<(Subscription, Listener)>,
    next_id: u64,
}

impl ChangeEmitter {
    /// Create an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`.
    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> Subscription {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    /// Call every listener once.
    pub fn fire(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for ChangeEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A cancellation flag a caller may trip while a query scans files.
///
/// Clones share the same flag, so a request handler can keep one clone and
/// hand the other to the query.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an untripped token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn fires_every_listener_once() {
        let count = Rc::new(Cell::new(0));
        let mut emitter = ChangeEmitter::new();
        for _ in 0..2 {
            let count = Rc::clone(&count);
            emitter.subscribe(move || count.set(count.get() + 1));
        }

        emitter.fire();

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let count = Rc::new(Cell::new(0));
        let mut emitter = ChangeEmitter::new();
        let handle = {
            let count = Rc::clone(&count);
            emitter.subscribe(move || count.set(count.get() + 1))
        };

        assert!(emitter.unsubscribe(handle));
        assert!(!emitter.unsubscribe(handle));
        emitter.fire();

        assert_eq!(count.get(), 0);
        assert!(emitter.is_empty());
    }

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let handle = token.clone();

        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
