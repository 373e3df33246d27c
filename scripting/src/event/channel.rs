use std::{cell::RefCell, fmt, marker::PhantomData, rc::Rc};

use super::{Publisher, Subscriber};

/// A subscriber shared between its owner and the channels it listens on.
pub type SharedSubscriber = Rc<RefCell<dyn Subscriber>>;

/// Names one subscription on one channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Pending {
    Add(SubscriptionId, SharedSubscriber),
    Remove(SubscriptionId),
    Clear,
}

#[derive(Default)]
struct State {
    subscribers: Vec<(SubscriptionId, SharedSubscriber)>,
    pending: Vec<Pending>,
    next_id: u64,
}

/// The subscribers of one message type. Cloning yields another handle to the same list.
pub struct Channel<M> {
    state: Rc<RefCell<State>>,
    _message: PhantomData<fn(&M)>,
}

impl<M> Clone for Channel<M> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            _message: PhantomData,
        }
    }
}

impl<M> Default for Channel<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Channel<M> {
    pub fn new() -> Self {
        Self {
            state: Rc::default(),
            _message: PhantomData,
        }
    }

    /// Queue `subscriber` to be added. Takes effect at the next [`handle_pending`](Self::handle_pending).
    pub fn subscribe(&self, subscriber: SharedSubscriber) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.pending.push(Pending::Add(id, subscriber));
        id
    }

    /// Queue the removal of a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state.borrow_mut().pending.push(Pending::Remove(id));
    }

    /// Queue the removal of every subscription made so far.
    pub fn unsubscribe_all(&self) {
        self.state.borrow_mut().pending.push(Pending::Clear);
    }

    /// Apply queued subscription changes in the order they were made.
    pub fn handle_pending(&self) {
        let mut state = self.state.borrow_mut();
        let pending = std::mem::take(&mut state.pending);
        for change in pending {
            match change {
                Pending::Add(id, subscriber) => state.subscribers.push((id, subscriber)),
                Pending::Remove(id) => state.subscribers.retain(|(existing, _)| *existing != id),
                Pending::Clear => state.subscribers.clear(),
            }
        }
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if changes are waiting for [`handle_pending`](Self::handle_pending).
    pub fn has_pending(&self) -> bool {
        !self.state.borrow().pending.is_empty()
    }

    /// Notify every subscriber of `publisher`, after applying pending changes.
    pub fn deliver(&self, publisher: &dyn Publisher) {
        self.handle_pending();
        let subscribers: Vec<_> = self
            .state
            .borrow()
            .subscribers
            .iter()
            .map(|(_, subscriber)| Rc::clone(subscriber))
            .collect();
        for subscriber in subscribers {
            subscriber.borrow_mut().notify(publisher);
        }
    }

    /// True if both handles name the same channel.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<M> fmt::Debug for Channel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Channel")
            .field("message", &std::any::type_name::<M>())
            .field("subscribers", &state.subscribers.len())
            .field("pending", &state.pending.len())
            .finish()
    }
}
