//! Publish/subscribe notifications, immediate or delayed.
//!
//! An [`Event<M>`] carries a message of type `M` and the [`Channel<M>`] of subscribers it is
//! delivered to. Events are sent right away with [`Publisher::deliver`] or queued with an
//! [`EventQueue`] to go out once a delay has elapsed in game time. The [`Broker`] keeps one
//! channel per message type.
//!
//! ```rust,ignore
//! let mut broker = Broker::new();
//! broker.register::<Damage>();
//! let channel = broker.channel::<Damage>().unwrap();
//! channel.subscribe(Rc::new(RefCell::new(HealthBar::default())));
//! channel.handle_pending();
//!
//! let mut queue = EventQueue::new();
//! queue.enqueue(Rc::new(Event::new(Damage(10), &channel)), &time, Duration::from_millis(500));
//! queue.update(&later);   // HealthBar is notified
//! ```
//!
//! # Deferred subscription
//!
//! Subscribing and unsubscribing never change a channel mid delivery. Changes are queued and
//! applied, in order, by [`Channel::handle_pending`], which every delivery runs first. A
//! subscriber may therefore unsubscribe itself, or subscribe others, from inside `notify`; the
//! change applies from the next delivery on.

mod broker;
mod channel;
mod queue;

pub use broker::Broker;
pub use channel::{Channel, SharedSubscriber, SubscriptionId};
pub use queue::EventQueue;

use std::{any::Any, fmt};

/// Receives delivered events.
pub trait Subscriber {
    fn notify(&mut self, publisher: &dyn Publisher);
}

/// Something that can be delivered to subscribers.
pub trait Publisher: Any + fmt::Debug {
    /// Notify every current subscriber.
    fn deliver(&self);

    fn as_any(&self) -> &dyn Any;
}

impl dyn Publisher {
    #[inline]
    pub fn is<T: Publisher>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Publisher>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// The message, if this is an `Event<M>`.
    #[inline]
    pub fn message<M: fmt::Debug + 'static>(&self) -> Option<&M> {
        self.downcast_ref::<Event<M>>().map(Event::message)
    }
}

/// A message bound for one channel.
pub struct Event<M> {
    message: M,
    channel: Channel<M>,
}

impl<M> Event<M> {
    pub fn new(message: M, channel: &Channel<M>) -> Self {
        Self {
            message,
            channel: channel.clone(),
        }
    }

    #[inline]
    pub fn message(&self) -> &M {
        &self.message
    }

    #[inline]
    pub fn channel(&self) -> &Channel<M> {
        &self.channel
    }
}

impl<M: fmt::Debug + 'static> Publisher for Event<M> {
    fn deliver(&self) {
        self.channel.deliver(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<M: fmt::Debug> fmt::Debug for Event<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("message", &self.message)
            .finish()
    }
}
