//! One channel per message type.
//!
//! Channels are stored type erased, keyed by the message's `TypeId`, and handed out as typed
//! [`Channel`] handles.

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
};

use super::Channel;

/// Type erased view of a [`Channel`] for the broker's map.
trait ErasedChannel {
    fn handle_pending(&self);

    fn len(&self) -> usize;

    fn as_any(&self) -> &dyn Any;
}

impl<M: 'static> ErasedChannel for Channel<M> {
    fn handle_pending(&self) {
        Channel::handle_pending(self);
    }

    fn len(&self) -> usize {
        Channel::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Owns the channel of every registered message type.
#[derive(Default)]
pub struct Broker {
    channels: HashMap<TypeId, Box<dyn ErasedChannel>>,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    /// Create the channel for messages of type `M`.
    ///
    /// # Panics
    ///
    /// Panics if `M` is already registered.
    pub fn register<M: 'static>(&mut self) -> Channel<M> {
        let type_id = TypeId::of::<M>();
        assert!(
            !self.channels.contains_key(&type_id),
            "Message type already registered: {:?}",
            type_name::<M>()
        );
        let channel = Channel::<M>::new();
        self.channels.insert(type_id, Box::new(channel.clone()));
        channel
    }

    #[inline]
    pub fn is_registered<M: 'static>(&self) -> bool {
        self.channels.contains_key(&TypeId::of::<M>())
    }

    /// A handle to `M`'s channel, if registered.
    pub fn channel<M: 'static>(&self) -> Option<Channel<M>> {
        let channel = self.channels.get(&TypeId::of::<M>())?;
        channel.as_any().downcast_ref::<Channel<M>>().cloned()
    }

    /// Apply pending subscription changes on every channel.
    pub fn handle_pending_all(&self) {
        for channel in self.channels.values() {
            channel.handle_pending();
        }
    }

    /// Total subscriptions across all channels.
    pub fn subscriber_count(&self) -> usize {
        self.channels.values().map(|channel| channel.len()).sum()
    }

    /// Number of registered message types.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("channels", &self.channels.len())
            .finish()
    }
}
