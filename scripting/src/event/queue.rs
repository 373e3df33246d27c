use std::{rc::Rc, time::Duration};

use super::Publisher;
use crate::gameplay::GameTime;

#[derive(Debug)]
struct Entry {
    publisher: Rc<dyn Publisher>,
    enqueued: Duration,
    delay: Duration,
}

impl Entry {
    fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.enqueued) >= self.delay
    }
}

/// Events waiting for their delay to elapse in game time.
#[derive(Debug, Default)]
pub struct EventQueue {
    entries: Vec<Entry>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `publisher` to be delivered once `delay` has passed since `time`.
    pub fn enqueue(&mut self, publisher: Rc<dyn Publisher>, time: &GameTime, delay: Duration) {
        self.entries.push(Entry {
            publisher,
            enqueued: time.current(),
            delay,
        });
    }

    /// Deliver `publisher` immediately.
    pub fn send(&self, publisher: &dyn Publisher) {
        publisher.deliver();
    }

    /// Deliver and drop every entry whose delay has elapsed at `time`, in the order they were
    /// queued. Returns how many were delivered.
    pub fn update(&mut self, time: &GameTime) -> usize {
        let now = time.current();
        let (expired, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.is_expired(now));
        self.entries = waiting;

        for entry in &expired {
            self.send(entry.publisher.as_ref());
        }
        expired.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
