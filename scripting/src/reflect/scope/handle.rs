use std::fmt;

use crossbeam::queue::SegQueue;

/// How many times a slot of the hierarchy has been reused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    const FIRST: Self = Self(0);

    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A reference to a scope living in a [`Hierarchy`](super::Hierarchy).
///
/// Handles are plain values. Once the scope they name is destroyed its slot gets a new generation,
/// so a stale handle is detected instead of silently naming whatever reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    index: u32,
    generation: Generation,
}

impl Handle {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation: Generation(generation),
        }
    }

    /// Index of the slot this handle names.
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation.0)
    }
}

/// Hands out slot handles and recycles freed ones with a bumped generation.
#[derive(Debug, Default)]
pub(crate) struct Allocator {
    /// Current generation of every slot ever handed out.
    generations: Vec<Generation>,

    /// Freed slots, reused oldest first.
    dead_pool: SegQueue<u32>,
}

impl Allocator {
    pub(crate) fn alloc(&mut self) -> Handle {
        if let Some(index) = self.dead_pool.pop() {
            return Handle {
                index,
                generation: self.generations[index as usize],
            };
        }

        let index = self.generations.len() as u32;
        self.generations.push(Generation::FIRST);
        Handle {
            index,
            generation: Generation::FIRST,
        }
    }

    /// Release a handle. Stale or already freed handles are ignored.
    pub(crate) fn free(&mut self, handle: Handle) {
        if self.is_current(handle) {
            let slot = &mut self.generations[handle.index()];
            *slot = slot.next();
            self.dead_pool.push(handle.index);
        }
    }

    /// True if `handle` carries the current generation of its slot.
    #[inline]
    pub(crate) fn is_current(&self, handle: Handle) -> bool {
        self.generations.get(handle.index()) == Some(&handle.generation)
    }

    /// Number of slots ever handed out.
    #[inline]
    pub(crate) fn slots(&self) -> usize {
        self.generations.len()
    }
}
