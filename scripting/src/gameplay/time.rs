use std::time::Duration;

/// Game clock handed to every update.
///
/// `current` is the total time the game has run, `delta` the length of the last frame. Both are
/// set by whoever drives the loop; nothing here reads the wall clock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameTime {
    current: Duration,
    delta: Duration,
}

impl GameTime {
    pub fn new(current: Duration, delta: Duration) -> Self {
        Self { current, delta }
    }

    #[inline]
    pub fn current(&self) -> Duration {
        self.current
    }

    #[inline]
    pub fn set_current(&mut self, current: Duration) {
        self.current = current;
    }

    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    #[inline]
    pub fn set_delta(&mut self, delta: Duration) {
        self.delta = delta;
    }

    /// Step the clock forward by one frame of length `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.current += delta;
        self.delta = delta;
    }
}
