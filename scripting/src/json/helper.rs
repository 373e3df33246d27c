use std::any::Any;

use serde_json::Value;

use crate::error::Result;

/// The container a parse fills in. Helpers downcast it to the type they know how to fill.
pub trait ParsedData: Any {
    /// Called before every parse.
    fn initialize(&mut self) {}

    /// Called after every parse, successful or not.
    fn cleanup(&mut self) {}

    /// A new, empty container of the same type.
    fn create(&self) -> Self
    where
        Self: Sized;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn ParsedData {
    #[inline]
    pub fn is<T: ParsedData>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: ParsedData>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: ParsedData>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// One link in a [`ParseCoordinator`](super::ParseCoordinator)'s chain.
///
/// For every member the coordinator calls [`start`](Self::start) on each helper in turn until
/// one returns `Ok(true)`. That helper receives exactly one matching [`end`](Self::end) once
/// the member's nested values have been parsed.
pub trait ParseHelper {
    /// Reset per-parse state. Called once before each document.
    fn initialize(&mut self) {}

    /// Called once after each document.
    fn cleanup(&mut self) {}

    /// A fresh helper of the same type, with no parse state.
    fn create(&self) -> Box<dyn ParseHelper>;

    /// Offer the member `key: value`. Returns whether this helper handles it.
    fn start(&mut self, data: &mut dyn ParsedData, key: &str, value: &Value) -> Result<bool>;

    /// Finish the member most recently accepted by [`start`](Self::start).
    fn end(&mut self, data: &mut dyn ParsedData, key: &str) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

impl dyn ParseHelper {
    #[inline]
    pub fn downcast_ref<T: ParseHelper + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
