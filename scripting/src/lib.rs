//! A reflection driven scripting substrate.
//!
//! Game data lives in trees of [`Scope`](reflect::Scope)s: ordered tables of named, dynamically
//! typed [`Datum`](reflect::Datum)s. Rust types opt in with `#[derive(Attributed)]`, which exposes
//! their fields as prescribed attributes that read and write straight through to the struct.
//! Scenes are loaded from JSON by the [`json`] module, behaviour is driven by the [`gameplay`]
//! action family, and [`event`] carries deferred notifications between them.

// Allow the crate to reference itself as `rusty_scripting` so derive output resolves internally.
extern crate self as rusty_scripting;

pub mod error;
pub mod event;
pub mod gameplay;
pub mod json;
pub mod log;
pub mod reflect;

pub use error::{Error, Result};
