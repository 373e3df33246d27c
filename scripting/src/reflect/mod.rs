//! Runtime reflection: dynamically typed values, attribute tables and the types that prescribe
//! them.
//!
//! - [`Datum`]: a homogeneous, variable length array of one [`Kind`] of value.
//! - [`Scope`]: an ordered table of named datums, arranged in a tree owned by a [`Hierarchy`].
//! - [`Attributed`]: reflected structs whose fields appear as prescribed attributes.
//! - [`TypeRegistry`] and [`Factory`]: what is reflected, and what can be built by name, collected
//!   into a [`Context`].

pub mod attributed;
mod context;
pub mod datum;
mod factory;
mod registry;
pub mod rtti;
pub mod scope;

pub use attributed::{Accessor, Attributed, Binding, Signature};
pub use context::{Context, ContextBuilder};
pub use datum::{Datum, External, Kind, Pointer, Value};
pub use factory::{Creator, Factory};
pub use registry::{TypeId, TypeInfo, TypeRegistry};
pub use rtti::Rtti;
pub use rusty_scripting_macros::Attributed;
pub use scope::{Generation, Handle, Hierarchy, Node, Scope};
