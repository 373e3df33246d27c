use std::{
    any::{Any, type_name},
    fmt,
};

use super::Scope;

/// A polymorphic member of a [`Hierarchy`](super::Hierarchy).
///
/// Every node owns a [`Scope`] holding its attributes. Plain scopes implement this trait
/// directly; reflected types get an implementation from `#[derive(Attributed)]`.
pub trait Node: Any + fmt::Debug {
    fn scope(&self) -> &Scope;

    fn scope_mut(&mut self) -> &mut Scope;

    /// The name this node's class is registered under.
    fn class_name(&self) -> &'static str;

    /// A copy of this node. Child handles in the copy still name the source's children; the
    /// hierarchy replaces them when it places the copy.
    fn clone_node(&self) -> Box<dyn Node>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// True for types whose prescribed attributes come from the type registry.
    fn is_attributed(&self) -> bool {
        false
    }
}

impl dyn Node {
    #[inline]
    pub fn is<T: Node>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Node>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl Node for Scope {
    fn scope(&self) -> &Scope {
        self
    }

    fn scope_mut(&mut self) -> &mut Scope {
        self
    }

    fn class_name(&self) -> &'static str {
        Scope::CLASS_NAME
    }

    fn clone_node(&self) -> Box<dyn Node> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Short name of `T` for diagnostics.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let name = type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
