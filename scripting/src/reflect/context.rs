use std::rc::Rc;

use crate::{
    error::Result,
    reflect::{Attributed, Creator, Factory, Node, Scope, TypeId, TypeRegistry},
};

/// The reflection configuration a [`Hierarchy`](crate::reflect::Hierarchy) works against: which
/// types are attributed, and which classes can be built by name.
#[derive(Debug, Default)]
pub struct Context {
    types: TypeRegistry,
    factory: Factory<dyn Node>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    #[inline]
    pub fn factory(&self) -> &Factory<dyn Node> {
        &self.factory
    }
}

/// Collects registrations for a [`Context`].
///
/// ```rust,ignore
/// let mut builder = Context::builder();
/// builder.register::<Monster>()?;
/// let mut tree = Hierarchy::new(builder.build());
/// ```
#[derive(Debug)]
pub struct ContextBuilder {
    context: Context,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn create_scope() -> Box<dyn Node> {
    Box::new(Scope::new())
}

impl ContextBuilder {
    /// A builder whose factory already knows plain scopes.
    pub fn new() -> Self {
        let mut context = Context::default();
        context.factory.add(Scope::CLASS_NAME, create_scope);
        Self { context }
    }

    /// Register `T`'s signatures without making it constructible by name.
    pub fn register_type<T: Attributed>(&mut self) -> Result<TypeId> {
        self.context.types.register::<T>()
    }

    /// Register `T`'s signatures and add it to the factory under its class name.
    pub fn register<T: Attributed + Default>(&mut self) -> Result<TypeId> {
        let id = self.register_type::<T>()?;
        self.context.factory.add_node::<T>();
        Ok(id)
    }

    /// Add a factory entry under an arbitrary name.
    pub fn add_class(&mut self, class_name: impl Into<String>, creator: Creator<dyn Node>) -> bool {
        self.context.factory.add(class_name, creator)
    }

    pub fn factory_mut(&mut self) -> &mut Factory<dyn Node> {
        &mut self.context.factory
    }

    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.context.types
    }

    pub fn build(self) -> Rc<Context> {
        Rc::new(self.context)
    }
}
