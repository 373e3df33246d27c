use std::collections::HashMap;

use log::{info, warn};

use crate::reflect::{Attributed, Node};

/// Builds a fresh, default instance of one class.
pub type Creator<P> = fn() -> Box<P>;

/// Name-keyed constructors for a family of polymorphic values.
///
/// `P` is usually a trait object: `Factory<dyn Node>` builds scope tree nodes by class name, as the
/// JSON loader and the create-action do.
///
/// ```rust,ignore
/// let mut factory: Factory<dyn Node> = Factory::new();
/// factory.add_node::<GameObject>();
/// let node = factory.create("GameObject").unwrap();
/// ```
pub struct Factory<P: ?Sized> {
    creators: HashMap<String, Creator<P>>,
}

impl<P: ?Sized> Default for Factory<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> Factory<P> {
    pub fn new() -> Self {
        Self {
            creators: HashMap::new(),
        }
    }

    /// Register `creator` under `class_name`. An existing entry is kept and `false` returned.
    pub fn add(&mut self, class_name: impl Into<String>, creator: Creator<P>) -> bool {
        let class_name = class_name.into();
        if self.creators.contains_key(&class_name) {
            warn!("factory already has a class named {class_name:?}");
            return false;
        }
        info!("added factory class {class_name}");
        self.creators.insert(class_name, creator);
        true
    }

    /// Returns false if nothing was registered under `class_name`.
    pub fn remove(&mut self, class_name: &str) -> bool {
        self.creators.remove(class_name).is_some()
    }

    #[inline]
    pub fn find(&self, class_name: &str) -> Option<Creator<P>> {
        self.creators.get(class_name).copied()
    }

    /// A new instance of `class_name`, or `None` if the name is unknown.
    pub fn create(&self, class_name: &str) -> Option<Box<P>> {
        self.find(class_name).map(|creator| creator())
    }

    #[inline]
    pub fn contains(&self, class_name: &str) -> bool {
        self.creators.contains_key(class_name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }

    /// Registered names, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.creators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn create_node<T: Attributed + Default>() -> Box<dyn Node> {
    Box::new(T::default())
}

impl Factory<dyn Node> {
    /// Register `T` under its class name.
    pub fn add_node<T: Attributed + Default>(&mut self) -> bool {
        self.add(T::CLASS_NAME, create_node::<T>)
    }
}

impl<P: ?Sized> std::fmt::Debug for Factory<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("classes", &self.class_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{
        Rtti,
        attributed::tests::AttributedFoo,
        rtti::tests::Foo,
    };

    fn make_foo() -> Box<dyn Rtti> {
        Box::new(Foo(7))
    }

    fn make_other_foo() -> Box<dyn Rtti> {
        Box::new(Foo(8))
    }

    #[test]
    fn add_and_create() {
        // Given
        let mut factory: Factory<dyn Rtti> = Factory::new();

        // When
        assert!(factory.add("Foo", make_foo));

        // Then
        assert!(factory.contains("Foo"));
        assert_eq!(factory.len(), 1);
        let foo = factory.create("Foo").unwrap();
        assert_eq!(foo.downcast_ref::<Foo>(), Some(&Foo(7)));
        assert!(factory.create("Bar").is_none());
        assert!(factory.find("Bar").is_none());
    }

    #[test]
    fn duplicate_names_keep_the_first_creator() {
        // Given
        let mut factory: Factory<dyn Rtti> = Factory::new();
        factory.add("Foo", make_foo);

        // When
        let added = factory.add("Foo", make_other_foo);

        // Then
        assert!(!added);
        let foo = factory.create("Foo").unwrap();
        assert_eq!(foo.downcast_ref::<Foo>(), Some(&Foo(7)));
    }

    #[test]
    fn remove() {
        // Given
        let mut factory: Factory<dyn Rtti> = Factory::new();
        factory.add("Foo", make_foo);

        // Then
        assert!(factory.remove("Foo"));
        assert!(!factory.remove("Foo"));
        assert!(factory.is_empty());
        assert!(factory.create("Foo").is_none());
    }

    #[test]
    fn nodes_by_class_name() {
        // Given
        let mut factory: Factory<dyn Node> = Factory::new();

        // When
        factory.add_node::<AttributedFoo>();
        let node = factory.create("AttributedFoo").unwrap();

        // Then
        assert!(node.is::<AttributedFoo>());
        assert_eq!(node.class_name(), "AttributedFoo");
        assert_eq!(factory.class_names(), vec!["AttributedFoo"]);
    }
}
