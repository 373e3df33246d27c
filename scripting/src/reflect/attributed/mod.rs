//! Reflected types with prescribed attributes.
//!
//! An attributed type is a struct that owns a [`Scope`](crate::reflect::Scope) plus typed
//! [`External`](crate::reflect::External) fields. Its [`Signature`]s, registered once with the
//! [`TypeRegistry`](crate::reflect::TypeRegistry), name the attributes every instance starts
//! with. When an instance enters a [`Hierarchy`](crate::reflect::Hierarchy) it receives:
//!
//! - a `"this"` pointer datum naming its own handle,
//! - one datum per field signature, bound to the field so reads and writes go straight through,
//! - one table datum per table signature, holding `count` empty child scopes.
//!
//! Anything appended afterwards is an *auxiliary* attribute.
//!
//! # Deriving
//!
//! ```rust,ignore
//! #[derive(Debug, Clone, Attributed)]
//! #[table("Inventory", count = 2)]
//! struct Monster {
//!     #[scope]
//!     scope: Scope,
//!     #[attribute("Health")]
//!     health: External<i32>,
//!     #[attribute("Path", count = 4)]
//!     path: External<Vec4>,
//! }
//! ```
//!
//! The derive implements both [`Attributed`] and [`Node`]. Field signatures come first, in
//! declaration order, followed by tables.

mod signature;

pub use signature::{Accessor, Binding, Signature};

use crate::reflect::Node;

/// A [`Node`] type with a fixed set of prescribed attributes.
pub trait Attributed: Node + Sized {
    /// The name the type registers under, in the registry and in factories.
    const CLASS_NAME: &'static str;

    /// Prescribed attributes in the order they are appended to each instance.
    fn signatures() -> Vec<Signature>;
}

#[cfg(test)]
pub(crate) mod tests {
    use std::rc::Rc;

    use glam::{Mat4, Vec4};

    use super::*;
    use crate::{
        error::Error,
        reflect::{Attributed, Context, External, Handle, Hierarchy, Kind, Pointer, Scope},
    };

    pub(crate) const ARRAY_SIZE: usize = 5;

    /// One field of every kind, a fixed size integer array and two tables.
    #[derive(Debug, Clone, Attributed)]
    #[table("NestedScope", count = 1)]
    #[table("NestedScopeArray", count = 2)]
    pub(crate) struct AttributedFoo {
        #[scope]
        scope: Scope,
        #[attribute("ExternalInteger")]
        pub(crate) external_integer: External<i32>,
        #[attribute("ExternalFloat")]
        pub(crate) external_float: External<f32>,
        #[attribute("ExternalString")]
        pub(crate) external_string: External<String>,
        #[attribute("ExternalVector")]
        pub(crate) external_vector: External<Vec4>,
        #[attribute("ExternalMatrix")]
        pub(crate) external_matrix: External<Mat4>,
        #[attribute("ExternalPointer")]
        pub(crate) external_pointer: External<Pointer>,
        #[attribute("ExternalIntegerArray", count = ARRAY_SIZE)]
        pub(crate) external_integer_array: External<i32>,
    }

    impl Default for AttributedFoo {
        fn default() -> Self {
            Self {
                scope: Scope::new(),
                external_integer: External::default(),
                external_float: External::default(),
                external_string: External::default(),
                external_vector: External::default(),
                external_matrix: External::default(),
                external_pointer: External::default(),
                external_integer_array: External::filled(ARRAY_SIZE),
            }
        }
    }

    /// A second, smaller type.
    #[derive(Debug, Clone, Default, Attributed)]
    #[table("Children")]
    pub(crate) struct AttributedBar {
        #[scope]
        scope: Scope,
        #[attribute("Health")]
        pub(crate) health: External<i32>,
    }

    /// A field whose length disagrees with its signature.
    #[derive(Debug, Clone, Default, Attributed)]
    struct Mismatched {
        scope: Scope,
        #[attribute("Values", count = 3)]
        values: External<f32>,
    }

    fn context() -> Rc<Context> {
        let mut builder = Context::builder();
        builder.register::<AttributedFoo>().unwrap();
        builder.register::<AttributedBar>().unwrap();
        builder.register::<Mismatched>().unwrap();
        builder.build()
    }

    fn foo(tree: &mut Hierarchy) -> Handle {
        tree.create::<AttributedFoo>().unwrap()
    }

    // ==================== Signatures ====================

    #[test]
    fn derived_signatures() {
        // When
        let signatures = AttributedFoo::signatures();

        // Then - fields in declaration order, then tables
        let names: Vec<_> = signatures.iter().map(Signature::name).collect();
        assert_eq!(
            names,
            vec![
                "ExternalInteger",
                "ExternalFloat",
                "ExternalString",
                "ExternalVector",
                "ExternalMatrix",
                "ExternalPointer",
                "ExternalIntegerArray",
                "NestedScope",
                "NestedScopeArray",
            ]
        );
        let kinds: Vec<_> = signatures.iter().map(Signature::kind).collect();
        assert_eq!(
            kinds,
            vec![
                Kind::Integer,
                Kind::Float,
                Kind::String,
                Kind::Vector,
                Kind::Matrix,
                Kind::Pointer,
                Kind::Integer,
                Kind::Table,
                Kind::Table,
            ]
        );
        assert_eq!(signatures[6].count(), ARRAY_SIZE);
        assert_eq!(signatures[8].count(), 2);
        assert_eq!(AttributedFoo::CLASS_NAME, "AttributedFoo");
    }

    #[test]
    fn table_count_defaults_to_zero() {
        let signatures = AttributedBar::signatures();
        assert_eq!(signatures[1], Signature::table("Children", 0));
    }

    // ==================== Population ====================

    #[test]
    fn instances_start_with_prescribed_attributes() {
        // Given
        let mut tree = Hierarchy::new(context());

        // When
        let handle = foo(&mut tree);

        // Then
        let scope = &tree[handle];
        assert_eq!(scope.len(), 1 + AttributedFoo::signatures().len());
        assert_eq!(tree.prescribed_len(handle).unwrap(), scope.len());
        assert_eq!(scope.name_at(0), Some(Scope::THIS));
        assert_eq!(
            scope[Scope::THIS].get::<Pointer>(0).unwrap().as_node(),
            Some(handle)
        );
        assert_eq!(scope["ExternalIntegerArray"].len(), ARRAY_SIZE);
        assert!(scope["ExternalIntegerArray"].is_external());
        assert_eq!(scope["NestedScope"].len(), 1);
        assert_eq!(scope["NestedScopeArray"].len(), 2);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn datums_write_through_to_fields() {
        // Given
        let mut tree = Hierarchy::new(context());
        let handle = foo(&mut tree);

        // When
        tree[handle]["ExternalInteger"].set(0, 42).unwrap();
        tree[handle]["ExternalIntegerArray"].set(4, 9).unwrap();
        tree[handle]["ExternalString"]
            .set(0, "Hello".to_string())
            .unwrap();
        tree.get::<AttributedFoo>(handle)
            .unwrap()
            .external_float
            .set(2.5);

        // Then
        let foo = tree.get::<AttributedFoo>(handle).unwrap();
        assert_eq!(foo.external_integer.get(), 42);
        assert_eq!(foo.external_integer_array.at(4), Some(9));
        assert_eq!(foo.external_string.get(), "Hello");
        assert_eq!(tree[handle]["ExternalFloat"].get::<f32>(0), Ok(2.5));
    }

    #[test]
    fn prescribed_datums_cannot_grow() {
        // Given
        let mut tree = Hierarchy::new(context());
        let handle = foo(&mut tree);

        // Then
        assert_eq!(
            tree[handle]["ExternalInteger"].push_back(1),
            Err(Error::ExternalStorage)
        );
        assert!(matches!(
            tree[handle]["ExternalInteger"].set(1, 1),
            Err(Error::OutOfBounds { index: 1, len: 1 })
        ));
    }

    #[test]
    fn unregistered_types_are_rejected() {
        // Given
        let mut tree = Hierarchy::default();

        // When
        let result = tree.create::<AttributedBar>();

        // Then
        assert_eq!(
            result,
            Err(Error::UnregisteredType("AttributedBar".to_string()))
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn field_length_must_match_signature() {
        // Given
        let mut tree = Hierarchy::new(context());

        // When
        let result = tree.create::<Mismatched>();

        // Then
        assert_eq!(
            result,
            Err(Error::SignatureMismatch {
                name: "Values".to_string(),
                expected: 3,
                actual: 1,
            })
        );
        assert!(tree.is_empty());
    }

    // ==================== Prescribed and auxiliary ====================

    #[test]
    fn attribute_classification() {
        // Given
        let mut tree = Hierarchy::new(context());
        let handle = foo(&mut tree);

        // When
        tree.append_auxiliary_attribute(handle, "Extra")
            .unwrap()
            .push_back(1.0f32)
            .unwrap();

        // Then
        for name in [Scope::THIS, "ExternalInteger", "NestedScopeArray"] {
            assert!(tree.is_attribute(handle, name).unwrap());
            assert!(tree.is_prescribed_attribute(handle, name).unwrap());
            assert!(!tree.is_auxiliary_attribute(handle, name).unwrap());
        }
        assert!(tree.is_auxiliary_attribute(handle, "Extra").unwrap());
        assert!(!tree.is_prescribed_attribute(handle, "Extra").unwrap());
        assert!(!tree.is_attribute(handle, "Missing").unwrap());
        assert!(!tree.is_auxiliary_attribute(handle, "Missing").unwrap());
    }

    #[test]
    fn auxiliary_names_cannot_shadow_prescribed_ones() {
        // Given
        let mut tree = Hierarchy::new(context());
        let handle = foo(&mut tree);

        // Then
        assert_eq!(
            tree.append_auxiliary_attribute(handle, "ExternalFloat").err(),
            Some(Error::PrescribedAttribute("ExternalFloat".to_string()))
        );
        assert_eq!(
            tree.append_auxiliary_attribute(handle, Scope::THIS).err(),
            Some(Error::PrescribedAttribute(Scope::THIS.to_string()))
        );
    }

    #[test]
    fn plain_scopes_have_nothing_prescribed() {
        // Given
        let mut tree = Hierarchy::new(context());
        let handle = tree.new_scope();
        tree.append(handle, "A").unwrap();

        // Then
        assert_eq!(tree.prescribed_len(handle).unwrap(), 0);
        assert!(tree.is_auxiliary_attribute(handle, "A").unwrap());
        assert!(tree.signatures(handle).unwrap().is_none());
    }

    // ==================== Copy, move, assign ====================

    #[test]
    fn copies_bind_their_own_fields() {
        // Given
        let mut tree = Hierarchy::new(context());
        let source = foo(&mut tree);
        tree[source]["ExternalInteger"].set(0, 10).unwrap();
        tree.append_auxiliary_attribute(source, "Extra")
            .unwrap()
            .push_back(3)
            .unwrap();

        // When
        let copy = tree.clone_scope(source).unwrap();
        tree[copy]["ExternalInteger"].set(0, 20).unwrap();

        // Then
        assert_eq!(tree[source]["ExternalInteger"].get::<i32>(0), Ok(10));
        assert_eq!(
            tree.get::<AttributedFoo>(copy)
                .unwrap()
                .external_integer
                .get(),
            20
        );
        assert_eq!(
            tree[copy][Scope::THIS].get::<Pointer>(0).unwrap().as_node(),
            Some(copy)
        );
        assert_eq!(tree[copy]["Extra"].get::<i32>(0), Ok(3));
        assert_ne!(
            tree[copy]["NestedScope"].handles(),
            tree[source]["NestedScope"].handles()
        );
        assert!(tree.is_auxiliary_attribute(copy, "Extra").unwrap());
    }

    #[test]
    fn external_datums_compare_by_field() {
        // Given
        let mut tree = Hierarchy::new(context());
        let source = foo(&mut tree);

        // When
        let copy = tree.clone_scope(source).unwrap();

        // Then - equal values, but each copy views its own fields
        assert_eq!(
            tree[copy]["ExternalInteger"].get::<i32>(0),
            tree[source]["ExternalInteger"].get::<i32>(0)
        );
        assert_ne!(tree[copy]["ExternalInteger"], tree[source]["ExternalInteger"]);
        assert!(!tree.equals(source, copy).unwrap());
        assert!(tree.equals(source, source).unwrap());
    }

    #[test]
    fn moved_instances_keep_their_fields() {
        // Given
        let mut tree = Hierarchy::new(context());
        let source = foo(&mut tree);
        tree[source]["ExternalInteger"].set(0, 7).unwrap();

        // When
        let moved = tree.move_scope(source).unwrap();
        tree[moved]["ExternalInteger"].set(0, 8).unwrap();

        // Then
        let foo = tree.get::<AttributedFoo>(moved).unwrap();
        assert_eq!(foo.external_integer.get(), 8);
        assert_eq!(
            tree[moved][Scope::THIS].get::<Pointer>(0).unwrap().as_node(),
            Some(moved)
        );
        assert!(tree[source].is_empty());
        for child in tree.children(moved).unwrap() {
            assert_eq!(tree.parent(child).unwrap(), Some(moved));
        }
    }

    #[test]
    fn assignment_rebinds_to_the_target() {
        // Given
        let mut tree = Hierarchy::new(context());
        let source = foo(&mut tree);
        let target = foo(&mut tree);
        tree[source]["ExternalInteger"].set(0, 5).unwrap();

        // When
        tree.assign(target, source).unwrap();
        tree[target]["ExternalInteger"].set(0, 6).unwrap();

        // Then
        assert_eq!(tree[source]["ExternalInteger"].get::<i32>(0), Ok(5));
        assert_eq!(
            tree.get::<AttributedFoo>(target)
                .unwrap()
                .external_integer
                .get(),
            6
        );
        assert_eq!(
            tree[target][Scope::THIS].get::<Pointer>(0).unwrap().as_node(),
            Some(target)
        );
        // 2 instances of 4 scopes each
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn created_by_class_name() {
        // Given
        let mut tree = Hierarchy::new(context());

        // When
        let handle = tree.create_class("AttributedBar").unwrap();

        // Then
        assert_eq!(tree.class_name(handle), Ok("AttributedBar"));
        assert!(tree.contains(handle));
        assert_eq!(
            tree.create_class("Nope"),
            Err(Error::UnknownClass("Nope".to_string()))
        );
    }
}
