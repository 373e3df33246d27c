use std::{
    any::{Any, type_name},
    fmt,
};

/// Runtime type information for objects referenced from pointer datums.
///
/// Implementors are ordinary Rust values held behind an `Rc`. The text form of a pointer datum
/// is the object's [`Display`](fmt::Display) output, and pointer equality falls back to
/// [`equals`](Rtti::equals) when two pointers are not the same object.
pub trait Rtti: Any + fmt::Debug + fmt::Display {
    fn as_any(&self) -> &dyn Any;

    /// Structural equality with another object. Defaults to never equal.
    fn equals(&self, _other: &dyn Rtti) -> bool {
        false
    }

    /// Name of the concrete type, for diagnostics.
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

impl dyn Rtti {
    /// True if the object is a `T`.
    #[inline]
    pub fn is<T: Rtti>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to a concrete type.
    #[inline]
    pub fn downcast_ref<T: Rtti>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A small object used across the crate's tests.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Foo(pub i32);

    impl fmt::Display for Foo {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Foo({})", self.0)
        }
    }

    impl Rtti for Foo {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn equals(&self, other: &dyn Rtti) -> bool {
            other.downcast_ref::<Foo>() == Some(self)
        }
    }

    #[derive(Debug)]
    struct Bar;

    impl fmt::Display for Bar {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Bar")
        }
    }

    impl Rtti for Bar {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn downcast() {
        // Given
        let foo: Box<dyn Rtti> = Box::new(Foo(3));

        // Then
        assert!(foo.is::<Foo>());
        assert!(!foo.is::<Bar>());
        assert_eq!(foo.downcast_ref::<Foo>(), Some(&Foo(3)));
        assert!(foo.downcast_ref::<Bar>().is_none());
        assert!(foo.type_name().ends_with("Foo"));
    }

    #[test]
    fn equals_defaults_to_false() {
        assert!(Foo(1).equals(&Foo(1)));
        assert!(!Foo(1).equals(&Foo(2)));
        assert!(!Foo(1).equals(&Bar));
        assert!(!Bar.equals(&Bar));
    }
}
