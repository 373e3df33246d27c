use std::fmt;

use glam::{Mat4, Vec4};

use crate::{
    error::{Error, Result},
    reflect::{Datum, External, Kind, Node, Pointer, Value},
};

/// Returns the field of a node that backs one prescribed attribute.
///
/// `None` means the node is not of the type the signature was written for.
pub type Accessor = fn(&dyn Node) -> Option<Binding>;

/// A shared handle onto one [`External`] field, tagged with its kind.
#[derive(Debug, Clone)]
pub enum Binding {
    Integer(External<i32>),
    Float(External<f32>),
    String(External<String>),
    Vector(External<Vec4>),
    Matrix(External<Mat4>),
    Pointer(External<Pointer>),
}

impl Binding {
    pub fn kind(&self) -> Kind {
        match self {
            Binding::Integer(_) => Kind::Integer,
            Binding::Float(_) => Kind::Float,
            Binding::String(_) => Kind::String,
            Binding::Vector(_) => Kind::Vector,
            Binding::Matrix(_) => Kind::Matrix,
            Binding::Pointer(_) => Kind::Pointer,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Binding::Integer(field) => field.len(),
            Binding::Float(field) => field.len(),
            Binding::String(field) => field.len(),
            Binding::Vector(field) => field.len(),
            Binding::Matrix(field) => field.len(),
            Binding::Pointer(field) => field.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make `datum` a view over this field.
    pub fn attach(self, datum: &mut Datum) -> Result<()> {
        match self {
            Binding::Integer(field) => datum.set_storage(field),
            Binding::Float(field) => datum.set_storage(field),
            Binding::String(field) => datum.set_storage(field),
            Binding::Vector(field) => datum.set_storage(field),
            Binding::Matrix(field) => datum.set_storage(field),
            Binding::Pointer(field) => datum.set_storage(field),
        }
    }
}

impl<T: Value> From<External<T>> for Binding {
    fn from(field: External<T>) -> Self {
        T::binding(field)
    }
}

/// Describes one prescribed attribute of a reflected type.
#[derive(Clone, Copy)]
pub struct Signature {
    name: &'static str,
    kind: Kind,
    count: usize,
    accessor: Option<Accessor>,
}

impl Signature {
    /// An attribute backed by an [`External`] field of the type.
    pub const fn external(name: &'static str, kind: Kind, count: usize, accessor: Accessor) -> Self {
        Self {
            name,
            kind,
            count,
            accessor: Some(accessor),
        }
    }

    /// A table attribute that starts out holding `count` empty child scopes.
    pub const fn table(name: &'static str, count: usize) -> Self {
        Self {
            name,
            kind: Kind::Table,
            count,
            accessor: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// The field of `node` backing this attribute, checked against the declared kind and count.
    /// `None` for table signatures.
    pub fn binding(&self, node: &dyn Node) -> Result<Option<Binding>> {
        let Some(accessor) = self.accessor else {
            return Ok(None);
        };
        // Signatures are only ever applied to the type that declared them.
        let binding =
            accessor(node).ok_or_else(|| Error::UnregisteredType(node.class_name().to_string()))?;
        if binding.kind() != self.kind {
            return Err(Error::KindMismatch {
                expected: self.kind,
                actual: binding.kind(),
            });
        }
        if binding.len() != self.count {
            return Err(Error::SignatureMismatch {
                name: self.name.to_string(),
                expected: self.count,
                actual: binding.len(),
            });
        }
        Ok(Some(binding))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("count", &self.count)
            .finish()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind && self.count == other.count
    }
}
