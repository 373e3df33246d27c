use std::{fmt, rc::Rc};

use glam::{Mat4, Vec4};

use super::{External, Kind, text};
use crate::{
    error::{Error, Result},
    reflect::{Binding, Handle, Rtti},
};

/// A reference held by a pointer datum.
#[derive(Debug, Clone, Default)]
pub enum Pointer {
    #[default]
    Null,
    /// A shared runtime object.
    Object(Rc<dyn Rtti>),
    /// A node of the hierarchy, including a scope's reference to itself.
    Node(Handle),
}

impl Pointer {
    /// Point at a new shared object.
    pub fn object<T: Rtti>(value: T) -> Self {
        Pointer::Object(Rc::new(value))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Pointer::Null)
    }

    pub fn as_object(&self) -> Option<&Rc<dyn Rtti>> {
        match self {
            Pointer::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<Handle> {
        match self {
            Pointer::Node(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl PartialEq for Pointer {
    /// Same object, or objects reporting [`Rtti::equals`].
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Pointer::Null, Pointer::Null) => true,
            (Pointer::Object(a), Pointer::Object(b)) => Rc::ptr_eq(a, b) || a.equals(&**b),
            (Pointer::Node(a), Pointer::Node(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pointer::Null => f.write_str("nullptr"),
            Pointer::Object(object) => fmt::Display::fmt(object, f),
            Pointer::Node(handle) => fmt::Display::fmt(handle, f),
        }
    }
}

/// Growable storage owned by a datum, or a view over an [`External`].
#[derive(Debug)]
pub enum Buffer<T> {
    Internal { items: Vec<T>, capacity: usize },
    External(External<T>),
}

impl<T: Clone> Clone for Buffer<T> {
    /// Internal storage is copied; an external view stays a view of the same field.
    fn clone(&self) -> Self {
        match self {
            Buffer::Internal { items, capacity } => Buffer::Internal {
                items: items.clone(),
                capacity: *capacity,
            },
            Buffer::External(external) => Buffer::External(external.share()),
        }
    }
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Buffer::Internal {
            items: Vec::new(),
            capacity: 0,
        }
    }
}

impl<T: Clone> Buffer<T> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Buffer::Internal { items, .. } => items.len(),
            Buffer::External(external) => external.len(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        match self {
            Buffer::Internal { capacity, .. } => *capacity,
            Buffer::External(external) => external.len(),
        }
    }

    #[inline]
    pub(crate) fn is_external(&self) -> bool {
        matches!(self, Buffer::External(_))
    }

    pub(crate) fn get(&self, index: usize) -> Result<T> {
        let found = match self {
            Buffer::Internal { items, .. } => items.get(index).cloned(),
            Buffer::External(external) => external.at(index),
        };
        found.ok_or(Error::OutOfBounds {
            index,
            len: self.len(),
        })
    }

    pub(crate) fn set(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.len();
        let written = match self {
            Buffer::Internal { items, .. } => match items.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            Buffer::External(external) => external.set_at(index, value),
        };
        if written {
            Ok(())
        } else {
            Err(Error::OutOfBounds { index, len })
        }
    }

    /// Run `f` over the current elements.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        match self {
            Buffer::Internal { items, .. } => f(items),
            Buffer::External(external) => f(&external.borrow()),
        }
    }

    fn internal_mut(&mut self) -> Result<(&mut Vec<T>, &mut usize)> {
        match self {
            Buffer::Internal { items, capacity } => Ok((items, capacity)),
            Buffer::External(_) => Err(Error::ExternalStorage),
        }
    }

    pub(crate) fn reserve(&mut self, target: usize) -> Result<()> {
        let (items, capacity) = self.internal_mut()?;
        if target > *capacity {
            items.reserve_exact(target - items.len());
            *capacity = target;
        }
        Ok(())
    }

    pub(crate) fn push(&mut self, value: T) -> Result<()> {
        let (items, capacity) = self.internal_mut()?;
        if items.len() == *capacity {
            let grown = (*capacity * 2).max(1);
            items.reserve_exact(grown - items.len());
            *capacity = grown;
        }
        items.push(value);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Option<T>> {
        let (items, _) = self.internal_mut()?;
        Ok(items.pop())
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Result<T> {
        let (items, _) = self.internal_mut()?;
        if index >= items.len() {
            return Err(Error::OutOfBounds {
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    /// Resize to exactly `len` elements, filling with `fill`. Zero releases the allocation.
    pub(crate) fn resize_with(&mut self, len: usize, fill: impl FnMut() -> T) -> Result<()> {
        let (items, capacity) = self.internal_mut()?;
        if len == 0 {
            *items = Vec::new();
            *capacity = 0;
        } else {
            items.resize_with(len, fill);
            *capacity = (*capacity).max(len);
        }
        Ok(())
    }

    pub(crate) fn clear(&mut self) -> Result<()> {
        let (items, _) = self.internal_mut()?;
        items.clear();
        Ok(())
    }
}

/// Per-kind datum storage.
#[derive(Debug, Clone, Default)]
pub enum Storage {
    #[default]
    Unknown,
    Integer(Buffer<i32>),
    Float(Buffer<f32>),
    String(Buffer<String>),
    Vector(Buffer<Vec4>),
    Matrix(Buffer<Mat4>),
    Pointer(Buffer<Pointer>),
    Table(Buffer<Handle>),
}

/// Dispatch an expression over the buffer of whichever kind the storage holds.
macro_rules! with_buffer {
    ($storage:expr, $buffer:ident => $body:expr, unknown => $unknown:expr) => {
        match $storage {
            Storage::Unknown => $unknown,
            Storage::Integer($buffer) => $body,
            Storage::Float($buffer) => $body,
            Storage::String($buffer) => $body,
            Storage::Vector($buffer) => $body,
            Storage::Matrix($buffer) => $body,
            Storage::Pointer($buffer) => $body,
            Storage::Table($buffer) => $body,
        }
    };
}
pub(crate) use with_buffer;

impl Storage {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Storage::Unknown => Kind::Unknown,
            Storage::Integer(_) => Kind::Integer,
            Storage::Float(_) => Kind::Float,
            Storage::String(_) => Kind::String,
            Storage::Vector(_) => Kind::Vector,
            Storage::Matrix(_) => Kind::Matrix,
            Storage::Pointer(_) => Kind::Pointer,
            Storage::Table(_) => Kind::Table,
        }
    }

    /// Empty internal storage for `kind`.
    pub(crate) fn empty(kind: Kind) -> Self {
        match kind {
            Kind::Unknown => Storage::Unknown,
            Kind::Integer => Storage::Integer(Buffer::default()),
            Kind::Float => Storage::Float(Buffer::default()),
            Kind::String => Storage::String(Buffer::default()),
            Kind::Vector => Storage::Vector(Buffer::default()),
            Kind::Matrix => Storage::Matrix(Buffer::default()),
            Kind::Pointer => Storage::Pointer(Buffer::default()),
            Kind::Table => Storage::Table(Buffer::default()),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A type a datum can hold elements of.
///
/// Implemented for `i32`, `f32`, `String`, [`Vec4`], [`Mat4`] and [`Pointer`]. Table elements are
/// hierarchy handles and are managed through [`Hierarchy`](crate::reflect::Hierarchy) instead.
pub trait Value: Clone + Default + fmt::Debug + 'static + sealed::Sealed {
    const KIND: Kind;

    #[doc(hidden)]
    fn buffer(storage: &Storage) -> Option<&Buffer<Self>>;

    #[doc(hidden)]
    fn buffer_mut(storage: &mut Storage) -> Option<&mut Buffer<Self>>;

    #[doc(hidden)]
    fn wrap(buffer: Buffer<Self>) -> Storage;

    #[doc(hidden)]
    fn binding(external: External<Self>) -> Binding;

    /// Element equality as datums see it.
    fn same(&self, other: &Self) -> bool;

    fn to_text(&self) -> String;

    fn from_text(text: &str) -> Result<Self>;
}

macro_rules! impl_value {
    ($ty:ty, $variant:ident, $same:expr, $to_text:expr, $from_text:expr) => {
        impl sealed::Sealed for $ty {}

        impl Value for $ty {
            const KIND: Kind = Kind::$variant;

            #[inline]
            fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
                match storage {
                    Storage::$variant(buffer) => Some(buffer),
                    _ => None,
                }
            }

            #[inline]
            fn buffer_mut(storage: &mut Storage) -> Option<&mut Buffer<Self>> {
                match storage {
                    Storage::$variant(buffer) => Some(buffer),
                    _ => None,
                }
            }

            #[inline]
            fn wrap(buffer: Buffer<Self>) -> Storage {
                Storage::$variant(buffer)
            }

            #[inline]
            fn binding(external: External<Self>) -> Binding {
                Binding::$variant(external)
            }

            fn same(&self, other: &Self) -> bool {
                let same: fn(&Self, &Self) -> bool = $same;
                same(self, other)
            }

            fn to_text(&self) -> String {
                let to_text: fn(&Self) -> String = $to_text;
                to_text(self)
            }

            fn from_text(text: &str) -> Result<Self> {
                let from_text: fn(&str) -> Result<Self> = $from_text;
                from_text(text)
            }
        }
    };
}

impl_value!(
    i32,
    Integer,
    |a, b| a == b,
    |v| v.to_string(),
    text::parse_integer
);
impl_value!(
    f32,
    Float,
    |a, b| a.to_bits() == b.to_bits(),
    |v| text::format_float(*v),
    text::parse_float
);
impl_value!(
    String,
    String,
    |a, b| a == b,
    |v| v.clone(),
    |text| Ok(text.to_string())
);
impl_value!(
    Vec4,
    Vector,
    |a, b| a.to_array().map(f32::to_bits) == b.to_array().map(f32::to_bits),
    |v| text::format_vector(*v),
    text::parse_vector
);
impl_value!(
    Mat4,
    Matrix,
    |a, b| a.to_cols_array().map(f32::to_bits) == b.to_cols_array().map(f32::to_bits),
    |v| text::format_matrix(*v),
    text::parse_matrix
);
impl_value!(
    Pointer,
    Pointer,
    |a, b| a == b,
    |v| v.to_string(),
    |text| Err(Error::Parse {
        kind: Kind::Pointer,
        text: text.to_string(),
    })
);
