//! Dynamically typed, variable length value containers.
//!
//! A [`Datum`] holds a homogeneous array of one [`Kind`] of value. It starts out empty and
//! [`Kind::Unknown`], becomes typed on first write, and keeps that kind for the rest of its life.
//!
//! # Storage
//!
//! Storage is either *internal*, owned by the datum and grown by doubling, or *external*, a view
//! over an [`External`] field of a reflected struct. External datums read and write through to
//! the field and never reallocate, so every operation that would change their length fails with
//! [`Error::ExternalStorage`].
//!
//! # Typed access
//!
//! Element access is generic over [`Value`]:
//!
//! ```rust,ignore
//! let mut datum = Datum::new();
//! datum.push_back(10)?;            // now an integer datum
//! datum.push_back(20)?;
//! assert_eq!(datum.get::<i32>(1)?, 20);
//! assert!(datum.get::<f32>(0).is_err()); // wrong kind
//! ```
//!
//! # Tables
//!
//! Table datums hold [`Handle`]s to child scopes. Those elements belong to the owning
//! [`Hierarchy`](crate::reflect::Hierarchy); only hierarchy operations add or remove them.

mod external;
mod kind;
pub(crate) mod text;
mod value;

pub use external::External;
pub use kind::Kind;
pub use value::{Pointer, Value};

use glam::{Mat4, Vec4};

use crate::{
    error::{Error, Result},
    reflect::Handle,
};
use value::{Buffer, Storage, with_buffer};

/// A typed, homogeneous array of values. See the [module documentation](self).
#[derive(Debug, Clone, Default)]
pub struct Datum {
    storage: Storage,
}

impl Datum {
    /// An empty datum of unknown kind.
    #[inline]
    pub const fn new() -> Self {
        Self {
            storage: Storage::Unknown,
        }
    }

    /// An empty datum of the given kind.
    pub fn with_kind(kind: Kind) -> Self {
        Self {
            storage: Storage::empty(kind),
        }
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.storage.kind()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_buffer!(&self.storage, buffer => buffer.len(), unknown => 0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements the datum can hold without growing.
    pub fn capacity(&self) -> usize {
        with_buffer!(&self.storage, buffer => buffer.capacity(), unknown => 0)
    }

    /// True if the datum is a view over an [`External`].
    pub fn is_external(&self) -> bool {
        with_buffer!(&self.storage, buffer => buffer.is_external(), unknown => false)
    }

    /// Assign the datum's kind. Setting the kind it already has is a no-op.
    pub fn set_kind(&mut self, kind: Kind) -> Result<()> {
        let current = self.kind();
        if current == kind {
            Ok(())
        } else if current == Kind::Unknown {
            self.storage = Storage::empty(kind);
            Ok(())
        } else {
            Err(Error::KindReassignment {
                current,
                requested: kind,
            })
        }
    }

    /// Grow capacity to at least `capacity`. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        with_buffer!(&mut self.storage, buffer => buffer.reserve(capacity), unknown => Err(Error::UnknownKind))
    }

    /// Change the number of elements, filling new ones with defaults.
    ///
    /// Resizing to zero releases the allocation. Unknown datums can only be resized to zero.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        match &mut self.storage {
            Storage::Unknown if len == 0 => Ok(()),
            Storage::Unknown => Err(Error::UnknownKind),
            Storage::Table(_) => Err(Error::TableStorage),
            Storage::Integer(buffer) => buffer.resize_with(len, Default::default),
            Storage::Float(buffer) => buffer.resize_with(len, Default::default),
            Storage::String(buffer) => buffer.resize_with(len, Default::default),
            Storage::Vector(buffer) => buffer.resize_with(len, Default::default),
            Storage::Matrix(buffer) => buffer.resize_with(len, Default::default),
            Storage::Pointer(buffer) => buffer.resize_with(len, Default::default),
        }
    }

    /// Remove every element, keeping capacity.
    pub fn clear(&mut self) -> Result<()> {
        match &mut self.storage {
            Storage::Unknown => Ok(()),
            Storage::Table(buffer) if buffer.len() > 0 => Err(Error::TableStorage),
            storage => with_buffer!(storage, buffer => buffer.clear(), unknown => Ok(())),
        }
    }

    /// Turn this datum into a view over `external`.
    ///
    /// Fails if the datum already holds a different kind or owns internal storage. A datum that is
    /// already external may be re-pointed at another field.
    pub fn set_storage<T: Value>(&mut self, external: External<T>) -> Result<()> {
        self.set_kind(T::KIND)?;
        if self.capacity() > 0 && !self.is_external() {
            return Err(Error::StorageInUse);
        }
        self.storage = T::wrap(Buffer::External(external));
        Ok(())
    }

    fn buffer<T: Value>(&self) -> Result<&Buffer<T>> {
        T::buffer(&self.storage).ok_or(Error::KindMismatch {
            expected: T::KIND,
            actual: self.kind(),
        })
    }

    fn buffer_mut<T: Value>(&mut self) -> Result<&mut Buffer<T>> {
        let actual = self.kind();
        T::buffer_mut(&mut self.storage).ok_or(Error::KindMismatch {
            expected: T::KIND,
            actual,
        })
    }

    /// Append a value, assigning the kind on first use.
    pub fn push_back<T: Value>(&mut self, value: T) -> Result<()> {
        self.set_kind(T::KIND)?;
        self.buffer_mut::<T>()?.push(value)
    }

    /// Remove the last element, if any.
    pub fn pop_back(&mut self) -> Result<()> {
        match &mut self.storage {
            Storage::Unknown => Err(Error::UnknownKind),
            Storage::Table(_) => Err(Error::TableStorage),
            storage => with_buffer!(storage, buffer => buffer.pop().map(drop), unknown => Ok(())),
        }
    }

    pub fn get<T: Value>(&self, index: usize) -> Result<T> {
        self.buffer::<T>()?.get(index)
    }

    pub fn set<T: Value>(&mut self, index: usize, value: T) -> Result<()> {
        self.buffer_mut::<T>()?.set(index, value)
    }

    pub fn front<T: Value>(&self) -> Result<T> {
        self.get(0)
    }

    pub fn back<T: Value>(&self) -> Result<T> {
        let buffer = self.buffer::<T>()?;
        match buffer.len() {
            0 => Err(Error::OutOfBounds { index: 0, len: 0 }),
            len => buffer.get(len - 1),
        }
    }

    /// Copy every element out.
    pub fn to_vec<T: Value>(&self) -> Result<Vec<T>> {
        Ok(self.buffer::<T>()?.with(|items| items.to_vec()))
    }

    /// Index of the first element equal to `value`.
    pub fn find<T: Value>(&self, value: &T) -> Result<Option<usize>> {
        Ok(self
            .buffer::<T>()?
            .with(|items| items.iter().position(|item| item.same(value))))
    }

    /// Remove the first element equal to `value`. Returns whether one was found.
    pub fn remove<T: Value>(&mut self, value: &T) -> Result<bool> {
        if self.is_external() {
            return Err(Error::ExternalStorage);
        }
        match self.find(value)? {
            Some(index) => self.remove_at(index).map(|_| true),
            None => Ok(false),
        }
    }

    /// Remove the element at `index`, shifting later elements down.
    pub fn remove_at(&mut self, index: usize) -> Result<()> {
        match &mut self.storage {
            Storage::Unknown => Err(Error::UnknownKind),
            Storage::Table(_) => Err(Error::TableStorage),
            storage => with_buffer!(storage, buffer => buffer.remove_at(index).map(drop), unknown => Ok(())),
        }
    }

    /// Reset the datum to hold exactly `value`.
    pub fn assign<T: Value>(&mut self, value: T) -> Result<()> {
        self.set_kind(T::KIND)?;
        let buffer = self.buffer_mut::<T>()?;
        buffer.clear()?;
        buffer.push(value)
    }

    /// Replace this datum's contents with a copy of `other`.
    ///
    /// Fails if this datum already holds a different kind. External views are copied as views.
    pub fn assign_from(&mut self, other: &Datum) -> Result<()> {
        let (current, requested) = (self.kind(), other.kind());
        if requested == Kind::Table || current == Kind::Table {
            return Err(Error::TableStorage);
        }
        if current != Kind::Unknown && current != requested {
            return Err(Error::KindReassignment { current, requested });
        }
        self.storage = other.storage.clone();
        Ok(())
    }

    /// Text form of the element at `index`.
    pub fn to_string_at(&self, index: usize) -> Result<String> {
        match &self.storage {
            Storage::Unknown => Err(Error::UnknownKind),
            Storage::Integer(buffer) => buffer.get(index).map(|v| v.to_text()),
            Storage::Float(buffer) => buffer.get(index).map(|v| v.to_text()),
            Storage::String(buffer) => buffer.get(index),
            Storage::Vector(buffer) => buffer.get(index).map(|v| v.to_text()),
            Storage::Matrix(buffer) => buffer.get(index).map(|v| v.to_text()),
            Storage::Pointer(buffer) => buffer.get(index).map(|v| v.to_text()),
            Storage::Table(buffer) => buffer.get(index).map(|h| h.to_string()),
        }
    }

    /// Parse `text` and store it at `index`.
    pub fn set_from_str(&mut self, index: usize, text: &str) -> Result<()> {
        match &mut self.storage {
            Storage::Integer(buffer) => buffer.set(index, Value::from_text(text)?),
            Storage::Float(buffer) => buffer.set(index, Value::from_text(text)?),
            Storage::String(buffer) => buffer.set(index, Value::from_text(text)?),
            Storage::Vector(buffer) => buffer.set(index, Value::from_text(text)?),
            Storage::Matrix(buffer) => buffer.set(index, Value::from_text(text)?),
            storage => Err(Self::untextual(storage.kind(), text)),
        }
    }

    /// Parse `text` and append it.
    pub fn push_back_from_str(&mut self, text: &str) -> Result<()> {
        match &mut self.storage {
            Storage::Integer(buffer) => buffer.push(Value::from_text(text)?),
            Storage::Float(buffer) => buffer.push(Value::from_text(text)?),
            Storage::String(buffer) => buffer.push(Value::from_text(text)?),
            Storage::Vector(buffer) => buffer.push(Value::from_text(text)?),
            Storage::Matrix(buffer) => buffer.push(Value::from_text(text)?),
            storage => Err(Self::untextual(storage.kind(), text)),
        }
    }

    fn untextual(kind: Kind, text: &str) -> Error {
        match kind {
            Kind::Unknown => Error::UnknownKind,
            Kind::Table => Error::TableStorage,
            kind => Error::Parse {
                kind,
                text: text.to_string(),
            },
        }
    }

    /// Child handles of a table datum. Empty for any other kind.
    pub fn handles(&self) -> &[Handle] {
        match &self.storage {
            Storage::Table(Buffer::Internal { items, .. }) => items.as_slice(),
            _ => &[],
        }
    }

    /// The child handle at `index` of a table datum.
    pub fn table(&self, index: usize) -> Result<Handle> {
        match &self.storage {
            Storage::Table(buffer) => buffer.get(index),
            _ => Err(Error::KindMismatch {
                expected: Kind::Table,
                actual: self.kind(),
            }),
        }
    }

    pub(crate) fn push_handle(&mut self, handle: Handle) -> Result<()> {
        self.set_kind(Kind::Table)?;
        match &mut self.storage {
            Storage::Table(buffer) => buffer.push(handle),
            _ => Err(Error::TableStorage),
        }
    }

    /// Remove `handle` from a table datum, returning the index it was at.
    pub(crate) fn remove_handle(&mut self, handle: Handle) -> Option<usize> {
        match &mut self.storage {
            Storage::Table(Buffer::Internal { items, .. }) => {
                let index = items.iter().position(|h| *h == handle)?;
                items.remove(index);
                Some(index)
            }
            _ => None,
        }
    }

    pub(crate) fn handles_mut(&mut self) -> &mut [Handle] {
        match &mut self.storage {
            Storage::Table(Buffer::Internal { items, .. }) => items.as_mut_slice(),
            _ => &mut [],
        }
    }
}

fn buffers_equal<T: Value>(a: &Buffer<T>, b: &Buffer<T>) -> bool {
    match (a, b) {
        (Buffer::External(a), Buffer::External(b)) => a.ptr_eq(b),
        (Buffer::Internal { items: a, .. }, Buffer::Internal { items: b, .. }) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same(b))
        }
        _ => false,
    }
}

impl PartialEq for Datum {
    /// Same kind, length and externality. External datums are equal only when they view the same
    /// field; internal ones compare element-wise. Table elements compare by handle.
    fn eq(&self, other: &Self) -> bool {
        match (&self.storage, &other.storage) {
            (Storage::Unknown, Storage::Unknown) => true,
            (Storage::Integer(a), Storage::Integer(b)) => buffers_equal(a, b),
            (Storage::Float(a), Storage::Float(b)) => buffers_equal(a, b),
            (Storage::String(a), Storage::String(b)) => buffers_equal(a, b),
            (Storage::Vector(a), Storage::Vector(b)) => buffers_equal(a, b),
            (Storage::Matrix(a), Storage::Matrix(b)) => buffers_equal(a, b),
            (Storage::Pointer(a), Storage::Pointer(b)) => buffers_equal(a, b),
            (Storage::Table(a), Storage::Table(b)) => {
                a.len() == b.len() && a.with(|a| b.with(|b| a == b))
            }
            _ => false,
        }
    }
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Datum {
                fn from(value: $ty) -> Self {
                    let buffer = Buffer::Internal {
                        items: vec![value],
                        capacity: 1,
                    };
                    Self { storage: <$ty as Value>::wrap(buffer) }
                }
            }

            impl PartialEq<$ty> for Datum {
                /// True if the datum holds exactly one element equal to `other`.
                fn eq(&self, other: &$ty) -> bool {
                    self.len() == 1
                        && self.get::<$ty>(0).is_ok_and(|value| value.same(other))
                }
            }
        )*
    };
}

impl_scalar!(i32, f32, String, Vec4, Mat4, Pointer);

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::from(value.to_string())
    }
}

impl PartialEq<&str> for Datum {
    fn eq(&self, other: &&str) -> bool {
        self.len() == 1 && self.get::<String>(0).is_ok_and(|value| value == *other)
    }
}
