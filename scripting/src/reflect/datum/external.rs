use std::{
    cell::{Ref, RefCell},
    fmt,
    rc::Rc,
};

/// Fixed-length storage owned by a reflected struct and aliased by a [`Datum`](super::Datum).
///
/// A reflected type declares its prescribed attributes as `External<T>` fields. When an instance
/// enters a [`Hierarchy`](crate::reflect::Hierarchy), each field is shared with the datum of the
/// same name, so reads and writes through either side observe the same values.
///
/// Cloning an `External` copies the values into fresh storage. Use [`share()`](Self::share) to
/// alias instead.
pub struct External<T> {
    cells: Rc<RefCell<Box<[T]>>>,
}

impl<T> External<T> {
    /// Wrap the given values.
    pub fn new(values: impl Into<Box<[T]>>) -> Self {
        Self {
            cells: Rc::new(RefCell::new(values.into())),
        }
    }

    /// Storage holding a single value.
    pub fn single(value: T) -> Self {
        Self::new(vec![value])
    }

    /// Storage holding `len` default values.
    pub fn filled(len: usize) -> Self
    where
        T: Default,
    {
        Self::new((0..len).map(|_| T::default()).collect::<Vec<_>>())
    }

    /// A second handle onto the same storage.
    #[inline]
    pub fn share(&self) -> Self {
        Self {
            cells: Rc::clone(&self.cells),
        }
    }

    /// True if both handles alias the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow all values.
    pub fn borrow(&self) -> Ref<'_, [T]> {
        Ref::map(self.cells.borrow(), |cells| &**cells)
    }

    /// Overwrite the value at `index`. Returns false if out of bounds.
    pub fn set_at(&self, index: usize, value: T) -> bool {
        match self.cells.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Overwrite the first value.
    ///
    /// # Panics
    ///
    /// Panics if the storage is empty.
    pub fn set(&self, value: T) {
        assert!(self.set_at(0, value), "external storage is empty");
    }
}

impl<T: Clone> External<T> {
    /// A copy of the value at `index`.
    pub fn at(&self, index: usize) -> Option<T> {
        self.cells.borrow().get(index).cloned()
    }

    /// A copy of the first value.
    ///
    /// # Panics
    ///
    /// Panics if the storage is empty.
    pub fn get(&self) -> T {
        match self.at(0) {
            Some(value) => value,
            None => panic!("external storage is empty"),
        }
    }

    /// A copy of every value.
    pub fn to_vec(&self) -> Vec<T> {
        self.cells.borrow().to_vec()
    }
}

impl<T: Clone> Clone for External<T> {
    fn clone(&self) -> Self {
        Self::new(self.to_vec())
    }
}

impl<T: Default> Default for External<T> {
    fn default() -> Self {
        Self::filled(1)
    }
}

impl<T: PartialEq> PartialEq for External<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.cells.borrow() == *other.cells.borrow()
    }
}

impl<T: fmt::Debug> fmt::Debug for External<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("External").field(&&**self.cells.borrow()).finish()
    }
}

impl<T> From<Vec<T>> for External<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}
