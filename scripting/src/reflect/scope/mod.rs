//! Named, ordered attribute tables arranged in a tree.
//!
//! A [`Scope`] is an insertion-ordered list of `(name, Datum)` pairs with a hash index for O(1)
//! lookup by name. Scopes form a tree through [`Kind::Table`] datums whose elements are
//! [`Handle`]s of child scopes.
//!
//! # Ownership
//!
//! Every scope lives in a [`Hierarchy`], a generational arena that owns all nodes and performs
//! every operation touching more than one of them: creating children, adoption, orphaning,
//! searching up and down the tree, deep copies and destruction. A child has exactly one parent,
//! and the hierarchy rejects any re-parenting that would create a cycle.
//!
//! ```rust,ignore
//! let mut tree = Hierarchy::default();
//! let root = tree.new_scope();
//! let child = tree.append_scope(root, "Children")?;
//! tree.scope_mut(child)?.append("Health")?.push_back(100)?;
//!
//! assert_eq!(tree.search(child, "Children").map(|(at, _)| at), Some(root));
//! ```
//!
//! # Polymorphism
//!
//! Nodes are stored as `Box<dyn Node>`. A plain [`Scope`] is a node; reflected types derived
//! with `#[derive(Attributed)]` are nodes that carry a scope plus typed fields.

mod handle;
mod hierarchy;
mod node;

pub use handle::{Generation, Handle};
pub use hierarchy::Hierarchy;
pub use node::Node;
pub(crate) use node::short_type_name;

use std::{
    collections::HashMap,
    ops::{Index, IndexMut},
};

use crate::{
    error::{Error, Result},
    reflect::{Datum, Kind},
};

/// An ordered table of named datums. See the [module documentation](self).
///
/// Cloning a scope copies its datums verbatim, including the child handles of table datums. Use
/// [`Hierarchy::clone_scope`] for a deep copy.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// This scope's own slot, once placed in a hierarchy.
    handle: Option<Handle>,

    /// The scope whose table datum holds this one.
    parent: Option<Handle>,

    /// Attributes in insertion order.
    attributes: Vec<(String, Datum)>,

    /// Name to position in `attributes`.
    index: HashMap<String, usize>,
}

impl Scope {
    /// Class name of plain scopes.
    pub const CLASS_NAME: &'static str = "Scope";

    /// Name of the self-reference attribute of reflected types.
    pub const THIS: &'static str = "this";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handle: None,
            parent: None,
            attributes: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// The slot this scope occupies in its hierarchy.
    #[inline]
    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    #[inline]
    pub fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) fn set_handle(&mut self, handle: Option<Handle>) {
        self.handle = handle;
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    /// Number of attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The datum named `name`, inserting an empty one at the end if there is none.
    pub fn append(&mut self, name: &str) -> Result<&mut Datum> {
        Ok(self.append_entry(name)?.0)
    }

    /// Like [`append`](Self::append), also reporting whether the datum was inserted.
    pub fn append_entry(&mut self, name: &str) -> Result<(&mut Datum, bool)> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        let (position, inserted) = match self.index.get(name) {
            Some(&position) => (position, false),
            None => {
                let position = self.attributes.len();
                self.attributes.push((name.to_string(), Datum::new()));
                self.index.insert(name.to_string(), position);
                (position, true)
            }
        };
        Ok((&mut self.attributes[position].1, inserted))
    }

    /// Direct lookup. Does not search ancestors.
    pub fn find(&self, name: &str) -> Option<&Datum> {
        self.index.get(name).map(|&i| &self.attributes[i].1)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Datum> {
        self.index.get(name).map(|&i| &mut self.attributes[i].1)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of `name` in insertion order.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// The datum at `index` in insertion order.
    pub fn get(&self, index: usize) -> Option<&Datum> {
        self.attributes.get(index).map(|(_, datum)| datum)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Datum> {
        self.attributes.get_mut(index).map(|(_, datum)| datum)
    }

    /// The attribute name at `index` in insertion order.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.attributes.get(index).map(|(name, _)| name.as_str())
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.attributes
            .iter()
            .map(|(name, datum)| (name.as_str(), datum))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Datum)> {
        self.attributes
            .iter_mut()
            .map(|(name, datum)| (name.as_str(), datum))
    }

    /// Every child handle, in attribute then element order.
    pub fn children(&self) -> impl Iterator<Item = Handle> + '_ {
        self.attributes
            .iter()
            .flat_map(|(_, datum)| datum.handles().iter().copied())
    }

    /// Locate `child` among this scope's table datums as `(attribute index, element index)`.
    pub fn find_child(&self, child: Handle) -> Option<(usize, usize)> {
        self.attributes
            .iter()
            .enumerate()
            .find_map(|(i, (_, datum))| {
                datum
                    .handles()
                    .iter()
                    .position(|h| *h == child)
                    .map(|j| (i, j))
            })
    }

    /// Positions of every table datum.
    pub(crate) fn table_positions(&self) -> Vec<usize> {
        self.attributes
            .iter()
            .enumerate()
            .filter(|(_, (_, datum))| datum.kind() == Kind::Table)
            .map(|(i, _)| i)
            .collect()
    }
}

impl PartialEq for Scope {
    /// Pairwise comparison of attributes in order, ignoring the self-reference. Table datums
    /// compare by child handle; [`Hierarchy::equals`] compares subtrees.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((a_name, a), (b_name, b))| {
                    a_name == b_name && (a_name == Scope::THIS || a == b)
                })
    }
}

impl Index<&str> for Scope {
    type Output = Datum;

    fn index(&self, name: &str) -> &Datum {
        match self.find(name) {
            Some(datum) => datum,
            None => panic!("no attribute named {name:?}"),
        }
    }
}

impl IndexMut<&str> for Scope {
    fn index_mut(&mut self, name: &str) -> &mut Datum {
        match self.find_mut(name) {
            Some(datum) => datum,
            None => panic!("no attribute named {name:?}"),
        }
    }
}

impl Index<usize> for Scope {
    type Output = Datum;

    fn index(&self, index: usize) -> &Datum {
        &self.attributes[index].1
    }
}

impl IndexMut<usize> for Scope {
    fn index_mut(&mut self, index: usize) -> &mut Datum {
        &mut self.attributes[index].1
    }
}
