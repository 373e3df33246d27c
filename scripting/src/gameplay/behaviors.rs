use std::{any::TypeId, collections::HashMap, fmt};

use log::warn;

use super::{
    ActionCreateAction, ActionDestroyAction, ActionIncrement, ActionList, ActionListWhile,
    GameObject, GameTime,
};
use crate::{
    error::Result,
    reflect::{Attributed, Handle, Hierarchy, Node, scope::short_type_name},
};

/// Per-frame update of one node, given the walker driving the frame.
pub type UpdateFn = fn(&Updater<'_>, &mut Hierarchy, Handle) -> Result<()>;

/// A reflected type with per-frame behaviour.
pub trait Behavior: Attributed {
    fn update(updater: &Updater<'_>, tree: &mut Hierarchy, handle: Handle) -> Result<()>;
}

/// Update functions keyed by node type.
///
/// Nodes whose type has no entry, plain scopes included, are inert: the [`Updater`] passes over
/// them without descending.
#[derive(Default)]
pub struct Behaviors {
    updates: HashMap<TypeId, (&'static str, UpdateFn)>,
}

impl Behaviors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behaviours of every built-in gameplay type.
    pub fn standard() -> Self {
        let mut behaviors = Self::new();
        behaviors.add::<GameObject>();
        behaviors.add::<ActionList>();
        behaviors.add::<ActionListWhile>();
        behaviors.add::<ActionIncrement>();
        behaviors.add::<ActionCreateAction>();
        behaviors.add::<ActionDestroyAction>();
        behaviors
    }

    /// Install `T`'s [`Behavior`]. Returns false and keeps the existing entry if `T` already has
    /// one.
    pub fn add<T: Behavior>(&mut self) -> bool {
        self.add_fn::<T>(T::update)
    }

    /// Install an arbitrary update function for nodes of type `T`.
    pub fn add_fn<T: Node>(&mut self, update: UpdateFn) -> bool {
        let name = short_type_name::<T>();
        if self.updates.contains_key(&TypeId::of::<T>()) {
            warn!("behavior for {name} already installed");
            return false;
        }
        self.updates.insert(TypeId::of::<T>(), (name, update));
        true
    }

    pub fn remove<T: Node>(&mut self) -> bool {
        self.updates.remove(&TypeId::of::<T>()).is_some()
    }

    #[inline]
    pub fn contains<T: Node>(&self) -> bool {
        self.updates.contains_key(&TypeId::of::<T>())
    }

    /// The update function for nodes whose concrete type is `type_id`.
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<UpdateFn> {
        self.updates.get(&type_id).map(|(_, update)| *update)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

impl fmt::Debug for Behaviors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.updates.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_struct("Behaviors").field("types", &names).finish()
    }
}

/// Walks a scope tree for one frame, dispatching each node to its behaviour.
#[derive(Debug, Clone, Copy)]
pub struct Updater<'a> {
    behaviors: &'a Behaviors,
    time: &'a GameTime,
}

impl<'a> Updater<'a> {
    pub fn new(behaviors: &'a Behaviors, time: &'a GameTime) -> Self {
        Self { behaviors, time }
    }

    #[inline]
    pub fn time(&self) -> &GameTime {
        self.time
    }

    #[inline]
    pub fn behaviors(&self) -> &Behaviors {
        self.behaviors
    }

    /// Run the behaviour of the node at `handle`, if its type has one.
    pub fn update(&self, tree: &mut Hierarchy, handle: Handle) -> Result<()> {
        let type_id = tree.node(handle)?.as_any().type_id();
        match self.behaviors.get(type_id) {
            Some(update) => update(self, tree, handle),
            None => Ok(()),
        }
    }

    /// Update every child held by `handle`'s table attribute `name`, in order.
    ///
    /// The children are those present when the walk starts. Ones destroyed along the way are
    /// skipped; ones added along the way run from the next frame.
    pub fn update_table(&self, tree: &mut Hierarchy, handle: Handle, name: &str) -> Result<()> {
        let children = match tree.scope(handle)?.find(name) {
            Some(datum) => datum.handles().to_vec(),
            None => return Ok(()),
        };
        for child in children {
            if tree.contains(child) {
                self.update(tree, child)?;
            }
        }
        Ok(())
    }
}
