use glam::Vec4;

use super::{
    Behavior, Updater,
    action::{self, ACTIONS},
};
use crate::{
    error::{Error, Result},
    reflect::{Attributed, Datum, External, Handle, Hierarchy, Scope},
};

/// A named, placed object in the scene, owning child objects and a list of actions.
///
/// Updating a game object updates every child, then every action.
#[derive(Debug, Clone, Attributed)]
#[table("Children")]
#[table("Actions")]
pub struct GameObject {
    #[scope]
    scope: Scope,
    #[attribute("Name")]
    name: External<String>,
    #[attribute("Position")]
    position: External<Vec4>,
    #[attribute("Rotation")]
    rotation: External<Vec4>,
    #[attribute("Scale")]
    scale: External<Vec4>,
}

impl Default for GameObject {
    fn default() -> Self {
        Self {
            scope: Scope::new(),
            name: External::default(),
            position: External::single(Vec4::ZERO),
            rotation: External::single(Vec4::ZERO),
            scale: External::single(Vec4::ONE),
        }
    }
}

impl GameObject {
    pub const CHILDREN: &'static str = "Children";
    pub const ACTIONS: &'static str = ACTIONS;

    #[inline]
    pub fn name(&self) -> String {
        self.name.get()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.name.set(name.into());
    }

    #[inline]
    pub fn position(&self) -> Vec4 {
        self.position.get()
    }

    pub fn set_position(&self, position: Vec4) {
        self.position.set(position);
    }

    #[inline]
    pub fn rotation(&self) -> Vec4 {
        self.rotation.get()
    }

    pub fn set_rotation(&self, rotation: Vec4) {
        self.rotation.set(rotation);
    }

    #[inline]
    pub fn scale(&self) -> Vec4 {
        self.scale.get()
    }

    pub fn set_scale(&self, scale: Vec4) {
        self.scale.set(scale);
    }

    /// The `index`th entry of the object's `Children`.
    pub fn child(tree: &Hierarchy, handle: Handle, index: usize) -> Result<Handle> {
        table(tree, handle, Self::CHILDREN)?.table(index)
    }

    /// The `index`th entry of the object's `Actions`.
    pub fn action(tree: &Hierarchy, handle: Handle, index: usize) -> Result<Handle> {
        table(tree, handle, Self::ACTIONS)?.table(index)
    }

    /// Create an action of `class_name`, name it `instance_name` and append it to the object's
    /// `Actions`.
    pub fn create_action(
        tree: &mut Hierarchy,
        handle: Handle,
        class_name: &str,
        instance_name: &str,
    ) -> Result<Handle> {
        tree.get::<Self>(handle)?;
        action::create_action(tree, handle, class_name, instance_name)
    }
}

impl Behavior for GameObject {
    fn update(updater: &Updater<'_>, tree: &mut Hierarchy, handle: Handle) -> Result<()> {
        updater.update_table(tree, handle, Self::CHILDREN)?;
        updater.update_table(tree, handle, Self::ACTIONS)
    }
}

fn table<'a>(tree: &'a Hierarchy, handle: Handle, name: &str) -> Result<&'a Datum> {
    tree.scope(handle)?
        .find(name)
        .ok_or_else(|| Error::MissingAttribute(name.to_string()))
}
