use log::warn;

use super::create_action;
use crate::{
    error::Result,
    gameplay::{Behavior, Updater},
    reflect::{Attributed, External, Handle, Hierarchy, Scope},
};

/// Each update, creates an action of `ClassName` named `InstanceName` in its owner's `Actions`.
#[derive(Debug, Clone, Default, Attributed)]
pub struct ActionCreateAction {
    scope: Scope,
    #[attribute("Name")]
    name: External<String>,
    #[attribute("ClassName")]
    class_name: External<String>,
    #[attribute("InstanceName")]
    instance_name: External<String>,
}

impl ActionCreateAction {
    #[inline]
    pub fn name(&self) -> String {
        self.name.get()
    }

    #[inline]
    pub fn class_name(&self) -> String {
        self.class_name.get()
    }

    pub fn set_class_name(&self, class_name: impl Into<String>) {
        self.class_name.set(class_name.into());
    }

    #[inline]
    pub fn instance_name(&self) -> String {
        self.instance_name.get()
    }

    pub fn set_instance_name(&self, instance_name: impl Into<String>) {
        self.instance_name.set(instance_name.into());
    }
}

impl Behavior for ActionCreateAction {
    fn update(_: &Updater<'_>, tree: &mut Hierarchy, handle: Handle) -> Result<()> {
        let action = tree.get::<Self>(handle)?;
        let (class_name, instance_name) = (action.class_name(), action.instance_name());
        if class_name.is_empty() || instance_name.is_empty() {
            warn!("{handle}: ClassName and InstanceName must both be set");
            return Ok(());
        }
        let Some(owner) = tree.parent(handle)? else {
            warn!("{handle}: no owner to create {class_name} in");
            return Ok(());
        };
        create_action(tree, owner, &class_name, &instance_name).map(drop)
    }
}
