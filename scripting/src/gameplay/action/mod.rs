//! Actions: small reflected behaviours attached to game objects and action lists.
//!
//! Every action has a prescribed `Name`. Actions live in an `Actions` table of their owner and
//! run once per frame when the owner updates.
//!
//! ```rust,ignore
//! let bump = GameObject::create_action(&mut tree, player, "ActionIncrement", "Bump")?;
//! tree.get::<ActionIncrement>(bump)?.set_target("Health");
//! ```

mod create;
mod destroy;
mod increment;
mod list;

pub use create::ActionCreateAction;
pub use destroy::ActionDestroyAction;
pub use increment::ActionIncrement;
pub use list::{ActionList, ActionListWhile};

use log::debug;

use crate::{
    error::{Error, Result},
    reflect::{Handle, Hierarchy},
};

/// Attribute holding an action's instance name.
pub const NAME: &str = "Name";

/// Table attribute holding an owner's actions.
pub const ACTIONS: &str = "Actions";

/// Create an action of `class_name` by factory, name it `instance_name` and append it to
/// `owner`'s `Actions`.
///
/// The class must prescribe a `Name` attribute. On failure nothing is left in the tree.
pub fn create_action(
    tree: &mut Hierarchy,
    owner: Handle,
    class_name: &str,
    instance_name: &str,
) -> Result<Handle> {
    tree.node(owner)?;
    let action = tree.create_class(class_name)?;
    if let Err(error) = name_and_adopt(tree, owner, action, instance_name) {
        tree.destroy(action)?;
        return Err(error);
    }
    debug!("created {class_name} {instance_name:?} under {owner}");
    Ok(action)
}

fn name_and_adopt(tree: &mut Hierarchy, owner: Handle, action: Handle, name: &str) -> Result<()> {
    if !tree.is_prescribed_attribute(action, NAME)? {
        return Err(Error::MissingAttribute(NAME.to_string()));
    }
    tree.scope_mut(action)?
        .find_mut(NAME)
        .ok_or_else(|| Error::MissingAttribute(NAME.to_string()))?
        .set(0, name.to_string())?;
    tree.adopt(owner, action, ACTIONS)
}

/// The instance name of the action at `handle`, if it has one.
pub fn action_name(tree: &Hierarchy, handle: Handle) -> Option<String> {
    tree.scope(handle).ok()?.find(NAME)?.front::<String>().ok()
}

/// The action named `name` in `owner`'s `Actions`.
pub fn find_action(tree: &Hierarchy, owner: Handle, name: &str) -> Option<Handle> {
    tree.scope(owner)
        .ok()?
        .find(ACTIONS)?
        .handles()
        .iter()
        .copied()
        .find(|action| action_name(tree, *action).as_deref() == Some(name))
}
