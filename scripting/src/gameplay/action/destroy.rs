use log::{debug, warn};

use super::find_action;
use crate::{
    error::Result,
    gameplay::{Behavior, Updater},
    reflect::{Attributed, External, Handle, Hierarchy, Scope},
};

/// Destroys the action named `InstanceName` in its owner's `Actions`.
#[derive(Debug, Clone, Default, Attributed)]
pub struct ActionDestroyAction {
    scope: Scope,
    #[attribute("Name")]
    name: External<String>,
    #[attribute("InstanceName")]
    instance_name: External<String>,
}

impl ActionDestroyAction {
    #[inline]
    pub fn name(&self) -> String {
        self.name.get()
    }

    #[inline]
    pub fn instance_name(&self) -> String {
        self.instance_name.get()
    }

    pub fn set_instance_name(&self, instance_name: impl Into<String>) {
        self.instance_name.set(instance_name.into());
    }
}

impl Behavior for ActionDestroyAction {
    fn update(_: &Updater<'_>, tree: &mut Hierarchy, handle: Handle) -> Result<()> {
        let instance_name = tree.get::<Self>(handle)?.instance_name();
        if instance_name.is_empty() {
            warn!("{handle}: InstanceName must be set");
            return Ok(());
        }
        let Some(owner) = tree.parent(handle)? else {
            warn!("{handle}: no owner to destroy {instance_name:?} in");
            return Ok(());
        };
        match find_action(tree, owner, &instance_name) {
            Some(target) => tree.destroy(target),
            None => {
                debug!("{handle}: no action {instance_name:?} under {owner}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::{
        ActionIncrement, Behaviors, GameObject, GameTime, action::create_action, tests::context,
    };

    fn tick(tree: &mut Hierarchy, handle: Handle) {
        let behaviors = Behaviors::standard();
        let time = GameTime::default();
        Updater::new(&behaviors, &time).update(tree, handle).unwrap();
    }

    /// A game object with `Count`, a destroyer of `victim`, then an increment of `Count` named
    /// "Bump".
    fn setup(victim: &str) -> (Hierarchy, Handle, Handle) {
        let mut tree = Hierarchy::new(context());
        let object = tree.create::<GameObject>().unwrap();
        tree.append(object, "Count").unwrap().push_back(0.0f32).unwrap();
        let destroyer =
            create_action(&mut tree, object, ActionDestroyAction::CLASS_NAME, "Reaper").unwrap();
        tree.get::<ActionDestroyAction>(destroyer)
            .unwrap()
            .set_instance_name(victim);
        let bump = create_action(&mut tree, object, ActionIncrement::CLASS_NAME, "Bump").unwrap();
        tree.get::<ActionIncrement>(bump).unwrap().set_target("Count");
        (tree, object, destroyer)
    }

    #[test]
    fn destroys_the_named_sibling() {
        // Given
        let (mut tree, object, destroyer) = setup("Bump");
        let live = tree.len();

        // When
        tick(&mut tree, object);

        // Then: the increment is gone before its turn comes.
        assert_eq!(find_action(&tree, object, "Bump"), None);
        assert_eq!(tree[object]["Actions"].handles(), &[destroyer]);
        assert_eq!(tree.len(), live - 1);
        assert_eq!(tree[object]["Count"].front::<f32>(), Ok(0.0));
    }

    #[test]
    fn unknown_names_are_ignored() {
        // Given
        let (mut tree, object, _) = setup("Ghost");

        // When
        tick(&mut tree, object);

        // Then
        assert_eq!(tree[object]["Actions"].handles().len(), 2);
        assert_eq!(tree[object]["Count"].front::<f32>(), Ok(1.0));
    }

    #[test]
    fn an_action_may_destroy_itself() {
        // Given
        let (mut tree, object, destroyer) = setup("Reaper");

        // When
        tick(&mut tree, object);

        // Then
        assert!(!tree.contains(destroyer));
        assert_eq!(tree[object]["Count"].front::<f32>(), Ok(1.0));
    }
}
