use super::{ACTIONS, create_action};
use crate::{
    error::Result,
    gameplay::{Behavior, Updater},
    reflect::{Attributed, External, Handle, Hierarchy, Scope},
};

/// Runs every action in its `Actions` table, in order.
#[derive(Debug, Clone, Default, Attributed)]
#[table("Actions")]
pub struct ActionList {
    scope: Scope,
    #[attribute("Name")]
    name: External<String>,
}

impl ActionList {
    #[inline]
    pub fn name(&self) -> String {
        self.name.get()
    }

    /// Create an action of `class_name` named `instance_name` inside the list at `handle`.
    pub fn create_action(
        tree: &mut Hierarchy,
        handle: Handle,
        class_name: &str,
        instance_name: &str,
    ) -> Result<Handle> {
        tree.get::<Self>(handle)?;
        create_action(tree, handle, class_name, instance_name)
    }
}

impl Behavior for ActionList {
    fn update(updater: &Updater<'_>, tree: &mut Hierarchy, handle: Handle) -> Result<()> {
        updater.update_table(tree, handle, ACTIONS)
    }
}

/// An [`ActionList`] that only runs while its `Condition` is 1.
#[derive(Debug, Clone, Default, Attributed)]
#[table("Actions")]
pub struct ActionListWhile {
    scope: Scope,
    #[attribute("Name")]
    name: External<String>,
    #[attribute("Condition")]
    condition: External<i32>,
}

impl ActionListWhile {
    #[inline]
    pub fn name(&self) -> String {
        self.name.get()
    }

    #[inline]
    pub fn condition(&self) -> bool {
        self.condition.get() == 1
    }

    pub fn set_condition(&self, condition: bool) {
        self.condition.set(i32::from(condition));
    }

    pub fn create_action(
        tree: &mut Hierarchy,
        handle: Handle,
        class_name: &str,
        instance_name: &str,
    ) -> Result<Handle> {
        tree.get::<Self>(handle)?;
        create_action(tree, handle, class_name, instance_name)
    }
}

impl Behavior for ActionListWhile {
    fn update(updater: &Updater<'_>, tree: &mut Hierarchy, handle: Handle) -> Result<()> {
        if !tree.get::<Self>(handle)?.condition() {
            return Ok(());
        }
        updater.update_table(tree, handle, ACTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error,
        gameplay::{ActionIncrement, Behaviors, GameObject, GameTime, tests::context},
    };

    fn tick(tree: &mut Hierarchy, handle: Handle) {
        let behaviors = Behaviors::standard();
        let time = GameTime::default();
        Updater::new(&behaviors, &time).update(tree, handle).unwrap();
    }

    /// A game object with a `Count` float and a list of class `L` holding one increment of it.
    fn setup<L: Attributed>() -> (Hierarchy, Handle, Handle) {
        let mut tree = Hierarchy::new(context());
        let object = tree.create::<GameObject>().unwrap();
        tree.append(object, "Count").unwrap().push_back(0.0f32).unwrap();
        let list = GameObject::create_action(&mut tree, object, L::CLASS_NAME, "List").unwrap();
        let bump = super::create_action(&mut tree, list, ActionIncrement::CLASS_NAME, "Bump")
            .unwrap();
        tree.get::<ActionIncrement>(bump).unwrap().set_target("Count");
        (tree, object, list)
    }

    // ==================== ActionList ====================

    #[test]
    fn list_runs_its_actions() {
        // Given
        let (mut tree, object, list) = setup::<ActionList>();

        // When
        tick(&mut tree, object);
        tick(&mut tree, list);

        // Then
        assert_eq!(tree[object]["Count"].front::<f32>(), Ok(2.0));
    }

    #[test]
    fn list_create_action_checks_the_owner() {
        // Given
        let (mut tree, object, list) = setup::<ActionList>();

        // When
        let second =
            ActionList::create_action(&mut tree, list, ActionIncrement::CLASS_NAME, "Second")
                .unwrap();

        // Then
        assert_eq!(tree[list]["Actions"].handles().len(), 2);
        assert_eq!(tree.parent(second), Ok(Some(list)));
        assert!(matches!(
            ActionList::create_action(&mut tree, object, ActionIncrement::CLASS_NAME, "No"),
            Err(Error::WrongType { .. })
        ));
    }

    // ==================== ActionListWhile ====================

    #[test]
    fn while_list_is_gated_by_its_condition() {
        // Given
        let (mut tree, object, list) = setup::<ActionListWhile>();
        assert!(!tree.get::<ActionListWhile>(list).unwrap().condition());

        // When
        tick(&mut tree, object);

        // Then
        assert_eq!(tree[object]["Count"].front::<f32>(), Ok(0.0));

        // When
        tree.get::<ActionListWhile>(list).unwrap().set_condition(true);
        tick(&mut tree, object);
        tick(&mut tree, object);

        // Then
        assert_eq!(tree[object]["Count"].front::<f32>(), Ok(2.0));
        assert_eq!(tree[list]["Condition"].front::<i32>(), Ok(1));
    }

    #[test]
    fn only_one_counts_as_true() {
        // Given
        let (mut tree, object, list) = setup::<ActionListWhile>();

        // When
        tree[list]["Condition"].set(0, 2).unwrap();
        tick(&mut tree, object);

        // Then
        assert_eq!(tree[object]["Count"].front::<f32>(), Ok(0.0));
    }
}
