use crate::{
    error::{Error, Result},
    gameplay::{Behavior, Updater},
    reflect::{Attributed, External, Handle, Hierarchy, Scope},
};

/// Adds `Step` to the first float of the attribute named by `Target`, searching the whole tree
/// from its root. An empty target attribute starts from zero.
#[derive(Debug, Clone, Attributed)]
pub struct ActionIncrement {
    scope: Scope,
    #[attribute("Name")]
    name: External<String>,
    #[attribute("Target")]
    target: External<String>,
    #[attribute("Step")]
    step: External<f32>,
}

impl Default for ActionIncrement {
    fn default() -> Self {
        Self {
            scope: Scope::new(),
            name: External::default(),
            target: External::default(),
            step: External::single(1.0),
        }
    }
}

impl ActionIncrement {
    #[inline]
    pub fn name(&self) -> String {
        self.name.get()
    }

    #[inline]
    pub fn target(&self) -> String {
        self.target.get()
    }

    pub fn set_target(&self, target: impl Into<String>) {
        self.target.set(target.into());
    }

    #[inline]
    pub fn step(&self) -> f32 {
        self.step.get()
    }

    pub fn set_step(&self, step: f32) {
        self.step.set(step);
    }
}

impl Behavior for ActionIncrement {
    fn update(_: &Updater<'_>, tree: &mut Hierarchy, handle: Handle) -> Result<()> {
        let action = tree.get::<Self>(handle)?;
        let (target, step) = (action.target(), action.step());
        if target.is_empty() {
            return Ok(());
        }

        let datum = tree
            .search_for_target_datum(handle, &target)
            .ok_or(Error::MissingAttribute(target))?;
        if datum.is_empty() {
            datum.push_back(step)
        } else {
            let value = datum.front::<f32>()?;
            datum.set(0, value + step)
        }
    }
}
