use std::{path::Path, rc::Rc};

use log::info;

use super::{Behaviors, GameObject, GameTime, Updater};
use crate::{
    error::Result,
    event::EventQueue,
    json::{self, TableData},
    reflect::{Context, Handle, Hierarchy},
};

/// A running game: a scene rooted at a [`GameObject`], the behaviours that drive it and the
/// queue of pending events.
#[derive(Debug)]
pub struct GameState {
    tree: Hierarchy,
    root: Handle,
    behaviors: Behaviors,
    queue: EventQueue,
}

impl GameState {
    /// An empty scene with the standard behaviours. `context` must have the gameplay types
    /// registered.
    pub fn new(context: Rc<Context>) -> Result<Self> {
        Self::with_behaviors(context, Behaviors::standard())
    }

    pub fn with_behaviors(context: Rc<Context>, behaviors: Behaviors) -> Result<Self> {
        let (tree, root) = empty_scene(context)?;
        Ok(Self {
            tree,
            root,
            behaviors,
            queue: EventQueue::new(),
        })
    }

    /// Replace the scene with one parsed from `text`. The current scene is kept if parsing
    /// fails.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let (tree, root) = empty_scene(Rc::clone(self.tree.context()))?;
        self.replace(json::parse_scene_str(tree, root, text)?);
        Ok(())
    }

    /// Replace the scene with one read from the JSON file at `path`.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (tree, root) = empty_scene(Rc::clone(self.tree.context()))?;
        self.replace(json::parse_scene_file(tree, root, path)?);
        info!("loaded scene {}", path.display());
        Ok(())
    }

    fn replace(&mut self, scene: TableData) {
        (self.tree, self.root) = scene.into_parts();
    }

    /// Advance one frame: deliver due events, then update the scene from the root down.
    pub fn update(&mut self, time: &GameTime) -> Result<()> {
        self.queue.update(time);
        Updater::new(&self.behaviors, time).update(&mut self.tree, self.root)
    }

    #[inline]
    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut Hierarchy {
        &mut self.tree
    }

    #[inline]
    pub fn root(&self) -> Handle {
        self.root
    }

    #[inline]
    pub fn behaviors(&self) -> &Behaviors {
        &self.behaviors
    }

    #[inline]
    pub fn behaviors_mut(&mut self) -> &mut Behaviors {
        &mut self.behaviors
    }

    #[inline]
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    #[inline]
    pub fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }
}

fn empty_scene(context: Rc<Context>) -> Result<(Hierarchy, Handle)> {
    let mut tree = Hierarchy::new(context);
    let root = tree.create::<GameObject>()?;
    Ok((tree, root))
}
