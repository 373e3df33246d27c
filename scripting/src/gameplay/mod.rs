//! Gameplay types built on the reflection layer.
//!
//! A scene is a tree of [`GameObject`]s, each with `Children` and a list of `Actions`. Every frame
//! [`GameState::update`] walks the tree from its root with an [`Updater`], which dispatches each
//! node to the [`Behavior`] registered for its type in [`Behaviors`].
//!
//! ```rust,ignore
//! let mut builder = Context::builder();
//! gameplay::register(&mut builder)?;
//!
//! let mut state = GameState::new(builder.build())?;
//! state.load_file("scene.json")?;
//!
//! let mut time = GameTime::default();
//! time.advance(Duration::from_millis(16));
//! state.update(&time)?;
//! ```

pub mod action;
mod behaviors;
mod game_object;
mod game_state;
mod time;

pub use action::{
    ActionCreateAction, ActionDestroyAction, ActionIncrement, ActionList, ActionListWhile,
};
pub use behaviors::{Behavior, Behaviors, UpdateFn, Updater};
pub use game_object::GameObject;
pub use game_state::GameState;
pub use time::GameTime;

use crate::{error::Result, reflect::ContextBuilder};

/// Register every built-in gameplay type with the type registry and the factory.
pub fn register(builder: &mut ContextBuilder) -> Result<()> {
    builder.register::<GameObject>()?;
    builder.register::<ActionList>()?;
    builder.register::<ActionListWhile>()?;
    builder.register::<ActionIncrement>()?;
    builder.register::<ActionCreateAction>()?;
    builder.register::<ActionDestroyAction>()?;
    Ok(())
}
