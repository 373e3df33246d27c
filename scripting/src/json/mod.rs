//! JSON loading through a chain of parse helpers.
//!
//! A [`ParseCoordinator`] walks a `serde_json` document and offers every member to its
//! [`ParseHelper`]s in order. The first helper that accepts a member owns it: the coordinator
//! descends into the member's object or array, then hands it back to that helper to finish.
//! Helpers write into the coordinator's [`ParsedData`] container.
//!
//! [`TableParseHelper`] builds scope trees into [`TableData`]:
//!
//! ```json
//! {
//!     "Name": "Player",
//!     "Health": { "type": "integer", "value": 100 },
//!     "Path": { "type": "vector", "value": ["bvec4(0, 0, 0, 1)", "bvec4(1, 0, 0, 1)"] },
//!     "Weapon": { "class": "GameObject", "Name": "Sword" },
//!     "Actions": { "type": "table", "class": "ActionIncrement", "value": [{ "Target": "Health" }] },
//!     "Stats": { "Strength": "10" }
//! }
//! ```
//!
//! - a bare scalar or array of scalars is appended, as a string unless the attribute already
//!   has a kind;
//! - `"type"` naming a kind with a `"value"` gives the attribute that kind;
//! - `"type"` or `"class"` naming a factory class creates an instance and parses the rest of the
//!   object into it;
//! - any other object becomes a nested scope.

mod coordinator;
mod helper;
mod integer;
mod table;

pub use coordinator::ParseCoordinator;
pub use helper::{ParseHelper, ParsedData};
pub use integer::{IntegerData, IntegerParseHelper};
pub use table::{TableData, TableParseHelper};

use std::path::Path;

use crate::{
    error::Result,
    reflect::{Handle, Hierarchy},
};

/// Parse a JSON scene from `text` into the scope at `root`.
pub fn parse_scene_str(tree: Hierarchy, root: Handle, text: &str) -> Result<TableData> {
    let mut coordinator = ParseCoordinator::new(TableData::with_root(tree, root));
    coordinator.add_helper(Box::new(TableParseHelper::new()));
    coordinator.parse_str(text)?;
    Ok(coordinator.into_data())
}

/// Parse a JSON scene file into the scope at `root`.
pub fn parse_scene_file(tree: Hierarchy, root: Handle, path: impl AsRef<Path>) -> Result<TableData> {
    let mut coordinator = ParseCoordinator::new(TableData::with_root(tree, root));
    coordinator.add_helper(Box::new(TableParseHelper::new()));
    coordinator.parse_file(path)?;
    Ok(coordinator.into_data())
}
