//! Generated scenes and scope trees.
//!
//! Scenes are built from a seeded RNG so every run parses and updates the same data.

use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_scripting::{
    Result,
    gameplay::{self, GameState},
    reflect::{Context, Handle, Hierarchy},
};
use serde_json::{Map, Value, json};

/// Shape of a generated scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Game objects under the root.
    pub objects: usize,
    /// Nested game objects under each top level object.
    pub children_per_object: usize,
    /// Float attributes on every object.
    pub stats_per_object: usize,
    /// Increment actions on every object.
    pub actions_per_object: usize,
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            objects: 100,
            children_per_object: 2,
            stats_per_object: 4,
            actions_per_object: 2,
            seed: 12345,
        }
    }
}

/// A context with every gameplay type registered.
pub fn context() -> Result<Rc<Context>> {
    let mut builder = Context::builder();
    gameplay::register(&mut builder)?;
    Ok(builder.build())
}

struct SceneWriter {
    config: SceneConfig,
    rng: ChaCha8Rng,
    next_id: usize,
}

impl SceneWriter {
    fn random_vector(&mut self) -> String {
        let [x, y, z] = [(); 3].map(|_| self.rng.gen_range(-500.0f32..500.0));
        format!("bvec4({x}, {y}, {z}, 1)")
    }

    fn object(&mut self, depth: usize) -> Value {
        self.next_id += 1;
        let mut object = Map::new();
        object.insert("class".into(), json!("GameObject"));
        object.insert("Name".into(), json!(format!("object-{}", self.next_id)));
        object.insert(
            "Position".into(),
            json!({ "type": "vector", "value": self.random_vector() }),
        );
        for stat in 0..self.config.stats_per_object {
            let value: f32 = self.rng.gen_range(0.0..100.0);
            object.insert(
                format!("Stat{stat}"),
                json!({ "type": "float", "value": value }),
            );
        }

        if depth == 0 && self.config.children_per_object > 0 {
            let children: Vec<Value> = (0..self.config.children_per_object)
                .map(|_| self.object(depth + 1))
                .collect();
            object.insert("Children".into(), Value::Array(children));
        }

        let actions: Vec<Value> = (0..self.config.actions_per_object)
            .map(|i| {
                let stat = self.rng.gen_range(0..self.config.stats_per_object.max(1));
                json!({
                    "type": "ActionIncrement",
                    "Name": format!("bump-{i}"),
                    "Target": format!("Stat{stat}"),
                    "Step": self.rng.gen_range(0.1f32..2.0),
                })
            })
            .collect();
        object.insert("Actions".into(), Value::Array(actions));
        Value::Object(object)
    }
}

/// JSON text of a scene shaped by `config`.
pub fn scene_json(config: &SceneConfig) -> String {
    let mut writer = SceneWriter {
        rng: ChaCha8Rng::seed_from_u64(config.seed),
        config: config.clone(),
        next_id: 0,
    };
    let objects: Vec<Value> = (0..config.objects).map(|_| writer.object(0)).collect();
    let mut root = Map::new();
    root.insert("Name".into(), json!("world"));
    for stat in 0..config.stats_per_object {
        root.insert(format!("Stat{stat}"), json!({ "type": "float", "value": 0 }));
    }
    root.insert("Children".into(), Value::Array(objects));
    Value::Object(root).to_string()
}

/// A game state holding a scene shaped by `config`.
pub fn load_scene(config: &SceneConfig) -> Result<GameState> {
    let mut state = GameState::new(context()?)?;
    state.load_str(&scene_json(config))?;
    Ok(state)
}

/// A root scope with `attributes` integer attributes named `attr0`, `attr1`, ...
pub fn flat_scope(tree: &mut Hierarchy, attributes: usize) -> Result<Handle> {
    let root = tree.new_scope();
    for i in 0..attributes {
        tree.append(root, &format!("attr{i}"))?.push_back(i as i32)?;
    }
    Ok(root)
}

/// A tree of plain scopes `depth` levels deep where every scope has `fanout` children and one
/// float attribute.
pub fn wide_tree(tree: &mut Hierarchy, depth: usize, fanout: usize) -> Result<Handle> {
    let root = tree.new_scope();
    let mut level = vec![root];
    for _ in 0..depth {
        let mut next = Vec::with_capacity(level.len() * fanout);
        for parent in level {
            tree.append(parent, "Weight")?.push_back(1.0f32)?;
            for _ in 0..fanout {
                next.push(tree.append_scope(parent, "Children")?);
            }
        }
        level = next;
    }
    Ok(root)
}
