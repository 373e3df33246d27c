use std::{any::Any, collections::HashMap};

use serde_json::{Map, Value};

use super::{ParseHelper, ParsedData};
use crate::{
    error::{Error, Result},
    reflect::{Datum, Handle, Hierarchy, Kind},
};

/// A scope tree being filled from JSON, and the scope the document's members land in.
#[derive(Debug)]
pub struct TableData {
    tree: Hierarchy,
    root: Handle,
}

impl Default for TableData {
    fn default() -> Self {
        Self::new(Hierarchy::default())
    }
}

impl TableData {
    /// Parse into a new, empty root scope of `tree`.
    pub fn new(mut tree: Hierarchy) -> Self {
        let root = tree.new_scope();
        Self { tree, root }
    }

    /// Parse into an existing scope of `tree`.
    pub fn with_root(tree: Hierarchy, root: Handle) -> Self {
        Self { tree, root }
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

    pub fn into_parts(self) -> (Hierarchy, Handle) {
        (self.tree, self.root)
    }
}

impl ParsedData for TableData {
    fn create(&self) -> Self {
        Self::new(Hierarchy::new(self.tree.context().clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Where the members currently being offered belong.
#[derive(Debug, Clone)]
enum Frame {
    /// Attributes of a scope. Scopes made from a class object skip its `"type"` and `"class"`.
    Scope { handle: Handle, skip_meta: bool },
    /// The `"type"`, `"class"` and `"value"` members describing one attribute.
    Descriptor {
        owner: Handle,
        key: String,
        kind: Kind,
        class: Option<String>,
    },
    /// A member with nothing nested to handle.
    Leaf,
}

/// Builds scope trees from JSON into [`TableData`]. See the [module documentation](super).
#[derive(Debug, Default)]
pub struct TableParseHelper {
    stack: Vec<Frame>,

    /// Next element to write for each external datum, so arrays fill it in order.
    cursors: HashMap<(Handle, String), usize>,
}

impl TableParseHelper {
    pub const TYPE_KEY: &'static str = "type";
    pub const CLASS_KEY: &'static str = "class";
    pub const VALUE_KEY: &'static str = "value";

    pub fn new() -> Self {
        Self::default()
    }

    fn is_meta(key: &str) -> bool {
        key == Self::TYPE_KEY || key == Self::CLASS_KEY
    }

    /// A member of the scope at `owner`, or `None` when its `"type"` names neither a kind nor a
    /// factory class.
    fn start_member(
        &mut self,
        tree: &mut Hierarchy,
        owner: Handle,
        key: &str,
        value: &Value,
    ) -> Result<Option<Frame>> {
        let Value::Object(members) = value else {
            if !value.is_array() {
                self.write(tree, owner, key, value, Kind::String)?;
                return Ok(Some(Frame::Leaf));
            }
            // Elements come back as members of the same scope.
            return Ok(Some(Frame::Scope {
                handle: owner,
                skip_meta: false,
            }));
        };

        let type_name = string_member(members, Self::TYPE_KEY)?;
        let class = string_member(members, Self::CLASS_KEY)?;
        let class = match type_name {
            Some(name) => {
                if let Some(kind) = Kind::from_name(name) {
                    tree.append(owner, key)?.set_kind(kind)?;
                    return Ok(Some(Frame::Descriptor {
                        owner,
                        key: key.to_string(),
                        kind,
                        class: class.map(str::to_string),
                    }));
                }
                if !tree.context().factory().contains(name) {
                    return Ok(None);
                }
                Some(name)
            }
            None => class,
        };

        let frame = match class {
            Some(class) => Frame::Scope {
                handle: create_child(tree, owner, key, class)?,
                skip_meta: true,
            },
            None => Frame::Scope {
                handle: tree.append_scope(owner, key)?,
                skip_meta: false,
            },
        };
        Ok(Some(frame))
    }

    /// The `"value"` member of a descriptor.
    fn start_value(&mut self, tree: &mut Hierarchy, frame: Frame, value: &Value) -> Result<Frame> {
        if value.is_array() {
            // Elements come back as further values of the same descriptor.
            return Ok(frame);
        }
        let Frame::Descriptor {
            owner,
            key,
            kind,
            class,
        } = frame
        else {
            return Ok(Frame::Leaf);
        };

        match value {
            Value::Object(_) if kind == Kind::Table => {
                let child = match class {
                    Some(class) => create_child(tree, owner, &key, &class)?,
                    None => tree.append_scope(owner, &key)?,
                };
                Ok(Frame::Scope {
                    handle: child,
                    skip_meta: false,
                })
            }
            Value::Object(_) => Err(Error::UnexpectedJson(format!(
                "{key:?} holds {kind} data, not an object"
            ))),
            _ if kind == Kind::Table => Err(Error::UnexpectedJson(format!(
                "table {key:?} needs object values, found {value}"
            ))),
            _ => {
                self.write(tree, owner, &key, value, kind)?;
                Ok(Frame::Leaf)
            }
        }
    }

    /// Store a scalar into `owner.key`. External datums are filled front to back, internal ones
    /// are appended to. An untyped datum takes `default_kind`.
    fn write(
        &mut self,
        tree: &mut Hierarchy,
        owner: Handle,
        key: &str,
        value: &Value,
        default_kind: Kind,
    ) -> Result<()> {
        let datum = tree.append(owner, key)?;
        if datum.kind() == Kind::Unknown {
            datum.set_kind(default_kind)?;
        }
        let text = scalar_text(datum, value)?;

        if datum.is_external() {
            let cursor = self.cursors.entry((owner, key.to_string())).or_insert(0);
            datum.set_from_str(*cursor, &text)?;
            *cursor += 1;
            Ok(())
        } else {
            datum.push_back_from_str(&text)
        }
    }
}

impl ParseHelper for TableParseHelper {
    fn initialize(&mut self) {
        self.stack.clear();
        self.cursors.clear();
    }

    fn cleanup(&mut self) {
        self.initialize();
    }

    fn create(&self) -> Box<dyn ParseHelper> {
        Box::new(Self::new())
    }

    fn start(&mut self, data: &mut dyn ParsedData, key: &str, value: &Value) -> Result<bool> {
        let Some(data) = data.downcast_mut::<TableData>() else {
            return Ok(false);
        };
        let root = data.root;
        let tree = &mut data.tree;

        let frame = match self.stack.last().cloned().unwrap_or(Frame::Scope {
            handle: root,
            skip_meta: false,
        }) {
            Frame::Scope { skip_meta: true, .. } if Self::is_meta(key) => Frame::Leaf,
            Frame::Scope { handle, .. } => match self.start_member(tree, handle, key, value)? {
                Some(frame) => frame,
                None => return Ok(false),
            },
            Frame::Descriptor { .. } if Self::is_meta(key) => Frame::Leaf,
            descriptor @ Frame::Descriptor { .. } if key == Self::VALUE_KEY => {
                self.start_value(tree, descriptor, value)?
            }
            Frame::Descriptor { .. } | Frame::Leaf => return Ok(false),
        };
        self.stack.push(frame);
        Ok(true)
    }

    fn end(&mut self, data: &mut dyn ParsedData, key: &str) -> Result<()> {
        if !data.is::<TableData>() {
            return Ok(());
        }
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| Error::UnexpectedJson(format!("unbalanced end for {key:?}")))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Create a `class` instance and adopt it into `owner.key`.
fn create_child(tree: &mut Hierarchy, owner: Handle, key: &str, class: &str) -> Result<Handle> {
    let child = tree.create_class(class)?;
    if let Err(error) = tree.adopt(owner, child, key) {
        tree.destroy(child)?;
        return Err(error);
    }
    Ok(child)
}

fn string_member<'a>(members: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match members.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(other) => Err(Error::UnexpectedJson(format!(
            "{key:?} must be a string, found {other}"
        ))),
    }
}

/// The text a JSON scalar is parsed from for `datum`'s kind.
fn scalar_text(datum: &Datum, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) if datum.kind() != Kind::Vector && datum.kind() != Kind::Matrix => {
            Ok(number.to_string())
        }
        Value::Bool(flag) if datum.kind() == Kind::Integer => Ok(i32::from(*flag).to_string()),
        Value::Bool(flag) if datum.kind() == Kind::String => Ok(flag.to_string()),
        other => Err(Error::UnexpectedJson(format!(
            "cannot store {other} in a {} datum",
            datum.kind()
        ))),
    }
}
