use std::{fmt::Write, time::Duration};

use crossbeam::channel::Receiver;
use rusty_scripting::{
    Result,
    gameplay::{GameState, GameTime},
    log::LogMessage,
    reflect::{Handle, Hierarchy, Kind, Scope},
};

const HELP: &str = "\
commands:
  load <path>      replace the scene with a JSON file
  show [name]      print the scene, or the first attribute called <name>
  find <name>      locate an attribute anywhere in the scene
  tick [n] [ms]    run n frames (default 1) of ms milliseconds (default 16)
  help             show this text
  quit             leave the shell";

const DEFAULT_FRAME: Duration = Duration::from_millis(16);

/// Command interpreter over a [`GameState`].
pub struct Shell {
    state: GameState,
    time: GameTime,
    logs: Receiver<LogMessage>,
    running: bool,
}

impl Shell {
    pub fn new(state: GameState, logs: Receiver<LogMessage>) -> Self {
        Self {
            state,
            time: GameTime::default(),
            logs,
            running: true,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one command line and return what it printed.
    pub fn execute(&mut self, line: &str) -> String {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return String::new();
        };
        let args: Vec<&str> = words.collect();

        let result = match (command, args.as_slice()) {
            ("load", [path]) => self.load(path),
            ("show", []) => self.show(None),
            ("show", [name]) => self.show(Some(name)),
            ("find", [name]) => Ok(self.find(name)),
            ("tick", args) if args.len() <= 2 => self.tick(args),
            ("help", []) => Ok(HELP.to_string()),
            ("quit" | "exit", []) => {
                self.running = false;
                Ok(String::new())
            }
            _ => Ok(format!("unrecognized command {line:?}, try `help`")),
        };
        result.unwrap_or_else(|error| format!("error: {error}"))
    }

    /// Log records gathered since the last drain, one per line.
    pub fn drain_logs(&self) -> Vec<String> {
        self.logs
            .try_iter()
            .map(|message| format!("[{}] {}", message.level, message.message))
            .collect()
    }

    fn load(&mut self, path: &str) -> Result<String> {
        self.state.load_file(path)?;
        self.time = GameTime::default();
        Ok(format!("loaded {path} ({} scopes)", self.state.tree().len()))
    }

    fn show(&self, name: Option<&str>) -> Result<String> {
        let tree = self.state.tree();
        let mut out = String::new();
        match name {
            None => render_scope(tree, self.state.root(), 0, &mut out)?,
            Some(name) => match tree.down_search(self.state.root(), name) {
                Some((at, index)) => render_attribute(tree, at, index, 0, &mut out)?,
                None => return Ok(format!("no attribute {name:?}")),
            },
        }
        Ok(out.trim_end().to_string())
    }

    fn find(&self, name: &str) -> String {
        let tree = self.state.tree();
        match tree.down_search(self.state.root(), name) {
            Some((at, index)) => {
                let path = scope_path(tree, at);
                format!("{name:?} is attribute {index} of {path}")
            }
            None => format!("no attribute {name:?}"),
        }
    }

    fn tick(&mut self, args: &[&str]) -> Result<String> {
        let frames = match args.first() {
            Some(text) => match text.parse::<u32>() {
                Ok(frames) => frames,
                Err(_) => return Ok(format!("bad frame count {text:?}")),
            },
            None => 1,
        };
        let frame = match args.get(1) {
            Some(text) => match text.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => return Ok(format!("bad frame length {text:?}")),
            },
            None => DEFAULT_FRAME,
        };

        for _ in 0..frames {
            self.time.advance(frame);
            self.state.update(&self.time)?;
        }
        Ok(format!(
            "ran {frames} frame(s), game time {:.3}s",
            self.time.current().as_secs_f64()
        ))
    }
}

fn render_scope(tree: &Hierarchy, handle: Handle, depth: usize, out: &mut String) -> Result<()> {
    for index in 0..tree.scope(handle)?.len() {
        render_attribute(tree, handle, index, depth, out)?;
    }
    Ok(())
}

fn render_attribute(
    tree: &Hierarchy,
    handle: Handle,
    index: usize,
    depth: usize,
    out: &mut String,
) -> Result<()> {
    let scope = tree.scope(handle)?;
    let (Some(name), Some(datum)) = (scope.name_at(index), scope.get(index)) else {
        return Ok(());
    };
    if name == Scope::THIS {
        return Ok(());
    }

    let indent = "  ".repeat(depth);
    if datum.kind() == Kind::Table {
        let _ = writeln!(out, "{indent}{name}: [{}]", datum.len());
        for child in datum.handles() {
            let _ = writeln!(out, "{indent}  - {}", tree.class_name(*child)?);
            render_scope(tree, *child, depth + 2, out)?;
        }
        return Ok(());
    }

    let values: Vec<String> = (0..datum.len())
        .map(|i| datum.to_string_at(i))
        .collect::<Result<_>>()?;
    let _ = writeln!(out, "{indent}{name} ({}): {}", datum.kind(), values.join(", "));
    Ok(())
}

/// `root.Children[1].Actions[0]` style location of `handle`.
fn scope_path(tree: &Hierarchy, handle: Handle) -> String {
    let mut segments = Vec::new();
    let mut current = handle;
    while let Ok(Some(parent)) = tree.parent(current) {
        let segment = tree
            .scope(parent)
            .ok()
            .and_then(|scope| {
                let (attribute, element) = scope.find_child(current)?;
                Some(format!("{}[{element}]", scope.name_at(attribute)?))
            })
            .unwrap_or_else(|| "?".to_string());
        segments.push(segment);
        current = parent;
    }
    segments.push("root".to_string());
    segments.reverse();
    segments.join(".")
}
