//! Crate-wide error type.
//!
//! Every fallible operation in the crate reports one of the variants of [`Error`]. Lookup misses
//! are not errors: `find`-style operations return `Option` instead, since probing for an optional
//! attribute is ordinary control flow for scripting code.

use thiserror::Error;

use crate::reflect::{Handle, Kind};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Type contract.
    #[error("datum holds {actual} data, not {expected}")]
    KindMismatch { expected: Kind, actual: Kind },

    #[error("datum kind is already {current}, cannot change it to {requested}")]
    KindReassignment { current: Kind, requested: Kind },

    #[error("datum kind has not been set")]
    UnknownKind,

    #[error("datum storage is external and cannot be resized or reallocated")]
    ExternalStorage,

    #[error("datum already owns internal storage")]
    StorageInUse,

    #[error("table elements are owned by the hierarchy and cannot be edited directly")]
    TableStorage,

    #[error("cannot parse {kind} from {text:?}")]
    Parse { kind: Kind, text: String },

    // Bounds.
    #[error("index {index} out of bounds (size {len})")]
    OutOfBounds { index: usize, len: usize },

    // Ownership topology.
    #[error("a scope cannot adopt itself")]
    SelfAdoption,

    #[error("a scope cannot adopt one of its ancestors")]
    AncestorAdoption,

    #[error("attribute {name:?} holds {kind} data and cannot hold scopes")]
    IncompatibleAttribute { name: String, kind: Kind },

    #[error("cannot assign between a scope and its ancestor or descendant")]
    OverlappingAssignment,

    #[error("handle {0} does not refer to a live scope")]
    InvalidHandle(Handle),

    // Naming.
    #[error("attribute names cannot be empty")]
    EmptyName,

    #[error("{0:?} is already a prescribed attribute")]
    PrescribedAttribute(String),

    #[error("no attribute named {0:?}")]
    MissingAttribute(String),

    // Registry.
    #[error("type '{0}' is not registered")]
    UnregisteredType(String),

    #[error("type '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("signature {name:?} expects {expected} element(s) but the field holds {actual}")]
    SignatureMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("no class named {0:?} is registered with the factory")]
    UnknownClass(String),

    #[error("node is a {actual}, not a {expected}")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },

    // Input.
    #[error("invalid json: {0}")]
    Json(String),

    #[error("unexpected json: {0}")]
    UnexpectedJson(String),

    #[error("i/o failure: {0}")]
    Io(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json(error.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error.to_string())
    }
}
