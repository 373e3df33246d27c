use std::fmt;

/// The kind of data a [`Datum`](super::Datum) holds.
///
/// A datum starts out as [`Kind::Unknown`] and is assigned a concrete kind at most once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    #[default]
    Unknown,
    Integer,
    Float,
    String,
    Vector,
    Matrix,
    Pointer,
    Table,
}

impl Kind {
    /// Every concrete kind, in declaration order.
    pub const CONCRETE: [Kind; 7] = [
        Kind::Integer,
        Kind::Float,
        Kind::String,
        Kind::Vector,
        Kind::Matrix,
        Kind::Pointer,
        Kind::Table,
    ];

    /// The lowercase name used for this kind in scene data.
    pub const fn name(&self) -> &'static str {
        match self {
            Kind::Unknown => "unknown",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Vector => "vector",
            Kind::Matrix => "matrix",
            Kind::Pointer => "pointer",
            Kind::Table => "table",
        }
    }

    /// Look up a concrete kind by its scene-data name.
    pub fn from_name(name: &str) -> Option<Kind> {
        Self::CONCRETE.into_iter().find(|kind| kind.name() == name)
    }

    /// True for kinds with a textual form (everything except unknown, pointer and table).
    #[inline]
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Kind::Integer | Kind::Float | Kind::String | Kind::Vector | Kind::Matrix
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
