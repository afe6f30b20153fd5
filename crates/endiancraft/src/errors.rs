//! Error types for catalogue construction and image synthesis.

use thiserror::Error;

/// Errors produced when building a [crate::schema::Catalogue].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    /// Two structs share a name.
    #[error("struct `{0}` is declared more than once")]
    DuplicateStruct(String),
    /// A struct contains itself, directly or through other structs. `path`
    /// starts and ends with the same struct name.
    #[error("struct composition cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },
}

/// Errors produced by [crate::synth::Synthesizer]. Synthesis stops at the
/// first one and returns no partial image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// The requested struct is not in the catalogue.
    #[error("unknown struct `{0}`")]
    UnknownStruct(String),
    /// A field type is neither a primitive nor a struct in the catalogue.
    #[error("unknown type `{type_name}` for field `{field}`")]
    UnknownType { type_name: String, field: String },
    /// A symbolic dimension has no value and the policy is strict.
    #[error("unresolved array dimension `{symbol}` in field `{field}`")]
    UnresolvedDimension { symbol: String, field: String },
    /// A dimension resolved to a negative value, or to zero while zero
    /// extents are rejected.
    #[error("array dimension `{dimension}` of field `{field}` resolved to {value}")]
    NonPositiveDimension {
        dimension: String,
        field: String,
        value: i64,
    },
    /// The element or byte count of a field does not fit in `usize`.
    #[error("field `{field}` is too large to synthesize")]
    ImageTooLarge { field: String },
}
