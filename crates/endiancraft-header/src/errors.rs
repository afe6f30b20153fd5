use thiserror::Error;

/// Errors produced while reading header text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// A `typedef struct` block has no closing brace or no terminating `;`.
    #[error("unterminated struct block starting on line {line}")]
    UnterminatedStruct { line: usize },
}
