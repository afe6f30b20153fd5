//! Field declarations used to build a [crate::schema::StructDecl].

use std::fmt;

/// One array dimension as written in the declaration.
///
/// Symbols are kept unresolved; they are looked up in
/// [crate::constants::ResolvedConstants] only when an image is synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// A literal extent such as `10`.
    Literal(u64),
    /// A named extent such as `MAX_20`.
    Symbol(String),
}

impl Dimension {
    pub fn symbol(name: impl Into<String>) -> Self {
        Dimension::Symbol(name.into())
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Dimension::Literal(_) => None,
            Dimension::Symbol(name) => Some(name),
        }
    }
}

impl From<u64> for Dimension {
    fn from(value: u64) -> Self {
        Dimension::Literal(value)
    }
}

impl From<&str> for Dimension {
    fn from(value: &str) -> Self {
        Dimension::Symbol(value.to_string())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Literal(value) => write!(f, "{value}"),
            Dimension::Symbol(name) => f.write_str(name),
        }
    }
}

/// A single named field: a primitive or struct type, optionally an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Primitive C name (`uint16_t`) or the name of another struct.
    pub type_name: String,
    pub field_name: String,
    /// Outermost dimension first. Empty for a scalar.
    pub dimensions: Vec<Dimension>,
}

impl FieldDecl {
    pub fn new(
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        dimensions: Vec<Dimension>,
    ) -> Self {
        FieldDecl {
            type_name: type_name.into(),
            field_name: field_name.into(),
            dimensions,
        }
    }

    pub fn scalar(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(type_name, field_name, Vec::new())
    }

    pub fn array<D: Into<Dimension>>(
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        dimensions: impl IntoIterator<Item = D>,
    ) -> Self {
        Self::new(
            type_name,
            field_name,
            dimensions.into_iter().map(Into::into).collect(),
        )
    }

    pub fn is_array(&self) -> bool {
        !self.dimensions.is_empty()
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }
}

impl fmt::Display for FieldDecl {
    /// Formats as a C declaration without the trailing semicolon.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name, self.field_name)?;
        for dimension in &self.dimensions {
            write!(f, "[{dimension}]")?;
        }
        Ok(())
    }
}
