//! Resolved values for symbolic array dimensions, and the policies applied
//! when a dimension cannot be used as-is.

use indexmap::IndexMap;

use crate::{errors::SynthError, field::Dimension};

/// A symbol with no value in [ResolvedConstants].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no value for `{0}`")]
pub struct Unresolved(pub String);

/// Name to integer map supplied by the caller for one synthesis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConstants {
    values: IndexMap<String, i64>,
}

impl ResolvedConstants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: i64) -> Option<i64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<i64, Unresolved> {
        self.get(name).ok_or_else(|| Unresolved(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for ResolvedConstants {
    fn from_iter<T: IntoIterator<Item = (S, i64)>>(iter: T) -> Self {
        let mut constants = ResolvedConstants::new();
        constants.extend(iter);
        constants
    }
}

impl<S: Into<String>> Extend<(S, i64)> for ResolvedConstants {
    fn extend<T: IntoIterator<Item = (S, i64)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

/// What to do with a symbolic dimension that has no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UnresolvedPolicy {
    /// Fail with [SynthError::UnresolvedDimension].
    #[default]
    Strict,
    /// Treat the dimension as 0, so the field contributes no bytes.
    Zero,
}

/// Whether an extent of exactly zero is acceptable. Negative extents are always rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ZeroExtentPolicy {
    /// Zero-length arrays emit no bytes.
    #[default]
    Allow,
    /// Zero-length arrays fail with [SynthError::NonPositiveDimension].
    Reject,
}

/// Dimension handling for one synthesis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SynthOptions {
    pub unresolved: UnresolvedPolicy,
    pub zero_extent: ZeroExtentPolicy,
}

impl SynthOptions {
    /// Unresolved symbols become zero instead of failing.
    pub fn permissive() -> Self {
        SynthOptions {
            unresolved: UnresolvedPolicy::Zero,
            zero_extent: ZeroExtentPolicy::Allow,
        }
    }

    /// Resolves one dimension of `field` to an element count.
    pub fn extent(
        &self,
        dimension: &Dimension,
        field: &str,
        constants: &ResolvedConstants,
    ) -> Result<usize, SynthError> {
        let value = match dimension {
            Dimension::Literal(value) => i64::try_from(*value).map_err(|_| too_large(field))?,
            Dimension::Symbol(symbol) => match (constants.resolve(symbol), self.unresolved) {
                (Ok(value), _) => value,
                (Err(_), UnresolvedPolicy::Zero) => {
                    tracing::debug!(%symbol, %field, "unresolved dimension treated as 0");
                    0
                }
                (Err(Unresolved(symbol)), UnresolvedPolicy::Strict) => {
                    return Err(SynthError::UnresolvedDimension {
                        symbol,
                        field: field.to_string(),
                    });
                }
            },
        };

        if value < 0 || (value == 0 && self.zero_extent == ZeroExtentPolicy::Reject) {
            return Err(SynthError::NonPositiveDimension {
                dimension: dimension.to_string(),
                field: field.to_string(),
                value,
            });
        }

        usize::try_from(value).map_err(|_| too_large(field))
    }
}

fn too_large(field: &str) -> SynthError {
    SynthError::ImageTooLarge {
        field: field.to_string(),
    }
}
