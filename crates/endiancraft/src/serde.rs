//! JSON-deserializable catalogue description.
//!
//! These types describe struct layouts and constants as produced by an
//! external header parser. They are intended to be loaded from JSON and then
//! turned into a [crate::schema::Catalogue] and
//! [crate::constants::ResolvedConstants].
//!
//! ```json
//! {
//!   "structs": [
//!     { "name": "s1_type", "fields": [
//!       { "type": "uint8_t", "name": "port", "dims": [10] },
//!       { "type": "uint32_t", "name": "ip_address", "dims": ["MAX_20"] }
//!     ] }
//!   ],
//!   "constants": { "MAX_20": 20 }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    constants::ResolvedConstants,
    errors::CatalogueError,
    field::{Dimension, FieldDecl},
    schema::{Catalogue, StructDecl},
};

/// Top-level description: structs plus the constants their dimensions use.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CatalogueDef {
    pub structs: Vec<StructDef>,
    #[serde(default)]
    pub constants: BTreeMap<String, i64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Primitive C name or struct name.
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    /// Outermost first; omitted for scalars.
    #[serde(default)]
    pub dims: Vec<DimensionDef>,
}

/// A dimension is either a number or a symbol name.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum DimensionDef {
    Literal(u64),
    Symbol(String),
}

impl From<DimensionDef> for Dimension {
    fn from(value: DimensionDef) -> Self {
        match value {
            DimensionDef::Literal(value) => Dimension::Literal(value),
            DimensionDef::Symbol(name) => Dimension::Symbol(name),
        }
    }
}

impl From<&Dimension> for DimensionDef {
    fn from(value: &Dimension) -> Self {
        match value {
            Dimension::Literal(value) => DimensionDef::Literal(*value),
            Dimension::Symbol(name) => DimensionDef::Symbol(name.clone()),
        }
    }
}

impl From<FieldDef> for FieldDecl {
    fn from(value: FieldDef) -> Self {
        FieldDecl::new(
            value.type_name,
            value.name,
            value.dims.into_iter().map(Into::into).collect(),
        )
    }
}

impl From<StructDef> for StructDecl {
    fn from(value: StructDef) -> Self {
        StructDecl::new(value.name, value.fields.into_iter().map(Into::into).collect())
    }
}

impl From<&StructDecl> for StructDef {
    fn from(value: &StructDecl) -> Self {
        StructDef {
            name: value.struct_name.clone(),
            fields: value
                .fields
                .iter()
                .map(|field| FieldDef {
                    type_name: field.type_name.clone(),
                    name: field.field_name.clone(),
                    dims: field.dimensions.iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }
}

impl CatalogueDef {
    /// Splits the definition into a checked catalogue and its constants.
    pub fn build(self) -> Result<(Catalogue, ResolvedConstants), CatalogueError> {
        let catalogue = Catalogue::new(self.structs.into_iter().map(StructDecl::from))?;
        let constants = self.constants.into_iter().collect();
        Ok((catalogue, constants))
    }
}

impl TryFrom<CatalogueDef> for Catalogue {
    type Error = CatalogueError;

    fn try_from(value: CatalogueDef) -> Result<Self, Self::Error> {
        Catalogue::new(value.structs.into_iter().map(StructDecl::from))
    }
}
