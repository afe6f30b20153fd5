//! Struct declarations and the name-addressable catalogue they live in.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use crate::{
    errors::{CatalogueError, SynthError},
    field::FieldDecl,
    primitive::PrimitiveType,
};

/// A struct with its fields in declaration (and memory) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub struct_name: String,
    pub fields: Vec<FieldDecl>,
}

impl StructDecl {
    pub fn new(struct_name: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        StructDecl {
            struct_name: struct_name.into(),
            fields,
        }
    }
}

/// What a field's `type_name` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType<'a> {
    /// Another struct in the same catalogue.
    Composite(&'a StructDecl),
    Primitive(PrimitiveType),
}

/// Read-only set of structs keyed by name. Use [Catalogue::new] to build one;
/// construction rejects duplicate names and composition cycles, so every
/// catalogue can be traversed recursively without bound checks.
#[derive(Debug, Clone)]
pub struct Catalogue {
    structs: IndexMap<String, StructDecl>,
    /// Struct names with every dependency before its dependents.
    topological: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl Catalogue {
    pub fn new(structs: impl IntoIterator<Item = StructDecl>) -> Result<Self, CatalogueError> {
        let mut by_name: IndexMap<String, StructDecl> = IndexMap::new();
        for decl in structs {
            if by_name.contains_key(&decl.struct_name) {
                return Err(CatalogueError::DuplicateStruct(decl.struct_name));
            }
            by_name.insert(decl.struct_name.clone(), decl);
        }

        let topological = topological_order(&by_name)?;

        Ok(Catalogue {
            structs: by_name,
            topological,
        })
    }

    pub fn lookup(&self, struct_name: &str) -> Result<&StructDecl, SynthError> {
        self.structs
            .get(struct_name)
            .ok_or_else(|| SynthError::UnknownStruct(struct_name.to_string()))
    }

    pub fn fields_of(&self, struct_name: &str) -> Result<&[FieldDecl], SynthError> {
        Ok(&self.lookup(struct_name)?.fields)
    }

    pub fn contains(&self, struct_name: &str) -> bool {
        self.structs.contains_key(struct_name)
    }

    /// Resolves the type of `field`. Struct names win over primitive names.
    pub fn classify(&self, field: &FieldDecl) -> Result<FieldType<'_>, SynthError> {
        if let Some(decl) = self.structs.get(&field.type_name) {
            return Ok(FieldType::Composite(decl));
        }

        PrimitiveType::from_name(&field.type_name)
            .map(FieldType::Primitive)
            .ok_or_else(|| SynthError::UnknownType {
                type_name: field.type_name.clone(),
                field: field.field_name.clone(),
            })
    }

    /// Structs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &StructDecl> {
        self.structs.values()
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Struct names ordered so that every struct comes after the structs it contains.
    pub fn topological_order(&self) -> &[String] {
        &self.topological
    }

    /// Every distinct symbolic dimension, in order of first use.
    pub fn symbols(&self) -> Vec<&str> {
        let symbols: IndexSet<&str> = self
            .iter()
            .flat_map(|decl| &decl.fields)
            .flat_map(|field| &field.dimensions)
            .filter_map(|dimension| dimension.as_symbol())
            .collect();

        symbols.into_iter().collect()
    }
}

fn topological_order(structs: &IndexMap<String, StructDecl>) -> Result<Vec<String>, CatalogueError> {
    let mut marks = HashMap::with_capacity(structs.len());
    let mut path = Vec::new();
    let mut order = Vec::with_capacity(structs.len());

    for name in structs.keys() {
        visit(name, structs, &mut marks, &mut path, &mut order)?;
    }

    Ok(order)
}

fn visit<'a>(
    name: &'a str,
    structs: &'a IndexMap<String, StructDecl>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
    order: &mut Vec<String>,
) -> Result<(), CatalogueError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = path.iter().position(|entry| *entry == name).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|entry| entry.to_string()).collect();
            cycle.push(name.to_string());
            return Err(CatalogueError::Cycle { path: cycle });
        }
        None => {}
    }

    let Some(decl) = structs.get(name) else {
        return Ok(());
    };

    marks.insert(name, Mark::Visiting);
    path.push(name);

    for field in &decl.fields {
        if structs.contains_key(&field.type_name) {
            visit(&field.type_name, structs, marks, path, order)?;
        }
    }

    path.pop();
    marks.insert(name, Mark::Done);
    order.push(name.to_string());

    Ok(())
}
