//! Recursive synthesis of struct memory images.
//!
//! Fields are visited depth-first in declaration order. Array fields are
//! expanded in row-major order (last dimension varies fastest), composite
//! elements recurse into the referenced struct, and primitive elements are
//! filled by a [PatternGenerator].

use std::ops::Range;

use itertools::{Either, Itertools};

use crate::{
    constants::{ResolvedConstants, SynthOptions},
    errors::SynthError,
    field::FieldDecl,
    pattern::{CyclicPattern, PatternGenerator},
    primitive::{ByteOrder, PrimitiveType},
    schema::{Catalogue, FieldType, StructDecl},
};

/// Where a run of bytes in an [Image] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Annotation {
    pub range: Range<usize>,
    /// 0 for fields of the synthesized struct, +1 per enclosing composite element.
    pub depth: usize,
    pub type_name: String,
    pub field_name: String,
    pub kind: AnnotationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum AnnotationKind {
    /// A whole primitive field, every element included.
    Primitive {
        primitive: PrimitiveType,
        /// Resolved extents, outermost first. Empty for a scalar.
        extents: Vec<usize>,
    },
    /// One element of a composite field. The annotations of its nested fields
    /// follow it directly, one level deeper.
    ///
    /// Unlike a primitive field, a composite field with a zero extent has no
    /// elements and therefore leaves no annotation at all.
    Composite {
        /// Element position, outermost first. Empty for a scalar.
        indices: Vec<usize>,
    },
}

impl Annotation {
    /// Byte ranges of the individual elements of a primitive field. A
    /// composite element is returned as a single range.
    pub fn element_ranges(&self) -> Vec<Range<usize>> {
        match &self.kind {
            AnnotationKind::Primitive { primitive, .. } => {
                let width = primitive.width();
                self.range
                    .clone()
                    .step_by(width)
                    .map(|start| start..start + width)
                    .collect()
            }
            AnnotationKind::Composite { .. } => vec![self.range.clone()],
        }
    }

    /// `[10][20]` for primitive extents, `[1][0]` for composite indices.
    pub fn subscript(&self) -> String {
        let values = match &self.kind {
            AnnotationKind::Primitive { extents, .. } => extents,
            AnnotationKind::Composite { indices } => indices,
        };
        values.iter().map(|value| format!("[{value}]")).collect()
    }
}

/// The memory image of one struct in one byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Image {
    pub order: ByteOrder,
    pub bytes: Vec<u8>,
    /// In traversal order.
    pub annotations: Vec<Annotation>,
}

impl Image {
    fn new(order: ByteOrder) -> Self {
        Image {
            order,
            bytes: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn primitive_fields(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(|annotation| matches!(annotation.kind, AnnotationKind::Primitive { .. }))
    }
}

/// Big- and little-endian images of the same struct.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TestVector {
    pub struct_name: String,
    pub big: Image,
    pub little: Image,
}

impl TestVector {
    /// Length of either image; both always have the same length.
    pub fn len(&self) -> usize {
        self.big.len()
    }

    pub fn is_empty(&self) -> bool {
        self.big.is_empty()
    }

    pub fn image(&self, order: ByteOrder) -> &Image {
        match order {
            ByteOrder::Big => &self.big,
            ByteOrder::Little => &self.little,
        }
    }
}

/// Synthesizes images from a catalogue and one set of resolved constants.
///
/// A synthesizer only reads its inputs, so one instance can be shared across
/// threads when the generator is `Sync`.
#[derive(Debug, Clone)]
pub struct Synthesizer<'a, G = CyclicPattern> {
    catalogue: &'a Catalogue,
    constants: &'a ResolvedConstants,
    options: SynthOptions,
    generator: G,
}

impl<'a> Synthesizer<'a> {
    /// Strict options and the default marker pattern.
    pub fn new(catalogue: &'a Catalogue, constants: &'a ResolvedConstants) -> Self {
        Synthesizer {
            catalogue,
            constants,
            options: SynthOptions::default(),
            generator: CyclicPattern::default(),
        }
    }
}

impl<'a, G: PatternGenerator> Synthesizer<'a, G> {
    pub fn with_options(mut self, options: SynthOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_generator<H: PatternGenerator>(self, generator: H) -> Synthesizer<'a, H> {
        Synthesizer {
            catalogue: self.catalogue,
            constants: self.constants,
            options: self.options,
            generator,
        }
    }

    pub fn options(&self) -> SynthOptions {
        self.options
    }

    /// Synthesizes the image of `struct_name` in `order`.
    #[tracing::instrument(level = "trace", name = "Synthesizer::image", skip(self))]
    pub fn image(&self, struct_name: &str, order: ByteOrder) -> Result<Image, SynthError> {
        let decl = self.catalogue.lookup(struct_name)?;
        let mut image = Image::new(order);
        self.emit_struct(decl, 0, &mut image)?;
        Ok(image)
    }

    /// Synthesizes both images of `struct_name`.
    pub fn vector(&self, struct_name: &str) -> Result<TestVector, SynthError> {
        let big = self.image(struct_name, ByteOrder::Big)?;
        let little = self.image(struct_name, ByteOrder::Little)?;
        debug_assert_eq!(big.len(), little.len());

        Ok(TestVector {
            struct_name: struct_name.to_string(),
            big,
            little,
        })
    }

    /// One result per struct with at least one field, in catalogue order.
    pub fn vectors(
        &self,
    ) -> impl Iterator<Item = (&'a StructDecl, Result<TestVector, SynthError>)> + '_ {
        self.catalogue
            .iter()
            .filter(|decl| !decl.fields.is_empty())
            .map(|decl| (decl, self.vector(&decl.struct_name)))
    }

    fn emit_struct(&self, decl: &StructDecl, depth: usize, image: &mut Image) -> Result<(), SynthError> {
        for field in &decl.fields {
            self.emit_field(field, depth, image)?;
        }

        Ok(())
    }

    fn emit_field(&self, field: &FieldDecl, depth: usize, image: &mut Image) -> Result<(), SynthError> {
        let field_type = self.catalogue.classify(field)?;
        let extents = field
            .dimensions
            .iter()
            .map(|dimension| {
                self.options
                    .extent(dimension, &field.field_name, self.constants)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let too_large = || SynthError::ImageTooLarge {
            field: field.field_name.clone(),
        };
        let count = extents
            .iter()
            .try_fold(1usize, |count, &extent| count.checked_mul(extent))
            .ok_or_else(too_large)?;

        match field_type {
            FieldType::Primitive(primitive) => {
                let start = image.bytes.len();
                let width = primitive.width();
                let len = count.checked_mul(width).ok_or_else(too_large)?;

                image.bytes.reserve(len);
                for _ in 0..count {
                    self.generator
                        .emit(primitive, width, image.order, &mut image.bytes);
                }

                image.annotations.push(Annotation {
                    range: start..image.bytes.len(),
                    depth,
                    type_name: field.type_name.clone(),
                    field_name: field.field_name.clone(),
                    kind: AnnotationKind::Primitive { primitive, extents },
                });
            }
            FieldType::Composite(nested) => {
                for indices in element_indices(&extents) {
                    let slot = image.annotations.len();
                    let start = image.bytes.len();
                    image.annotations.push(Annotation {
                        range: start..start,
                        depth,
                        type_name: field.type_name.clone(),
                        field_name: field.field_name.clone(),
                        kind: AnnotationKind::Composite { indices },
                    });

                    self.emit_struct(nested, depth + 1, image)?;
                    image.annotations[slot].range.end = image.bytes.len();
                }
            }
        }

        Ok(())
    }
}

/// Every element position of an array with `extents`, in row-major order.
/// A scalar has exactly one (empty) position.
fn element_indices(extents: &[usize]) -> impl Iterator<Item = Vec<usize>> + '_ {
    if extents.is_empty() {
        Either::Left(std::iter::once(Vec::new()))
    } else {
        Either::Right(
            extents
                .iter()
                .map(|&extent| 0..extent)
                .multi_cartesian_product(),
        )
    }
}

/// Synthesizes `struct_name` with strict options and the default marker pattern.
pub fn synthesize(
    catalogue: &Catalogue,
    struct_name: &str,
    constants: &ResolvedConstants,
    order: ByteOrder,
) -> Result<Image, SynthError> {
    Synthesizer::new(catalogue, constants).image(struct_name, order)
}
