use endiancraft::{
    constants::{ResolvedConstants, SynthOptions},
    field::{Dimension, FieldDecl},
    primitive::{ByteOrder, PrimitiveType},
    schema::{Catalogue, StructDecl},
    synth::{AnnotationKind, Synthesizer, synthesize},
};
use proptest::prelude::*;

const PRIMITIVES: &[&str] = &[
    "uint8_t",
    "int8_t",
    "char",
    "uint16_t",
    "short",
    "int",
    "unsigned int",
    "uint32_t",
    "uint64_t",
    "int64_t",
    "float",
    "double",
];

fn dims() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..4, 0..3)
}

fn primitive_field() -> impl Strategy<Value = FieldDecl> {
    (prop::sample::select(PRIMITIVES), dims())
        .prop_map(|(type_name, dims)| FieldDecl::array(type_name, "value", dims))
}

fn field_or_leaf() -> impl Strategy<Value = FieldDecl> {
    prop_oneof![
        primitive_field(),
        dims().prop_map(|dims| FieldDecl::array("leaf_t", "leaf", dims)),
    ]
}

fn named(mut fields: Vec<FieldDecl>) -> Vec<FieldDecl> {
    for (i, field) in fields.iter_mut().enumerate() {
        field.field_name = format!("{}_{i}", field.field_name);
    }
    fields
}

/// A leaf struct of primitives and a top struct that may embed it.
fn catalogue() -> impl Strategy<Value = Catalogue> {
    (
        prop::collection::vec(primitive_field(), 1..5),
        prop::collection::vec(field_or_leaf(), 1..5),
    )
        .prop_map(|(leaf, top)| {
            Catalogue::new(vec![
                StructDecl::new("top_t", named(top)),
                StructDecl::new("leaf_t", named(leaf)),
            ])
            .unwrap()
        })
}

/// Image size computed directly from the declarations.
fn expected_len(catalogue: &Catalogue, struct_name: &str) -> usize {
    catalogue
        .fields_of(struct_name)
        .unwrap()
        .iter()
        .map(|field| {
            let count: usize = field
                .dimensions
                .iter()
                .map(|dimension| match dimension {
                    Dimension::Literal(value) => *value as usize,
                    Dimension::Symbol(_) => unreachable!(),
                })
                .product();
            let element = match PrimitiveType::from_name(&field.type_name) {
                Some(primitive) => primitive.width(),
                None => expected_len(catalogue, &field.type_name),
            };
            count * element
        })
        .sum()
}

proptest! {
    #[test]
    fn images_have_equal_length(catalogue in catalogue()) {
        let constants = ResolvedConstants::new();
        let big = synthesize(&catalogue, "top_t", &constants, ByteOrder::Big).unwrap();
        let little = synthesize(&catalogue, "top_t", &constants, ByteOrder::Little).unwrap();

        prop_assert_eq!(big.len(), little.len());
        prop_assert_eq!(big.len(), expected_len(&catalogue, "top_t"));
        prop_assert_eq!(&big.annotations, &little.annotations);
    }

    #[test]
    fn multi_byte_fields_are_reversed(catalogue in catalogue()) {
        let constants = ResolvedConstants::new();
        let big = synthesize(&catalogue, "top_t", &constants, ByteOrder::Big).unwrap();
        let little = synthesize(&catalogue, "top_t", &constants, ByteOrder::Little).unwrap();

        for annotation in big.primitive_fields() {
            for range in annotation.element_ranges() {
                let mut reversed = big.bytes[range.clone()].to_vec();
                reversed.reverse();
                prop_assert_eq!(&little.bytes[range.clone()], reversed.as_slice());

                if range.len() == 1 {
                    prop_assert_eq!(big.bytes[range.start], little.bytes[range.start]);
                }
            }
        }
    }

    #[test]
    fn synthesis_is_idempotent(catalogue in catalogue()) {
        let constants = ResolvedConstants::new();
        let synthesizer = Synthesizer::new(&catalogue, &constants);
        prop_assert_eq!(synthesizer.vector("top_t").unwrap(), synthesizer.vector("top_t").unwrap());
    }

    #[test]
    fn single_composite_field_is_transparent(fields in prop::collection::vec(primitive_field(), 1..6)) {
        let catalogue = Catalogue::new(vec![
            StructDecl::new("inner_t", named(fields)),
            StructDecl::new("outer_t", vec![FieldDecl::scalar("inner_t", "inner")]),
        ])
        .unwrap();
        let constants = ResolvedConstants::new();

        for order in ByteOrder::BOTH {
            let outer = synthesize(&catalogue, "outer_t", &constants, order).unwrap();
            let inner = synthesize(&catalogue, "inner_t", &constants, order).unwrap();
            prop_assert_eq!(&outer.bytes, &inner.bytes);
        }
    }

    #[test]
    fn unresolved_symbol_drops_field_when_permissive(fields in prop::collection::vec(primitive_field(), 1..6)) {
        let fields = named(fields);
        let mut with_symbol = fields.clone();
        with_symbol.push(FieldDecl::new("uint32_t", "tail", vec![Dimension::symbol("COUNT")]));

        let catalogue = Catalogue::new(vec![
            StructDecl::new("plain_t", fields),
            StructDecl::new("symbolic_t", with_symbol),
        ])
        .unwrap();
        let constants = ResolvedConstants::new();
        let synthesizer = Synthesizer::new(&catalogue, &constants).with_options(SynthOptions::permissive());

        for order in ByteOrder::BOTH {
            let plain = synthesizer.image("plain_t", order).unwrap();
            let symbolic = synthesizer.image("symbolic_t", order).unwrap();
            prop_assert_eq!(&plain.bytes, &symbolic.bytes);
        }
        prop_assert!(Synthesizer::new(&catalogue, &constants).image("symbolic_t", ByteOrder::Big).is_err());
    }
}

#[test]
fn nested_arrays_match_hand_computed_layout() {
    // s3_type { s2_type s2[5]; s1_type s1; } with MAX_20 = 20
    let catalogue = Catalogue::new(vec![
        StructDecl::new(
            "s1_type",
            vec![
                FieldDecl::array("uint8_t", "port", [10u64]),
                FieldDecl::array("uint16_t", "protocol", [10u64]),
                FieldDecl::array("uint32_t", "ip_address", ["MAX_20"]),
            ],
        ),
        StructDecl::new(
            "s2_type",
            vec![
                FieldDecl::array("uint8_t", "port", [10u64]),
                FieldDecl::array("uint16_t", "protocol", ["MAX_20"]),
                FieldDecl::array("s1_type", "nested_address", [2u64]),
            ],
        ),
        StructDecl::new(
            "s3_type",
            vec![
                FieldDecl::array("s2_type", "s2", [5u64]),
                FieldDecl::scalar("s1_type", "s1"),
            ],
        ),
    ])
    .unwrap();
    let constants: ResolvedConstants = [("MAX_20", 20)].into_iter().collect();
    let vector = Synthesizer::new(&catalogue, &constants)
        .vector("s3_type")
        .unwrap();

    let s1 = 10 + 2 * 10 + 4 * 20;
    let s2 = 10 + 2 * 20 + 2 * s1;
    assert_eq!(vector.len(), 5 * s2 + s1);

    let composites = vector
        .big
        .annotations
        .iter()
        .filter(|annotation| matches!(annotation.kind, AnnotationKind::Composite { .. }))
        .count();
    // 5 s2 elements, each with 2 nested s1 elements, plus the trailing s1.
    assert_eq!(composites, 5 + 5 * 2 + 1);
}
