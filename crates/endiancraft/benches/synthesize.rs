use endiancraft::{
    constants::ResolvedConstants,
    field::FieldDecl,
    primitive::ByteOrder,
    schema::{Catalogue, StructDecl},
    synth::Synthesizer,
};
use criterion::{Criterion, criterion_group, criterion_main};

const TYPES: [&str; 4] = ["uint8_t", "uint16_t", "uint32_t", "uint64_t"];

/// A leaf struct with `field_count` arrays and a parent holding four of them.
fn gen_catalogue(field_count: usize) -> Catalogue {
    let mut fields = Vec::with_capacity(field_count);

    for i in 0..field_count {
        fields.push(FieldDecl::array(TYPES[i % TYPES.len()], format!("f{}", i), [4u64, 2]));
    }

    Catalogue::new(vec![
        StructDecl::new("leaf_t", fields),
        StructDecl::new("root_t", vec![FieldDecl::array("leaf_t", "leaves", [4u64])]),
    ])
    .unwrap()
}

fn bench_synthesize(c: &mut Criterion) {
    let constants = ResolvedConstants::new();

    for &field_count in &[1usize, 10, 50, 100] {
        let catalogue = gen_catalogue(field_count);
        let synthesizer = Synthesizer::new(&catalogue, &constants);

        c.bench_function(&format!("synthesize_{}_fields", field_count), |b| {
            b.iter(|| {
                let _ = synthesizer.image("root_t", ByteOrder::Little).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_synthesize);
criterion_main!(benches);
