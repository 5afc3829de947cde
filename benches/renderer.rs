use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hieragram::{
    Attribute, EntityDescription, FieldGroup, Identifier, LayoutConfig, Theme, compute_layout,
    render_svg,
};
use std::hint::black_box;

fn synthetic_entity(attributes: usize, groups: usize, subs_per_group: usize) -> EntityDescription {
    EntityDescription {
        name: "Benchmark".to_string(),
        identifiers: vec![Identifier::new("BenchmarkId")],
        attributes: (0..attributes)
            .map(|i| {
                if i % 3 == 0 {
                    Attribute::with_selector(format!("Attribute{i}"))
                } else {
                    Attribute::new(format!("Attribute{i}"))
                }
            })
            .collect(),
        field_groups: (0..groups)
            .map(|g| {
                FieldGroup::new(
                    format!("Group{g}"),
                    (0..subs_per_group)
                        .map(|s| Attribute::new(format!("Sub{g}_{s}")))
                        .collect(),
                )
            })
            .collect(),
    }
}

fn bench_layout(c: &mut Criterion) {
    let theme = Theme::classic();
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("layout");
    for (name, entity) in [
        ("small", synthetic_entity(4, 1, 2)),
        ("medium", synthetic_entity(20, 4, 6)),
        ("large", synthetic_entity(80, 12, 10)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &entity, |b, entity| {
            b.iter(|| compute_layout(black_box(entity), &theme, &config));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let theme = Theme::classic();
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("render");
    for (name, entity) in [
        ("small", synthetic_entity(4, 1, 2)),
        ("medium", synthetic_entity(20, 4, 6)),
        ("large", synthetic_entity(80, 12, 10)),
    ] {
        let geometry = compute_layout(&entity, &theme, &config);
        group.bench_with_input(BenchmarkId::from_parameter(name), &geometry, |b, geometry| {
            b.iter(|| render_svg(black_box(geometry), &theme).expect("render"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout, bench_render);
criterion_main!(benches);
