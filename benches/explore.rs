use criterion::{criterion_group, criterion_main, Criterion};
use flora_core::{ancestors, explore, ColorTable, Genotype, LineageMemo, Species};

fn rose_seeds() -> Vec<Genotype> {
    vec![
        Genotype::from_alleles(Species::Rose, "RRyyWWSs").unwrap(),
        Genotype::from_alleles(Species::Rose, "rrYYWWss").unwrap(),
        Genotype::from_alleles(Species::Rose, "rryyWwss").unwrap(),
    ]
}

fn bench_explore(c: &mut Criterion) {
    let seeds = rose_seeds();

    c.bench_function("explore_rose_seeds", |b| b.iter(|| explore(&seeds)));

    let het = Genotype::new(Species::Rose, &[1, 1, 1, 1]).unwrap();
    c.bench_function("cross_rose_double_het", |b| b.iter(|| het.cross(&het)));

    let table = explore(&seeds);
    let colors = ColorTable::new();
    let blue = Genotype::from_alleles(Species::Rose, "RRYYwwss").unwrap();
    c.bench_function("lineage_blue_rose", |b| {
        b.iter(|| {
            let mut memo = LineageMemo::new();
            ancestors(&blue, &table, &colors, &mut memo).unwrap()
        })
    });
}

criterion_group!(benches, bench_explore);
criterion_main!(benches);
