use criterion::{black_box, criterion_group, criterion_main, Criterion};
use petgraph::graph::EdgeIndex;

use molzip::{fragment_on_bonds, molzip, parse_smiles, FragmentParams, MolzipParams};

const ETHANOL: &str = "CCO";
const DIENE: &str = "C/C=C/C=C/C";
const DIPEPTIDE: &str = "CC(=O)N[C@@H](C)C(=O)N[C@@H](CC(C)C)C(=O)O";

fn bench_fragment(c: &mut Criterion) {
    let ethanol = parse_smiles(ETHANOL).unwrap();
    let diene = parse_smiles(DIENE).unwrap();
    let dipeptide = parse_smiles(DIPEPTIDE).unwrap();
    let params = FragmentParams::default();

    let mut group = c.benchmark_group("fragment");

    group.bench_function("ethanol", |b| {
        b.iter(|| {
            black_box(
                fragment_on_bonds(black_box(&ethanol), &[EdgeIndex::new(1)], &params).unwrap(),
            )
        })
    });
    group.bench_function("diene", |b| {
        b.iter(|| {
            black_box(fragment_on_bonds(black_box(&diene), &[EdgeIndex::new(2)], &params).unwrap())
        })
    });
    group.bench_function("dipeptide", |b| {
        b.iter(|| {
            black_box(
                fragment_on_bonds(
                    black_box(&dipeptide),
                    &[EdgeIndex::new(3), EdgeIndex::new(8)],
                    &params,
                )
                .unwrap(),
            )
        })
    });

    group.finish();
}

fn bench_zip(c: &mut Criterion) {
    let params = MolzipParams::default();
    let frag_params = FragmentParams::default();

    let simple = vec![
        parse_smiles("CC[*:1]").unwrap(),
        parse_smiles("[*:1]O").unwrap(),
    ];
    let amino = vec![
        parse_smiles("C[*:1]").unwrap(),
        parse_smiles("[*:1]C(N)C(=O)O").unwrap(),
    ];
    let dipeptide_pieces = fragment_on_bonds(
        &parse_smiles(DIPEPTIDE).unwrap(),
        &[EdgeIndex::new(3), EdgeIndex::new(8)],
        &frag_params,
    )
    .unwrap();

    let mut group = c.benchmark_group("zip");

    group.bench_function("simple", |b| {
        b.iter(|| black_box(molzip(black_box(&simple), &params).unwrap()))
    });
    group.bench_function("amino_acid", |b| {
        b.iter(|| black_box(molzip(black_box(&amino), &params).unwrap()))
    });
    group.bench_function("dipeptide_rejoin", |b| {
        b.iter(|| {
            black_box(molzip(black_box(std::slice::from_ref(&dipeptide_pieces)), &params).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_fragment, bench_zip);
criterion_main!(benches);
