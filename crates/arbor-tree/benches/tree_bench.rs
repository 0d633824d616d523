//! Criterion benchmarks for arbor-tree: tree building and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use arbor_tree::{Attribute, DecisionTreeConfig, MaxDepth, Record, Schema, information_gain};

const COLORS: &[&str] = &["red", "green", "blue", "yellow"];

/// Records with `n_numeric` numeric and two categorical attributes; `y` is
/// driven by `x0` and `c0`.
fn make_records(n_records: usize, n_numeric: usize, seed: u64) -> (Schema, Vec<Record>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut attributes: Vec<Attribute> = (0..n_numeric)
        .map(|i| Attribute::numeric(format!("x{i}")))
        .collect();
    attributes.push(Attribute::categorical("c0"));
    attributes.push(Attribute::categorical("c1"));

    let records = (0..n_records)
        .map(|_| {
            let mut record = Record::new();
            for i in 0..n_numeric {
                record.insert(format!("x{i}"), rng.r#gen::<f64>() * 100.0);
            }
            let c0 = COLORS[rng.gen_range(0..COLORS.len())];
            let c1 = COLORS[rng.gen_range(0..COLORS.len())];
            let x0 = record.numeric("x0").unwrap_or(0.0);
            record.insert("c0", c0);
            record.insert("c1", c1);
            record.insert("y", x0 > 50.0 || c0 == "red");
            record
        })
        .collect();
    (Schema::new(attributes), records)
}

fn bench_fit(c: &mut Criterion) {
    let (schema, records) = make_records(1000, 8, 42);
    let cfg = DecisionTreeConfig::new()
        .with_schema(schema)
        .with_target("y")
        .with_max_depth(MaxDepth::new(5));

    c.bench_function("tree_fit_1000x10_depth5", |b| {
        b.iter(|| cfg.fit(&records).unwrap());
    });
}

fn bench_predict_batch(c: &mut Criterion) {
    let (schema, records) = make_records(1000, 8, 42);
    let tree = DecisionTreeConfig::new()
        .with_schema(schema)
        .with_target("y")
        .fit(&records)
        .unwrap();

    c.bench_function("tree_predict_batch_1000", |b| {
        b.iter(|| tree.predict_batch(&records));
    });
}

fn bench_numeric_gain(c: &mut Criterion) {
    // Threshold search sorts and sweeps every distinct value.
    let (_, records) = make_records(1000, 1, 42);
    let attribute = Attribute::numeric("x0");

    c.bench_function("information_gain_numeric_1000", |b| {
        b.iter(|| information_gain(&records, &attribute, "y", None));
    });
}

criterion_group!(benches, bench_fit, bench_predict_batch, bench_numeric_gain);
criterion_main!(benches);
