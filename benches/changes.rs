//! Change-diff engine benchmarks
//!
//! Measures the diff function over documents of increasing width, for the
//! identity case (nothing changed) and a mixed patch (set + unset + push).
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench changes
//! cargo bench --bench changes -- "changes/identity"
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docmap::{changes, Document, Value};

/// Field counts for width scaling.
const WIDTHS: &[usize] = &[8, 64, 256];

fn snapshot(fields: usize) -> Document {
    let mut document = Document::new();
    for i in 0..fields {
        let value = match i % 4 {
            0 => Value::Int(i as i64),
            1 => Value::from(format!("value-{i}")),
            2 => Value::Array((0..8).map(Value::Int).collect()),
            _ => {
                let mut nested = Document::new();
                nested.insert("inner".to_string(), Value::Int(i as i64));
                nested.insert("flag".to_string(), Value::Bool(i % 2 == 0));
                Value::Object(nested)
            }
        };
        document.insert(format!("field_{i}"), value);
    }
    document
}

fn mutated(baseline: &Document) -> Document {
    let mut current = baseline.clone();
    current.insert("field_0".to_string(), Value::from("replaced"));
    current.shift_remove("field_1");
    if let Some(Value::Array(items)) = current.get_mut("field_2") {
        items.push(Value::Int(99));
    }
    current.insert("brand_new".to_string(), Value::Bool(true));
    current
}

fn bench_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("changes");

    for &width in WIDTHS {
        let baseline = snapshot(width);
        let current = mutated(&baseline);

        group.bench_with_input(
            BenchmarkId::new("identity", width),
            &baseline,
            |b, baseline| b.iter(|| changes(black_box(baseline), black_box(baseline))),
        );

        group.bench_with_input(BenchmarkId::new("mixed", width), &width, |b, _| {
            b.iter(|| changes(black_box(&current), black_box(&baseline)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_changes);
criterion_main!(benches);
