use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use csv_loader::catalog::ColumnSchema;
use csv_loader::coerce::{CoercionPolicy, coerce};
use csv_loader::statement::{IdentifierQuoting, build_insert};

fn sample_schema() -> Vec<ColumnSchema> {
    vec![
        ColumnSchema::new("Id", "int"),
        ColumnSchema::new("Name", "varchar"),
        ColumnSchema::new("Amount", "money"),
        ColumnSchema::new("Active", "bit"),
        ColumnSchema::new("CreatedAt", "datetime"),
    ]
}

fn sample_rows(count: usize) -> Vec<Vec<String>> {
    (0..count)
        .map(|ix| {
            vec![
                ix.to_string(),
                format!("O'Brien-{ix}"),
                format!("${ix}.50"),
                (if ix % 2 == 0 { "yes" } else { "no" }).to_string(),
                format!("2024-01-{:02} 08:30:00 UTC", (ix % 28) + 1),
            ]
        })
        .collect()
}

fn bench_coerce(c: &mut Criterion) {
    let policy = CoercionPolicy::default();
    let rows = sample_rows(1_000);
    let dtypes = ["int", "varchar", "money", "bit", "datetime"];
    c.bench_function("coerce_mixed_fields", |b| {
        b.iter(|| {
            for row in &rows {
                for (value, dtype) in row.iter().zip(dtypes) {
                    black_box(coerce(value, dtype, &policy));
                }
            }
        })
    });
}

fn bench_build_insert(c: &mut Criterion) {
    let schema = sample_schema();
    let columns: Vec<String> = schema.iter().map(|col| col.name.clone()).collect();
    let rows = sample_rows(1_000);
    let policy = CoercionPolicy::default();
    c.bench_function("build_insert_1k_rows", |b| {
        b.iter(|| {
            for row in &rows {
                black_box(
                    build_insert(
                        "dbo.ledger",
                        &columns,
                        row,
                        &schema,
                        IdentifierQuoting::default(),
                        &policy,
                    )
                    .expect("build"),
                );
            }
        })
    });
}

criterion_group!(benches, bench_coerce, bench_build_insert);
criterion_main!(benches);
