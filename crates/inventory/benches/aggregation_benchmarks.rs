use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use medistock_core::TransactionId;
use medistock_inventory::{
    BucketOrder, MovementType, Transaction, TransactionFilter, aggregate_with, export_csv_in,
};

const MATERIALS: [(&str, Option<&str>); 6] = [
    ("Vida Suero Oral", None),
    ("Espejos Vaginales", None),
    ("Laminillas", None),
    ("Citobrush", None),
    ("Pruebas Rápidas", Some("Hepatitis B")),
    ("Pruebas Rápidas", Some("VIH/Sífilis")),
];

/// Synthetic history: round-robin materials, every third movement an outflow.
fn history(n: usize) -> Vec<Transaction> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let (material, subtype) = MATERIALS[i % MATERIALS.len()];
            Transaction {
                id: TransactionId::new(),
                date: start + Duration::minutes(i as i64 * 37),
                kind: if i % 3 == 0 { MovementType::Salida } else { MovementType::Ingreso },
                material_name: material.to_string(),
                subtype: subtype.map(str::to_string),
                batch_number: format!("L{:05}", i % 500),
                origin_or_destination: "ALMACÉN".to_string(),
                quantity: (i % 40 + 1) as u32,
                observations: None,
            }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    for &n in &[100usize, 1_000, 10_000] {
        let txs = history(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("first_seen", n), &txs, |b, txs| {
            b.iter(|| aggregate_with(black_box(txs), BucketOrder::FirstSeen))
        });
        group.bench_with_input(BenchmarkId::new("alphabetical", n), &txs, |b, txs| {
            b.iter(|| aggregate_with(black_box(txs), BucketOrder::Alphabetical))
        });
    }
    group.finish();
}

fn bench_filter_and_export(c: &mut Criterion) {
    let tz = FixedOffset::west_opt(6 * 3600).unwrap();
    let txs = history(10_000);
    let filter = TransactionFilter::new()
        .with_search("l0012")
        .from_date(chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
        .to_date(chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());

    c.bench_function("filter/search_and_range_10k", |b| {
        b.iter(|| filter.apply_in(black_box(&txs), &tz))
    });
    c.bench_function("export_csv/10k", |b| b.iter(|| export_csv_in(black_box(&txs), &tz)));
}

criterion_group!(benches, bench_aggregate, bench_filter_and_export);
criterion_main!(benches);
