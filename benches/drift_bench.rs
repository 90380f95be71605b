use chrono::{TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use driftscan::engine::decide;
use driftscan::scanner::ObservedEntry;
use driftscan::store::FileRecord;
use driftscan::utils::hash;
use std::hint::black_box;
use std::path::PathBuf;

fn bench_hash_bytes(c: &mut Criterion) {
    let small = vec![0xabu8; 4 * 1024];
    let large = vec![0xabu8; 1024 * 1024];

    c.bench_function("hash_bytes_4k", |b| {
        b.iter(|| hash::hash_bytes(black_box(&small)));
    });
    c.bench_function("hash_bytes_1m", |b| {
        b.iter(|| hash::hash_bytes(black_box(&large)));
    });
}

fn bench_decide(c: &mut Criterion) {
    let record = FileRecord {
        path: PathBuf::from("/data/a.txt"),
        size: 4096,
        modified: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        digest: "0".repeat(64),
    };
    let observed = ObservedEntry {
        path: PathBuf::from("/data/a.txt"),
        size: 4096,
        modified: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        is_dir: false,
    };
    let digest = "0".repeat(64);

    c.bench_function("decide_unchanged", |b| {
        b.iter(|| decide(black_box(Some(&record)), black_box(&observed), black_box(&digest)));
    });
}

criterion_group!(benches, bench_hash_bytes, bench_decide);
criterion_main!(benches);
