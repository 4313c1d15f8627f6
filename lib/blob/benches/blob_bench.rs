use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tempfile::TempDir;

use labkom_blob::{BlobStore, FileStore};

fn bench_put_100kb(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::open(tmp.path()).unwrap();
    // Typical scanned supervisor letter.
    let data = vec![0xABu8; 100 * 1024];

    c.bench_function("blob_put_100kb", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("surat/req{}.pdf", i);
            store.put(black_box(&key), black_box(&data)).unwrap();
            i += 1;
        });
    });
}

fn bench_put_3mb(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::open(tmp.path()).unwrap();
    // Upload limit.
    let data = vec![0xABu8; 3 * 1024 * 1024];

    c.bench_function("blob_put_3mb", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("surat/req{}.pdf", i);
            store.put(black_box(&key), black_box(&data)).unwrap();
            i += 1;
        });
    });
}

fn bench_get_100kb(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::open(tmp.path()).unwrap();
    let data = vec![0xABu8; 100 * 1024];

    for i in 0..1000 {
        let key = format!("surat/req{}.pdf", i);
        store.put(&key, &data).unwrap();
    }

    c.bench_function("blob_get_100kb", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("surat/req{}.pdf", i % 1000);
            let _ = store.get(black_box(&key)).unwrap();
            i += 1;
        });
    });
}

fn bench_list(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::open(tmp.path()).unwrap();

    for i in 0..500 {
        let key = format!("surat/req{}.pdf", i);
        store.put(&key, b"doc").unwrap();
    }
    for i in 0..500 {
        let key = format!("export/report-{}.csv", i);
        store.put(&key, b"doc").unwrap();
    }

    c.bench_function("blob_list_500", |b| {
        b.iter(|| {
            let results = store.list(black_box("surat/")).unwrap();
            assert_eq!(results.len(), 500);
        });
    });
}

criterion_group!(benches, bench_put_100kb, bench_put_3mb, bench_get_100kb, bench_list);
criterion_main!(benches);
