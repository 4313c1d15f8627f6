use criterion::{Criterion, black_box, criterion_group, criterion_main};

use labkom_sql::{SQLStore, SqliteStore, Value};

fn seeded_store(rows: i64) -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .exec_batch(
            "CREATE TABLE requests (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                nim TEXT NOT NULL,
                data TEXT NOT NULL
            );
            CREATE INDEX idx_requests_status ON requests(status);",
        )
        .unwrap();

    for i in 0..rows {
        store
            .exec(
                "INSERT INTO requests (id, status, nim, data) VALUES (?1, ?2, ?3, ?4)",
                &[
                    Value::Text(format!("req{:05}", i)),
                    Value::Text(if i % 3 == 0 { "ACTIVE" } else { "PENDING" }.to_string()),
                    Value::Text(format!("21/{:06}/TK/{}", i, i % 9)),
                    Value::Text("{\"software\":[\"MATLAB\"]}".to_string()),
                ],
            )
            .unwrap();
    }
    store
}

fn bench_insert(c: &mut Criterion) {
    let store = seeded_store(0);
    let mut i = 0i64;
    c.bench_function("sqlite_insert_request", |b| {
        b.iter(|| {
            store
                .exec(
                    "INSERT INTO requests (id, status, nim, data) VALUES (?1, ?2, ?3, ?4)",
                    &[
                        Value::Text(format!("bench{:08}", i)),
                        Value::Text("PENDING".to_string()),
                        Value::Text("21/000000/TK/0".to_string()),
                        Value::Text("{}".to_string()),
                    ],
                )
                .unwrap();
            i += 1;
        });
    });
}

fn bench_get_by_id(c: &mut Criterion) {
    let store = seeded_store(10_000);
    let mut i = 0i64;
    c.bench_function("sqlite_get_request", |b| {
        b.iter(|| {
            let rows = store
                .query(
                    "SELECT id, status, data FROM requests WHERE id = ?1",
                    &[Value::Text(format!("req{:05}", black_box(i % 10_000)))],
                )
                .unwrap();
            assert_eq!(rows.len(), 1);
            i += 1;
        });
    });
}

fn bench_guarded_transition(c: &mut Criterion) {
    let store = seeded_store(10_000);
    let mut i = 0i64;
    c.bench_function("sqlite_cas_transition", |b| {
        b.iter(|| {
            // Affected count is 0 or 1; the statement itself is what we time.
            store
                .exec(
                    "UPDATE requests SET status = 'ACTIVE' WHERE id = ?1 AND status = 'PENDING'",
                    &[Value::Text(format!("req{:05}", black_box(i % 10_000)))],
                )
                .unwrap();
            i += 1;
        });
    });
}

criterion_group!(benches, bench_insert, bench_get_by_id, bench_guarded_transition);
criterion_main!(benches);
