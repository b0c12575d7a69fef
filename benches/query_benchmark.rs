use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use memdoc::core::database::Database;
use memdoc::query::ast::{
    Builtin, Comparison, CreateTable, Insert, MetaQuery, Predicate, Query, TableRef, Term,
    WriteQuery,
};
use rand::Rng;
use std::thread;

fn events() -> TableRef {
    TableRef::new("bench", "events")
}

fn open_database() -> Database {
    let db = Database::new();
    db.execute(&Query::meta(0, MetaQuery::CreateDb("bench".into())));
    db.execute(&Query::meta(0, MetaQuery::CreateTable(CreateTable::new(events()))));
    db
}

/// Helper to create test documents
fn create_test_document(id: Option<u64>) -> Term {
    let mut rng = rand::thread_rng();
    let words = ["the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog"];
    let tags = (0..4)
        .map(|_| Term::string(words[rng.gen_range(0..words.len())]))
        .collect();

    let mut fields = vec![
        ("category".to_string(), Term::String(format!("category_{}", rng.gen_range(0..10)))),
        ("score".to_string(), Term::Number(rng.gen_range(0.0..100.0))),
        ("tags".to_string(), Term::Array(tags)),
    ];
    if let Some(id) = id {
        fields.push(("id".to_string(), Term::Number(id as f64)));
    }
    Term::Object(fields)
}

fn insert_query(token: i64, terms: Vec<Term>) -> Query {
    Query::write(
        token,
        WriteQuery::Insert(Insert {
            table_ref: events(),
            terms,
        }),
    )
}

fn populate(db: &Database, count: u64) {
    let docs = (0..count).map(|id| create_test_document(Some(id))).collect();
    db.execute(&insert_query(0, docs));
}

/// Benchmark single document insertion with a generated key
fn bench_single_insert(c: &mut Criterion) {
    let db = open_database();

    c.bench_function("single_document_insert", |b| {
        let mut token = 0;
        b.iter(|| {
            let response = db.execute(&insert_query(token, vec![create_test_document(None)]));
            token += 1;
            black_box(response)
        });
    });
}

/// Benchmark batch insertion
fn bench_batch_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_insert");

    for batch_size in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                let db = open_database();
                let mut next_id = 0u64;

                b.iter(|| {
                    let docs = (0..batch_size)
                        .map(|_| {
                            next_id += 1;
                            create_test_document(Some(next_id))
                        })
                        .collect();
                    black_box(db.execute(&insert_query(next_id as i64, docs)))
                });
            },
        );
    }
    group.finish();
}

/// Benchmark point lookups by primary key
fn bench_get_by_key(c: &mut Criterion) {
    let db = open_database();
    populate(&db, 10_000);

    c.bench_function("get_by_key", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let key = Term::Number(rng.gen_range(0..10_000) as f64);
            black_box(db.execute(&Query::read(1, Term::get_by_key(events(), key))))
        });
    });
}

/// Benchmark full table scans
fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_scan");

    for rows in [100u64, 1000, 10_000].iter() {
        let db = open_database();
        populate(&db, *rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), rows, |b, _| {
            b.iter(|| black_box(db.execute(&Query::read(2, Term::Table(events())))));
        });
    }
    group.finish();
}

/// Benchmark expression evaluation without touching a table
fn bench_expressions(c: &mut Criterion) {
    let db = Database::new();
    let predicate = Predicate {
        arg: "row".to_string(),
        body: Box::new(Term::compare(
            Comparison::Ge,
            Term::call(Builtin::GetAttr, vec![Term::ImplicitVar, Term::string("score")]),
            Term::call(Builtin::Div, vec![Term::Number(100.0), Term::Number(3.0)]),
        )),
    };
    let row = Term::object([("score", Term::Number(42.0))]);
    let query = Query::read(3, Term::call(Builtin::Filter(predicate), vec![row]));

    c.bench_function("filter_expression", |b| {
        b.iter(|| black_box(db.execute(&query)));
    });
}

/// Benchmark readers running against a concurrent writer
fn bench_concurrent_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_operations");
    group.sample_size(10);

    for readers in [2, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(readers), readers, |b, &readers| {
            let db = open_database();
            populate(&db, 1000);

            b.iter(|| {
                let writer = {
                    let db = db.clone();
                    thread::spawn(move || {
                        for token in 0..100 {
                            db.execute(&insert_query(token, vec![create_test_document(None)]));
                        }
                    })
                };
                let handles: Vec<_> = (0..readers)
                    .map(|_| {
                        let db = db.clone();
                        thread::spawn(move || {
                            for _ in 0..100 {
                                let key = Term::Number(rand::thread_rng().gen_range(0..1000) as f64);
                                black_box(db.execute(&Query::read(4, Term::get_by_key(events(), key))));
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.join().unwrap();
                }
                writer.join().unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_insert,
    bench_batch_insert,
    bench_get_by_key,
    bench_scan,
    bench_expressions,
    bench_concurrent_operations
);
criterion_main!(benches);
