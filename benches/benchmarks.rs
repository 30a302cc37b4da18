use criterion::{black_box, criterion_group, criterion_main, Criterion};
use newsletter_client::models::parse_search_response;
use serde_json::{json, Value};

fn search_body(count: usize) -> Value {
    let emails: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": i,
                "sender": format!("news{}@example.com", i),
                "subject": format!("Weekly digest #{}", i),
                "received_at": "2024-03-01T09:30:00"
            })
        })
        .collect();
    json!({ "query": "digest", "emails": emails })
}

fn search_benchmarks(c: &mut Criterion) {
    let body = search_body(100);
    c.bench_function("parse_search_response_100", |b| {
        b.iter(|| parse_search_response(black_box(body.clone())))
    });

    let empty = json!({ "message": "No emails found for the given query." });
    c.bench_function("parse_search_response_no_matches", |b| {
        b.iter(|| parse_search_response(black_box(empty.clone())))
    });
}

criterion_group!(benches, search_benchmarks);
criterion_main!(benches);
