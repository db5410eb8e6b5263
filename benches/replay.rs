//! Throughput benchmarks for message application and top-of-book queries.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lobster_replay::{Book, EventApplier, Message};

/// A deterministic add/cancel/execute mix around a tight spread.
fn create_test_messages(count: usize) -> Vec<Message> {
    let base_price: i64 = 5_850_000;
    let mut messages = Vec::with_capacity(count);

    for i in 0..count {
        let order_id = (i + 1) as u64;
        let is_bid = i % 2 == 0;
        let direction = if is_bid { 1 } else { -1 };
        let offset = ((i % 10) as i64) * 100;
        let price = if is_bid {
            base_price - offset
        } else {
            base_price + 100 + offset
        };
        let timestamp = 34_200.0 + i as f64 * 1e-6;

        match i % 7 {
            // Mostly submissions so the book keeps resting liquidity.
            0..=3 => messages.push(Message::new(
                timestamp,
                1,
                order_id,
                ((i % 100) + 1) as u64,
                price,
                direction,
            )),
            4 => messages.push(Message::new(
                timestamp,
                2,
                order_id.saturating_sub(4),
                5,
                price,
                direction,
            )),
            5 => messages.push(Message::new(
                timestamp,
                4,
                order_id.saturating_sub(2),
                3,
                price,
                direction,
            )),
            _ => messages.push(Message::new(
                timestamp,
                3,
                order_id.saturating_sub(6),
                0,
                price,
                direction,
            )),
        }
    }

    messages
}

fn bench_apply(c: &mut Criterion) {
    let messages = create_test_messages(100_000);

    let mut group = c.benchmark_group("apply");
    group.throughput(Throughput::Elements(messages.len() as u64));

    group.bench_function("process_messages", |b| {
        b.iter(|| {
            let mut book = Book::with_capacity(10_000, 200_000);
            let mut applier = EventApplier::new();
            for msg in &messages {
                applier.apply(&mut book, black_box(msg));
            }
            black_box(book.order_count())
        })
    });

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let messages = create_test_messages(10_000);
    let mut book = Book::with_capacity(10_000, 20_000);
    let mut applier = EventApplier::new();
    for msg in &messages {
        applier.apply(&mut book, msg);
    }

    let mut group = c.benchmark_group("queries");

    group.bench_function("best_bid", |b| b.iter(|| black_box(book.best_bid())));
    group.bench_function("obi", |b| b.iter(|| black_box(book.obi())));
    group.bench_function("microprice", |b| b.iter(|| black_box(book.microprice())));
    group.bench_function("depth_10", |b| {
        b.iter(|| black_box(book.depth(lobster_replay::Side::Buy, 10)))
    });

    group.finish();
}

criterion_group!(benches, bench_apply, bench_queries);
criterion_main!(benches);
