use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use qnet_sim::events::{Event, EventKind, EventList};

const EVENTS: usize = 10_000;

fn filled_list() -> EventList {
    let mut list = EventList::new();
    for idx in 0..EVENTS {
        // Spread times with a few deterministic collisions to exercise
        // the tie-break path.
        let time = (idx % 97) as f64 + (idx as f64) * 1e-4;
        list.add(Event::new(time, EventKind::Arrival, idx as u64, idx % 4));
    }
    list
}

fn bench_event_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_list");

    group.bench_function("add_10k", |b| {
        b.iter(|| {
            let mut list = EventList::new();
            for idx in 0..EVENTS {
                let time = (idx % 97) as f64;
                list.add(Event::new(time, EventKind::Arrival, idx as u64, 0));
            }
            black_box(list.len())
        })
    });

    group.bench_function("drain_10k", |b| {
        b.iter_batched(
            filled_list,
            |mut list| {
                while let Some(event) = list.remove_next() {
                    black_box(event.time);
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_event_list);
criterion_main!(benches);
