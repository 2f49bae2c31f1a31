use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pushguard::config::Policy;
use pushguard::message::MessageValidator;
use pushguard::mood::VerbList;
use std::hint::black_box;

fn messages(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            0 => format!("Fix parser bug number {i}"),
            1 => format!("Add option {i}\n\nThe option is read from the config file\nand passed to the checker.\n"),
            2 => format!("Merge branch 'topic-{i}' into main"),
            _ => format!("changed things in module {i}."),
        })
        .collect()
}

fn bench_first_violation(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_first_violation");
    let oracle = VerbList::new(["Fix", "Add", "Change"]);

    for (name, policy) in [("classic", Policy::classic()), ("modern", Policy::modern())] {
        let validator = MessageValidator::new(&policy.message, &oracle);
        for size in [100usize, 1_000] {
            let batch = messages(size);
            group.throughput(Throughput::Elements(size as u64));
            group.bench_with_input(BenchmarkId::new(name, size), &batch, |b, batch| {
                b.iter(|| {
                    for message in batch {
                        black_box(validator.first_violation(message).unwrap());
                    }
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_first_violation);
criterion_main!(benches);
