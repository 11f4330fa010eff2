use basalt_perf::make_test_record;
use basalt_sync::Mailbox;
use basalt_wal::LogRecord;
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

fn bench_publish(c: &mut Criterion) {
    let (mut w, _r) = Mailbox::<LogRecord>::new().split();
    let rec = make_test_record();

    let mut group = c.benchmark_group("mailbox");
    group.throughput(Throughput::Elements(1));

    group.bench_function("publish", |b| {
        b.iter(|| w.publish(black_box(rec)));
    });

    group.finish();
}

fn bench_try_read_hit(c: &mut Criterion) {
    let (mut w, mut r) = Mailbox::<LogRecord>::new().split();
    w.publish(make_test_record());
    let mut out = LogRecord::default();

    let mut group = c.benchmark_group("mailbox");
    group.throughput(Throughput::Elements(1));

    group.bench_function("try_read (hit)", |b| {
        b.iter(|| black_box(r.try_read(&mut out)));
    });

    group.finish();
}

fn bench_try_read_miss(c: &mut Criterion) {
    let (_w, mut r) = Mailbox::<LogRecord>::new().split();
    let mut out = LogRecord::default();

    let mut group = c.benchmark_group("mailbox");
    group.throughput(Throughput::Elements(1));

    group.bench_function("try_read (miss)", |b| {
        b.iter(|| black_box(r.try_read(&mut out)));
    });

    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let (mut w, mut r) = Mailbox::<LogRecord>::new().split();
    let rec = make_test_record();
    let mut out = LogRecord::default();

    let mut group = c.benchmark_group("mailbox");
    group.throughput(Throughput::Elements(1));

    group.bench_function("round_trip", |b| {
        b.iter(|| {
            w.publish(black_box(rec));
            black_box(r.try_read(&mut out))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_publish,
    bench_try_read_hit,
    bench_try_read_miss,
    bench_round_trip,
);
criterion_main!(benches);
