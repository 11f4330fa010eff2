use basalt_perf::make_test_record;
use basalt_sync::SnapBuffer;
use basalt_wal::LogRecord;
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

fn bench_write(c: &mut Criterion) {
    let (mut w, _r) = SnapBuffer::<LogRecord>::new().split();
    let rec = make_test_record();

    let mut group = c.benchmark_group("snap");
    group.throughput(Throughput::Elements(1));

    group.bench_function("write", |b| {
        b.iter(|| w.write(black_box(rec)));
    });

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let (mut w, r) = SnapBuffer::<LogRecord>::new().split();
    w.write(make_test_record());

    let mut group = c.benchmark_group("snap");
    group.throughput(Throughput::Elements(1));

    group.bench_function("read", |b| {
        b.iter(|| black_box(r.read()));
    });

    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let (mut w, r) = SnapBuffer::<LogRecord>::new().split();
    let rec = make_test_record();

    let mut group = c.benchmark_group("snap");
    group.throughput(Throughput::Elements(1));

    group.bench_function("round_trip", |b| {
        b.iter(|| {
            w.write(black_box(rec));
            black_box(r.read())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_write, bench_read, bench_round_trip);
criterion_main!(benches);
