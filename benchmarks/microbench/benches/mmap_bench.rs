use std::io::Write;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use scanlab_core::scan::sum_linear;
use scanlab_core::{advise_sequential, Buffer};

// 16 MiB column file of 4-byte integers
const FILE_ELEMENTS: i32 = 4 * 1024 * 1024;

fn column_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    let bytes: Vec<u8> = (0..FILE_ELEMENTS).flat_map(|v| v.to_le_bytes()).collect();
    file.write_all(&bytes).expect("write column");
    file.flush().expect("flush column");
    file
}

fn bench_map(c: &mut Criterion) {
    let file = column_file();

    c.bench_function("map_and_release", |b| {
        b.iter(|| {
            let column = Buffer::<i32>::map_file(black_box(file.path())).expect("map");
            black_box(column.len())
        });
    });
}

fn bench_mapped_scan(c: &mut Criterion) {
    let file = column_file();
    let mut group = c.benchmark_group("mapped_scan");
    group.throughput(Throughput::Bytes(FILE_ELEMENTS as u64 * 4));
    group.sample_size(20);

    for advise in [false, true] {
        let name = if advise { "madvise_sequential" } else { "no_madvise" };
        group.bench_function(name, |b| {
            b.iter(|| {
                let column = Buffer::<i32>::map_file(file.path()).expect("map");
                if advise {
                    black_box(advise_sequential(&column).is_applied());
                }
                sum_linear(black_box(&column))
            });
        });
    }

    let heap = Buffer::from_vec((0..FILE_ELEMENTS).collect::<Vec<i32>>());
    group.bench_function("heap", |b| {
        b.iter(|| sum_linear(black_box(&heap)));
    });
    group.finish();
}

criterion_group!(benches, bench_map, bench_mapped_scan);
criterion_main!(benches);
