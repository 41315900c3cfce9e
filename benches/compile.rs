use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use levelnet::{
    compile, Delay, DelayTable, ExecutorConfig, Increment, LevelResult, Model, RoundExecutor,
};

/// A ring of `n` substrates: each activates the next and degrades.
fn ring_model(n: usize, levels: u32) -> Model {
    let side = levels as usize + 1;
    let matrix = DelayTable::matrix((0..side).map(|c| {
        (0..side).map(move |t| if c == 0 || t == side - 1 { Delay::Never } else { Delay::Finite(2 + t as u32) })
    }));
    let vector = DelayTable::vector((0..side).map(|t| if t == 0 { Delay::Never } else { Delay::Finite(7) }));

    let mut builder = Model::builder().levels(levels);
    for i in 0..n {
        builder = builder.substrate(format!("S{i}"), u32::from(i % 2 == 0) * levels);
    }
    for i in 0..n {
        builder = builder
            .catalyzed(&format!("act{i}"), format!("S{i}"), format!("S{}", (i + 1) % n), Increment::Up, matrix.clone())
            .degradation(&format!("deg{i}"), format!("S{i}"), Increment::Down, vector.clone());
    }
    builder.build().unwrap()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for n in [4usize, 32, 128] {
        let model = ring_model(n, 4);
        group.throughput(Throughput::Elements(model.reactions().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &model, |b, model| {
            b.iter(|| compile(model).unwrap());
        });
    }
    group.finish();
}

fn bench_execute_and_query(c: &mut Criterion) {
    let model = ring_model(32, 4);
    let config = ExecutorConfig {
        horizon: 500,
        max_rounds: 5_000,
    };

    c.bench_function("execute/ring32", |b| {
        b.iter(|| RoundExecutor::new(&model, config).unwrap().run().unwrap());
    });

    let report = RoundExecutor::new(&model, config).unwrap().run().unwrap();
    let result = LevelResult::new(report.trace);
    let times = result.time_indices();
    c.bench_function("query/concentration_at", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for &t in &times {
                sum += u64::from(result.concentration_at("S7", t).unwrap());
            }
            sum
        });
    });
}

criterion_group!(benches, bench_compile, bench_execute_and_query);
criterion_main!(benches);
