use criterion::{Criterion, criterion_group, criterion_main};
use ndarray::{Array1, Array2};
use std::hint::black_box;
use transconnect::{prelude::*, train::CandidateSpec};

fn synthetic_route(stops: usize) -> RouteTable {
    let stops: Vec<Stop> = (0..stops)
        .map(|i| Stop {
            name: format!("stop-{i}").into(),
            position: i as u32 + 1,
            coordinate: Coordinate {
                latitude: -1.95 + i as f64 * 0.001,
                longitude: 30.15 - i as f64 * 0.003,
            },
            cumulative_km: i as f64 * 0.5,
        })
        .collect();
    RouteTable::from_stops(stops).expect("valid synthetic route")
}

fn synthetic_bundle() -> ModelBundle {
    let n = 200;
    let mut x = Array2::zeros((n, 3));
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let distance = 26.0 * i as f64 / n as f64;
        let traffic = (i % 2) as f64;
        let hour = (6 + i % 14) as f64;
        let speed = if traffic > 0.0 { 17.3 } else { 31.2 };
        x[[i, 0]] = distance;
        x[[i, 1]] = traffic;
        x[[i, 2]] = hour;
        y[i] = distance / speed * 60.0;
    }
    let candidates = vec![Candidate::new("linear-regression", CandidateSpec::Linear)];
    let (bundle, _) = train_and_select(x, y, &candidates, &TrainConfig::default())
        .expect("training on synthetic data");
    bundle
}

fn nearest_lookup(route: &RouteTable, query: &Coordinate) {
    let _ = black_box(route.nearest_stop(query));
}

fn full_prediction(route: &RouteTable, bundle: &ModelBundle, query: &Coordinate) {
    let _ = black_box(predict_eta(route, bundle, *query, Condition::Traffic, 8));
}

fn criterion_benchmark(c: &mut Criterion) {
    let route = synthetic_route(100);
    let bundle = synthetic_bundle();
    let query = Coordinate {
        latitude: -1.9201,
        longitude: 30.06,
    };

    let mut group = c.benchmark_group("Eta");

    group.bench_function("Nearest stop (100 stops)", |b| {
        b.iter(|| nearest_lookup(&route, &query))
    });

    group.bench_function("End to end prediction", |b| {
        b.iter(|| full_prediction(&route, &bundle, &query))
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
