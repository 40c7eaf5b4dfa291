use criterion::{Criterion, criterion_group, criterion_main};
use mishwar::prelude::*;
use std::hint::black_box;

/// Synthetic grid city: `size` x `size` stops ~600 m apart, bus trips
/// along every row, metro lines down every third column, and a microbus
/// diagonal.
fn grid_city(size: u32) -> (StopGraph, FeedIndex) {
    let config = Config::default();
    let mut index = FeedIndex::new();
    let stop_id = |row: u32, col: u32| format!("S_{row}_{col}");

    let mut trips: Vec<(String, Mode, Vec<String>)> = Vec::new();
    for row in 0..size {
        trips.push((
            format!("BUS_{row}"),
            Mode::Bus,
            (0..size).map(|col| stop_id(row, col)).collect(),
        ));
    }
    for col in (0..size).step_by(3) {
        trips.push((
            format!("METRO_{col}"),
            Mode::Metro,
            (0..size).map(|row| stop_id(row, col)).collect(),
        ));
    }
    trips.push((
        "MICRO_DIAG".to_owned(),
        Mode::Microbus,
        (0..size).map(|i| stop_id(i, i)).collect(),
    ));

    for (i, (trip_id, mode, _)) in trips.iter().enumerate() {
        let route_id = format!("R{i}");
        index.insert_route(&route_id, *mode);
        index.insert_trip(trip_id, &route_id);
    }

    let mut builder = GraphBuilder::new(&index, &config);
    for row in 0..size {
        for col in 0..size {
            builder.add_stop(
                &stop_id(row, col),
                &format!("Stop {row}/{col}"),
                Coordinate::new(30.0 + row as f64 * 0.0054, 31.2 + col as f64 * 0.0062),
            );
        }
    }
    for (trip_id, _, stops) in &trips {
        for (seq, stop) in stops.iter().enumerate() {
            builder.add_stop_time(trip_id, stop, seq as u32 + 1);
        }
    }
    (builder.finish(), index)
}

fn criterion_benchmark(c: &mut Criterion) {
    let (graph, index) = grid_city(15);
    let router = Router::new(&graph, &index);

    let origin = Coordinate::new(30.0005, 31.2004);
    let destination = Coordinate::new(30.0750, 31.2860); // far corner

    let mut group = c.benchmark_group("Routing");

    group.bench_function("Optimal search", |b| {
        b.iter(|| {
            black_box(router.search(
                black_box(origin),
                black_box(destination),
                ModeMask::ANY.with_walk(),
                "optimal",
            ))
        })
    });

    group.bench_function("All four variants", |b| {
        b.iter(|| black_box(router.route_options(black_box(origin), black_box(destination))))
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
