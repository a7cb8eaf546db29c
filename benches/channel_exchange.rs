use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use cht_adapter::algs::index_lookup::{LoadSlot, load_indices, temperature_indices};
use cht_adapter::data::bc::{BoundaryTables, DirichletTable, LoadKind, LoadLabel, LoadTable};
use cht_adapter::data::quantity::Quantity;
use cht_adapter::topology::{ElementId, FaceRef, NodeId};

/// Boundary tables for `elements` disjoint tetrahedra, declared in shuffled order.
fn tables(elements: u64, rng: &mut StdRng) -> (BoundaryTables, Vec<NodeId>, Vec<FaceRef>) {
    let mut nodes: Vec<NodeId> = (1..=4 * elements).map(NodeId::new).collect();
    let faces: Vec<FaceRef> = (1..=elements)
        .map(|e| FaceRef::new(ElementId::new(e), 1).expect("face 1 exists"))
        .collect();

    let mut declared = nodes.clone();
    declared.shuffle(rng);
    let dirichlet = DirichletTable::from_declarations(declared.iter().map(|&n| (n, 0, 300.0)))
        .expect("unique declarations");
    let mut loads = LoadTable::new();
    let mut order = faces.clone();
    order.shuffle(rng);
    for f in &order {
        loads.push(f.element(), LoadLabel::on(LoadKind::DistributedFlux, *f), [0.0, 0.0]);
        loads.push(f.element(), LoadLabel::on(LoadKind::Film, *f), [0.0, 0.0]);
    }
    nodes.shuffle(rng);
    (BoundaryTables { dirichlet, loads }, nodes, faces)
}

fn bench_channel_exchange(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_exchange");
    let mut rng = StdRng::seed_from_u64(42);

    for &elements in &[256u64, 1024u64] {
        let (mut t, nodes, faces) = tables(elements, &mut rng);
        let film = LoadSlot::of(Quantity::SinkTemperature).expect("face quantity");

        group.bench_with_input(BenchmarkId::new("build_temperature", elements), &elements, |b, _| {
            b.iter(|| black_box(temperature_indices(&nodes, &t).expect("declared")));
        });
        group.bench_with_input(BenchmarkId::new("build_film", elements), &elements, |b, _| {
            b.iter(|| black_box(load_indices(&faces, film, &t).expect("declared")));
        });

        let temperature = temperature_indices(&nodes, &t).expect("declared");
        let sink = load_indices(&faces, film, &t).expect("declared");
        let node_buffer: Vec<f64> = (0..nodes.len()).map(|i| 290.0 + i as f64 * 1e-3).collect();
        let face_buffer = vec![310.0; faces.len()];
        group.bench_with_input(BenchmarkId::new("scatter", elements), &elements, |b, _| {
            b.iter(|| {
                temperature.scatter(black_box(&node_buffer), &mut t).expect("sized");
                sink.scatter(black_box(&face_buffer), &mut t).expect("sized");
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_channel_exchange);
criterion_main!(benches);
