//! Benchmarks for the transfer pipeline.

use criterion::{criterion_group, criterion_main, Criterion};
use retarget::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> Mesh {
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    // Create grid vertices
    for j in 0..=n {
        for i in 0..=n {
            positions.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    // Create triangles
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push(vec![v00, v10, v11]);
            faces.push(vec![v00, v11, v01]);
        }
    }

    Mesh::new(positions, faces).unwrap()
}

/// The grid with a central bump, as a deformed pose.
fn create_bumped_grid(base: &Mesh, n: usize) -> Mesh {
    let center = Point3::new(n as f64 / 2.0, n as f64 / 2.0, 0.0);
    let positions: Vec<Point3<f64>> = base
        .positions()
        .iter()
        .map(|p| {
            let d = (p - center).norm();
            Point3::new(p.x, p.y, (-d * d / 4.0).exp())
        })
        .collect();
    base.with_positions(positions).unwrap()
}

fn bench_correspondence(c: &mut Criterion) {
    let source = create_grid_mesh(20);
    let target = create_grid_mesh(27);

    c.bench_function("resolve_grid_27_onto_20", |b| {
        b.iter(|| resolve(&target, &source, &ResolveOptions::default()).unwrap());
    });

    c.bench_function("resolve_grid_27_onto_20_sequential", |b| {
        b.iter(|| resolve(&target, &source, &ResolveOptions::default().sequential()).unwrap());
    });
}

fn bench_smoothing(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);
    let bumped = create_bumped_grid(&mesh, 50);
    let deltas = DeltaSet::between(&mesh, &bumped).unwrap();
    let statics = classify_static(&deltas, 0.001).unwrap();

    c.bench_function("smooth_grid_50_10_iterations", |b| {
        b.iter(|| {
            smooth_deltas(
                &deltas,
                mesh.adjacency(),
                &statics,
                &SmoothOptions::default().with_iterations(10),
            )
            .unwrap()
        });
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let source = create_grid_mesh(20);
    let bumped = create_bumped_grid(&source, 20);
    let target = create_grid_mesh(27);

    let mut scene = MemoryScene::new();
    scene.insert_mesh("source", source);
    scene.insert_mesh("source_bumped", bumped);
    scene.insert_mesh("target", target);

    let mut session = TransferSession::new();
    session.set_source(&scene, "source").unwrap();
    session.set_target(&scene, "target").unwrap();

    c.bench_function("execute_from_mesh_grid_27", |b| {
        b.iter(|| {
            session
                .execute_from_mesh(&scene, "source_bumped", &TransferOptions::default())
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_correspondence, bench_smoothing, bench_full_pipeline);
criterion_main!(benches);
