use criterion::{black_box, criterion_group, criterion_main, Criterion};
use declutter_core::batch::extract_features;
use declutter_core::registry::{RegistryConfig, TrackRegistry};
use declutter_core::types::{TrackId, Update};

fn make_updates(n_tracks: usize, ticks: usize) -> Vec<Update> {
    let mut out = Vec::with_capacity(n_tracks * ticks);
    for t in 0..ticks {
        for k in 0..n_tracks {
            let phase = k as f64 * std::f64::consts::TAU / n_tracks as f64;
            let tf = t as f64;
            out.push(Update {
                track_id: TrackId::from(k as u64),
                timestamp: tf,
                speed: 10.0 + (tf * 0.1 + phase).sin(),
                azimuth: (phase.to_degrees() + tf) % 360.0,
                elevation: 2.0,
                range: 1000.0 + tf,
                lat: 40.0 + 0.0001 * tf * phase.cos(),
                lon: -90.0 + 0.0001 * tf * phase.sin(),
                alt_msl: 250.0,
                radar_cross_section: 0.01,
            });
        }
    }
    out
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    for n in [50, 500, 2000] {
        let updates = make_updates(n, 20);
        group.bench_function(format!("ingest_snapshot_{n}_tracks"), |b| {
            b.iter(|| {
                let mut reg = TrackRegistry::new(RegistryConfig::default());
                for u in &updates {
                    reg.ingest(u);
                }
                reg.evict_stale(19.0);
                black_box(reg.snapshot_all());
            });
        });
        group.bench_function(format!("batch_extract_{n}_tracks"), |b| {
            b.iter(|| black_box(extract_features(&updates)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_registry);
criterion_main!(benches);
