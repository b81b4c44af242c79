use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dronevox_voiceprint::synth::{utterance, UtteranceConfig};
use dronevox_voiceprint::{
    FeatureExtractor, FrameStatsExtractor, Recognizer, StoreConfig, VoiceprintStore,
};

fn populated_store(n: usize) -> VoiceprintStore {
    let store = VoiceprintStore::in_memory(
        StoreConfig::default(),
        Arc::new(FrameStatsExtractor::default()),
    );
    let dim = store.dimension();
    for i in 0..n {
        let fp: Vec<f32> = (0..dim).map(|d| ((i * 31 + d * 7) % 97) as f32 / 97.0).collect();
        store
            .train_features(&format!("command-{i}"), vec![fp; 4], &[])
            .unwrap();
    }
    store
}

fn bench_extract(c: &mut Criterion) {
    let ext = FrameStatsExtractor::default();
    let cfg = UtteranceConfig::default();
    let audio = utterance("takeoff", 0, &cfg); // 2s

    c.bench_function("voiceprint_extract_2s", |b| {
        b.iter(|| {
            let _ = black_box(ext.extract(black_box(&audio)));
        });
    });
}

fn bench_recognize_100(c: &mut Criterion) {
    let store = populated_store(100);
    let recognizer = Recognizer::default();
    let query = store.list()[42].fingerprint.clone();

    c.bench_function("voiceprint_recognize_100", |b| {
        b.iter(|| {
            let _ = black_box(recognizer.recognize(black_box(&query), &store));
        });
    });
}

fn bench_synth(c: &mut Criterion) {
    let cfg = UtteranceConfig {
        duration: Duration::from_millis(400),
        ..Default::default()
    };

    c.bench_function("voiceprint_synth_400ms", |b| {
        b.iter(|| {
            let _ = black_box(utterance(black_box("landing"), 1, &cfg));
        });
    });
}

criterion_group!(benches, bench_extract, bench_recognize_100, bench_synth);
criterion_main!(benches);
