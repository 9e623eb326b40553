use criterion::{black_box, criterion_group, criterion_main, Criterion};

use strongbox::core::codec;
use strongbox::core::crypto::{self, CompositeSecret, KdfParams};
use strongbox::Store;

fn light_params() -> KdfParams {
    KdfParams {
        m_cost: 1024,
        t_cost: 1,
        p_cost: 1,
    }
}

fn sample_store(entries: usize) -> Store {
    let mut store = Store::new();
    let group = store.add_group("bench", store.root()).unwrap();
    for i in 0..entries {
        store
            .add_entry(
                group,
                &format!("entry-{}", i),
                "user",
                "correct horse battery staple",
                "https://example.com",
                "some notes",
            )
            .unwrap();
    }
    store
}

fn bench_kdf(c: &mut Criterion) {
    let secret = CompositeSecret::new("bench-password", None).unwrap();
    let salt = crypto::random_salt();

    c.bench_function("derive_key/interactive", |b| {
        b.iter(|| crypto::derive_key(black_box(&secret), &salt, KdfParams::default()).unwrap())
    });
    c.bench_function("derive_key/light", |b| {
        b.iter(|| crypto::derive_key(black_box(&secret), &salt, light_params()).unwrap())
    });
}

fn bench_codec(c: &mut Criterion) {
    let secret = CompositeSecret::new("bench-password", None).unwrap();
    let salt = crypto::random_salt();
    let key = crypto::derive_key(&secret, &salt, light_params()).unwrap();
    let store = sample_store(500);
    let bytes = codec::encode(&store, &key, light_params(), &salt).unwrap();

    c.bench_function("encode/500-entries", |b| {
        b.iter(|| codec::encode(black_box(&store), &key, light_params(), &salt).unwrap())
    });
    c.bench_function("decode/500-entries", |b| {
        b.iter(|| codec::decode(black_box(&bytes), &secret).unwrap())
    });
}

criterion_group!(benches, bench_kdf, bench_codec);
criterion_main!(benches);
