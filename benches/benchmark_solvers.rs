//! Benchmarks for the hot paths: the Caesar sweep, classification and a
//! hill-climb restart.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use sibyl::analysis::classifier::classify;
use sibyl::ciphers::CipherKind;
use sibyl::{Engine, Language, Options};

const PLAINTEXT: &str =
    "THE NIGHT WATCHMAN MADE HIS ROUNDS THROUGH THE EMPTY STREETS OF THE OLD QUARTER \
     PAST THE BAKERY AND THE BANK AND THE SHUTTERED MARKET STALLS HIS LANTERN THREW \
     LONG SHADOWS ON THE WALLS AND HIS STEPS ECHOED UNDER THE STONE ARCHES";

fn bench_caesar_sweep(c: &mut Criterion) {
    let engine = Engine::with_default_resources().unwrap();
    let ciphertext = CipherKind::Caesar { shift: 11 }.encode(PLAINTEXT).unwrap();
    c.bench_function("caesar_sweep", |b| {
        b.iter(|| {
            let result = engine.auto_decrypt(black_box(&ciphertext), &Options::default());
            black_box(result)
        })
    });
}

fn bench_classifier(c: &mut Criterion) {
    let engine = Engine::with_default_resources().unwrap();
    let dictionary = engine.resources().dictionary(Language::English);
    let ciphertext = CipherKind::Vigenere {
        key: "KEY".to_string(),
    }
    .encode(PLAINTEXT)
    .unwrap();
    c.bench_function("classifier", |b| {
        b.iter(|| black_box(classify(black_box(&ciphertext), dictionary.as_deref())))
    });
}

fn bench_hill_climb(c: &mut Criterion) {
    let engine = Engine::with_default_resources().unwrap();
    let ciphertext = CipherKind::Substitution {
        alphabet: "QWERTYUIOPASDFGHJKLZXCVBNM".to_string(),
    }
    .encode(PLAINTEXT)
    .unwrap();
    c.bench_function("hill_climb_substitution", |b| {
        b.iter(|| {
            let result = engine.auto_decrypt(black_box(&ciphertext), &Options::default());
            black_box(result)
        })
    });
}

criterion_group!(benches, bench_caesar_sweep, bench_classifier, bench_hill_climb);
criterion_main!(benches);
