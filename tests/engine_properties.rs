//! Invariant and round-trip properties of the analysis substrate and the
//! cipher primitives, exercised through the public API.

use sibyl::analysis::{self, kasiski};
use sibyl::ciphers::CipherKind;
use sibyl::textnorm::{clean_letters, match_layout};
use sibyl::{Engine, Language};

const SAMPLES: [&str; 4] = [
    "DEFEND THE EAST WALL OF THE CASTLE UNTIL THE SNOW CLOSES THE PASSES",
    "WKH TXLFN EURZQ IRA MXPSV RYHU WKH ODCB GRJ",
    "QXZJKWVPM QXZJKWVPM QXZJKWVPM QXZJKWVPM",
    "AABBA ABBAB AABAA BABBA AABBB ABABA BBAAB",
];

#[test]
fn test_ioc_stays_in_normalized_range_for_prose() {
    for sample in SAMPLES {
        let ioc = analysis::index_of_coincidence(sample);
        assert!(ioc >= 0.0, "ioc {} for {:?}", ioc, sample);
    }
    // Natural-language and shift ciphertexts sit in the expected band.
    let english = "THE WOMEN WHO HAD KEPT THE FARMS RUNNING THROUGH THOSE LONG YEARS \
                   WATCHED THE ROADS EACH EVENING FOR FACES THEY HAD ALMOST GIVEN UP";
    let ioc = analysis::index_of_coincidence(english);
    assert!((1.2..2.2).contains(&ioc), "english ioc {}", ioc);
}

#[test]
fn test_entropy_bounded_by_log2_26() {
    let bound = 26f64.log2();
    for sample in SAMPLES {
        assert!(analysis::entropy(sample) <= bound + 1e-12);
    }
}

#[test]
fn test_monoalphabetic_substitution_preserves_ioc() {
    let text = "ATTACK AT DAWN THE ENEMY SLEEPS AND THE RIVER GUARDS ARE FEW";
    let substituted = CipherKind::Substitution {
        alphabet: "QWERTYUIOPASDFGHJKLZXCVBNM".to_string(),
    }
    .encode(text)
    .unwrap();
    let diff =
        (analysis::index_of_coincidence(text) - analysis::index_of_coincidence(&substituted)).abs();
    assert!(diff < 1e-9, "ioc drifted by {}", diff);
}

#[test]
fn test_classifier_output_invariants() {
    let engine = Engine::with_default_resources().unwrap();
    for sample in SAMPLES {
        let classification = engine.classify(sample, Some(Language::English));
        assert!(!classification.candidates.is_empty());
        assert!((classification.top().confidence - 1.0).abs() < 1e-12);
        for candidate in &classification.candidates {
            assert!((0.0..=1.0).contains(&candidate.confidence));
        }
    }
}

#[test]
fn test_kasiski_candidates_within_bounds() {
    let text = CipherKind::Vigenere {
        key: "WINTERKING".to_string(),
    }
    .encode(
        &"THE KING SENT A MESSAGE TO THE GENERAL OF THE ARMY IN THE NORTH AND ORDERED \
          HIM TO DEFEND THE CASTLE AT ALL COSTS UNTIL THE WINTER MADE THE ROADS IMPASSABLE "
            .repeat(2),
    )
    .unwrap();
    let exam = kasiski::examine(&text);
    for candidate in &exam.key_length_candidates {
        assert!((2..=20).contains(&candidate.key_length));
        assert!((0.0..=1.0).contains(&candidate.score));
    }
}

#[test]
fn test_atbash_self_inverse_property() {
    let texts = ["ABCXYZ", "The Walls Have Ears", "MIXED case 123!"];
    for text in texts {
        let twice = CipherKind::Atbash
            .encode(&CipherKind::Atbash.encode(text).unwrap())
            .unwrap();
        assert_eq!(twice, text);
    }
}

#[test]
fn test_caesar_decrypt_inverts_encrypt_for_all_shifts() {
    let text = "Carry the harvest in before the season turns.";
    for shift in 0..26u8 {
        let cipher = CipherKind::Caesar { shift };
        assert_eq!(cipher.decode(&cipher.encode(text).unwrap()).unwrap(), text);
    }
}

#[test]
fn test_match_layout_restores_original() {
    let originals = [
        "Hello, World!",
        "A sentence WITH Mixed case; and punctuation...",
        "no-letters-here: 123",
    ];
    for original in originals {
        assert_eq!(match_layout(original, &clean_letters(original)), original);
    }
}

#[test]
fn test_vigenere_recovery_key_or_rotation() {
    // With a plaintext much longer than the key, the recovered key must
    // reproduce the original plaintext exactly.
    let plaintext = "GOOD MEN AND WOMEN DO THEIR WORK EACH DAY WITHOUT MUCH THOUGHT OF \
                     FAME OR FORTUNE THEY OPEN THEIR SHOPS IN THE MORNING AND CLOSE THEM \
                     AT NIGHT THEY TEACH THE CHILDREN AND MEND THE ROADS AND BRING IN THE \
                     HARVEST WHEN THE SEASON TURNS";
    let ciphertext = CipherKind::Vigenere {
        key: "LANTERN".to_string(),
    }
    .encode(plaintext)
    .unwrap();

    let engine = Engine::with_default_resources().unwrap();
    let result = engine.auto_decrypt(&ciphertext, &sibyl::Options::default());
    assert!(result.method.contains("vigenere"), "method {}", result.method);
    assert_eq!(clean_letters(&result.plaintext), clean_letters(plaintext));
}
