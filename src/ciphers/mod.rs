//! Classical cipher encoders and decoders.
//!
//! One sum type covers the whole zoo. Every variant is deterministic and
//! stateless: the same input and key always produce the same output, and
//! nothing persists between calls. The solvers reuse these primitives to
//! apply recovered keys, and the test suites use them to synthesize
//! ciphertexts.
//!
//! Letter ciphers preserve layout: non-letters pass through and case is
//! re-applied. The re-encoding ciphers (Polybius, Baconian) necessarily
//! emit their own surface form instead.

use crate::errors::EngineError;

/// The 5x5 Polybius grid; I and J share the (2,4) cell.
const POLYBIUS_GRID: [[char; 5]; 5] = [
    ['A', 'B', 'C', 'D', 'E'],
    ['F', 'G', 'H', 'I', 'K'],
    ['L', 'M', 'N', 'O', 'P'],
    ['Q', 'R', 'S', 'T', 'U'],
    ['V', 'W', 'X', 'Y', 'Z'],
];

/// 24-letter Baconian alphabet: I/J and U/V share codes.
const BACONIAN_ALPHABET: &str = "ABCDEFGHIKLMNOPQRSTUWXYZ";

/// A concrete classical cipher with its key material.
#[derive(Debug, Clone, PartialEq)]
pub enum CipherKind {
    /// Alphabet rotation by `shift` positions (A-Z domain).
    Caesar {
        /// Rotation amount, 0..26.
        shift: u8,
    },
    /// Rotation over printable ASCII 33..=126 by `shift` positions.
    Rot47 {
        /// Rotation amount, 0..94.
        shift: u8,
    },
    /// The A↔Z mirror. Self-inverse and keyless.
    Atbash,
    /// Periodic polyalphabetic shift by the letters of `key`.
    Vigenere {
        /// Alphabetic keyword.
        key: String,
    },
    /// Beaufort variant: ciphertext = key − plaintext. Reciprocal.
    Beaufort {
        /// Alphabetic keyword.
        key: String,
    },
    /// Porta's thirteen reciprocal alphabets keyed by letter pairs.
    Porta {
        /// Alphabetic keyword.
        key: String,
    },
    /// Vigenère restricted to digit shifts 0-9.
    Gronsfeld {
        /// Digit-string key.
        key: String,
    },
    /// Vigenère whose keystream continues with the plaintext itself.
    Autokey {
        /// Alphabetic primer keyword.
        key: String,
    },
    /// Fixed letter-for-letter permutation.
    Substitution {
        /// Image of A-Z under encryption, as a 26-letter string.
        alphabet: String,
    },
    /// 5x5 grid coordinates as digit pairs.
    Polybius,
    /// Five-symbol A/B groups per letter.
    Baconian,
    /// Zigzag transposition across `rails` rows.
    RailFence {
        /// Number of rails, at least 2.
        rails: usize,
    },
}

impl CipherKind {
    /// Stable method tag used in results and logs.
    pub fn method_tag(&self) -> &'static str {
        match self {
            CipherKind::Caesar { .. } => "caesar-shift",
            CipherKind::Rot47 { .. } => "rot47",
            CipherKind::Atbash => "atbash",
            CipherKind::Vigenere { .. } => "vigenere",
            CipherKind::Beaufort { .. } => "beaufort",
            CipherKind::Porta { .. } => "porta",
            CipherKind::Gronsfeld { .. } => "gronsfeld",
            CipherKind::Autokey { .. } => "autokey",
            CipherKind::Substitution { .. } => "substitution",
            CipherKind::Polybius => "polybius",
            CipherKind::Baconian => "baconian",
            CipherKind::RailFence { .. } => "rail-fence",
        }
    }

    /// Encrypt `plaintext`.
    pub fn encode(&self, plaintext: &str) -> Result<String, EngineError> {
        match self {
            CipherKind::Caesar { shift } => {
                let shift = validate_shift(*shift, 26)?;
                Ok(map_letters(plaintext, |c| (c + shift) % 26))
            }
            CipherKind::Rot47 { shift } => {
                let shift = validate_shift(*shift, 94)?;
                Ok(rot47_map(plaintext, shift))
            }
            CipherKind::Atbash => Ok(map_letters(plaintext, |c| 25 - c)),
            CipherKind::Vigenere { key } => {
                let key = letter_key(key)?;
                let mut i = 0usize;
                Ok(map_letters(plaintext, |c| {
                    let k = key[i % key.len()];
                    i += 1;
                    (c + k) % 26
                }))
            }
            CipherKind::Beaufort { key } => self.beaufort_apply(plaintext, key),
            CipherKind::Porta { key } => self.porta_apply(plaintext, key),
            CipherKind::Gronsfeld { key } => {
                let key = digit_key(key)?;
                let mut i = 0usize;
                Ok(map_letters(plaintext, |c| {
                    let k = key[i % key.len()];
                    i += 1;
                    (c + k) % 26
                }))
            }
            CipherKind::Autokey { key } => {
                let key = letter_key(key)?;
                let mut plain_stream: Vec<u8> = Vec::new();
                Ok(map_letters(plaintext, |c| {
                    let i = plain_stream.len();
                    let k = if i < key.len() {
                        key[i]
                    } else {
                        plain_stream[i - key.len()]
                    };
                    plain_stream.push(c);
                    (c + k) % 26
                }))
            }
            CipherKind::Substitution { alphabet } => {
                let table = permutation_key(alphabet)?;
                Ok(map_letters(plaintext, |c| table[c as usize]))
            }
            CipherKind::Polybius => Ok(polybius_encode(plaintext)),
            CipherKind::Baconian => Ok(baconian_encode(plaintext)),
            CipherKind::RailFence { rails } => rail_fence_encode(plaintext, *rails),
        }
    }

    /// Decrypt `ciphertext`.
    pub fn decode(&self, ciphertext: &str) -> Result<String, EngineError> {
        match self {
            CipherKind::Caesar { shift } => {
                let shift = validate_shift(*shift, 26)?;
                Ok(map_letters(ciphertext, |c| (c + 26 - shift) % 26))
            }
            CipherKind::Rot47 { shift } => {
                let shift = validate_shift(*shift, 94)?;
                Ok(rot47_map(ciphertext, 94 - shift % 94))
            }
            CipherKind::Atbash => self.encode(ciphertext),
            CipherKind::Vigenere { key } => {
                let key = letter_key(key)?;
                let mut i = 0usize;
                Ok(map_letters(ciphertext, |c| {
                    let k = key[i % key.len()];
                    i += 1;
                    (c + 26 - k) % 26
                }))
            }
            // Beaufort and Porta are reciprocal.
            CipherKind::Beaufort { key } => self.beaufort_apply(ciphertext, key),
            CipherKind::Porta { key } => self.porta_apply(ciphertext, key),
            CipherKind::Gronsfeld { key } => {
                let key = digit_key(key)?;
                let mut i = 0usize;
                Ok(map_letters(ciphertext, |c| {
                    let k = key[i % key.len()];
                    i += 1;
                    (c + 26 - k) % 26
                }))
            }
            CipherKind::Autokey { key } => {
                let key = letter_key(key)?;
                let mut recovered: Vec<u8> = Vec::new();
                Ok(map_letters(ciphertext, |c| {
                    let i = recovered.len();
                    let k = if i < key.len() {
                        key[i]
                    } else {
                        recovered[i - key.len()]
                    };
                    let p = (c + 26 - k) % 26;
                    recovered.push(p);
                    p
                }))
            }
            CipherKind::Substitution { alphabet } => {
                let table = permutation_key(alphabet)?;
                let mut inverse = [0u8; 26];
                for (plain, &cipher) in table.iter().enumerate() {
                    inverse[cipher as usize] = plain as u8;
                }
                Ok(map_letters(ciphertext, |c| inverse[c as usize]))
            }
            CipherKind::Polybius => {
                polybius_decode(ciphertext).ok_or(EngineError::InvalidKey(
                    "ciphertext is not a digit-pair stream in 11..=55".to_string(),
                ))
            }
            CipherKind::Baconian => baconian_decode(ciphertext).ok_or(EngineError::InvalidKey(
                "ciphertext is not a two-symbol group stream".to_string(),
            )),
            CipherKind::RailFence { rails } => rail_fence_decode(ciphertext, *rails),
        }
    }

    /// Shared reciprocal Beaufort transform.
    fn beaufort_apply(&self, text: &str, key: &str) -> Result<String, EngineError> {
        let key = letter_key(key)?;
        let mut i = 0usize;
        Ok(map_letters(text, |c| {
            let k = key[i % key.len()];
            i += 1;
            (k + 26 - c) % 26
        }))
    }

    /// Shared reciprocal Porta transform.
    fn porta_apply(&self, text: &str, key: &str) -> Result<String, EngineError> {
        let key = letter_key(key)?;
        let mut i = 0usize;
        Ok(map_letters(text, |c| {
            let row = key[i % key.len()] / 2;
            i += 1;
            porta_transform(c, row)
        }))
    }
}

/// Apply Porta row `row` (0..13) to letter index `c`. Self-inverse.
fn porta_transform(c: u8, row: u8) -> u8 {
    if c < 13 {
        13 + (c + row) % 13
    } else {
        (c - 13 + 13 - row) % 13
    }
}

/// Map letters of `text` through `f` (on 0-25 indices), preserving case
/// and passing non-letters through.
fn map_letters<F>(text: &str, mut f: F) -> String
where
    F: FnMut(u8) -> u8,
{
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let idx = c.to_ascii_uppercase() as u8 - b'A';
                let mapped = (f(idx) + b'A') as char;
                if c.is_ascii_lowercase() {
                    mapped.to_ascii_lowercase()
                } else {
                    mapped
                }
            } else {
                c
            }
        })
        .collect()
}

/// Rotate printable ASCII (33..=126) forward by `shift`; everything else
/// passes through.
fn rot47_map(text: &str, shift: u8) -> String {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if (33..=126).contains(&code) {
                let rotated = (code - 33 + shift as u32) % 94 + 33;
                char::from_u32(rotated).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Validate a rotation amount against its domain size.
fn validate_shift(shift: u8, domain: u8) -> Result<u8, EngineError> {
    if shift < domain {
        Ok(shift)
    } else {
        Err(EngineError::InvalidKey(format!(
            "shift {} outside domain 0..{}",
            shift, domain
        )))
    }
}

/// Key letters as 0-25 indices; rejects empty or non-alphabetic keys.
fn letter_key(key: &str) -> Result<Vec<u8>, EngineError> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EngineError::InvalidKey(format!(
            "key {:?} must be non-empty letters",
            key
        )));
    }
    Ok(key
        .chars()
        .map(|c| c.to_ascii_uppercase() as u8 - b'A')
        .collect())
}

/// Key digits as 0-9 shifts; rejects empty or non-digit keys.
fn digit_key(key: &str) -> Result<Vec<u8>, EngineError> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_digit()) {
        return Err(EngineError::InvalidKey(format!(
            "key {:?} must be non-empty digits",
            key
        )));
    }
    Ok(key.chars().map(|c| c as u8 - b'0').collect())
}

/// A substitution alphabet as a table from plain index to cipher index.
/// Must be a permutation of A-Z.
fn permutation_key(alphabet: &str) -> Result<[u8; 26], EngineError> {
    let upper = alphabet.to_ascii_uppercase();
    if upper.len() != 26 {
        return Err(EngineError::InvalidKey(format!(
            "substitution alphabet has length {}, want 26",
            upper.len()
        )));
    }
    let mut table = [0u8; 26];
    let mut seen = [false; 26];
    for (i, c) in upper.chars().enumerate() {
        if !c.is_ascii_uppercase() {
            return Err(EngineError::InvalidKey(format!(
                "substitution alphabet contains {:?}",
                c
            )));
        }
        let idx = c as u8 - b'A';
        if seen[idx as usize] {
            return Err(EngineError::InvalidKey(format!(
                "substitution alphabet repeats {}",
                c
            )));
        }
        seen[idx as usize] = true;
        table[i] = idx;
    }
    Ok(table)
}

/// Encode letters as space-separated row/column digit pairs. J shares I's
/// cell; non-letters are dropped.
fn polybius_encode(plaintext: &str) -> String {
    let mut pairs = Vec::new();
    for c in plaintext.chars() {
        if !c.is_ascii_alphabetic() {
            continue;
        }
        let mut u = c.to_ascii_uppercase();
        if u == 'J' {
            u = 'I';
        }
        for (r, row) in POLYBIUS_GRID.iter().enumerate() {
            if let Some(col) = row.iter().position(|&g| g == u) {
                pairs.push(format!("{}{}", r + 1, col + 1));
                break;
            }
        }
    }
    pairs.join(" ")
}

/// Decode digit pairs (whitespace optional) back into letters.
fn polybius_decode(ciphertext: &str) -> Option<String> {
    let digits: Vec<u32> = ciphertext.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }
    let mut result = String::with_capacity(digits.len() / 2);
    for pair in digits.chunks_exact(2) {
        let (row, col) = (pair[0] as usize, pair[1] as usize);
        if !(1..=5).contains(&row) || !(1..=5).contains(&col) {
            return None;
        }
        result.push(POLYBIUS_GRID[row - 1][col - 1]);
    }
    Some(result)
}

/// Encode letters as space-separated five-symbol A/B groups. I/J and U/V
/// share codes; non-letters are dropped.
fn baconian_encode(plaintext: &str) -> String {
    let mut groups = Vec::new();
    for c in plaintext.chars() {
        if !c.is_ascii_alphabetic() {
            continue;
        }
        let mut u = c.to_ascii_uppercase();
        if u == 'J' {
            u = 'I';
        }
        if u == 'V' {
            u = 'U';
        }
        if let Some(idx) = BACONIAN_ALPHABET.find(u) {
            let group: String = (0..5)
                .rev()
                .map(|bit| if idx >> bit & 1 == 1 { 'B' } else { 'A' })
                .collect();
            groups.push(group);
        }
    }
    groups.join(" ")
}

/// Decode five-symbol groups of {A, B} or {0, 1}, whitespace ignored.
fn baconian_decode(ciphertext: &str) -> Option<String> {
    let symbols: Vec<u8> = ciphertext
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c.to_ascii_uppercase() {
            'A' | '0' => Some(0u8),
            'B' | '1' => Some(1u8),
            _ => None,
        })
        .collect::<Option<Vec<u8>>>()?;
    if symbols.is_empty() || symbols.len() % 5 != 0 {
        return None;
    }
    let alphabet: Vec<char> = BACONIAN_ALPHABET.chars().collect();
    let mut result = String::with_capacity(symbols.len() / 5);
    for group in symbols.chunks_exact(5) {
        let idx = group.iter().fold(0usize, |acc, &b| acc << 1 | b as usize);
        result.push(*alphabet.get(idx)?);
    }
    Some(result)
}

/// Rail-fence zigzag encode over all characters.
fn rail_fence_encode(plaintext: &str, rails: usize) -> Result<String, EngineError> {
    validate_rails(rails)?;
    let mut rows: Vec<String> = vec![String::new(); rails];
    for (i, c) in plaintext.chars().enumerate() {
        rows[zigzag_row(i, rails)].push(c);
    }
    Ok(rows.concat())
}

/// Rail-fence zigzag decode.
fn rail_fence_decode(ciphertext: &str, rails: usize) -> Result<String, EngineError> {
    validate_rails(rails)?;
    let chars: Vec<char> = ciphertext.chars().collect();
    let mut counts = vec![0usize; rails];
    for i in 0..chars.len() {
        counts[zigzag_row(i, rails)] += 1;
    }
    let mut rows: Vec<std::vec::IntoIter<char>> = Vec::with_capacity(rails);
    let mut offset = 0usize;
    for &count in &counts {
        rows.push(chars[offset..offset + count].to_vec().into_iter());
        offset += count;
    }
    let mut result = String::with_capacity(chars.len());
    for i in 0..chars.len() {
        match rows[zigzag_row(i, rails)].next() {
            Some(c) => result.push(c),
            None => return Err(EngineError::LengthMismatch),
        }
    }
    Ok(result)
}

/// Row index of position `i` in a zigzag over `rails` rows.
fn zigzag_row(i: usize, rails: usize) -> usize {
    let period = 2 * (rails - 1);
    let phase = i % period;
    if phase < rails {
        phase
    } else {
        period - phase
    }
}

/// Rails must describe an actual zigzag.
fn validate_rails(rails: usize) -> Result<(), EngineError> {
    if rails < 2 {
        return Err(EngineError::InvalidKey(format!(
            "rail fence needs at least 2 rails, got {}",
            rails
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caesar_roundtrip() {
        let cipher = CipherKind::Caesar { shift: 7 };
        let plaintext = "Attack at dawn!";
        let encoded = cipher.encode(plaintext).unwrap();
        assert_eq!(encoded, "Haahjr ha khdu!");
        assert_eq!(cipher.decode(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_caesar_rejects_out_of_domain_shift() {
        assert!(matches!(
            CipherKind::Caesar { shift: 26 }.encode("A"),
            Err(EngineError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_rot47_roundtrip_and_space_passthrough() {
        let cipher = CipherKind::Rot47 { shift: 47 };
        let plaintext = "Hello, World! 123";
        let encoded = cipher.encode(plaintext).unwrap();
        assert_ne!(encoded, plaintext);
        // Spaces sit below the printable band and pass through.
        assert_eq!(encoded.matches(' ').count(), 2);
        assert_eq!(cipher.decode(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_atbash_is_self_inverse() {
        let cipher = CipherKind::Atbash;
        let plaintext = "The Quick Brown Fox";
        let once = cipher.encode(plaintext).unwrap();
        assert_eq!(cipher.encode(&once).unwrap(), plaintext);
        assert_eq!(once, "Gsv Jfrxp Yildm Ulc");
    }

    #[test]
    fn test_vigenere_roundtrip() {
        let cipher = CipherKind::Vigenere {
            key: "KEY".to_string(),
        };
        let plaintext = "DIVERT TROOPS TO EAST RIDGE";
        let encoded = cipher.encode(plaintext).unwrap();
        assert_eq!(cipher.decode(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_vigenere_known_vector() {
        let cipher = CipherKind::Vigenere {
            key: "LEMON".to_string(),
        };
        assert_eq!(cipher.encode("ATTACKATDAWN").unwrap(), "LXFOPVEFRNHR");
    }

    #[test]
    fn test_beaufort_is_reciprocal() {
        let cipher = CipherKind::Beaufort {
            key: "FORTIFY".to_string(),
        };
        let plaintext = "DEFENDTHEEASTWALL";
        let encoded = cipher.encode(plaintext).unwrap();
        assert_eq!(cipher.decode(&encoded).unwrap(), plaintext);
        assert_eq!(cipher.encode(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_porta_is_reciprocal() {
        let cipher = CipherKind::Porta {
            key: "SHADOW".to_string(),
        };
        let plaintext = "MEETMEATMIDNIGHT";
        let encoded = cipher.encode(plaintext).unwrap();
        assert_ne!(encoded, plaintext);
        assert_eq!(cipher.encode(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_gronsfeld_roundtrip() {
        let cipher = CipherKind::Gronsfeld {
            key: "31415".to_string(),
        };
        let plaintext = "NUMBERS MAKE FINE KEYS";
        let encoded = cipher.encode(plaintext).unwrap();
        assert_eq!(cipher.decode(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_autokey_roundtrip() {
        let cipher = CipherKind::Autokey {
            key: "SECRET".to_string(),
        };
        let plaintext = "THE KEYSTREAM CONTINUES WITH THE MESSAGE";
        let encoded = cipher.encode(plaintext).unwrap();
        assert_eq!(cipher.decode(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_substitution_roundtrip_and_validation() {
        let cipher = CipherKind::Substitution {
            alphabet: "QWERTYUIOPASDFGHJKLZXCVBNM".to_string(),
        };
        let plaintext = "Substitution keeps word Shapes";
        let encoded = cipher.encode(plaintext).unwrap();
        assert_eq!(cipher.decode(&encoded).unwrap(), plaintext);

        let bad = CipherKind::Substitution {
            alphabet: "AABCDEFGHIJKLMNOPQRSTUVWXY".to_string(),
        };
        assert!(matches!(bad.encode("X"), Err(EngineError::InvalidKey(_))));
    }

    #[test]
    fn test_polybius_known_pairs() {
        let encoded = CipherKind::Polybius.encode("HELLO").unwrap();
        assert_eq!(encoded, "23 15 31 31 34");
        assert_eq!(CipherKind::Polybius.decode(&encoded).unwrap(), "HELLO");
        // J collapses onto I.
        assert_eq!(CipherKind::Polybius.encode("J").unwrap(), "24");
    }

    #[test]
    fn test_polybius_decode_rejects_bad_digits() {
        assert!(CipherKind::Polybius.decode("66 11").is_err());
        assert!(CipherKind::Polybius.decode("123").is_err());
    }

    #[test]
    fn test_baconian_roundtrip() {
        let encoded = CipherKind::Baconian.encode("CIPHER").unwrap();
        assert!(encoded
            .chars()
            .all(|c| c == 'A' || c == 'B' || c == ' '));
        assert_eq!(CipherKind::Baconian.decode(&encoded).unwrap(), "CIPHER");
    }

    #[test]
    fn test_baconian_accepts_binary_digits() {
        let encoded = CipherKind::Baconian.encode("CAB").unwrap();
        let binary: String = encoded
            .chars()
            .map(|c| match c {
                'A' => '0',
                'B' => '1',
                other => other,
            })
            .collect();
        assert_eq!(CipherKind::Baconian.decode(&binary).unwrap(), "CAB");
    }

    #[test]
    fn test_rail_fence_roundtrip() {
        let cipher = CipherKind::RailFence { rails: 3 };
        let plaintext = "WEAREDISCOVEREDFLEEATONCE";
        let encoded = cipher.encode(plaintext).unwrap();
        assert_eq!(encoded, "WECRLTEERDSOEEFEAOCAIVDEN");
        assert_eq!(cipher.decode(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_rail_fence_rejects_single_rail() {
        assert!(CipherKind::RailFence { rails: 1 }.encode("ABC").is_err());
    }

    #[test]
    fn test_method_tags_are_stable() {
        assert_eq!(CipherKind::Caesar { shift: 3 }.method_tag(), "caesar-shift");
        assert_eq!(CipherKind::Rot47 { shift: 47 }.method_tag(), "rot47");
        assert_eq!(
            CipherKind::Vigenere {
                key: "K".to_string()
            }
            .method_tag(),
            "vigenere"
        );
    }
}
