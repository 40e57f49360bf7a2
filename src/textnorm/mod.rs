//! Text normalization helpers.
//!
//! Every statistical routine in the engine works on the *cleaned* form of a
//! text: uppercase A-Z only, original order retained. Final plaintexts are
//! mapped back onto the original layout so spacing, punctuation and case
//! survive the round trip.

/// Uppercase A-Z letters of `s`, in order. Everything else is dropped.
pub fn clean_letters(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Printable ASCII (33..=126) characters of `s`, in order.
pub fn only_printable_ascii(s: &str) -> String {
    s.chars()
        .filter(|&c| ('!'..='~').contains(&c))
        .collect()
}

/// ASCII transliteration of Cyrillic letters, GOST-style digraphs
/// included. Non-Cyrillic characters pass through untouched, so the
/// result can be cleaned and scored like any Latin text. The Russian
/// frequency tables are built over this same romanization.
pub fn transliterate_cyrillic(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        let upper = c.to_uppercase().next().unwrap_or(c);
        let mapped = match upper {
            'А' => "A",
            'Б' => "B",
            'В' => "V",
            'Г' => "G",
            'Д' => "D",
            'Е' | 'Ё' | 'Э' => "E",
            'Ж' => "ZH",
            'З' => "Z",
            'И' => "I",
            'Й' => "J",
            'К' => "K",
            'Л' => "L",
            'М' => "M",
            'Н' => "N",
            'О' => "O",
            'П' => "P",
            'Р' => "R",
            'С' => "S",
            'Т' => "T",
            'У' => "U",
            'Ф' => "F",
            'Х' => "H",
            'Ц' => "C",
            'Ч' => "CH",
            'Ш' => "SH",
            'Щ' => "SHCH",
            // Hard and soft signs carry no sound of their own.
            'Ъ' | 'Ь' => "",
            'Ы' => "Y",
            'Ю' => "YU",
            'Я' => "YA",
            _ => {
                out.push(c);
                continue;
            }
        };
        if c.is_lowercase() {
            out.extend(mapped.chars().map(|m| m.to_ascii_lowercase()));
        } else {
            out.push_str(mapped);
        }
    }
    out
}

/// Re-apply the layout of `original` to `cleaned_plaintext`.
///
/// Walks `original`; wherever it held a Latin letter, the next letter of
/// `cleaned_plaintext` is emitted with the original letter's case.
/// Non-letters pass through untouched. If the cleaned input runs out of
/// letters before the layout does, remaining letter positions are filled
/// with `?` rather than failing the whole decryption.
pub fn match_layout(original: &str, cleaned_plaintext: &str) -> String {
    let mut letters = cleaned_plaintext
        .chars()
        .filter(|c| c.is_ascii_alphabetic());
    original
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                match letters.next() {
                    Some(p) => {
                        if c.is_ascii_lowercase() {
                            p.to_ascii_lowercase()
                        } else {
                            p.to_ascii_uppercase()
                        }
                    }
                    None => '?',
                }
            } else {
                c
            }
        })
        .collect()
}
