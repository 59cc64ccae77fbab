// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! Soundex phonetic codes.
//!
//! Backs the sounds-like operator: two values match when their soundex codes
//! are equal, the way the SQL `SOUNDS LIKE` comparison behaves.

/// Compute the 4-character soundex code of `input`.
///
/// Non-ASCII-alphabetic characters are skipped. Returns an empty string when
/// the input contains no letters.
pub fn soundex(input: &str) -> String {
    let mut letters = input.chars().filter(|c| c.is_ascii_alphabetic());

    let first = match letters.next() {
        Some(c) => c.to_ascii_uppercase(),
        None => return String::new(),
    };

    let mut code = String::with_capacity(4);
    code.push(first);

    let mut previous = digit(first);
    for c in letters {
        if code.len() == 4 {
            break;
        }
        let current = digit(c);
        match current {
            // Vowels reset the run so repeated consonant codes separated by
            // a vowel are kept.
            0 => previous = 0,
            // h and w are transparent: they neither emit nor reset.
            7 => {}
            d if d != previous => {
                code.push((b'0' + d) as char);
                previous = d;
            }
            _ => {}
        }
    }

    while code.len() < 4 {
        code.push('0');
    }

    code
}

/// Whether two values sound alike (equal non-empty soundex codes).
pub fn sounds_like(a: &str, b: &str) -> bool {
    let code_a = soundex(a);
    !code_a.is_empty() && code_a == soundex(b)
}

fn digit(c: char) -> u8 {
    match c.to_ascii_lowercase() {
        'b' | 'f' | 'p' | 'v' => 1,
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => 2,
        'd' | 't' => 3,
        'l' => 4,
        'm' | 'n' => 5,
        'r' => 6,
        'h' | 'w' => 7,
        _ => 0,
    }
}
