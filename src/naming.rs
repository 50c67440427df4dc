//! Natural (numeric-aware) filename ordering.
//!
//! Directory listings come back in whatever order the OS feels like. Every
//! listing this crate consumes (categories, products, product images) is
//! sorted with [`natural_cmp`] so the catalog is reproducible:
//!
//! - `["10.jpg", "2.jpg", "1.jpg"]` → `["1.jpg", "2.jpg", "10.jpg"]`
//! - `["foto-10.png", "foto-9.png"]` → `["foto-9.png", "foto-10.png"]`
//! - `["Sillas", "mesas"]` → `["mesas", "Sillas"]` (case-insensitive first)

use std::cmp::Ordering;

/// A run of either digits or non-digits within a name.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(name: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, c) in name.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(make_chunk(&name[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(prev) = in_digits {
        out.push(make_chunk(&name[start..], prev));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits { Chunk::Digits(s) } else { Chunk::Text(s) }
}

/// Compare two digit runs by numeric value without parsing (no overflow).
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        // `01` sorts after `1`: fewer leading zeros first
        .then_with(|| a.len().cmp(&b.len()))
}

fn cmp_chunk(a: &Chunk<'_>, b: &Chunk<'_>) -> Ordering {
    match (a, b) {
        (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
        (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
        (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}

/// Natural ordering: embedded numbers compare by value, text case-insensitively.
///
/// Falls back to plain byte ordering so the result is a total order even for
/// names that differ only in case.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);
    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = cmp_chunk(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len()).then_with(|| a.cmp(b))
}

/// Sort a list of names in place with [`natural_cmp`].
pub fn sort_natural<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}
