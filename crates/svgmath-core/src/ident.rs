//! Collision-safe glyph identifiers.
//!
//! pdf2svg names glyph symbols `glyph0-1`, `glyph0-2`, ... in every document it writes, so two
//! equations inlined into the same HTML page would resolve each other's `<use>` references. Each
//! extraction prefixes its ids with a fresh random token.

use rand::Rng;

pub const PREFIX_LEN: usize = 20;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Draws a [`PREFIX_LEN`]-letter ASCII token from `rng`.
///
/// 52^20 possible values; collisions are improbable but not cryptographically excluded.
pub fn random_prefix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..PREFIX_LEN)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

/// Ids cairo gives glyph definitions. Older versions wrap them in `<symbol>`, newer ones use
/// a plain `<g>`, so the id is what identifies a glyph.
pub fn is_glyph_id(id: &str) -> bool {
    id.starts_with("glyph")
}

/// `#glyph0-1` → `#<prefix>glyph0-1`. Only fragment references to glyphs are rewritten.
pub fn prefix_glyph_ref(href: &str, prefix: &str) -> Option<String> {
    let rest = href.strip_prefix('#')?;
    if !is_glyph_id(rest) {
        return None;
    }
    Some(format!("#{prefix}{rest}"))
}

pub fn prefix_id(id: &str, prefix: &str) -> String {
    format!("{prefix}{id}")
}
