//! N-gram hash.
//!
//! Fingerprints from different processes and index builds must agree, so the
//! hash is fixed: a base-31 polynomial over the character codes, folded back
//! into 32 bits after every step.
//!
//! ```text
//! acc = acc * 31 + code(c)
//! acc = (acc & 0xFFFF_FFFF) ^ (acc >> 32)
//! hash = |low 32 bits of acc as i32|
//! ```
//!
//! The hash is a coarse filter only; collisions are expected, which is why
//! entries are compared by n-gram text as well.

/// Hash the characters of one n-gram.
pub fn ngram_hash<I>(chars: I) -> u32
where
    I: IntoIterator<Item = char>,
{
    let mut acc: i64 = 0;
    for c in chars {
        acc = acc.wrapping_mul(31).wrapping_add(i64::from(u32::from(c)));
        acc = (acc & 0xFFFF_FFFF) ^ (acc >> 32);
    }
    (acc as i32).unsigned_abs()
}

/// Convenience wrapper over [`ngram_hash`].
pub fn hash_str(s: &str) -> u32 {
    ngram_hash(s.chars())
}
