//! Utterance normalization
//!
//! Every utterance is normalized before wake-word gating so that matching
//! sees one canonical form regardless of casing, spacing or speaker register.

/// Ordered lexical rewrites applied after case folding
///
/// Masculine first-person pronoun and politeness particle are rewritten to
/// the assistant's register. No replacement contains any source string, so
/// applying the list twice is a no-op.
const SUBSTITUTIONS: &[(&str, &str)] = &[("ผม", "ฉัน"), ("ครับ", "ค่ะ")];

/// Normalize a raw utterance
///
/// Lowercases, collapses whitespace runs to a single space, trims, then
/// applies [`SUBSTITUTIONS`] in order. Total and idempotent.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    for (from, to) in SUBSTITUTIONS {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }

    out
}
