//! API key material: generation, digests and display masking
//!
//! Keys are bearer secrets of the form `sk-<48 url-safe chars>`. Only a
//! SHA-256 digest and a short display hint are persisted; the raw key is
//! handed to the caller once, at creation.

use rand::{rngs::OsRng, Rng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Prefix carried by every issued key
pub const API_KEY_PREFIX: &str = "sk-";

/// Length of the random part after the prefix
pub const API_KEY_SECRET_LEN: usize = 48;

/// Keys shorter than this are never partially revealed
pub const MASK_MIN_LENGTH: usize = 16;

/// Number of leading characters shown verbatim
pub const MASK_VISIBLE_CHARS: usize = 12;

/// Rendered instead of a key too short to mask
pub const MASK_PLACEHOLDER: &str = "sk-****";

/// Glyph substituted for every hidden character
pub const MASK_GLYPH: char = '\u{2022}';

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generate a new API key from the OS random source.
pub fn generate_api_key() -> String {
    let mut rng = OsRng;
    let secret: String = (0..API_KEY_SECRET_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}{}", API_KEY_PREFIX, secret)
}

/// Hex-encoded SHA-256 digest used as the lookup column for keys and sessions.
pub fn hash_token(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Constant-time comparison of two key digests.
pub fn digests_match(candidate: &str, stored: &str) -> bool {
    candidate.as_bytes().ct_eq(stored.as_bytes()).into()
}

/// Leading characters persisted so a key can be masked later without the secret.
pub fn key_hint(key: &str) -> String {
    key.chars().take(MASK_VISIBLE_CHARS).collect()
}

/// Mask a key for display.
///
/// The first 12 characters stay readable and every remaining character becomes
/// a bullet, so the masked form keeps the original length.
pub fn mask_api_key(key: &str) -> String {
    mask_from_hint(key, key.chars().count())
}

/// Mask a key known only by its hint and total length.
pub fn mask_from_hint(hint: &str, length: usize) -> String {
    if length < MASK_MIN_LENGTH {
        return MASK_PLACEHOLDER.to_string();
    }

    let visible: String = hint.chars().take(MASK_VISIBLE_CHARS).collect();
    let hidden = length.saturating_sub(MASK_VISIBLE_CHARS);
    let mut masked = String::with_capacity(visible.len() + hidden * MASK_GLYPH.len_utf8());
    masked.push_str(&visible);
    masked.extend(std::iter::repeat(MASK_GLYPH).take(hidden));
    masked
}
