//! Tracking codes for distribution links

use rand::Rng;

/// Characters used in codes; `0`, `O`, `1` and `I` are left out so codes survive being read aloud
pub const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const DEFAULT_LENGTH: usize = 8;
pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 32;

/// Generate a random code of `len` characters (clamped to the valid range)
pub fn generate(len: usize) -> String {
    let len = len.clamp(MIN_LENGTH, MAX_LENGTH);
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Canonical form of a user-supplied code
pub fn normalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Whether `code` (already normalized) could have been generated
pub fn is_valid(code: &str) -> bool {
    (MIN_LENGTH..=MAX_LENGTH).contains(&code.len()) && code.bytes().all(|b| ALPHABET.contains(&b))
}

/// Public survey URL for a code
pub fn survey_url(base_url: &str, code: &str) -> String {
    format!("{}/s/{}", base_url.trim_end_matches('/'), code)
}
