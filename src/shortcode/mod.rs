//! Short code generation
//!
//! Codes are random tokens over a URL-safe alphabet. Uniqueness is NOT
//! guaranteed by construction; the store's unique insert is the authority
//! and callers retry on conflict (see the encode handler).

use rand::RngExt;

/// URL-safe alphabet: letters, digits, `-` and `_`.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Minimum accepted code length. Shorter candidates are padded.
pub const MIN_CODE_LENGTH: usize = 3;

/// Default generated code length.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Total insert attempts before encode gives up with an internal error.
/// The original implementation looped forever on collision; a saturated
/// code space would hang it.
pub const MAX_CODE_ATTEMPTS: usize = 16;

/// Widen the candidate length by one character after this many
/// consecutive collisions, so a crowded length drains into a larger one.
pub const WIDEN_AFTER_ATTEMPTS: usize = 4;

/// Generate a random code of `length` characters (padded up to
/// [`MIN_CODE_LENGTH`] if a shorter length is requested).
pub fn generate(length: usize) -> String {
    let mut rng = rand::rng();
    let mut code: String = (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();

    while code.len() < MIN_CODE_LENGTH {
        code.push('a');
    }

    code
}

/// Candidate length for the given zero-based attempt number.
pub fn length_for_attempt(base_length: usize, attempt: usize) -> usize {
    base_length.max(MIN_CODE_LENGTH) + attempt / WIDEN_AFTER_ATTEMPTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        for len in [3, 5, 7, 12] {
            assert_eq!(generate(len).len(), len);
        }
    }

    #[test]
    fn pads_short_requests_to_minimum() {
        assert_eq!(generate(0).len(), MIN_CODE_LENGTH);
        assert_eq!(generate(1).len(), MIN_CODE_LENGTH);
        assert_eq!(generate(2).len(), MIN_CODE_LENGTH);
    }

    #[test]
    fn uses_url_safe_alphabet() {
        for _ in 0..100 {
            let code = generate(DEFAULT_CODE_LENGTH);
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "unexpected character in code: {}",
                code
            );
        }
    }

    #[test]
    fn widens_length_as_collisions_accumulate() {
        assert_eq!(length_for_attempt(7, 0), 7);
        assert_eq!(length_for_attempt(7, 3), 7);
        assert_eq!(length_for_attempt(7, 4), 8);
        assert_eq!(length_for_attempt(7, 8), 9);
        // Requests below the minimum are clamped before widening
        assert_eq!(length_for_attempt(1, 0), MIN_CODE_LENGTH);
    }
}
