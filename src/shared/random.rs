//! Random opaque tokens (refresh tokens, OAuth2 state).

use rand::{distr::Alphanumeric, Rng};

/// `len` characters drawn from `[A-Za-z0-9]` using the thread-local CSPRNG.
pub fn alphanumeric(len: usize) -> String {
    rand::rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphanumeric_length_and_charset() {
        let token = alphanumeric(64);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, alphanumeric(64));
    }
}
