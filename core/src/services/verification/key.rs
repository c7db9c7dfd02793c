//! Address key derivation

use sha2::{Digest, Sha256};

/// Derives the irreversible record key for an address
///
/// `key = hex(sha256(seed ‖ address))`. Rotating the seed orphans every
/// existing record for lookups by address; lookups by token still work.
#[derive(Clone)]
pub struct KeyDeriver {
    seed: String,
}

impl KeyDeriver {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }

    /// Derive the 64-character lowercase hex key for a normalized address
    pub fn derive(&self, address: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_bytes());
        hasher.update(address.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Debug for KeyDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDeriver").field("seed", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // sha256("x" + "a@b.com")
        let mut hasher = Sha256::new();
        hasher.update(b"xa@b.com");
        let expected = hex::encode(hasher.finalize());

        let key = KeyDeriver::new("x").derive("a@b.com");
        assert_eq!(key, expected);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_deterministic_and_seed_dependent() {
        let deriver = KeyDeriver::new("seed-one");
        assert_eq!(deriver.derive("a@b.com"), deriver.derive("a@b.com"));
        assert_ne!(deriver.derive("a@b.com"), deriver.derive("c@b.com"));
        assert_ne!(
            deriver.derive("a@b.com"),
            KeyDeriver::new("seed-two").derive("a@b.com")
        );
    }

    #[test]
    fn test_debug_hides_seed() {
        let rendered = format!("{:?}", KeyDeriver::new("very-secret"));
        assert!(!rendered.contains("very-secret"));
    }
}
