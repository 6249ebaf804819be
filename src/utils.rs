//! Identifier and password digest helpers.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Random 8-digit user id, zero padded.
pub fn generate_id() -> String {
    let id: u32 = rand::thread_rng().gen_range(0..100_000_000);
    format!("{:08}", id)
}

/// Lowercase hex SHA-256 digest of `input`.
pub fn hash_sha256(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex_encode(&hasher.finalize())
}

pub fn is_sha256(input: &str) -> bool {
    input.len() == 64 && input.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Digest of `password` unless it already is one.
pub fn password_digest(password: &str) -> String {
    if is_sha256(password) {
        password.to_ascii_lowercase()
    } else {
        hash_sha256(password)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_eight_digits() {
        for _ in 0..50 {
            let id = generate_id();
            assert_eq!(id.len(), 8);
            assert!(id.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_hash_sha256_known_digest() {
        assert_eq!(
            hash_sha256("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_password_digest_does_not_rehash() {
        let digest = hash_sha256("segredo");
        assert!(is_sha256(&digest));
        assert_eq!(password_digest(&digest), digest);
        assert_eq!(password_digest("segredo"), digest);
        assert!(!is_sha256("segredo"));
    }
}
