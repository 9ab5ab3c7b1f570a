//! PBKDF2-SHA256 password hashing.
//!
//! Encoded form: `pbkdf2$<iterations>$<salt hex>$<hash hex>`.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;

const SCHEME: &str = "pbkdf2";

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_password_with_salt(password, &salt, iterations)
}

/// Hash a password with the given salt.
pub fn hash_password_with_salt(password: &str, salt: &[u8], iterations: u32) -> String {
    let hash = derive(password, salt, iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// Well-formed hash no password derives to; verifying against it costs the
/// same as a real hash with these iterations.
pub fn decoy_hash(iterations: u32) -> String {
    format!(
        "{SCHEME}${iterations}${}${}",
        hex::encode([0u8; SALT_LENGTH]),
        hex::encode([0u8; HASH_LENGTH])
    )
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    hash
}

/// Check a password against an encoded hash. Malformed hashes never match.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let Some((iterations, salt, expected)) = decode(encoded) else {
        return false;
    };
    let actual = derive(password, &salt, iterations);
    actual.ct_eq(expected.as_slice()).into()
}

fn decode(encoded: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = encoded.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let iterations = parts.next()?.parse().ok()?;
    let salt = hex::decode(parts.next()?).ok()?;
    let hash = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() || iterations == 0 || hash.len() != HASH_LENGTH {
        return None;
    }
    Some((iterations, salt, hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITERATIONS: u32 = 1_000;

    #[test]
    fn test_hash_and_verify() {
        let encoded = hash_password("correct horse", ITERATIONS);
        assert!(encoded.starts_with("pbkdf2$1000$"));
        assert!(verify_password("correct horse", &encoded));
        assert!(!verify_password("correct horse ", &encoded));
    }

    #[test]
    fn test_salt_is_random() {
        let a = hash_password("secret1", ITERATIONS);
        let b = hash_password("secret1", ITERATIONS);
        assert_ne!(a, b);
        assert!(verify_password("secret1", &a));
        assert!(verify_password("secret1", &b));
    }

    #[test]
    fn test_deterministic_with_salt() {
        let salt = [7u8; SALT_LENGTH];
        assert_eq!(
            hash_password_with_salt("secret1", &salt, ITERATIONS),
            hash_password_with_salt("secret1", &salt, ITERATIONS)
        );
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        for bad in ["", "plain", "bcrypt$10$aa$bb", "pbkdf2$x$00$00", "pbkdf2$1000$zz$00"] {
            assert!(!verify_password("secret1", bad), "matched {bad:?}");
        }
    }
}
