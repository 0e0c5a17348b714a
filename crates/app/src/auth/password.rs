//! Salted password hashing.

use constant_time_eq::constant_time_eq;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use crate::auth::token::encode_hex;

const SALT_BYTES: usize = 16;

/// Hash a password with a fresh random salt.
///
/// Returns `(salt_hex, hash_hex)`.
#[must_use]
pub(crate) fn hash_password(password: &str) -> (String, String) {
    let mut salt = [0_u8; SALT_BYTES];

    OsRng.fill_bytes(&mut salt);

    let salt_hex = encode_hex(&salt);
    let hash_hex = digest_with_salt(&salt_hex, password);

    (salt_hex, hash_hex)
}

/// Check a password against a stored salt and hash in constant time.
#[must_use]
pub(crate) fn verify_password(password: &str, salt_hex: &str, hash_hex: &str) -> bool {
    let computed = digest_with_salt(salt_hex, password);

    constant_time_eq(computed.as_bytes(), hash_hex.as_bytes())
}

fn digest_with_salt(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();

    hasher.update(salt_hex.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());

    encode_hex(&hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let (salt, hash) = hash_password("hunter2");

        assert!(verify_password("hunter2", &salt, &hash));
        assert!(!verify_password("hunter3", &salt, &hash));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let (salt_a, hash_a) = hash_password("hunter2");
        let (salt_b, hash_b) = hash_password("hunter2");

        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }
}
