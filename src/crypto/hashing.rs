// One-way digests of credential strings. Passwords are stored and compared
// only in this form.

use sha2::{Digest, Sha256};

/// SHA-256 of the secret's UTF-8 bytes as 64 lowercase hex characters.
pub fn digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a candidate secret against a stored digest.
///
/// The byte comparison does not short-circuit on the first mismatch.
pub fn digests_match(candidate: &str, stored_digest: &str) -> bool {
    let computed = digest(candidate);
    if computed.len() != stored_digest.len() {
        return false;
    }
    computed
        .bytes()
        .zip(stored_digest.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
