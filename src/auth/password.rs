use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Salt length in bytes for newly generated hashes.
const SALT_LEN: usize = 16;

/// Salted SHA-256 password digest, hex encoded for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    /// Hashes `password` with the given salt.
    pub fn new(salt: &[u8], password: &str) -> Self {
        Self {
            salt: hex::encode(salt),
            digest: hex::encode(digest(salt, password)),
        }
    }

    /// Hashes `password` with a fresh random salt.
    pub fn generate(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt);
        Self::new(&salt, password)
    }

    /// Returns `true` if `password` produces the stored digest.
    pub fn verify(&self, password: &str) -> bool {
        match hex::decode(&self.salt) {
            Ok(salt) => hex::encode(digest(&salt, password)) == self.digest,
            Err(_) => false,
        }
    }
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}
