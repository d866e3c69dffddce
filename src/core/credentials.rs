//! Password generation and crypt(3) hashing for the conserver passwd file.

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha_crypt::{sha512_check, sha512_simple, Sha512Params};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("hash password: {0}")]
    Hash(String),
}

/// A rendered `username:hash` line of the passwd file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialEntry {
    pub username: String,
    pub hashed_password: String,
}

impl fmt::Display for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.username, self.hashed_password)
    }
}

/// One-way hashing into the format conserver authenticates against.
pub trait CredentialHasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;
}

/// SHA-512 crypt (`$6$salt$hash`) with a fresh random salt per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha512Crypt;

impl CredentialHasher for Sha512Crypt {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        hash_password(plaintext)
    }
}

/// Generate a random alphanumeric password from the OS CSPRNG.
pub fn generate_password(length: usize) -> Zeroizing<String> {
    if length == 0 {
        return Zeroizing::new(String::new());
    }
    Zeroizing::new(
        OsRng
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect(),
    )
}

/// Hash a plaintext password with SHA-512 crypt and a random salt.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    sha512_simple(plaintext, &Sha512Params::default())
        .map_err(|e| CredentialError::Hash(format!("{:?}", e)))
}

/// Check a plaintext password against a crypt string using its embedded salt.
pub fn verify_password(plaintext: &str, hashed: &str) -> bool {
    sha512_check(plaintext, hashed).is_ok()
}
