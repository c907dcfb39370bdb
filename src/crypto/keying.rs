//! Password-derived key material.
//!
//! Two deliberately different 16-byte derivations come from the same
//! password: the *verification key* only confirms that a password matches
//! the one on record, while the *encryption key* protects the private
//! scalar. Compromising the stored verification value alone therefore
//! yields no decryption capability.

use sha2::{Digest, Sha256};

use crate::core::errors::WalletError;

/// Length of both derived keys.
pub const DERIVED_KEY_LEN: usize = 16;

/// Minimum accepted password length. No other complexity rules are
/// enforced.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Checks the password acceptance policy: non-empty and at least
/// [`MIN_PASSWORD_LEN`] characters.
pub fn validate_password(password: &str) -> Result<(), WalletError> {
    if password.is_empty() {
        return Err(WalletError::InvalidPassword("password is empty".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WalletError::InvalidPassword(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Derivation of the two password-bound keys.
///
/// The storage format fixes the default derivation, but the trait keeps
/// the KDF swappable without touching call sites.
pub trait PasswordKeying: Send + Sync {
    /// Key stored to later confirm the same password is supplied.
    /// Never used for decryption.
    fn verification_key(&self, password: &str) -> Result<[u8; DERIVED_KEY_LEN], WalletError>;

    /// Key used to encrypt and decrypt the private scalar.
    fn encryption_key(&self, password: &str) -> Result<[u8; DERIVED_KEY_LEN], WalletError>;
}

/// Storage-compatible default derivation: plain SHA-256, no salt, no
/// iteration count.
///
/// `verification_key = first16(sha256(sha256(password)))`
/// `encryption_key   = first16(sha256(password))`
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Keying;

impl PasswordKeying for Sha256Keying {
    fn verification_key(&self, password: &str) -> Result<[u8; DERIVED_KEY_LEN], WalletError> {
        validate_password(password)?;
        let once = Sha256::digest(password.as_bytes());
        let twice = Sha256::digest(once);
        Ok(first16(&twice))
    }

    fn encryption_key(&self, password: &str) -> Result<[u8; DERIVED_KEY_LEN], WalletError> {
        validate_password(password)?;
        Ok(first16(&Sha256::digest(password.as_bytes())))
    }
}

fn first16(digest: &[u8]) -> [u8; DERIVED_KEY_LEN] {
    let mut out = [0u8; DERIVED_KEY_LEN];
    out.copy_from_slice(&digest[..DERIVED_KEY_LEN]);
    out
}
