//! Fixed-layout credential record storage.
//!
//! The persisted artifact is a single 226-character ASCII record with no
//! header, versioning, or checksum: 32 hex characters of verification
//! key, 130 of uncompressed public point, 64 of encrypted private
//! scalar, concatenated with no delimiter. The record is only ever valid
//! as a whole; any other length is corrupt. This layer knows the byte
//! layout and nothing else — hex well-formedness is the consumer's
//! problem.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::errors::WalletError;

/// Total record length in ASCII characters.
pub const RECORD_LEN: usize = 226;

/// Hex length of the verification-key field, bytes [0, 32).
pub const VERIFICATION_HEX_LEN: usize = 32;

/// Hex length of the public-point field, bytes [32, 162).
pub const PUBLIC_HEX_LEN: usize = 130;

/// Hex length of the encrypted-scalar field, bytes [162, 226).
pub const CIPHER_HEX_LEN: usize = 64;

/// The three fields of a parsed record, still hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub verification_hex: String,
    pub public_hex: String,
    pub cipher_hex: String,
}

impl SecretRecord {
    /// Splits a raw record into its three fixed sub-ranges.
    ///
    /// Exactly [`RECORD_LEN`] ASCII characters are accepted; no other
    /// validation happens here.
    pub fn parse(raw: &[u8]) -> Result<Self, WalletError> {
        if raw.len() != RECORD_LEN {
            return Err(WalletError::CorruptStorage(format!(
                "record length {} (expected {})",
                raw.len(),
                RECORD_LEN
            )));
        }
        if !raw.is_ascii() {
            return Err(WalletError::CorruptStorage(
                "record contains non-ASCII bytes".to_string(),
            ));
        }
        let text = std::str::from_utf8(raw)
            .map_err(|err| WalletError::CorruptStorage(err.to_string()))?;
        Ok(Self {
            verification_hex: text[..VERIFICATION_HEX_LEN].to_string(),
            public_hex: text[VERIFICATION_HEX_LEN..VERIFICATION_HEX_LEN + PUBLIC_HEX_LEN]
                .to_string(),
            cipher_hex: text[VERIFICATION_HEX_LEN + PUBLIC_HEX_LEN..].to_string(),
        })
    }

    /// Re-assembles the record text.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.verification_hex, self.public_hex, self.cipher_hex)
    }
}

/// File-backed store for the secret record.
///
/// Assumes exclusive ownership of the record file by one session process
/// at a time.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a record file is present at all.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Serializes the three fields and persists them as a single logical
    /// record, replacing any prior one.
    pub fn write(
        &self,
        verification_key: &[u8; 16],
        public_point: &[u8; 65],
        encrypted_scalar: &[u8; 32],
    ) -> Result<(), WalletError> {
        let record = format!(
            "{}{}{}",
            hex::encode(verification_key),
            hex::encode(public_point),
            hex::encode(encrypted_scalar)
        );
        debug_assert_eq!(record.len(), RECORD_LEN);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, record.as_bytes())?;
        debug!(path = %self.path.display(), "wallet record written");
        Ok(())
    }

    /// Reads and splits the record. Any length other than
    /// [`RECORD_LEN`] — including an absent file — is corrupt.
    pub fn read(&self) -> Result<SecretRecord, WalletError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(WalletError::CorruptStorage(format!(
                    "no record at {}",
                    self.path.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };
        SecretRecord::parse(&raw).map_err(|err| {
            warn!(path = %self.path.display(), %err, "unreadable wallet record");
            err
        })
    }

    /// Reads only the public-point field, tolerating absence of storage.
    pub fn read_public_only(&self) -> Result<Option<String>, WalletError> {
        if !self.exists() {
            return Ok(None);
        }
        Ok(Some(self.read()?.public_hex))
    }
}
