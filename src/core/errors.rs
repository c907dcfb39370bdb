use thiserror::Error;

/// Error taxonomy for wallet operations.
///
/// Every failure is local to the requested operation and leaves prior
/// state unchanged. The taxonomy is preserved through the public API;
/// callers that need a plain success/failure verdict flatten it at their
/// own boundary.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Password rejected by the acceptance policy.
    #[error("invalid password: {0}")]
    InvalidPassword(String),
    /// Private key is not a 64-hex-character curve scalar.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// Public key is not a well-formed 65-byte uncompressed point.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    /// Address does not decode to the expected 20 bytes.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Persisted record is unreadable or has the wrong shape.
    #[error("corrupt wallet record: {0}")]
    CorruptStorage(String),
    /// Not authenticated, or no resident key usable for the operation.
    #[error("no usable credential: {0}")]
    NoCredential(String),
    /// Supplied password does not match the stored verification field.
    #[error("password does not match the stored credential")]
    InvalidCredential,
    /// Signing requested while no private scalar is resident.
    #[error("no private key resident")]
    NoPrivateKey,
    /// Local validation failed or the ledger returned an empty skeleton.
    #[error("transaction build failed: {0}")]
    BuildFailure(String),
    /// Remote ledger call failed or timed out.
    #[error("ledger request failed: {0}")]
    NetworkFailure(String),
    /// Underlying storage I/O error.
    #[error("storage error: {0}")]
    StorageError(String),
    /// Cipher or curve-level failure.
    #[error("crypto error: {0}")]
    CryptoError(String),
}

impl WalletError {
    /// Whether retrying the same operation could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::NetworkFailure(_))
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        WalletError::StorageError(err.to_string())
    }
}
