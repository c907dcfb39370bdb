//! Record cipher for the persisted private scalar.
//!
//! The fixed record layout leaves exactly 32 ciphertext bytes, so the
//! scalar is encrypted as two independent AES-128-ECB blocks with no
//! padding, nonce, or authentication tag. ECB cannot detect a wrong key;
//! the caller must validate the decrypted scalar against the stored
//! public point.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
use zeroize::Zeroizing;

use crate::core::errors::WalletError;
use crate::crypto::keying::DERIVED_KEY_LEN;

/// Length of the private scalar, plaintext and ciphertext alike.
pub const SCALAR_LEN: usize = 32;

/// Encrypts a 32-byte scalar under a 16-byte key.
pub fn encrypt_scalar(plain: &[u8; SCALAR_LEN], key: &[u8; DERIVED_KEY_LEN]) -> [u8; SCALAR_LEN] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut out = *plain;
    for block in out.chunks_exact_mut(16) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
    out
}

/// Decrypts a 32-byte ciphertext under a 16-byte key.
///
/// The result is zeroized on drop. Any input length other than 32 bytes
/// is rejected.
pub fn decrypt_scalar(
    ciphertext: &[u8],
    key: &[u8; DERIVED_KEY_LEN],
) -> Result<Zeroizing<[u8; SCALAR_LEN]>, WalletError> {
    if ciphertext.len() != SCALAR_LEN {
        return Err(WalletError::CryptoError(format!(
            "ciphertext must be {} bytes, got {}",
            SCALAR_LEN,
            ciphertext.len()
        )));
    }
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut out = Zeroizing::new([0u8; SCALAR_LEN]);
    out.copy_from_slice(ciphertext);
    for block in out.chunks_exact_mut(16) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }
    Ok(out)
}
