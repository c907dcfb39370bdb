//! Resident keypair custody.
//!
//! A custodian holds at most one keypair and moves between three states:
//! no key material, public-only material, or a full keypair. The address
//! is always recomputed from the public point and never stored on its
//! own. Any successful import or generation fully replaces the prior
//! state; key material from two imports is never mixed.

use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};
use zeroize::Zeroizing;

use crate::core::errors::WalletError;

/// Hex length of an importable private scalar.
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Length of the uncompressed public point, 0x04 prefix included.
pub const PUBLIC_POINT_LEN: usize = 65;

/// Length of a derived address.
pub const ADDRESS_LEN: usize = 20;

#[derive(Debug)]
enum KeyMaterial {
    Empty,
    PublicOnly(VerifyingKey),
    // SigningKey zeroizes its scalar on drop, so replacement wipes it.
    Full(SigningKey),
}

/// Holds the in-memory keypair and derives its address on demand.
#[derive(Debug)]
pub struct KeyCustodian {
    material: KeyMaterial,
}

impl KeyCustodian {
    /// A custodian with no key material.
    pub fn new() -> Self {
        Self { material: KeyMaterial::Empty }
    }

    /// Draws a fresh random scalar from the OS RNG.
    pub fn generate() -> Self {
        Self { material: KeyMaterial::Full(SigningKey::random(&mut OsRng)) }
    }

    /// Imports a private scalar from exactly 64 hex characters.
    pub fn import_private(hex_scalar: &str) -> Result<Self, WalletError> {
        if hex_scalar.len() != PRIVATE_KEY_HEX_LEN {
            return Err(WalletError::InvalidPrivateKey(format!(
                "expected {} hex characters, got {}",
                PRIVATE_KEY_HEX_LEN,
                hex_scalar.len()
            )));
        }
        let bytes = Zeroizing::new(
            hex::decode(hex_scalar)
                .map_err(|err| WalletError::InvalidPrivateKey(err.to_string()))?,
        );
        Self::import_private_bytes(&bytes)
    }

    /// Imports a private scalar from its raw 32 bytes.
    pub fn import_private_bytes(scalar: &[u8]) -> Result<Self, WalletError> {
        let signing = SigningKey::from_slice(scalar)
            .map_err(|err| WalletError::InvalidPrivateKey(err.to_string()))?;
        Ok(Self { material: KeyMaterial::Full(signing) })
    }

    /// Imports a public point from its 130-hex-character uncompressed
    /// encoding. The resulting custodian can derive an address but never
    /// sign.
    pub fn import_public_only(hex_point: &str) -> Result<Self, WalletError> {
        let bytes = hex::decode(hex_point)
            .map_err(|err| WalletError::InvalidPublicKey(err.to_string()))?;
        if bytes.len() != PUBLIC_POINT_LEN || bytes[0] != 0x04 {
            return Err(WalletError::InvalidPublicKey(format!(
                "expected a {}-byte uncompressed point with 0x04 prefix",
                PUBLIC_POINT_LEN
            )));
        }
        let verifying = VerifyingKey::from_sec1_bytes(&bytes)
            .map_err(|err| WalletError::InvalidPublicKey(err.to_string()))?;
        Ok(Self { material: KeyMaterial::PublicOnly(verifying) })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.material, KeyMaterial::Empty)
    }

    pub fn has_private(&self) -> bool {
        matches!(self.material, KeyMaterial::Full(_))
    }

    fn verifying(&self) -> Option<VerifyingKey> {
        match &self.material {
            KeyMaterial::Empty => None,
            KeyMaterial::PublicOnly(verifying) => Some(*verifying),
            KeyMaterial::Full(signing) => Some(*signing.verifying_key()),
        }
    }

    /// The 65-byte uncompressed public point.
    pub fn public_point(&self) -> Result<[u8; PUBLIC_POINT_LEN], WalletError> {
        let verifying = self
            .verifying()
            .ok_or_else(|| WalletError::NoCredential("no resident keypair".to_string()))?;
        let encoded = verifying.to_encoded_point(false);
        let mut out = [0u8; PUBLIC_POINT_LEN];
        out.copy_from_slice(encoded.as_bytes());
        Ok(out)
    }

    /// The 20-byte address: last 20 bytes of Keccak-256 over the public
    /// point without its 0x04 prefix.
    pub fn address(&self) -> Result<[u8; ADDRESS_LEN], WalletError> {
        let point = self.public_point()?;
        let hash = Keccak256::digest(&point[1..]);
        let mut address = [0u8; ADDRESS_LEN];
        address.copy_from_slice(&hash[12..]);
        Ok(address)
    }

    pub fn address_hex(&self) -> Result<String, WalletError> {
        Ok(hex::encode(self.address()?))
    }

    /// Zeroizing copy of the private scalar, for persisting or exporting.
    pub fn private_scalar(&self) -> Result<Zeroizing<[u8; 32]>, WalletError> {
        match &self.material {
            KeyMaterial::Full(signing) => {
                let mut out = Zeroizing::new([0u8; 32]);
                out.copy_from_slice(&signing.to_bytes());
                Ok(out)
            }
            _ => Err(WalletError::NoPrivateKey),
        }
    }

    /// Deterministic recoverable ECDSA signature over a 32-byte digest,
    /// serialized as r || s || v (65 bytes).
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; 65], WalletError> {
        let signing = match &self.material {
            KeyMaterial::Full(signing) => signing,
            _ => return Err(WalletError::NoPrivateKey),
        };
        let (signature, recovery_id) = signing
            .sign_prehash_recoverable(digest)
            .map_err(|err| WalletError::CryptoError(err.to_string()))?;
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(out)
    }

    /// Drops the private scalar, demoting a full custodian to
    /// public-only. The scalar is zeroized as it is dropped.
    pub fn clear_private(&mut self) {
        if let KeyMaterial::Full(signing) = &self.material {
            let verifying = *signing.verifying_key();
            self.material = KeyMaterial::PublicOnly(verifying);
        }
    }
}

impl Default for KeyCustodian {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::signature::hazmat::PrehashVerifier;
    use k256::ecdsa::{RecoveryId, Signature};

    // secp256k1 generator point: the public key of scalar 1.
    const GENERATOR_HEX: &str = "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";
    const SCALAR_ONE_HEX: &str =
        "0000000000000000000000000000000000000000000000000000000000000001";
    const SCALAR_ONE_ADDRESS: &str = "7e5f4552091a69125d5dfcb7b8c2659029395bdf";

    #[test]
    fn new_custodian_is_empty() {
        let custodian = KeyCustodian::new();
        assert!(custodian.is_empty());
        assert!(!custodian.has_private());
        assert!(matches!(
            custodian.address().unwrap_err(),
            WalletError::NoCredential(_)
        ));
    }

    #[test]
    fn generate_produces_full_custodian() {
        let custodian = KeyCustodian::generate();
        assert!(custodian.has_private());
        let point = custodian.public_point().unwrap();
        assert_eq!(point[0], 0x04);
        assert_eq!(custodian.address().unwrap().len(), ADDRESS_LEN);
    }

    #[test]
    fn import_private_derives_known_point_and_address() {
        let custodian = KeyCustodian::import_private(SCALAR_ONE_HEX).unwrap();
        assert_eq!(hex::encode(custodian.public_point().unwrap()), GENERATOR_HEX);
        assert_eq!(custodian.address_hex().unwrap(), SCALAR_ONE_ADDRESS);
    }

    #[test]
    fn import_private_rejects_bad_input() {
        assert!(matches!(
            KeyCustodian::import_private("abcd").unwrap_err(),
            WalletError::InvalidPrivateKey(_)
        ));
        let not_hex = "zz".repeat(32);
        assert!(matches!(
            KeyCustodian::import_private(&not_hex).unwrap_err(),
            WalletError::InvalidPrivateKey(_)
        ));
        // Zero is not a valid curve scalar.
        let zero = "00".repeat(32);
        assert!(matches!(
            KeyCustodian::import_private(&zero).unwrap_err(),
            WalletError::InvalidPrivateKey(_)
        ));
    }

    #[test]
    fn import_public_only_matches_full_import() {
        let full = KeyCustodian::import_private(SCALAR_ONE_HEX).unwrap();
        let public_only = KeyCustodian::import_public_only(GENERATOR_HEX).unwrap();
        assert_eq!(
            full.address_hex().unwrap(),
            public_only.address_hex().unwrap()
        );
        assert!(!public_only.has_private());
        assert!(matches!(
            public_only.private_scalar().unwrap_err(),
            WalletError::NoPrivateKey
        ));
    }

    #[test]
    fn import_public_only_rejects_malformed_points() {
        assert!(KeyCustodian::import_public_only("04abcd").is_err());
        // Right length, wrong prefix.
        let compressed_prefix = format!("02{}", &GENERATOR_HEX[2..]);
        assert!(matches!(
            KeyCustodian::import_public_only(&compressed_prefix).unwrap_err(),
            WalletError::InvalidPublicKey(_)
        ));
        // Right shape, not on the curve.
        let off_curve = format!("04{}", "11".repeat(64));
        assert!(KeyCustodian::import_public_only(&off_curve).is_err());
    }

    #[test]
    fn sign_requires_private_key() {
        let digest = [0x55u8; 32];
        assert!(matches!(
            KeyCustodian::new().sign_digest(&digest).unwrap_err(),
            WalletError::NoPrivateKey
        ));
        let public_only = KeyCustodian::import_public_only(GENERATOR_HEX).unwrap();
        assert!(matches!(
            public_only.sign_digest(&digest).unwrap_err(),
            WalletError::NoPrivateKey
        ));
    }

    #[test]
    fn signatures_are_deterministic_and_verifiable() {
        let custodian = KeyCustodian::import_private(SCALAR_ONE_HEX).unwrap();
        let digest = [0x21u8; 32];
        let first = custodian.sign_digest(&digest).unwrap();
        let second = custodian.sign_digest(&digest).unwrap();
        assert_eq!(first, second);

        let signature = Signature::from_slice(&first[..64]).unwrap();
        let verifying =
            VerifyingKey::from_sec1_bytes(&hex::decode(GENERATOR_HEX).unwrap()).unwrap();
        verifying.verify_prehash(&digest, &signature).unwrap();

        let recovery_id = RecoveryId::from_byte(first[64]).unwrap();
        let recovered =
            VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id).unwrap();
        assert_eq!(recovered, verifying);
    }

    #[test]
    fn clear_private_demotes_to_public_only() {
        let mut custodian = KeyCustodian::generate();
        let address = custodian.address_hex().unwrap();
        custodian.clear_private();
        assert!(!custodian.has_private());
        assert!(!custodian.is_empty());
        // Address survives the wipe; signing does not.
        assert_eq!(custodian.address_hex().unwrap(), address);
        assert!(matches!(
            custodian.sign_digest(&[0u8; 32]).unwrap_err(),
            WalletError::NoPrivateKey
        ));
    }

    #[test]
    fn scalar_roundtrips_through_export() {
        let custodian = KeyCustodian::generate();
        let scalar = custodian.private_scalar().unwrap();
        let reimported = KeyCustodian::import_private_bytes(scalar.as_ref()).unwrap();
        assert_eq!(
            custodian.address_hex().unwrap(),
            reimported.address_hex().unwrap()
        );
    }
}
