//! Session orchestration: login state, rehydration, and auth gating.
//!
//! A `WalletSession` is an explicit object owned by the caller; there is
//! no process-wide wallet slot. Transitions (register, import, login,
//! logout, change-password) take `&mut self`, so two transitions can
//! never interleave on one session. All key-using operations are gated
//! on an authenticated session and rehydrate the keypair from storage on
//! demand.

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::config::WalletConfig;
use crate::core::custodian::KeyCustodian;
use crate::core::errors::WalletError;
use crate::crypto::cipher;
use crate::crypto::keying::{validate_password, PasswordKeying, Sha256Keying};
use crate::ledger::builder::{AssetIssueParams, TransactionBuilder};
use crate::ledger::{AccountSummary, LedgerService, TimeoutLedger, WitnessSummary};
use crate::storage::CredentialStore;

/// Wallet session over one credential store and one ledger handle.
pub struct WalletSession {
    store: CredentialStore,
    keying: Box<dyn PasswordKeying>,
    ledger: Arc<dyn LedgerService>,
    custodian: KeyCustodian,
    authenticated: bool,
}

impl WalletSession {
    /// Builds a session; every ledger call is bounded by `timeout`.
    pub fn new(
        store: CredentialStore,
        keying: Box<dyn PasswordKeying>,
        ledger: Arc<dyn LedgerService>,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            store,
            keying,
            ledger: Arc::new(TimeoutLedger::new(ledger, timeout)),
            custodian: KeyCustodian::new(),
            authenticated: false,
        }
    }

    /// Session with the storage-compatible default keying and the
    /// configured record path and timeout.
    pub fn from_config(config: &WalletConfig, ledger: Arc<dyn LedgerService>) -> Self {
        Self::new(
            CredentialStore::new(&config.wallet_path),
            Box::new(Sha256Keying),
            ledger,
            config.request_timeout(),
        )
    }

    pub fn is_logged_in(&self) -> bool {
        self.authenticated
    }

    /// Whether a private scalar is currently resident.
    pub fn has_resident_private(&self) -> bool {
        self.custodian.has_private()
    }

    /// Generates a fresh keypair, registers the account with the ledger
    /// (signed by the new key), and persists the wallet only once the
    /// ledger accepted it. Storage is untouched on any failure. The
    /// session stays unauthenticated; `login` follows.
    pub async fn register(&mut self, name: &str, password: &str) -> Result<(), WalletError> {
        validate_password(password)?;
        let candidate = KeyCustodian::generate();
        let builder = TransactionBuilder::new(self.ledger.as_ref(), &candidate);
        let accepted = builder.create_account(name).await?;
        if !accepted {
            warn!("account creation rejected by ledger; wallet not stored");
            return Err(WalletError::NetworkFailure(
                "account creation was not accepted".to_string(),
            ));
        }
        self.persist(&candidate, password)?;
        let address = candidate.address_hex()?;
        self.custodian = candidate;
        info!(%address, "wallet registered");
        Ok(())
    }

    /// Imports an externally supplied private key and persists it under
    /// `password`. No ledger call is made. The session stays
    /// unauthenticated.
    pub fn import(&mut self, password: &str, private_key_hex: &str) -> Result<(), WalletError> {
        validate_password(password)?;
        let candidate = KeyCustodian::import_private(private_key_hex)?;
        self.persist(&candidate, password)?;
        let address = candidate.address_hex()?;
        self.custodian = candidate;
        info!(%address, "wallet imported");
        Ok(())
    }

    /// Authenticates the session. The password is accepted only if its
    /// verification key equals the stored verification field; the check
    /// runs even when a full keypair is already resident.
    pub fn login(&mut self, password: &str) -> Result<(), WalletError> {
        validate_password(password)?;
        if !self.store.exists() {
            warn!("login without a stored wallet; register or import first");
            return Err(WalletError::NoCredential(
                "no wallet record on disk".to_string(),
            ));
        }
        if !self.custodian.has_private() {
            self.rehydrate_full(password)?;
        }
        self.check_verification(password)?;
        self.authenticated = true;
        info!("session authenticated");
        Ok(())
    }

    /// Clears the authenticated flag and wipes the resident private
    /// scalar; the public half stays cached for address reads after a
    /// fresh login.
    pub fn logout(&mut self) {
        self.authenticated = false;
        self.custodian.clear_private();
        info!("session logged out");
    }

    /// Re-encrypts the wallet under `new_password`, replacing the stored
    /// record. Requires an authenticated session and the old password.
    pub fn change_password(
        &mut self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), WalletError> {
        self.require_login("change_password")?;
        validate_password(old_password)?;
        validate_password(new_password)?;
        self.check_verification(old_password)?;
        self.ensure_full(old_password)?;
        self.persist_resident(new_password)?;
        info!("wallet password changed");
        Ok(())
    }

    /// One-off export: the resident scalar re-encrypted under
    /// `export_password`, returned as hex. The stored record is not
    /// touched.
    pub fn backup(
        &mut self,
        session_password: &str,
        export_password: &str,
    ) -> Result<String, WalletError> {
        self.require_login("backup")?;
        validate_password(session_password)?;
        validate_password(export_password)?;
        self.check_verification(session_password)?;
        self.ensure_full(session_password)?;
        let scalar = self.custodian.private_scalar()?;
        let export_key = self.keying.encryption_key(export_password)?;
        Ok(hex::encode(cipher::encrypt_scalar(&scalar, &export_key)))
    }

    /// Hex address of the resident wallet, falling back to the stored
    /// public field when no key material is in memory.
    pub fn address_hex(&mut self) -> Result<String, WalletError> {
        self.require_login("get_address")?;
        self.ensure_public()?;
        self.custodian.address_hex()
    }

    /// Balance of the resident wallet's address. Public-only material
    /// suffices.
    pub async fn balance(&mut self) -> Result<i64, WalletError> {
        self.require_login("get_balance")?;
        self.ensure_public()?;
        let address = self.custodian.address()?;
        self.ledger.get_balance(&address).await
    }

    pub async fn send_coin(
        &mut self,
        password: &str,
        to: &str,
        amount: i64,
    ) -> Result<bool, WalletError> {
        self.require_login("send_coin")?;
        validate_password(password)?;
        self.ensure_full(password)?;
        self.builder().send_transfer(to, amount).await
    }

    pub async fn asset_issue(
        &mut self,
        password: &str,
        params: AssetIssueParams,
    ) -> Result<bool, WalletError> {
        self.require_login("asset_issue")?;
        validate_password(password)?;
        self.ensure_full(password)?;
        self.builder().issue_asset(params).await
    }

    pub async fn create_witness(
        &mut self,
        password: &str,
        url: &str,
    ) -> Result<bool, WalletError> {
        self.require_login("create_witness")?;
        validate_password(password)?;
        self.ensure_full(password)?;
        self.builder().create_witness(url).await
    }

    pub async fn vote_witness(
        &mut self,
        password: &str,
        votes: &[(String, String)],
    ) -> Result<bool, WalletError> {
        self.require_login("vote_witness")?;
        validate_password(password)?;
        self.ensure_full(password)?;
        self.builder().vote_witnesses(votes).await
    }

    pub async fn list_accounts(&self) -> Result<Option<Vec<AccountSummary>>, WalletError> {
        self.ledger.list_accounts().await
    }

    pub async fn list_witnesses(&self) -> Result<Option<Vec<WitnessSummary>>, WalletError> {
        self.ledger.list_witnesses().await
    }

    fn builder(&self) -> TransactionBuilder<'_> {
        TransactionBuilder::new(self.ledger.as_ref(), &self.custodian)
    }

    fn require_login(&self, operation: &str) -> Result<(), WalletError> {
        if !self.authenticated {
            warn!(operation, "operation requires an authenticated session");
            return Err(WalletError::NoCredential(format!(
                "{} requires login",
                operation
            )));
        }
        Ok(())
    }

    /// Persists a candidate custodian under `password`: verification key,
    /// public point, and the scalar encrypted with the encryption key.
    fn persist(&self, candidate: &KeyCustodian, password: &str) -> Result<(), WalletError> {
        let verification = self.keying.verification_key(password)?;
        let encryption = self.keying.encryption_key(password)?;
        let public_point = candidate.public_point()?;
        let scalar = candidate.private_scalar()?;
        let ciphertext = cipher::encrypt_scalar(&scalar, &encryption);
        self.store.write(&verification, &public_point, &ciphertext)
    }

    fn persist_resident(&self, password: &str) -> Result<(), WalletError> {
        self.persist(&self.custodian, password)
    }

    /// Compares the password's verification key against the stored
    /// verification field.
    fn check_verification(&self, password: &str) -> Result<(), WalletError> {
        let record = self.store.read()?;
        let verification = self.keying.verification_key(password)?;
        if hex::encode(verification) != record.verification_hex.to_lowercase() {
            warn!("password does not match the stored verification field");
            return Err(WalletError::InvalidCredential);
        }
        Ok(())
    }

    /// Rebuilds the full keypair from the stored record. ECB gives no
    /// integrity, so the decrypted scalar is accepted only if its public
    /// point matches the stored public field.
    fn rehydrate_full(&mut self, password: &str) -> Result<(), WalletError> {
        let record = self.store.read()?;
        let encryption = self.keying.encryption_key(password)?;
        let ciphertext = hex::decode(&record.cipher_hex).map_err(|err| {
            WalletError::CorruptStorage(format!("private field is not hex: {}", err))
        })?;
        let scalar = cipher::decrypt_scalar(&ciphertext, &encryption)?;
        let candidate = KeyCustodian::import_private_bytes(scalar.as_ref())
            .map_err(|_| WalletError::InvalidCredential)?;
        let stored_public = record.public_hex.to_lowercase();
        if hex::encode(candidate.public_point()?) != stored_public {
            warn!("decrypted key does not match the stored public point");
            return Err(WalletError::InvalidCredential);
        }
        self.custodian = candidate;
        Ok(())
    }

    /// Key-using operations first ensure a full custodian, rehydrating
    /// silently with the caller-supplied password; failure is
    /// `NoCredential`.
    fn ensure_full(&mut self, password: &str) -> Result<(), WalletError> {
        if self.custodian.has_private() {
            return Ok(());
        }
        self.rehydrate_full(password).map_err(|err| {
            warn!(%err, "rehydration failed");
            WalletError::NoCredential(format!("could not rehydrate wallet: {}", err))
        })
    }

    /// Address-only operations tolerate a missing private half and load
    /// the stored public point instead.
    fn ensure_public(&mut self) -> Result<(), WalletError> {
        if !self.custodian.is_empty() {
            return Ok(());
        }
        match self.store.read_public_only()? {
            Some(public_hex) => {
                self.custodian = KeyCustodian::import_public_only(&public_hex)?;
                Ok(())
            }
            None => Err(WalletError::NoCredential(
                "no wallet record on disk".to_string(),
            )),
        }
    }
}
