//! Local wallet key custody and transaction signing.
//!
//! The crate owns a single secp256k1 keypair, derives symmetric key
//! material from a user-supplied password, persists the encrypted private
//! scalar in a fixed-layout record, reconstructs the keypair on demand,
//! and produces signed transaction payloads for a remote ledger service.
//! The ledger itself is consumed behind the [`ledger::LedgerService`]
//! trait and never implemented here.

pub mod core;
pub mod crypto;
pub mod ledger;
pub mod storage;

pub use crate::core::config::WalletConfig;
pub use crate::core::custodian::KeyCustodian;
pub use crate::core::errors::WalletError;
pub use crate::core::session::WalletSession;
