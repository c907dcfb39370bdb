//! Contract payloads and the transaction data model.
//!
//! These are the payloads the remote ledger service understands. The
//! service returns an unsigned skeleton carrying the contract entries;
//! the wallet signs SHA-256 of the skeleton's canonical serialization
//! and hands the signed transaction back for broadcast.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::errors::WalletError;

/// Length of a decoded ledger address.
pub const ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountType {
    Normal,
    AssetIssue,
    Contract,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferContract {
    pub owner_address: Vec<u8>,
    pub to_address: Vec<u8>,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountCreateContract {
    pub account_type: AccountType,
    pub account_name: Vec<u8>,
    pub owner_address: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetIssueContract {
    pub owner_address: Vec<u8>,
    pub name: Vec<u8>,
    pub total_supply: i64,
    pub trx_num: i32,
    pub ico_num: i32,
    pub start_time: i64,
    pub end_time: i64,
    pub decay_ratio: i32,
    pub vote_score: i32,
    pub description: Vec<u8>,
    pub url: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WitnessCreateContract {
    pub owner_address: Vec<u8>,
    pub url: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub vote_address: Vec<u8>,
    pub vote_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteWitnessContract {
    pub owner_address: Vec<u8>,
    pub votes: Vec<Vote>,
}

/// One contract entry inside a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContractPayload {
    Transfer(TransferContract),
    AccountCreate(AccountCreateContract),
    AssetIssue(AssetIssueContract),
    WitnessCreate(WitnessCreateContract),
    VoteWitness(VoteWitnessContract),
}

/// An unsigned transaction as returned by the ledger service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionSkeleton {
    pub contracts: Vec<ContractPayload>,
    /// Millisecond timestamp assigned by the ledger service.
    pub timestamp: i64,
}

impl TransactionSkeleton {
    /// A skeleton with zero contract entries is a build failure, never
    /// signed.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// SHA-256 over the canonical (struct-ordered JSON) serialization;
    /// the message the custodian signs.
    pub fn digest(&self) -> Result<[u8; 32], WalletError> {
        let raw = serde_json::to_vec(self)
            .map_err(|err| WalletError::BuildFailure(err.to_string()))?;
        Ok(Sha256::digest(&raw).into())
    }
}

/// A skeleton plus the 65-byte recoverable signature over its digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedTransaction {
    pub skeleton: TransactionSkeleton,
    pub signature: Vec<u8>,
}

/// Account entry from the ledger's listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSummary {
    pub address: Vec<u8>,
    pub account_name: Vec<u8>,
    pub balance: i64,
}

/// Witness entry from the ledger's listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WitnessSummary {
    pub address: Vec<u8>,
    pub url: String,
    pub vote_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer_skeleton(amount: i64) -> TransactionSkeleton {
        TransactionSkeleton {
            contracts: vec![ContractPayload::Transfer(TransferContract {
                owner_address: vec![1u8; ADDRESS_LEN],
                to_address: vec![2u8; ADDRESS_LEN],
                amount,
            })],
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn empty_skeleton_is_flagged() {
        let skeleton = TransactionSkeleton { contracts: vec![], timestamp: 0 };
        assert!(skeleton.is_empty());
        assert!(!transfer_skeleton(10).is_empty());
    }

    #[test]
    fn digest_is_deterministic_and_content_sensitive() {
        let a = transfer_skeleton(10);
        let b = transfer_skeleton(10);
        let c = transfer_skeleton(11);
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_ne!(a.digest().unwrap(), c.digest().unwrap());
    }

    #[test]
    fn skeleton_serializes_roundtrip() {
        let skeleton = transfer_skeleton(42);
        let raw = serde_json::to_vec(&skeleton).unwrap();
        let back: TransactionSkeleton = serde_json::from_slice(&raw).unwrap();
        assert_eq!(skeleton, back);
    }
}
