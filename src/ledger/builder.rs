//! Transaction composition and the build→sign→broadcast sequence.
//!
//! Each intent is validated locally first; only then is the ledger asked
//! for an unsigned skeleton. A skeleton with zero contract entries is a
//! build failure and is never signed. Broadcast failures are reported
//! once, with no local retry.

use chrono::Utc;
use tracing::{info, warn};

use crate::core::custodian::KeyCustodian;
use crate::core::errors::WalletError;

use super::types::{
    AccountCreateContract, AccountType, AssetIssueContract, TransactionSkeleton, TransferContract,
    Vote, VoteWitnessContract, WitnessCreateContract, ADDRESS_LEN,
};
use super::LedgerService;

/// Parameters for an asset issuance.
#[derive(Debug, Clone)]
pub struct AssetIssueParams {
    pub name: String,
    pub total_supply: i64,
    pub trx_num: i32,
    pub ico_num: i32,
    /// Millisecond timestamp; must be strictly in the future at build
    /// time.
    pub start_time: i64,
    /// Millisecond timestamp; must be after `start_time`.
    pub end_time: i64,
    pub decay_ratio: i32,
    pub vote_score: i32,
    pub description: String,
    pub url: String,
}

/// Drives one intent through compose → skeleton → sign → broadcast.
pub struct TransactionBuilder<'a> {
    ledger: &'a dyn LedgerService,
    custodian: &'a KeyCustodian,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(ledger: &'a dyn LedgerService, custodian: &'a KeyCustodian) -> Self {
        Self { ledger, custodian }
    }

    /// Decodes a destination address, requiring exactly
    /// [`ADDRESS_LEN`] bytes.
    pub fn decode_address(hex_address: &str) -> Result<Vec<u8>, WalletError> {
        let bytes = hex::decode(hex_address)
            .map_err(|err| WalletError::InvalidAddress(err.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(WalletError::InvalidAddress(format!(
                "address must decode to {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            )));
        }
        Ok(bytes)
    }

    pub async fn send_transfer(&self, to: &str, amount: i64) -> Result<bool, WalletError> {
        let to_address = Self::decode_address(to)?;
        let contract = TransferContract {
            owner_address: self.custodian.address()?.to_vec(),
            to_address,
            amount,
        };
        let skeleton = self.ledger.create_transfer_skeleton(contract).await?;
        self.finalize(skeleton).await
    }

    pub async fn create_account(&self, account_name: &str) -> Result<bool, WalletError> {
        let contract = AccountCreateContract {
            account_type: AccountType::Normal,
            account_name: account_name.as_bytes().to_vec(),
            owner_address: self.custodian.address()?.to_vec(),
        };
        let skeleton = self.ledger.create_account_skeleton(contract).await?;
        self.finalize(skeleton).await
    }

    pub async fn issue_asset(&self, params: AssetIssueParams) -> Result<bool, WalletError> {
        validate_asset_issue(&params, Utc::now().timestamp_millis())?;
        let contract = AssetIssueContract {
            owner_address: self.custodian.address()?.to_vec(),
            name: params.name.into_bytes(),
            total_supply: params.total_supply,
            trx_num: params.trx_num,
            ico_num: params.ico_num,
            start_time: params.start_time,
            end_time: params.end_time,
            decay_ratio: params.decay_ratio,
            vote_score: params.vote_score,
            description: params.description.into_bytes(),
            url: params.url.into_bytes(),
        };
        let skeleton = self.ledger.create_asset_issue_skeleton(contract).await?;
        self.finalize(skeleton).await
    }

    pub async fn create_witness(&self, url: &str) -> Result<bool, WalletError> {
        let contract = WitnessCreateContract {
            owner_address: self.custodian.address()?.to_vec(),
            url: url.as_bytes().to_vec(),
        };
        let skeleton = self.ledger.create_witness_skeleton(contract).await?;
        self.finalize(skeleton).await
    }

    /// Votes pair a witness address with a count given as decimal text.
    /// A parse failure is a local error; no ledger call is made.
    pub async fn vote_witnesses(&self, votes: &[(String, String)]) -> Result<bool, WalletError> {
        if votes.is_empty() {
            return Err(WalletError::BuildFailure("vote set is empty".to_string()));
        }
        let mut entries = Vec::with_capacity(votes.len());
        for (witness_address, count) in votes {
            let vote_count: i64 = count.parse().map_err(|_| {
                WalletError::BuildFailure(format!("invalid vote count {:?}", count))
            })?;
            entries.push(Vote {
                vote_address: witness_address.as_bytes().to_vec(),
                vote_count,
            });
        }
        let contract = VoteWitnessContract {
            owner_address: self.custodian.address()?.to_vec(),
            votes: entries,
        };
        let skeleton = self.ledger.create_vote_skeleton(contract).await?;
        self.finalize(skeleton).await
    }

    async fn finalize(&self, skeleton: TransactionSkeleton) -> Result<bool, WalletError> {
        if skeleton.is_empty() {
            warn!("ledger returned a skeleton with no contract entries");
            return Err(WalletError::BuildFailure(
                "transaction skeleton carries no contract".to_string(),
            ));
        }
        let digest = skeleton.digest()?;
        let signature = self.custodian.sign_digest(&digest)?;
        let signed = super::types::SignedTransaction {
            skeleton,
            signature: signature.to_vec(),
        };
        let accepted = self.ledger.broadcast(signed).await?;
        info!(accepted, "transaction broadcast");
        Ok(accepted)
    }
}

fn validate_asset_issue(params: &AssetIssueParams, now_millis: i64) -> Result<(), WalletError> {
    if params.total_supply <= 0 {
        return Err(WalletError::BuildFailure(
            "total supply must be positive".to_string(),
        ));
    }
    if params.trx_num <= 0 {
        return Err(WalletError::BuildFailure(
            "trx num must be positive".to_string(),
        ));
    }
    if params.ico_num <= 0 {
        return Err(WalletError::BuildFailure(
            "ico num must be positive".to_string(),
        ));
    }
    if params.start_time <= now_millis {
        return Err(WalletError::BuildFailure(
            "start time must be in the future".to_string(),
        ));
    }
    if params.end_time <= params.start_time {
        return Err(WalletError::BuildFailure(
            "end time must be after start time".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AssetIssueParams {
        AssetIssueParams {
            name: "token".to_string(),
            total_supply: 1_000_000,
            trx_num: 1,
            ico_num: 1,
            start_time: 2_000,
            end_time: 3_000,
            decay_ratio: 0,
            vote_score: 0,
            description: "a token".to_string(),
            url: "https://example.invalid".to_string(),
        }
    }

    #[test]
    fn asset_issue_bounds_are_enforced() {
        let now = 1_000;
        assert!(validate_asset_issue(&params(), now).is_ok());

        let mut bad = params();
        bad.total_supply = 0;
        assert!(matches!(
            validate_asset_issue(&bad, now).unwrap_err(),
            WalletError::BuildFailure(_)
        ));

        let mut bad = params();
        bad.trx_num = 0;
        assert!(validate_asset_issue(&bad, now).is_err());

        let mut bad = params();
        bad.ico_num = -3;
        assert!(validate_asset_issue(&bad, now).is_err());

        // Start exactly at the clock is not strictly in the future.
        let mut bad = params();
        bad.start_time = now;
        assert!(validate_asset_issue(&bad, now).is_err());

        let mut bad = params();
        bad.end_time = bad.start_time;
        assert!(validate_asset_issue(&bad, now).is_err());
    }

    #[test]
    fn address_decoding_requires_twenty_bytes() {
        assert_eq!(
            TransactionBuilder::decode_address(&"ab".repeat(20)).unwrap().len(),
            ADDRESS_LEN
        );
        assert!(matches!(
            TransactionBuilder::decode_address("abcd").unwrap_err(),
            WalletError::InvalidAddress(_)
        ));
        assert!(matches!(
            TransactionBuilder::decode_address(&"ab".repeat(21)).unwrap_err(),
            WalletError::InvalidAddress(_)
        ));
        assert!(matches!(
            TransactionBuilder::decode_address(&"zz".repeat(20)).unwrap_err(),
            WalletError::InvalidAddress(_)
        ));
    }
}
