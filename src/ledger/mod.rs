//! Ledger service seam.
//!
//! The remote ledger is consumed through [`LedgerService`] and never
//! implemented in this crate. The core defines no retry policy; it does
//! bound every call it makes through [`TimeoutLedger`], since an
//! unresponsive remote would otherwise block the calling operation
//! indefinitely.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::core::errors::WalletError;

pub mod builder;
pub mod types;

pub use types::{
    AccountCreateContract, AccountSummary, AccountType, AssetIssueContract, ContractPayload,
    SignedTransaction, TransactionSkeleton, TransferContract, Vote, VoteWitnessContract,
    WitnessCreateContract, WitnessSummary,
};

/// Capability set consumed from the remote ledger service.
#[async_trait]
pub trait LedgerService: Send + Sync {
    async fn get_balance(&self, address: &[u8]) -> Result<i64, WalletError>;

    async fn create_transfer_skeleton(
        &self,
        contract: TransferContract,
    ) -> Result<TransactionSkeleton, WalletError>;

    async fn create_account_skeleton(
        &self,
        contract: AccountCreateContract,
    ) -> Result<TransactionSkeleton, WalletError>;

    async fn create_asset_issue_skeleton(
        &self,
        contract: AssetIssueContract,
    ) -> Result<TransactionSkeleton, WalletError>;

    async fn create_witness_skeleton(
        &self,
        contract: WitnessCreateContract,
    ) -> Result<TransactionSkeleton, WalletError>;

    async fn create_vote_skeleton(
        &self,
        contract: VoteWitnessContract,
    ) -> Result<TransactionSkeleton, WalletError>;

    /// Submits a signed transaction; the ledger's acceptance verdict is
    /// passed through unmodified.
    async fn broadcast(&self, transaction: SignedTransaction) -> Result<bool, WalletError>;

    async fn list_accounts(&self) -> Result<Option<Vec<AccountSummary>>, WalletError>;

    async fn list_witnesses(&self) -> Result<Option<Vec<WitnessSummary>>, WalletError>;
}

/// Applies one fixed deadline to every call of an inner ledger service.
///
/// Expiry surfaces as [`WalletError::NetworkFailure`]; the operation that
/// made the call fails once, with no retry.
pub struct TimeoutLedger {
    inner: Arc<dyn LedgerService>,
    deadline: Duration,
}

impl TimeoutLedger {
    pub fn new(inner: Arc<dyn LedgerService>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, WalletError>
    where
        F: Future<Output = Result<T, WalletError>> + Send,
    {
        match timeout(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(WalletError::NetworkFailure(format!(
                "ledger call exceeded {:?}",
                self.deadline
            ))),
        }
    }
}

#[async_trait]
impl LedgerService for TimeoutLedger {
    async fn get_balance(&self, address: &[u8]) -> Result<i64, WalletError> {
        self.bounded(self.inner.get_balance(address)).await
    }

    async fn create_transfer_skeleton(
        &self,
        contract: TransferContract,
    ) -> Result<TransactionSkeleton, WalletError> {
        self.bounded(self.inner.create_transfer_skeleton(contract)).await
    }

    async fn create_account_skeleton(
        &self,
        contract: AccountCreateContract,
    ) -> Result<TransactionSkeleton, WalletError> {
        self.bounded(self.inner.create_account_skeleton(contract)).await
    }

    async fn create_asset_issue_skeleton(
        &self,
        contract: AssetIssueContract,
    ) -> Result<TransactionSkeleton, WalletError> {
        self.bounded(self.inner.create_asset_issue_skeleton(contract)).await
    }

    async fn create_witness_skeleton(
        &self,
        contract: WitnessCreateContract,
    ) -> Result<TransactionSkeleton, WalletError> {
        self.bounded(self.inner.create_witness_skeleton(contract)).await
    }

    async fn create_vote_skeleton(
        &self,
        contract: VoteWitnessContract,
    ) -> Result<TransactionSkeleton, WalletError> {
        self.bounded(self.inner.create_vote_skeleton(contract)).await
    }

    async fn broadcast(&self, transaction: SignedTransaction) -> Result<bool, WalletError> {
        self.bounded(self.inner.broadcast(transaction)).await
    }

    async fn list_accounts(&self) -> Result<Option<Vec<AccountSummary>>, WalletError> {
        self.bounded(self.inner.list_accounts()).await
    }

    async fn list_witnesses(&self) -> Result<Option<Vec<WitnessSummary>>, WalletError> {
        self.bounded(self.inner.list_witnesses()).await
    }
}
