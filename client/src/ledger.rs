//! The narrow contract the unstake workflow consumes from a remote node.

use serde::Deserialize;

use sweep_types::{AccountAddress, Amount};
use sweep_wallet::Credential;

use crate::call::{CallDescriptor, SignedTransaction};
use crate::error::ClientError;

/// An event emitted during transaction execution.
#[derive(Clone, Debug, Deserialize)]
pub struct Event {
    pub module: String,
    pub name: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// The ledger's report on a submitted transaction.
///
/// `success` reflects the ledger's own judgement of the batch as a whole;
/// nothing about individual sub-calls is implied unless `events` names them.
#[derive(Clone, Debug, Deserialize)]
pub struct ExecutionReceipt {
    pub hash: String,
    pub success: bool,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Read and submit operations against a remote consensus node.
///
/// All queries return exact integer amounts; a failed query is an error,
/// never a zero amount.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    /// Current liquid balance of an account.
    async fn query_balance(&self, address: &AccountAddress) -> Result<Amount, ClientError>;

    /// Current stake delegated by `account` to `delegate`.
    async fn query_stake(
        &self,
        account: &AccountAddress,
        delegate: &AccountAddress,
    ) -> Result<Amount, ClientError>;

    /// Sign a call with the account credential, producing a submittable
    /// transaction. Fails with `CredentialLocked` if the credential cannot
    /// be unlocked.
    fn sign_and_build_extrinsic(
        &self,
        call: &CallDescriptor,
        credential: &Credential,
    ) -> Result<SignedTransaction, ClientError>;

    /// Submit a signed transaction, optionally blocking until the node
    /// reports inclusion and finalization.
    async fn submit(
        &self,
        tx: &SignedTransaction,
        wait_for_inclusion: bool,
        wait_for_finalization: bool,
    ) -> Result<ExecutionReceipt, ClientError>;
}
