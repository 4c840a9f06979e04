//! Submission and result interpretation.

use sweep_client::{CallDescriptor, Event, Ledger};
use sweep_types::Amount;
use sweep_wallet::Account;

use crate::aggregate::UnstakeInstruction;
use crate::error::RunError;

/// Outcome of a submitted sweep.
///
/// `success` repeats the ledger's judgement of the batch as a whole. The
/// balance snapshots bracket the submission on both success and failure;
/// on a ledger with partial-batch semantics the after snapshot may have
/// moved even when `success` is false.
#[derive(Debug)]
pub struct SweepReport {
    pub success: bool,
    pub balance_before: Amount,
    pub balance_after: Amount,
    pub events: Vec<Event>,
    pub instructions: Vec<UnstakeInstruction>,
}

/// Sign the batch, submit it, wait for inclusion and finalization, and
/// classify the outcome.
///
/// Signing happens first so a locked credential fails the run before any
/// network submission is attempted. The before snapshot is read strictly
/// before submission, the after snapshot strictly after, regardless of the
/// reported outcome.
pub async fn submit_batch<L: Ledger>(
    ledger: &L,
    account: &Account,
    batch: &CallDescriptor,
    instructions: Vec<UnstakeInstruction>,
) -> Result<SweepReport, RunError> {
    let tx = ledger
        .sign_and_build_extrinsic(batch, &account.credential)
        .map_err(RunError::Signing)?;

    let balance_before = ledger
        .query_balance(&account.address)
        .await
        .map_err(RunError::Balance)?;

    tracing::info!(
        account = %account.address,
        delegates = instructions.len(),
        "submitting batch unstake, waiting for finalization"
    );

    let receipt = ledger
        .submit(&tx, true, true)
        .await
        .map_err(RunError::Submission)?;

    let balance_after = ledger
        .query_balance(&account.address)
        .await
        .map_err(RunError::Balance)?;

    if receipt.success {
        tracing::info!(hash = %receipt.hash, "batch executed successfully");
    } else {
        tracing::warn!(hash = %receipt.hash, "ledger reported unsuccessful batch execution");
    }

    Ok(SweepReport {
        success: receipt.success,
        balance_before,
        balance_after,
        events: receipt.events,
        instructions,
    })
}
