//! End-to-end orchestration of one sweep run.

use sweep_client::Ledger;
use sweep_wallet::{IdentityEntry, WalletStore};

use crate::aggregate::collect_positions;
use crate::batch::build_unstake_batch;
use crate::error::RunError;
use crate::submit::{submit_batch, SweepReport};

/// Terminal outcome of a run.
#[derive(Debug)]
pub enum RunOutcome {
    /// No delegate identity holds a positive stake; nothing was submitted.
    NothingToUnstake,
    /// A batch was submitted; the report carries the ledger's verdict.
    Swept(SweepReport),
}

/// Withdraw all delegated stake of the named wallet in one batch.
///
/// Discovery failures for individual identities are logged and skipped,
/// and passphrase-protected identities are excluded from discovery.
/// Everything else surfaces as a [`RunError`].
pub async fn run_sweep<L: Ledger>(
    ledger: &L,
    store: &WalletStore,
    wallet_name: &str,
    passphrase: Option<String>,
) -> Result<RunOutcome, RunError> {
    let account = store.resolve_account(wallet_name, passphrase)?;
    tracing::info!(wallet = wallet_name, account = %account.address, "resolved account");

    let mut delegates = Vec::new();
    for entry in store.list_delegate_identities(&account) {
        match entry {
            IdentityEntry::Loaded(identity) if identity.protected => {
                tracing::debug!(
                    identity = %identity.name,
                    "excluding passphrase-protected delegate identity"
                );
            }
            IdentityEntry::Loaded(identity) => delegates.push(identity),
            IdentityEntry::Unloadable { file, reason } => {
                tracing::warn!(
                    file = %file.display(),
                    %reason,
                    "skipping unloadable delegate identity"
                );
            }
        }
    }
    tracing::info!(count = delegates.len(), "discovered delegate identities");

    let instructions = collect_positions(ledger, &account.address, &delegates).await?;
    if instructions.is_empty() {
        tracing::info!("no positive stake positions found");
        return Ok(RunOutcome::NothingToUnstake);
    }

    let batch = build_unstake_batch(&instructions)?;
    let report = submit_batch(ledger, &account, &batch, instructions).await?;
    Ok(RunOutcome::Swept(report))
}
