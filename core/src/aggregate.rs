//! Position aggregation — from delegate identities to unstake instructions.

use std::collections::HashSet;

use sweep_client::Ledger;
use sweep_types::{AccountAddress, Amount};
use sweep_wallet::DelegateIdentity;

use crate::error::RunError;

/// One (delegate, amount) pair selected for the batch.
///
/// The amount is the exact queried stake; this workflow always withdraws
/// the full position. Invariant: amount > 0 strictly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnstakeInstruction {
    pub delegate: AccountAddress,
    pub amount: Amount,
}

/// Query the current stake for each delegate identity and keep the strictly
/// positive positions, in discovery order.
///
/// Duplicate delegate addresses are queried once (first occurrence wins).
/// A failed stake query aborts the run; it must never read as "zero stake".
pub async fn collect_positions<L: Ledger>(
    ledger: &L,
    account: &AccountAddress,
    delegates: &[DelegateIdentity],
) -> Result<Vec<UnstakeInstruction>, RunError> {
    let mut seen: HashSet<&AccountAddress> = HashSet::new();
    let mut instructions = Vec::new();

    for identity in delegates {
        if !seen.insert(&identity.address) {
            tracing::debug!(delegate = %identity.address, "skipping duplicate delegate address");
            continue;
        }

        let stake = ledger
            .query_stake(account, &identity.address)
            .await
            .map_err(|source| RunError::Query {
                delegate: identity.address.clone(),
                source,
            })?;

        tracing::debug!(delegate = %identity.address, stake = %stake, "queried stake position");

        if !stake.is_zero() {
            instructions.push(UnstakeInstruction {
                delegate: identity.address.clone(),
                amount: stake,
            });
        }
    }

    Ok(instructions)
}
