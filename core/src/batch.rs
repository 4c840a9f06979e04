//! Batch transaction building.

use serde_json::json;

use sweep_client::CallDescriptor;

use crate::aggregate::UnstakeInstruction;
use crate::error::RunError;

pub const STAKING_MODULE: &str = "staking";
pub const REMOVE_STAKE_FUNCTION: &str = "remove_stake";

/// Turn a non-empty ordered instruction sequence into one batch call with
/// one `staking::remove_stake` sub-call per instruction, order preserved.
///
/// Amounts were validated by the aggregator and are not re-checked here.
/// Construction is all-or-nothing; an empty input is rejected outright.
pub fn build_unstake_batch(
    instructions: &[UnstakeInstruction],
) -> Result<CallDescriptor, RunError> {
    if instructions.is_empty() {
        return Err(RunError::EmptyBatch);
    }

    let calls = instructions
        .iter()
        .map(|instruction| {
            CallDescriptor::new(
                STAKING_MODULE,
                REMOVE_STAKE_FUNCTION,
                json!({
                    "delegate": instruction.delegate.as_str(),
                    // motes as a decimal string: exact on every JSON parser
                    "amount": instruction.amount.motes().to_string(),
                }),
            )
        })
        .collect();

    Ok(CallDescriptor::batch(calls))
}
