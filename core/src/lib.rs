//! The unstake-aggregation-and-batch-submission workflow.
//!
//! One run withdraws the full stake an account has delegated to every one
//! of its delegate identities, in a single batched transaction:
//!
//! 1. resolve the account and enumerate its delegate identities
//! 2. query the current stake per identity, keep the strictly positive ones
//! 3. wrap one `remove_stake` sub-call per position into a batch
//! 4. sign, submit, wait for finality, and report the outcome together
//!    with before/after balance snapshots

pub mod aggregate;
pub mod batch;
pub mod error;
pub mod run;
pub mod submit;

pub use aggregate::{collect_positions, UnstakeInstruction};
pub use batch::build_unstake_batch;
pub use error::RunError;
pub use run::{run_sweep, RunOutcome};
pub use submit::{submit_batch, SweepReport};
