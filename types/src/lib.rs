//! Fundamental types shared across the stakesweep crates.
//!
//! - `Amount` — fixed-point token amount in the ledger's smallest unit
//! - `AccountAddress` — validated account identifier

pub mod address;
pub mod amount;

pub use address::{AccountAddress, AddressError};
pub use amount::Amount;
