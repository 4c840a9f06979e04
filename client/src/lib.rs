//! Ledger client for stakesweep.
//!
//! Defines the narrow contract the workflow needs from a remote consensus
//! node (`Ledger`), call descriptors for composing batched transactions,
//! and the JSON-RPC implementation (`NodeClient`).

pub mod call;
pub mod error;
pub mod ledger;
pub mod node;

pub use call::{CallDescriptor, SignedTransaction};
pub use error::ClientError;
pub use ledger::{Event, ExecutionReceipt, Ledger};
pub use node::NodeClient;
