//! Call descriptors — the unsigned representation of a ledger call.
//!
//! A call names a runtime module, a function within it, and JSON-encoded
//! parameters. A batch is itself a call (`utility::batch`) whose parameters
//! carry the ordered sub-calls.

use serde::{Deserialize, Serialize};

use sweep_types::AccountAddress;

/// Module and function names for batching.
pub const UTILITY_MODULE: &str = "utility";
pub const BATCH_FUNCTION: &str = "batch";

/// An unsigned ledger call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallDescriptor {
    pub module: String,
    pub function: String,
    pub params: serde_json::Value,
}

impl CallDescriptor {
    pub fn new(
        module: impl Into<String>,
        function: impl Into<String>,
        params: serde_json::Value,
    ) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            params,
        }
    }

    /// Wrap an ordered sequence of calls into a single `utility::batch` call.
    pub fn batch(calls: Vec<CallDescriptor>) -> Self {
        Self {
            module: UTILITY_MODULE.to_string(),
            function: BATCH_FUNCTION.to_string(),
            params: serde_json::json!({ "calls": calls }),
        }
    }

    /// The ordered sub-calls of a batch call; empty for a non-batch call.
    pub fn sub_calls(&self) -> Vec<CallDescriptor> {
        if self.module != UTILITY_MODULE || self.function != BATCH_FUNCTION {
            return Vec::new();
        }
        self.params
            .get("calls")
            .and_then(|calls| serde_json::from_value(calls.clone()).ok())
            .unwrap_or_default()
    }
}

/// A signed, submittable transaction wrapping one call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub call: CallDescriptor,
    pub signer: AccountAddress,
    /// Hex-encoded Ed25519 public key of the signer.
    pub public_key: String,
    /// Hex-encoded Ed25519 signature over the canonical JSON call encoding.
    pub signature: String,
}
