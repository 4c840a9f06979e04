//! JSON-RPC client for a remote consensus node.

use std::time::Duration;

use ed25519_dalek::{Signer, SigningKey};
use serde::Deserialize;

use sweep_types::{AccountAddress, Amount};
use sweep_wallet::Credential;

use crate::call::{CallDescriptor, SignedTransaction};
use crate::error::ClientError;
use crate::ledger::{ExecutionReceipt, Ledger};

/// HTTP client for communicating with a node via JSON-RPC.
///
/// Wraps `reqwest::Client` with the node's base URL and provides typed
/// methods for each RPC action the workflow needs. Only a connect timeout
/// is set: the submit call blocks until the node reports finality, and no
/// overall timeout is imposed at this layer.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    node_url: String,
}

impl NodeClient {
    /// Create a new NodeClient targeting the given base URL
    /// (e.g. `http://127.0.0.1:7076`).
    pub fn new(node_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            node_url: node_url.into(),
        })
    }

    /// The configured node URL.
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let mut body = params;
        body.as_object_mut()
            .ok_or_else(|| ClientError::InvalidResponse("params must be a JSON object".into()))?
            .insert("action".to_string(), serde_json::json!(action));

        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ClientError::Node(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
            return Err(ClientError::Node(err.to_string()));
        }

        Ok(json.get("result").cloned().unwrap_or(json))
    }
}

/// Balance response from the node, amount in motes.
#[derive(Debug, Clone, Deserialize)]
struct BalanceResult {
    balance: String,
}

/// Stake response from the node, amount in motes.
#[derive(Debug, Clone, Deserialize)]
struct StakeResult {
    stake: String,
}

fn parse_motes(raw: &str, field: &str) -> Result<Amount, ClientError> {
    raw.parse::<u128>()
        .map(Amount::from_motes)
        .map_err(|e| ClientError::InvalidResponse(format!("invalid {field} value {raw:?}: {e}")))
}

impl Ledger for NodeClient {
    async fn query_balance(&self, address: &AccountAddress) -> Result<Amount, ClientError> {
        let result = self
            .rpc_call(
                "account_balance",
                serde_json::json!({ "account": address.as_str() }),
            )
            .await?;

        let resp: BalanceResult = serde_json::from_value(result)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid balance response: {e}")))?;
        parse_motes(&resp.balance, "balance")
    }

    async fn query_stake(
        &self,
        account: &AccountAddress,
        delegate: &AccountAddress,
    ) -> Result<Amount, ClientError> {
        let result = self
            .rpc_call(
                "account_stake",
                serde_json::json!({
                    "account": account.as_str(),
                    "delegate": delegate.as_str(),
                }),
            )
            .await?;

        let resp: StakeResult = serde_json::from_value(result)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid stake response: {e}")))?;
        parse_motes(&resp.stake, "stake")
    }

    fn sign_and_build_extrinsic(
        &self,
        call: &CallDescriptor,
        credential: &Credential,
    ) -> Result<SignedTransaction, ClientError> {
        // The decrypted key lives only inside this scope and is zeroized
        // on drop.
        let secret = credential.unlock()?;
        let signing_key = SigningKey::from_bytes(&secret);

        let payload = serde_json::to_vec(call)
            .map_err(|e| ClientError::Signing(format!("call encoding failed: {e}")))?;
        let signature = signing_key.sign(&payload);

        Ok(SignedTransaction {
            call: call.clone(),
            signer: credential.address().clone(),
            public_key: hex::encode(signing_key.verifying_key().to_bytes()),
            signature: hex::encode(signature.to_bytes()),
        })
    }

    async fn submit(
        &self,
        tx: &SignedTransaction,
        wait_for_inclusion: bool,
        wait_for_finalization: bool,
    ) -> Result<ExecutionReceipt, ClientError> {
        tracing::debug!(signer = %tx.signer, "submitting extrinsic");
        let result = self
            .rpc_call(
                "submit_extrinsic",
                serde_json::json!({
                    "extrinsic": tx,
                    "wait_for_inclusion": wait_for_inclusion,
                    "wait_for_finalization": wait_for_finalization,
                }),
            )
            .await?;

        serde_json::from_value(result)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid submit response: {e}")))
    }
}
