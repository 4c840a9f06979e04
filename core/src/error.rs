use sweep_client::ClientError;
use sweep_types::AccountAddress;
use sweep_wallet::WalletError;
use thiserror::Error;

/// Terminating conditions of a sweep run.
///
/// There is no internal recovery or retry; every variant surfaces to the
/// caller as the end of the run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// A stake query failed. Never conflated with a zero position.
    #[error("stake query failed for delegate {delegate}: {source}")]
    Query {
        delegate: AccountAddress,
        #[source]
        source: ClientError,
    },

    #[error("balance query failed: {0}")]
    Balance(#[source] ClientError),

    #[error("signing failed: {0}")]
    Signing(#[source] ClientError),

    #[error("submission failed: {0}")]
    Submission(#[source] ClientError),

    /// Caller bug: the batch builder requires at least one instruction.
    #[error("batch builder invoked with no instructions")]
    EmptyBatch,
}

impl RunError {
    /// Whether the run failed because the signing credential could not be
    /// unlocked.
    pub fn is_credential_locked(&self) -> bool {
        match self {
            RunError::Wallet(WalletError::CredentialLocked) => true,
            RunError::Signing(ClientError::CredentialLocked) => true,
            _ => false,
        }
    }
}
