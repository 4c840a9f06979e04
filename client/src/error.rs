use sweep_wallet::WalletError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: the node could not be reached or the
    /// connection was lost mid-operation.
    #[error("network error: {0}")]
    Network(String),

    /// The node answered but reported an error.
    #[error("node error: {0}")]
    Node(String),

    /// The node answered with a payload this client cannot interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The signing credential could not be unlocked.
    #[error("signing credential is locked")]
    CredentialLocked,

    #[error("signing error: {0}")]
    Signing(String),
}

impl From<WalletError> for ClientError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::CredentialLocked => ClientError::CredentialLocked,
            other => ClientError::Signing(other.to_string()),
        }
    }
}
