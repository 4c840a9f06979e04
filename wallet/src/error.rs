use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("no wallet named {0:?} in the wallet directory")]
    NotFound(String),

    #[error("signing credential is passphrase-protected and no passphrase was supplied")]
    CredentialLocked,

    #[error("keystore error: {0}")]
    Keystore(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
