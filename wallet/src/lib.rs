//! Credential store for stakesweep.
//!
//! Provides the local wallet side of the workflow:
//! - Encrypted keystore files (Argon2id + AES-256-GCM)
//! - The wallet directory layout (`<root>/<name>/coldkey`,
//!   `<root>/<name>/hotkeys/<file>`)
//! - Account resolution and delegate-identity enumeration

pub mod error;
pub mod keystore;
pub mod store;

pub use error::WalletError;
pub use keystore::{load_keystore, save_keystore, KeystoreFile, SecretSection};
pub use store::{Account, Credential, DelegateIdentity, IdentityEntry, WalletStore};
