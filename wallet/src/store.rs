//! Wallet directory layout and account/identity resolution.
//!
//! On disk a wallet is a directory under the store root:
//!
//! ```text
//! <root>/<name>/coldkey          account keystore (signing credential)
//! <root>/<name>/hotkeys/<file>   one keystore per delegate identity
//! ```
//!
//! The coldkey signs the batch transaction. Hotkey files are only read for
//! their addresses; per-file load failures degrade to exclusion from the
//! set, never to a fatal error.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use sweep_types::AccountAddress;

use crate::error::WalletError;
use crate::keystore::{load_keystore, KeystoreFile};

/// The staking principal: public address plus unlock-on-demand credential.
pub struct Account {
    pub name: String,
    pub address: AccountAddress,
    pub credential: Credential,
}

/// The account's signing material, left encrypted until signing time.
pub struct Credential {
    keystore: KeystoreFile,
    passphrase: Option<String>,
}

impl Credential {
    pub fn new(keystore: KeystoreFile, passphrase: Option<String>) -> Self {
        Self {
            keystore,
            passphrase,
        }
    }

    /// Public address of the credential, readable without unlocking.
    pub fn address(&self) -> &AccountAddress {
        &self.keystore.address
    }

    /// Recover the raw signing key for a single signing operation.
    ///
    /// The returned key is zeroized on drop; callers must not let it
    /// outlive the signing call.
    pub fn unlock(&self) -> Result<Zeroizing<[u8; 32]>, WalletError> {
        self.keystore.decrypt(self.passphrase.as_deref())
    }
}

/// One subordinate identity discovered under the account's hotkey directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegateIdentity {
    /// File name the identity was loaded from.
    pub name: String,
    pub address: AccountAddress,
    /// Whether the signing material is passphrase-protected at rest.
    /// Protected identities are still usable for address lookup.
    pub protected: bool,
}

/// Per-file result of identity discovery.
#[derive(Debug)]
pub enum IdentityEntry {
    Loaded(DelegateIdentity),
    Unloadable { file: PathBuf, reason: String },
}

/// Local wallet store rooted at a directory.
pub struct WalletStore {
    root: PathBuf,
}

impl WalletStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open a store at a path that may start with `~` or `~/`.
    ///
    /// `~user` forms are not expanded and pass through literally.
    pub fn open(path: &str) -> Self {
        Self::new(expand_home(path))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn wallet_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Resolve a named account to its address and signing credential.
    ///
    /// The credential stays encrypted; `passphrase` is held for the later
    /// unlock at signing time.
    pub fn resolve_account(
        &self,
        name: &str,
        passphrase: Option<String>,
    ) -> Result<Account, WalletError> {
        let coldkey_path = self.wallet_dir(name).join("coldkey");
        if !coldkey_path.exists() {
            return Err(WalletError::NotFound(name.to_string()));
        }

        let keystore = load_keystore(&coldkey_path)?;
        let address = keystore.address.clone();

        Ok(Account {
            name: name.to_string(),
            address,
            credential: Credential::new(keystore, passphrase),
        })
    }

    /// Enumerate the delegate identities under an account's hotkey directory.
    ///
    /// A missing hotkey directory yields an empty set. Entries are sorted by
    /// file name so discovery order is stable across runs. Files that cannot
    /// be loaded come back tagged `Unloadable` rather than aborting the
    /// enumeration.
    pub fn list_delegate_identities(&self, account: &Account) -> Vec<IdentityEntry> {
        let hotkeys_dir = self.wallet_dir(&account.name).join("hotkeys");

        let read_dir = match std::fs::read_dir(&hotkeys_dir) {
            Ok(rd) => rd,
            Err(_) => return Vec::new(),
        };

        let mut files: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        files
            .into_iter()
            .map(|path| {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match load_keystore(&path) {
                    Ok(keystore) => IdentityEntry::Loaded(DelegateIdentity {
                        name: file_name,
                        address: keystore.address.clone(),
                        protected: keystore.is_encrypted(),
                    }),
                    Err(e) => IdentityEntry::Unloadable {
                        file: path,
                        reason: e.to_string(),
                    },
                }
            })
            .collect()
    }
}

/// Expand a bare `~` or leading `~/` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    expand_home_in(path, std::env::var("HOME").ok().as_deref())
}

fn expand_home_in(path: &str, home: Option<&str>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return PathBuf::from(home);
    }
    match path.strip_prefix("~/") {
        Some(rest) => PathBuf::from(home).join(rest),
        None => PathBuf::from(path),
    }
}
