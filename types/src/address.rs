//! Account address type.
//!
//! Addresses are base58-encoded public key identifiers as reported by the
//! ledger node and stored in keystore files. The wallet never derives
//! addresses itself; it only validates and carries them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Characters permitted in a base58 address (Bitcoin alphabet, no 0OIl).
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const MIN_LEN: usize = 32;
const MAX_LEN: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address length {0} out of range (32..=64)")]
    BadLength(usize),

    #[error("address contains non-base58 character {0:?}")]
    BadCharacter(char),
}

/// A validated account address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Parse and validate a raw address string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AddressError> {
        let s = raw.into();
        if s.len() < MIN_LEN || s.len() > MAX_LEN {
            return Err(AddressError::BadLength(s.len()));
        }
        if let Some(c) = s.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
            return Err(AddressError::BadCharacter(c));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, AddressError> {
        Self::parse(s)
    }
}

impl From<AccountAddress> for String {
    fn from(addr: AccountAddress) -> String {
        addr.0
    }
}
