use std::fmt;
use std::str::FromStr;

use crate::error::BackendError;

/// A 20-byte commit identifier, written as 40 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision([u8; 20]);

impl Revision {
    /// The all-zero sentinel git uses for "no revision" (ref created or deleted).
    pub const ZERO: Revision = Revision([0u8; 20]);

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut oid_bytes = [0u8; 20];
        oid_bytes.copy_from_slice(bytes);
        Revision(oid_bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, BackendError> {
        if hex_str.len() != 40 {
            return Err(BackendError::InvalidRevision(hex_str.to_string()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_str, &mut bytes)
            .map_err(|_| BackendError::InvalidRevision(hex_str.to_string()))?;
        Ok(Revision(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters, used to name a commit in reports.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl FromStr for Revision {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision({})", self.short())
    }
}

impl From<git2::Oid> for Revision {
    fn from(oid: git2::Oid) -> Self {
        Revision::from_bytes(oid.as_bytes())
    }
}

impl From<Revision> for git2::Oid {
    fn from(rev: Revision) -> Self {
        // A 20-byte slice always forms a valid oid.
        git2::Oid::from_bytes(rev.as_bytes()).unwrap_or_else(|_| git2::Oid::zero())
    }
}
