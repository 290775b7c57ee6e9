//! Server identity

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_IDENTITY_LEN: usize = 255;

/// Stable identity of a managed server.
///
/// The identity names both the server's data directory and its archive file,
/// so it must be a single plain filename component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerId(String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(Error::InvalidIdentity("identity is empty".to_string()));
        }
        if id.len() > MAX_IDENTITY_LEN {
            return Err(Error::InvalidIdentity(format!(
                "identity is longer than {} bytes",
                MAX_IDENTITY_LEN
            )));
        }
        if id.starts_with('.') {
            return Err(Error::InvalidIdentity(format!(
                "identity may not start with '.': {:?}",
                id
            )));
        }
        if id.contains(['/', '\\', '\0']) {
            return Err(Error::InvalidIdentity(format!(
                "identity contains a path separator or NUL: {:?}",
                id
            )));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ServerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ServerId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ServerId> for String {
    fn from(id: ServerId) -> Self {
        id.0
    }
}
