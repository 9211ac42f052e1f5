//! Owner identity. Sign-in never fails the caller: every failure falls
//! back to a locally generated id so history can still be scoped.

use crate::error::StoreError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{info, warn};
use uuid::Uuid;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Owner id for a sign-in token issued by the host environment.
    async fn sign_in_with_token(&self, token: &str) -> Result<String>;

    async fn sign_in_anonymously(&self) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Token,
    Anonymous,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub owner_id: String,
    pub source: IdentitySource,
}

pub async fn resolve_owner(
    provider: Option<&dyn IdentityProvider>,
    token: Option<&str>,
) -> Identity {
    if let Some(provider) = provider {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            match provider.sign_in_with_token(token).await {
                Ok(owner_id) => {
                    return Identity {
                        owner_id,
                        source: IdentitySource::Token,
                    }
                }
                Err(e) => warn!("Token sign-in failed, trying anonymous: {:#}", e),
            }
        }
        match provider.sign_in_anonymously().await {
            Ok(owner_id) => {
                return Identity {
                    owner_id,
                    source: IdentitySource::Anonymous,
                }
            }
            Err(e) => warn!("Anonymous sign-in failed: {:#}", e),
        }
    }

    let owner_id = Uuid::new_v4().to_string();
    info!("Using local identity {}", owner_id);
    Identity {
        owner_id,
        source: IdentitySource::Local,
    }
}

const IDENTITY_TREE: &str = "identity";
const ANONYMOUS_KEY: &str = "anonymous";
const TOKEN_PREFIX: &str = "token:";

/// Keeps identities in the history database so an owner's records survive
/// restarts. Tokens map to a stable id assigned on first use.
pub struct SledIdentityProvider {
    tree: sled::Tree,
}

impl SledIdentityProvider {
    pub fn new(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            tree: db.open_tree(IDENTITY_TREE)?,
        })
    }

    fn get_or_assign(&self, key: &str) -> Result<String, StoreError> {
        let fresh = Uuid::new_v4().to_string();
        // a concurrent first sign-in keeps whichever id was stored first
        let stored = match self
            .tree
            .compare_and_swap(key, None as Option<&[u8]>, Some(fresh.as_bytes()))?
        {
            Ok(()) => return Ok(fresh),
            Err(cas) => cas.current,
        };
        let bytes = stored.ok_or(StoreError::InvalidIdentity)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| StoreError::InvalidIdentity)
    }
}

#[async_trait]
impl IdentityProvider for SledIdentityProvider {
    async fn sign_in_with_token(&self, token: &str) -> Result<String> {
        if token.contains(char::is_whitespace) {
            return Err(anyhow!("Malformed sign-in token"));
        }
        Ok(self.get_or_assign(&format!("{}{}", TOKEN_PREFIX, token))?)
    }

    async fn sign_in_anonymously(&self) -> Result<String> {
        Ok(self.get_or_assign(ANONYMOUS_KEY)?)
    }
}
