use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::model::Credentials;

/// Computes the digest a legitimate client would send for `(nonce, timestamp)`
pub trait DigestSource: Send + Sync {
    fn compute_digest(&self, nonce: &str, timestamp: &str) -> String;
}

/// WSSE-style digest over a server-side shared secret
#[derive(Clone)]
pub struct SharedSecretVerifier {
    secret: String,
}

impl SharedSecretVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for SharedSecretVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl DigestSource for SharedSecretVerifier {
    fn compute_digest(&self, nonce: &str, timestamp: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(nonce.as_bytes());
        hasher.update(timestamp.as_bytes());
        hasher.update(self.secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("request digest does not match the expected digest")]
    DigestMismatch,
}

/// First gate of every privileged endpoint
#[derive(Clone)]
pub struct AuthGuard {
    source: Arc<dyn DigestSource>,
}

impl AuthGuard {
    pub fn new(source: Arc<dyn DigestSource>) -> Self {
        Self { source }
    }

    pub fn verify(
        &self,
        nonce: &str,
        timestamp: &str,
        submitted_digest: &str,
    ) -> Result<(), AuthError> {
        let expected = self.source.compute_digest(nonce, timestamp);
        if constant_time_eq(expected.as_bytes(), submitted_digest.as_bytes()) {
            Ok(())
        } else {
            log::warn!("Rejected request with mismatched digest (nonce {:?})", nonce);
            Err(AuthError::DigestMismatch)
        }
    }

    pub fn verify_credentials(&self, credentials: &Credentials) -> Result<(), AuthError> {
        self.verify(
            &credentials.nonce,
            &credentials.timestamp,
            &credentials.digest,
        )
    }

    /// Mint a fresh credential triple for embedding into a rendered page
    pub fn issue(&self) -> Credentials {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let digest = self.source.compute_digest(&nonce, &timestamp);
        Credentials {
            nonce,
            timestamp,
            digest,
        }
    }
}

impl std::fmt::Debug for AuthGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGuard").finish_non_exhaustive()
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (l, r)| acc | (l ^ r))
        == 0
}
