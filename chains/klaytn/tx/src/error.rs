use rosetta_klaytn_types::{DecodeError, MergeError, ValidationError};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    /// Failure reported by the RPC client, passed through untouched.
    #[error("rpc request failed: {0}")]
    Rpc(#[source] BoxError),
    /// Failure reported by the keyring, passed through untouched.
    #[error("keyring failed to sign: {0}")]
    Keyring(#[source] BoxError),
    #[error("signature does not recover to a public key: {0}")]
    InvalidSignature(String),
}

impl Error {
    pub(crate) fn rpc<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::Rpc(Box::new(error))
    }

    pub(crate) fn keyring<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::Keyring(Box::new(error))
    }
}
