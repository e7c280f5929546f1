mod config;
mod error;
mod hasher;
mod keyring;
mod transaction;

pub use config::{config, KlaytnConfig};
pub use error::{BoxError, Error};
pub use hasher::{DefaultHasher, TransactionHasher};
pub use keyring::{Keyring, KeyringError, MultipleKeyring, RoleBasedKeyring, SingleKeyring};
pub use transaction::{Offline, Transaction};

/// Re-exports for dependent crates to not require any additional
/// dependencies to be explicitly added on the client side.
pub mod ext {
    pub use rosetta_klaytn_backend as backend;
    pub use rosetta_klaytn_types as types;
}
