mod bytes;
pub mod crypto;
mod error;
pub mod params;
pub mod rlp_utils;
mod signature;
pub mod transactions;
mod tx_type;
pub mod validation;

pub use bytes::{Bytes, ParseBytesError};
#[cfg(feature = "with-crypto")]
pub use crypto::Keypair;
pub use crypto::{Crypto, DefaultCrypto, Signer};
pub use error::{DecodeError, MergeError, ValidationError};
pub use params::{FeeDelegationParams, TxCommonParams};
pub use primitive_types::{H160, H256, U256};
pub use signature::{RecoveryId, Signature};
pub use transactions::{
    BasicTransaction, FeeDelegatedTransaction, FeeDelegatedTransactionT, LegacyTransaction,
    TransactionT, TxCommon, TxPayload, TypedTransaction,
};
pub use tx_type::{Decoder, FeeDelegation, RoleGroup, TxType, UnknownTxType};
pub use validation::FeeRatio;

use std::fmt::{Display, Formatter, Result as FmtResult};

pub type Address = H160;

/// Re-exports for dependent crates to not require any additional
/// dependencies to be explicitly added on the client side.
pub mod ext {
    pub use bytes;
    pub use const_hex;
    #[cfg(feature = "with-crypto")]
    pub use libsecp256k1;
    pub use primitive_types;
    pub use rlp;
    #[cfg(feature = "with-crypto")]
    pub use secp256k1;
    #[cfg(feature = "serde")]
    pub use serde;
    pub use sha3;
}

/// Block at which account state is queried.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Hash)]
pub enum AtBlock {
    #[default]
    Latest,
    Earliest,
    /// Includes the transactions of the pending block.
    Pending,
    Number(u64),
}

impl From<u64> for AtBlock {
    fn from(block_number: u64) -> Self {
        Self::Number(block_number)
    }
}

impl Display for AtBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Earliest => f.write_str("earliest"),
            Self::Pending => f.write_str("pending"),
            Self::Number(number) => write!(f, "{number:#x}"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AtBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}
