#[cfg(feature = "jsonrpsee")]
pub mod jsonrpsee;

use async_trait::async_trait;
use rosetta_klaytn_types::{Address, AtBlock, U256};

/// Re-exports for dependent crates to not require any additional
/// dependencies to be explicitly added on the client side.
#[doc(hidden)]
pub mod ext {
    pub use async_trait::async_trait;
    pub use rosetta_klaytn_types as types;
    #[cfg(feature = "serde")]
    pub use serde;
}

/// Node queries needed to complete a transaction before signing.
#[async_trait]
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait KlaytnRpc {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the number of transactions sent from an address.
    async fn get_transaction_count(
        &self,
        account: Address,
        at: AtBlock,
    ) -> Result<u64, Self::Error>;

    /// Returns the chain id of the network.
    async fn chain_id(&self) -> Result<u64, Self::Error>;

    /// Returns the current unit price of gas, in peb.
    async fn gas_price(&self) -> Result<U256, Self::Error>;
}
