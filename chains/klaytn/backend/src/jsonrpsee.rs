use std::ops::{Deref, DerefMut};

use crate::{AtBlock, KlaytnRpc};
pub use jsonrpsee_core as core;
use jsonrpsee_core::{
    client::{ClientT, Error},
    rpc_params,
};
use rosetta_klaytn_types::{Address, U256};

/// Adapter for [`ClientT`] to [`KlaytnRpc`].
#[repr(transparent)]
pub struct Adapter<T: ClientT + Send + Sync>(pub T);

impl<T> Adapter<T>
where
    T: ClientT + Send + Sync,
{
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Adapter<T>
where
    T: ClientT + Send + Sync,
{
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for Adapter<T>
where
    T: ClientT + Send + Sync,
{
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Adapter<T>
where
    T: ClientT + Send + Sync,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> Clone for Adapter<T>
where
    T: ClientT + Send + Sync + Clone,
{
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> std::fmt::Debug for Adapter<T>
where
    T: ClientT + Send + Sync + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Adapter").field(&self.0).finish()
    }
}

/// Quantities are returned as hex encoded 256 bit integers.
fn to_u64(method: &str, value: U256) -> Result<u64, Error> {
    if value > U256::from(u64::MAX) {
        return Err(Error::Custom(format!("{method} returned {value}, which overflows u64")));
    }
    Ok(value.low_u64())
}

#[async_trait::async_trait]
impl<T> KlaytnRpc for Adapter<T>
where
    T: ClientT + Send + Sync,
{
    type Error = Error;

    async fn get_transaction_count(
        &self,
        account: Address,
        at: AtBlock,
    ) -> Result<u64, Self::Error> {
        let count: U256 =
            <T as ClientT>::request(&self.0, "klay_getTransactionCount", rpc_params![account, at])
                .await?;
        to_u64("klay_getTransactionCount", count)
    }

    async fn chain_id(&self) -> Result<u64, Self::Error> {
        let chain_id: U256 =
            <T as ClientT>::request(&self.0, "klay_chainID", rpc_params![]).await?;
        to_u64("klay_chainID", chain_id)
    }

    async fn gas_price(&self) -> Result<U256, Self::Error> {
        <T as ClientT>::request(&self.0, "klay_gasPrice", rpc_params![]).await
    }
}
