use crate::{
    config::KlaytnConfig,
    error::Error,
    hasher::{DefaultHasher, TransactionHasher},
    keyring::Keyring,
};
use async_trait::async_trait;
use rosetta_klaytn_backend::KlaytnRpc;
use rosetta_klaytn_types::{
    Address, AtBlock, Bytes, DecodeError, DefaultCrypto, FeeDelegatedTransactionT, MergeError,
    RoleGroup, Signature, TransactionT, TxType, TypedTransaction, ValidationError, H256, U256,
};
use std::convert::Infallible;

/// RPC client of transactions built without node access. Cannot be instantiated.
#[derive(Debug, Clone, Copy)]
pub enum Offline {}

#[async_trait]
impl KlaytnRpc for Offline {
    type Error = Infallible;

    async fn get_transaction_count(
        &self,
        _account: Address,
        _at: AtBlock,
    ) -> Result<u64, Self::Error> {
        match *self {}
    }

    async fn chain_id(&self) -> Result<u64, Self::Error> {
        match *self {}
    }

    async fn gas_price(&self) -> Result<U256, Self::Error> {
        match *self {}
    }
}

/// A [`TypedTransaction`] being completed, signed and combined.
///
/// Nonce, chain id and gas price left unset are fetched from the RPC client, if any,
/// before signing.
#[derive(Debug, Clone)]
pub struct Transaction<R = Offline> {
    tx: TypedTransaction,
    rpc: Option<R>,
}

impl Transaction<Offline> {
    pub fn new(tx: impl Into<TypedTransaction>) -> Self {
        Self { tx: tx.into(), rpc: None }
    }

    /// # Errors
    /// Returns `Err` if `raw` is not a valid raw transaction.
    pub fn decode(raw: &[u8]) -> Result<Self, Error> {
        Ok(Self::new(TypedTransaction::decode(raw)?))
    }
}

impl<R: KlaytnRpc> Transaction<R> {
    pub fn with_rpc(tx: impl Into<TypedTransaction>, rpc: R) -> Self {
        Self { tx: tx.into(), rpc: Some(rpc) }
    }

    /// Uses the chain id of `config` unless one is already set.
    #[must_use]
    pub fn for_network(mut self, config: &KlaytnConfig) -> Self {
        let common = self.tx.common_mut();
        if common.chain_id.is_none() {
            common.chain_id = Some(config.chain_id);
        }
        self
    }

    pub const fn tx(&self) -> &TypedTransaction {
        &self.tx
    }

    pub fn tx_mut(&mut self) -> &mut TypedTransaction {
        &mut self.tx
    }

    pub fn into_inner(self) -> TypedTransaction {
        self.tx
    }

    /// Fetches nonce, chain id and gas price where unset. Values already set are
    /// never overwritten.
    ///
    /// # Errors
    /// Returns `Err` if a request fails, or a value is still unset afterwards.
    pub async fn fill(&mut self) -> Result<(), Error> {
        if let Some(rpc) = self.rpc.as_ref() {
            let common = self.tx.common();
            let (from, nonce, chain_id, gas_price) =
                (common.from, common.nonce, common.chain_id, common.gas_price);

            if let (None, Some(from)) = (nonce, from) {
                let nonce = rpc
                    .get_transaction_count(from, AtBlock::Latest)
                    .await
                    .map_err(Error::rpc)?;
                tracing::debug!(?from, nonce, "filled nonce");
                self.tx.common_mut().nonce = Some(nonce);
            }
            if chain_id.is_none() {
                let chain_id = rpc.chain_id().await.map_err(Error::rpc)?;
                tracing::debug!(chain_id, "filled chain id");
                self.tx.common_mut().chain_id = Some(chain_id);
            }
            if gas_price.is_none() {
                let gas_price = rpc.gas_price().await.map_err(Error::rpc)?;
                tracing::debug!(%gas_price, "filled gas price");
                self.tx.common_mut().gas_price = Some(gas_price);
            }
        }

        let reason = if self.rpc.is_none() {
            "no rpc client is configured"
        } else {
            "the sender address is unset"
        };
        let common = self.tx.common();
        let missing = if common.nonce.is_none() {
            Some("nonce")
        } else if common.chain_id.is_none() {
            Some("chainId")
        } else if common.gas_price.is_none() {
            Some("gasPrice")
        } else {
            None
        };
        match missing {
            Some(field) => Err(ValidationError::CannotFill { field, reason }.into()),
            None => Ok(()),
        }
    }

    /// Signs as sender with the first key of the keyring role matching the
    /// transaction type.
    ///
    /// # Errors
    /// Returns `Err` if the keyring does not fit the transaction, a value cannot be
    /// filled or signing fails.
    pub async fn sign_with_key<K: Keyring>(&mut self, keyring: &K) -> Result<(), Error> {
        self.sign_with_key_by(keyring, 0, &DefaultHasher).await
    }

    /// Signs as sender with the `index`-th key, over the digest computed by `hasher`.
    ///
    /// # Errors
    /// Same as [`Transaction::sign_with_key`].
    pub async fn sign_with_key_by<K: Keyring, H: TransactionHasher>(
        &mut self,
        keyring: &K,
        index: usize,
        hasher: &H,
    ) -> Result<(), Error> {
        self.prepare_sender(keyring).await?;
        let hash = hasher.signature_hash(&self.tx)?;
        let chain_id = self.tx.common().require_chain_id()?;
        let role = self.tx.tx_type().role();
        let signature = keyring.sign(hash, chain_id, role, index).map_err(Error::keyring)?;
        self.append_signatures(&[signature])
    }

    /// Signs as sender with every key of the keyring role matching the transaction type.
    ///
    /// # Errors
    /// Same as [`Transaction::sign_with_key`].
    pub async fn sign_with_keys<K: Keyring>(&mut self, keyring: &K) -> Result<(), Error> {
        self.sign_with_keys_by(keyring, &DefaultHasher).await
    }

    /// # Errors
    /// Same as [`Transaction::sign_with_key`].
    pub async fn sign_with_keys_by<K: Keyring, H: TransactionHasher>(
        &mut self,
        keyring: &K,
        hasher: &H,
    ) -> Result<(), Error> {
        self.prepare_sender(keyring).await?;
        let hash = hasher.signature_hash(&self.tx)?;
        let chain_id = self.tx.common().require_chain_id()?;
        let role = self.tx.tx_type().role();
        let signatures = keyring.sign_all(hash, chain_id, role).map_err(Error::keyring)?;
        self.append_signatures(&signatures)
    }

    /// Signs as fee payer with the first fee payer key of the keyring.
    ///
    /// # Errors
    /// Returns `Err` if the transaction is not fee delegated, the keyring does not fit
    /// the fee payer, a value cannot be filled or signing fails.
    pub async fn sign_as_fee_payer_with_key<K: Keyring>(
        &mut self,
        keyring: &K,
    ) -> Result<(), Error> {
        self.sign_as_fee_payer_with_key_by(keyring, 0, &DefaultHasher).await
    }

    /// # Errors
    /// Same as [`Transaction::sign_as_fee_payer_with_key`].
    pub async fn sign_as_fee_payer_with_key_by<K: Keyring, H: TransactionHasher>(
        &mut self,
        keyring: &K,
        index: usize,
        hasher: &H,
    ) -> Result<(), Error> {
        self.prepare_fee_payer(keyring).await?;
        let hash = hasher.fee_payer_signature_hash(&self.tx)?;
        let chain_id = self.tx.common().require_chain_id()?;
        let signature =
            keyring.sign(hash, chain_id, RoleGroup::FeePayer, index).map_err(Error::keyring)?;
        self.append_fee_payer_signatures(&[signature])
    }

    /// Signs as fee payer with every fee payer key of the keyring.
    ///
    /// # Errors
    /// Same as [`Transaction::sign_as_fee_payer_with_key`].
    pub async fn sign_as_fee_payer_with_keys<K: Keyring>(
        &mut self,
        keyring: &K,
    ) -> Result<(), Error> {
        self.sign_as_fee_payer_with_keys_by(keyring, &DefaultHasher).await
    }

    /// # Errors
    /// Same as [`Transaction::sign_as_fee_payer_with_key`].
    pub async fn sign_as_fee_payer_with_keys_by<K: Keyring, H: TransactionHasher>(
        &mut self,
        keyring: &K,
        hasher: &H,
    ) -> Result<(), Error> {
        self.prepare_fee_payer(keyring).await?;
        let hash = hasher.fee_payer_signature_hash(&self.tx)?;
        let chain_id = self.tx.common().require_chain_id()?;
        let signatures =
            keyring.sign_all(hash, chain_id, RoleGroup::FeePayer).map_err(Error::keyring)?;
        self.append_fee_payer_signatures(&signatures)
    }

    /// Merges the signatures of raw transactions describing this same transaction and
    /// returns the resulting raw transaction.
    ///
    /// # Errors
    /// Returns `Err` on the first raw transaction which is malformed or differs. The
    /// signatures of the raw transactions before it are kept.
    pub fn combine<I, T>(&mut self, raws: I) -> Result<Bytes, Error>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let before = self.tx.common().signatures.len();
        match self.tx.combine_signed_raw_transactions(raws) {
            Ok(raw) => {
                tracing::debug!(
                    appended = self.tx.common().signatures.len() - before,
                    "combined sender signatures"
                );
                Ok(raw)
            },
            Err(error) => {
                tracing::warn!(%error, "rejected raw transaction");
                Err(error.into())
            },
        }
    }

    /// Like [`Transaction::combine`], for raw transactions given as hex.
    ///
    /// # Errors
    /// Same as [`Transaction::combine`].
    pub fn combine_hex<I, T>(&mut self, raws: I) -> Result<Bytes, Error>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let raws = raws
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                const_hex::decode(raw.as_ref()).map_err(|error| MergeError::Decode {
                    index,
                    source: DecodeError::InvalidHex(error.to_string()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.combine(raws)
    }

    /// Raw transaction as "0x" prefixed hex.
    ///
    /// # Errors
    /// Returns `Err` if the nonce or gas price is unset.
    pub fn raw_transaction(&self) -> Result<String, Error> {
        Ok(self.tx.rlp_encode()?.to_hex())
    }

    /// # Errors
    /// Returns `Err` if the nonce or gas price is unset.
    pub fn transaction_hash(&self) -> Result<String, Error> {
        Ok(format!("{:#x}", self.tx.tx_hash()?))
    }

    /// # Errors
    /// Returns `Err` if the nonce or gas price is unset.
    pub fn sender_tx_hash(&self) -> Result<String, Error> {
        Ok(format!("{:#x}", self.tx.sender_tx_hash()?))
    }

    /// Addresses of the keys behind the sender signatures, in signature order.
    ///
    /// # Errors
    /// Returns `Err` if the signing payload cannot be encoded or a signature is invalid.
    pub fn recover_signers(&self) -> Result<Vec<Address>, Error> {
        let hash = self.tx.signature_hash()?;
        self.tx.common().signatures.iter().map(|signature| recover(signature, hash)).collect()
    }

    /// Addresses of the keys behind the fee payer signatures, in signature order.
    ///
    /// # Errors
    /// Returns `Err` if the transaction is not fee delegated, the fee payer signing
    /// payload cannot be encoded or a signature is invalid.
    pub fn recover_fee_payers(&self) -> Result<Vec<Address>, Error> {
        let fee_delegated = self
            .tx
            .fee_delegated()
            .ok_or_else(|| ValidationError::NotFeeDelegated(self.tx.tx_type()))?;
        let hash = fee_delegated.fee_payer_signature_hash()?;
        fee_delegated
            .fee_payer_signatures()
            .iter()
            .map(|signature| recover(signature, hash))
            .collect()
    }

    /// Legacy transactions reject decoupled keyrings, then the sender is adopted from
    /// or checked against the keyring, then missing values are filled.
    async fn prepare_sender<K: Keyring>(&mut self, keyring: &K) -> Result<(), Error> {
        if self.tx.tx_type() == TxType::Legacy && keyring.is_decoupled() {
            return Err(ValidationError::IncompatibleKeyType.into());
        }
        let address = keyring.address();
        let common = self.tx.common_mut();
        match common.from {
            Some(from) if !from.is_zero() => {
                if from != address {
                    return Err(ValidationError::AddressMismatch {
                        field: "from",
                        expected: from,
                        actual: address,
                    }
                    .into());
                }
            },
            _ => {
                tracing::debug!(?address, "sender adopted from the keyring");
                common.from = Some(address);
            },
        }
        self.fill().await
    }

    async fn prepare_fee_payer<K: Keyring>(&mut self, keyring: &K) -> Result<(), Error> {
        let tx_type = self.tx.tx_type();
        let fee_delegated =
            self.tx.fee_delegated_mut().ok_or(ValidationError::NotFeeDelegated(tx_type))?;
        let address = keyring.address();
        match fee_delegated.fee_payer() {
            Some(fee_payer) if !fee_payer.is_zero() => {
                if fee_payer != address {
                    return Err(ValidationError::AddressMismatch {
                        field: "feePayer",
                        expected: fee_payer,
                        actual: address,
                    }
                    .into());
                }
            },
            _ => {
                tracing::debug!(?address, "fee payer adopted from the keyring");
                fee_delegated.set_fee_payer(address);
            },
        }
        self.fill().await
    }

    fn append_signatures(&mut self, signatures: &[Signature]) -> Result<(), Error> {
        self.tx.append_signatures(signatures)?;
        tracing::debug!(
            tx_type = %self.tx.tx_type(),
            count = signatures.len(),
            "appended sender signatures"
        );
        Ok(())
    }

    fn append_fee_payer_signatures(&mut self, signatures: &[Signature]) -> Result<(), Error> {
        let tx_type = self.tx.tx_type();
        self.tx
            .fee_delegated_mut()
            .ok_or(ValidationError::NotFeeDelegated(tx_type))?
            .append_fee_payer_signatures(signatures);
        tracing::debug!(%tx_type, count = signatures.len(), "appended fee payer signatures");
        Ok(())
    }
}

fn recover(signature: &Signature, hash: H256) -> Result<Address, Error> {
    DefaultCrypto::secp256k1_ecdsa_recover(signature, hash)
        .map_err(|error| Error::InvalidSignature(format!("{error:?}")))
}
