pub mod account_update;
pub mod basic;
pub mod cancel;
pub mod chain_data_anchoring;
pub mod fee_delegated;
pub mod legacy;
pub mod smart_contract_deploy;
pub mod smart_contract_execution;
pub mod typed_transaction;
pub mod value_transfer;
pub mod value_transfer_memo;

pub use account_update::{AccountUpdate, AccountUpdateParams};
pub use basic::BasicTransaction;
pub use cancel::Cancel;
pub use chain_data_anchoring::{ChainDataAnchoring, ChainDataAnchoringParams};
pub use fee_delegated::FeeDelegatedTransaction;
pub use legacy::{LegacyTransaction, LegacyTransactionParams};
pub use smart_contract_deploy::{CodeFormat, SmartContractDeploy, SmartContractDeployParams};
pub use smart_contract_execution::{SmartContractExecution, SmartContractExecutionParams};
pub use typed_transaction::TypedTransaction;
pub use value_transfer::{ValueTransfer, ValueTransferParams};
pub use value_transfer_memo::{ValueTransferMemo, ValueTransferMemoParams};

use crate::{
    crypto::DefaultCrypto,
    error::{DecodeError, MergeError, ValidationError},
    rlp_utils::RlpStreamExt,
    signature::Signature,
    tx_type::TxType,
    validation::{self, FeeRatio},
    Address, Bytes, H256, U256,
};
use rlp::{DecoderError, Rlp, RlpStream};
use std::fmt::Debug;

/// Fields shared by every transaction type.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct TxCommon {
    /// Sender address, adopted from the keyring on first signing when unset.
    pub from: Option<Address>,
    /// Filled from `klay_getTransactionCount` when unset.
    pub nonce: Option<u64>,
    /// Gas limit.
    pub gas: u64,
    /// Filled from `klay_gasPrice` when unset.
    pub gas_price: Option<U256>,
    /// Only part of the signing payload, never of the raw transaction.
    pub chain_id: Option<u64>,
    /// Sender signatures, in role key order.
    pub signatures: Vec<Signature>,
}

impl TxCommon {
    #[must_use]
    pub const fn new(gas: u64) -> Self {
        Self {
            from: None,
            nonce: None,
            gas,
            gas_price: None,
            chain_id: None,
            signatures: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    #[must_use]
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    #[must_use]
    pub fn with_gas_price(mut self, gas_price: impl Into<U256>) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    #[must_use]
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// # Errors
    /// Returns `Err` if the nonce is unset.
    pub fn require_nonce(&self) -> Result<u64, ValidationError> {
        self.nonce.ok_or(ValidationError::MissingField("nonce"))
    }

    /// # Errors
    /// Returns `Err` if the gas price is unset.
    pub fn require_gas_price(&self) -> Result<U256, ValidationError> {
        self.gas_price.ok_or(ValidationError::MissingField("gasPrice"))
    }

    /// # Errors
    /// Returns `Err` if the chain id is unset.
    pub fn require_chain_id(&self) -> Result<u64, ValidationError> {
        self.chain_id.ok_or(ValidationError::MissingField("chainId"))
    }

    /// Checks the values that can be filled from the network, in the order
    /// nonce, gas price, chain id.
    ///
    /// # Errors
    /// Returns `Err` naming the first missing value.
    pub fn validate_optional_values(&self, check_chain_id: bool) -> Result<(), ValidationError> {
        self.require_nonce()?;
        self.require_gas_price()?;
        if check_chain_id {
            self.require_chain_id()?;
        }
        Ok(())
    }

    /// Appends signatures, ignoring empty placeholders.
    pub fn append_signatures(&mut self, signatures: &[Signature]) {
        self.signatures.extend(signatures.iter().filter(|signature| !signature.is_empty()));
    }

    pub(crate) fn fill_unset_from(&mut self, other: &Self) {
        if !self.signatures.is_empty() {
            return;
        }
        if self.nonce.is_none() {
            self.nonce = other.nonce;
        }
        if self.gas_price.is_none() {
            self.gas_price = other.gas_price;
        }
    }

    /// Compares everything but the signatures. Chain ids only when both are known,
    /// the sender only when both are known and `from_may_be_unknown` is set.
    pub(crate) fn same_fields(&self, other: &Self, from_may_be_unknown: bool) -> bool {
        let same_from = match (self.from, other.from) {
            (Some(this), Some(other)) => this == other,
            (None, None) => true,
            _ => from_may_be_unknown,
        };
        let same_chain_id = match (self.chain_id, other.chain_id) {
            (Some(this), Some(other)) => this == other,
            _ => true,
        };
        same_from &&
            same_chain_id &&
            self.nonce == other.nonce &&
            self.gas_price == other.gas_price &&
            self.gas == other.gas
    }

    /// Chain id carried by the first signature `v`.
    pub(crate) fn chain_id_from(signatures: &[Signature]) -> Option<u64> {
        signatures.first().and_then(|signature| signature.v.chain_id())
    }
}

/// Fields decoded by a [`TxPayload`], together with the ones it owns the position of.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PayloadFields<P> {
    pub payload: P,
    pub from: Option<Address>,
    pub fee_ratio: Option<FeeRatio>,
}

/// The type specific part of a transaction, shared by its basic, fee delegated and
/// partially fee delegated variants.
pub trait TxPayload: Clone + PartialEq + Eq + Debug + Send + Sync + 'static {
    /// Basic, fee delegated and partially fee delegated types, in this order.
    const TX_TYPES: [TxType; 3];

    /// Items written by [`TxPayload::rlp_append_fields`], sender included, fee ratio excluded.
    const FIELD_COUNT: usize;

    /// Textual parameters accepted by [`TxPayload::from_params`].
    type Params;

    /// # Errors
    /// Returns `Err` if a parameter is malformed.
    fn from_params(params: &Self::Params) -> Result<Self, ValidationError>;

    /// Appends the fields following `[nonce, gasPrice, gas]`, including the sender and,
    /// for partial fee delegation, the fee ratio at their protocol position.
    fn rlp_append_fields(
        &self,
        stream: &mut RlpStream,
        from: Option<&Address>,
        fee_ratio: Option<FeeRatio>,
    );

    /// # Errors
    /// Returns `Err` if the fields starting at `offset` are malformed.
    fn rlp_decode_fields(
        rlp: &Rlp,
        offset: usize,
        with_fee_ratio: bool,
    ) -> Result<PayloadFields<Self>, DecoderError>;
}

/// Operations common to every transaction type.
pub trait TransactionT {
    fn tx_type(&self) -> TxType;

    fn common(&self) -> &TxCommon;

    fn common_mut(&mut self) -> &mut TxCommon;

    /// Raw transaction: `tag ++ RLP([..fields, signatures])`, fee delegated types
    /// append `feePayer, feePayerSignatures`.
    ///
    /// # Errors
    /// Returns `Err` if the nonce or gas price is unset.
    fn rlp_encode(&self) -> Result<Bytes, ValidationError>;

    /// Payload signed by the sender: `RLP([RLP([tag, ..fields]), chainId, 0, 0])`.
    ///
    /// # Errors
    /// Returns `Err` if the nonce, gas price or chain id is unset.
    fn rlp_encode_for_signature(&self) -> Result<Bytes, ValidationError>;

    /// `keccak256` of the raw transaction.
    ///
    /// # Errors
    /// Returns `Err` if the transaction cannot be encoded.
    fn tx_hash(&self) -> Result<H256, ValidationError> {
        self.rlp_encode().map(|raw| DefaultCrypto::keccak256(raw))
    }

    /// Hash over the sender part of the transaction, identical to [`TransactionT::tx_hash`]
    /// unless the fee is delegated.
    ///
    /// # Errors
    /// Returns `Err` if the transaction cannot be encoded.
    fn sender_tx_hash(&self) -> Result<H256, ValidationError> {
        self.tx_hash()
    }

    /// `keccak256` of the sender signing payload.
    ///
    /// # Errors
    /// Returns `Err` if the nonce, gas price or chain id is unset.
    fn signature_hash(&self) -> Result<H256, ValidationError> {
        self.rlp_encode_for_signature().map(|payload| DefaultCrypto::keccak256(payload))
    }

    /// Appends sender signatures, never replacing existing ones.
    ///
    /// # Errors
    /// Returns `Err` if the type limits the number of signatures.
    fn append_signatures(&mut self, signatures: &[Signature]) -> Result<(), ValidationError> {
        self.common_mut().append_signatures(signatures);
        Ok(())
    }

    /// Whether every field except the signatures matches `other`.
    fn same_fields(&self, other: &Self) -> bool
    where
        Self: Sized;

    /// Adopts nonce, gas price and fee payer from `other` where they are still unset.
    fn fill_unset_from(&mut self, other: &Self)
    where
        Self: Sized;

    /// Appends every signature list of `other`.
    ///
    /// # Errors
    /// Returns `Err` if the type limits the number of signatures.
    fn append_signatures_from(&mut self, other: &Self) -> Result<(), ValidationError>
    where
        Self: Sized,
    {
        self.append_signatures(&other.common().signatures)
    }

    /// Merges the signatures of `candidate`, the `index`-th raw transaction being combined.
    /// The transaction is left untouched when the candidate is rejected.
    ///
    /// # Errors
    /// Returns `Err` if the candidate describes a different transaction.
    fn combine(&mut self, candidate: &Self, index: usize) -> Result<(), MergeError>
    where
        Self: Sized + Clone,
    {
        let mut merged = self.clone();
        merged.fill_unset_from(candidate);
        if !merged.same_fields(candidate) {
            return Err(MergeError::InconsistentTransaction { index });
        }
        merged.append_signatures_from(candidate)?;
        *self = merged;
        Ok(())
    }
}

/// Operations of the fee delegated transaction types.
pub trait FeeDelegatedTransactionT: TransactionT {
    fn fee_payer(&self) -> Option<Address>;

    fn set_fee_payer(&mut self, fee_payer: Address);

    fn fee_ratio(&self) -> Option<FeeRatio>;

    fn fee_payer_signatures(&self) -> &[Signature];

    /// Appends fee payer signatures, never replacing existing ones.
    fn append_fee_payer_signatures(&mut self, signatures: &[Signature]);

    /// Payload signed by the fee payer:
    /// `RLP([RLP([tag, ..fields]), feePayer, chainId, 0, 0])`.
    ///
    /// # Errors
    /// Returns `Err` if the nonce, gas price, chain id or fee payer is unset.
    fn rlp_encode_for_fee_payer_signature(&self) -> Result<Bytes, ValidationError>;

    /// `keccak256` of the fee payer signing payload.
    ///
    /// # Errors
    /// Returns `Err` if the payload cannot be encoded.
    fn fee_payer_signature_hash(&self) -> Result<H256, ValidationError> {
        self.rlp_encode_for_fee_payer_signature().map(|payload| DefaultCrypto::keccak256(payload))
    }
}

/// Number of items in `[nonce, gasPrice, gas, ..fields]`.
const fn field_count<P: TxPayload>(fee_ratio: Option<FeeRatio>) -> usize {
    3 + P::FIELD_COUNT + if fee_ratio.is_some() { 1 } else { 0 }
}

/// Appends `nonce, gasPrice, gas, ..fields`.
fn rlp_append_fields<P: TxPayload>(
    stream: &mut RlpStream,
    common: &TxCommon,
    payload: &P,
    fee_ratio: Option<FeeRatio>,
) -> Result<(), ValidationError> {
    let nonce = common.require_nonce()?;
    let gas_price = common.require_gas_price()?;
    stream.append(&nonce).append(&gas_price).append(&common.gas);
    payload.rlp_append_fields(stream, common.from.as_ref(), fee_ratio);
    Ok(())
}

/// `tag ++ RLP([nonce, gasPrice, gas, ..fields, signatures (, feePayer, feePayerSignatures)])`
pub(crate) fn rlp_encode_raw<P: TxPayload>(
    tx_type: TxType,
    common: &TxCommon,
    payload: &P,
    fee_ratio: Option<FeeRatio>,
    fee_payer: Option<(Option<&Address>, &[Signature])>,
) -> Result<Bytes, ValidationError> {
    let count = field_count::<P>(fee_ratio) + 1 + if fee_payer.is_some() { 2 } else { 0 };
    let mut stream = RlpStream::new_list(count);
    rlp_append_fields(&mut stream, common, payload, fee_ratio)?;
    stream.append_signatures(&common.signatures);
    if let Some((fee_payer, fee_payer_signatures)) = fee_payer {
        stream.append_opt(fee_payer).append_signatures(fee_payer_signatures);
    }
    Ok(prefix_tag(tx_type, &stream.out()))
}

/// `RLP([RLP([tag, ..fields]) (, feePayer), chainId, 0, 0])`
pub(crate) fn rlp_encode_signing_payload<P: TxPayload>(
    tx_type: TxType,
    common: &TxCommon,
    payload: &P,
    fee_ratio: Option<FeeRatio>,
    fee_payer: Option<&Address>,
) -> Result<Bytes, ValidationError> {
    common.validate_optional_values(true)?;
    let chain_id = common.chain_id.unwrap_or_default();

    let mut inner = RlpStream::new_list(1 + field_count::<P>(fee_ratio));
    inner.append(&tag_of(tx_type));
    rlp_append_fields(&mut inner, common, payload, fee_ratio)?;
    let inner = inner.out();

    let mut stream = RlpStream::new_list(if fee_payer.is_some() { 5 } else { 4 });
    stream.append_iter(inner.iter().copied());
    if let Some(fee_payer) = fee_payer {
        stream.append(fee_payer);
    }
    stream.append(&chain_id).append(&0u8).append(&0u8);
    Ok(stream.out().freeze().into())
}

/// Decodes `[nonce, gasPrice, gas, ..fields]`, the signatures are left empty.
pub(crate) fn rlp_decode_fields<P: TxPayload>(
    rlp: &Rlp,
    with_fee_ratio: bool,
) -> Result<(TxCommon, PayloadFields<P>), DecoderError> {
    let nonce: u64 = rlp.val_at(0)?;
    let gas_price: U256 = rlp.val_at(1)?;
    let gas: u64 = rlp.val_at(2)?;
    let fields = P::rlp_decode_fields(rlp, 3, with_fee_ratio)?;
    let common = TxCommon {
        from: fields.from,
        nonce: Some(nonce),
        gas,
        gas_price: Some(gas_price),
        chain_id: None,
        signatures: Vec::new(),
    };
    Ok((common, fields))
}

/// Splits the type tag from the RLP body of a raw typed transaction.
pub(crate) fn split_tag(raw: &[u8]) -> Result<(u8, Rlp<'_>), DecodeError> {
    let (&tag, body) = raw.split_first().ok_or(DecodeError::Empty)?;
    Ok((tag, rlp_body(body)?))
}

/// Wraps a single RLP list, rejecting anything after it.
pub(crate) fn rlp_body(body: &[u8]) -> Result<Rlp<'_>, DecodeError> {
    let rlp = Rlp::new(body);
    if !rlp.is_list() {
        return Err(DecoderError::RlpExpectedToBeList.into());
    }
    if rlp.payload_info()?.total() != body.len() {
        return Err(DecodeError::TrailingBytes);
    }
    Ok(rlp)
}

/// Fails unless the body holds exactly `expected` items.
pub(crate) fn check_item_count(rlp: &Rlp, expected: usize) -> Result<(), DecoderError> {
    if rlp.item_count()? == expected {
        Ok(())
    } else {
        Err(DecoderError::RlpIncorrectListLen)
    }
}

fn tag_of(tx_type: TxType) -> u8 {
    // Only typed transactions reach the typed codec.
    tx_type.tag().unwrap_or_default()
}

fn prefix_tag(tx_type: TxType, body: &[u8]) -> Bytes {
    let mut raw = Vec::with_capacity(body.len() + 1);
    raw.push(tag_of(tx_type));
    raw.extend_from_slice(body);
    raw.into()
}

/// `RLP` decodes an optional fee ratio at `index`.
pub(crate) fn rlp_decode_fee_ratio(
    rlp: &Rlp,
    index: usize,
    with_fee_ratio: bool,
) -> Result<Option<FeeRatio>, DecoderError> {
    if with_fee_ratio {
        rlp.val_at(index).map(Some)
    } else {
        Ok(None)
    }
}

/// Parses the textual common parameters.
impl TryFrom<&crate::params::TxCommonParams> for TxCommon {
    type Error = ValidationError;

    fn try_from(params: &crate::params::TxCommonParams) -> Result<Self, Self::Error> {
        Ok(Self {
            from: validation::parse_optional_address("from", params.from.as_deref())?,
            nonce: validation::parse_optional_u64("nonce", params.nonce.as_deref())?,
            gas: validation::parse_u64("gas", &params.gas)?,
            gas_price: validation::parse_optional_u256("gasPrice", params.gas_price.as_deref())?,
            chain_id: validation::parse_optional_u64("chainId", params.chain_id.as_deref())?,
            signatures: params.signatures.iter().copied().filter(|sig| !sig.is_empty()).collect(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        BasicTransaction, FeeDelegatedTransaction, FeeDelegatedTransactionT, TransactionT,
        TxCommon, TxPayload,
    };
    use crate::{
        signature::{RecoveryId, Signature},
        validation::FeeRatio,
        Address, H256, U256,
    };
    use hex_literal::hex;

    /// Sender and receiver used across the codec tests.
    pub const FROM: [u8; 20] = hex!("a94f5374fce5edbc8e2a8697c15331677e6ebf0b");
    pub const TO: [u8; 20] = hex!("7b65b75d204abed71587c9e519a89277766ee1d0");
    pub const FEE_PAYER: [u8; 20] = hex!("5a0043070275d9f6054307ee7348bd660849d90f");

    /// nonce 1234, gas price 25, gas 1_000_000, chain id 1
    pub fn common() -> TxCommon {
        TxCommon::new(1_000_000)
            .with_from(Address::from(FROM))
            .with_nonce(1234)
            .with_gas_price(U256::from(25u64))
            .with_chain_id(1)
    }

    pub fn sender_signature() -> Signature {
        Signature {
            v: RecoveryId::new(0x25),
            r: hex!("f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29a").into(),
            s: hex!("6748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc").into(),
        }
    }

    pub fn fee_payer_signature() -> Signature {
        Signature {
            v: RecoveryId::new(0x26),
            r: hex!("f45cf8d7f88c08e6b6ec0b3b562f34ca94283e4689021987abb6b0772ddfd80a").into(),
            s: hex!("298fe2c5aeabb6a518f4cbb5ff39631a5d88be505d3923374f65fdcf63c2955b").into(),
        }
    }

    /// Checks the encodings of `payload` sent with [`common`], unsigned and signed with
    /// [`sender_signature`], then decodes the signed form back.
    pub fn check_basic<P: TxPayload>(
        payload: P,
        unsigned: &[u8],
        signing_payload: &[u8],
        signed: &[u8],
        tx_hash: [u8; 32],
    ) {
        let mut tx = BasicTransaction::new(common(), payload);
        assert_eq!(&tx.rlp_encode().unwrap()[..], unsigned);
        assert_eq!(&tx.rlp_encode_for_signature().unwrap()[..], signing_payload);

        tx.append_signatures(&[sender_signature()]).unwrap();
        assert_eq!(&tx.rlp_encode().unwrap()[..], signed);
        assert_eq!(tx.tx_hash().unwrap(), H256(tx_hash));
        assert_eq!(tx.sender_tx_hash().unwrap(), H256(tx_hash));
        assert_eq!(BasicTransaction::<P>::decode(signed).unwrap(), tx);

        let decoded = BasicTransaction::<P>::decode(unsigned).unwrap();
        assert!(decoded.common.signatures.is_empty());
        assert_eq!(decoded.common.chain_id, None);
        assert_eq!(decoded.payload, tx.payload);
    }

    /// Same as [`check_basic`] for the fee delegated types, signed by the sender and by
    /// [`FEE_PAYER`]. Returns the signed transaction.
    pub fn check_fee_delegated<P: TxPayload>(
        payload: P,
        fee_ratio: Option<u8>,
        signed: &[u8],
        tx_hash: [u8; 32],
    ) -> FeeDelegatedTransaction<P> {
        let fee_ratio = fee_ratio.map(|ratio| FeeRatio::new(ratio).unwrap());
        let mut tx = FeeDelegatedTransaction::new(common(), payload, fee_ratio)
            .with_fee_payer(Address::from(FEE_PAYER));
        tx.append_signatures(&[sender_signature()]).unwrap();
        tx.append_fee_payer_signatures(&[fee_payer_signature()]);
        assert_eq!(&tx.rlp_encode().unwrap()[..], signed);
        assert_eq!(tx.tx_hash().unwrap(), H256(tx_hash));
        assert_eq!(FeeDelegatedTransaction::<P>::decode(signed).unwrap(), tx);
        assert_eq!(FeeDelegatedTransaction::<P>::decode_exact(signed, tx.tx_type()).unwrap(), tx);
        tx
    }

    #[test]
    fn optional_values_are_checked_in_order() {
        use crate::error::ValidationError;
        let mut common = TxCommon::new(21000);
        assert_eq!(common.validate_optional_values(true), Err(ValidationError::MissingField("nonce")));
        common.nonce = Some(1);
        assert_eq!(
            common.validate_optional_values(true),
            Err(ValidationError::MissingField("gasPrice"))
        );
        common.gas_price = Some(U256::one());
        assert_eq!(
            common.validate_optional_values(true),
            Err(ValidationError::MissingField("chainId"))
        );
        assert_eq!(common.validate_optional_values(false), Ok(()));
    }

    #[test]
    fn same_fields_ignores_unknown_chain_id() {
        let mut decoded = common();
        decoded.chain_id = None;
        assert!(common().same_fields(&decoded, false));
        decoded.gas += 1;
        assert!(!common().same_fields(&decoded, false));
    }
}
