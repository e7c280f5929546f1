use super::{
    check_item_count, rlp_decode_fields, rlp_encode_raw, rlp_encode_signing_payload, split_tag,
    TransactionT, TxCommon, TxPayload,
};
use crate::{
    error::{DecodeError, ValidationError},
    params::TxCommonParams,
    rlp_utils::RlpExt,
    tx_type::TxType,
    Bytes,
};

/// A transaction whose fee is paid by its sender.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct BasicTransaction<P> {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub common: TxCommon,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub payload: P,
}

impl<P: TxPayload> BasicTransaction<P> {
    pub const fn new(common: TxCommon, payload: P) -> Self {
        Self { common, payload }
    }

    /// Builds the transaction from textual parameters, validating every field.
    ///
    /// # Errors
    /// Returns `Err` if a parameter is malformed.
    pub fn from_params(common: &TxCommonParams, payload: &P::Params) -> Result<Self, ValidationError> {
        Ok(Self { common: TxCommon::try_from(common)?, payload: P::from_params(payload)? })
    }

    /// Decodes a raw transaction of this type.
    ///
    /// # Errors
    /// Returns `Err` if the tag is not the one of this type or the body is malformed.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let expected = P::TX_TYPES[0];
        let (tag, rlp) = split_tag(raw)?;
        if Some(tag) != expected.tag() {
            return Err(DecodeError::UnknownOrMismatchedTag { tag, expected: Some(expected) });
        }
        let signatures_index = 3 + P::FIELD_COUNT;
        check_item_count(&rlp, signatures_index + 1)?;
        let (mut common, fields) = rlp_decode_fields::<P>(&rlp, false)?;
        common.signatures = rlp.signatures_at(signatures_index)?;
        common.chain_id = TxCommon::chain_id_from(&common.signatures);
        Ok(Self { common, payload: fields.payload })
    }
}

impl<P: TxPayload> TransactionT for BasicTransaction<P> {
    fn tx_type(&self) -> TxType {
        P::TX_TYPES[0]
    }

    fn common(&self) -> &TxCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut TxCommon {
        &mut self.common
    }

    fn rlp_encode(&self) -> Result<Bytes, ValidationError> {
        rlp_encode_raw(self.tx_type(), &self.common, &self.payload, None, None)
    }

    fn rlp_encode_for_signature(&self) -> Result<Bytes, ValidationError> {
        rlp_encode_signing_payload(self.tx_type(), &self.common, &self.payload, None, None)
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.common.same_fields(&other.common, false) && self.payload == other.payload
    }

    fn fill_unset_from(&mut self, other: &Self) {
        self.common.fill_unset_from(&other.common);
    }
}
