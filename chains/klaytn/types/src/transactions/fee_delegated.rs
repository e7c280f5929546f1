use super::{
    check_item_count, rlp_decode_fields, rlp_encode_raw, rlp_encode_signing_payload, split_tag,
    FeeDelegatedTransactionT, TransactionT, TxCommon, TxPayload,
};
use crate::{
    crypto::DefaultCrypto,
    error::{DecodeError, ValidationError},
    params::{FeeDelegationParams, TxCommonParams},
    rlp_utils::RlpExt,
    signature::Signature,
    tx_type::TxType,
    validation::{self, FeeRatio},
    Address, Bytes, H256,
};

/// A transaction whose fee is paid, fully or by `fee_ratio` percent, by a fee payer.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct FeeDelegatedTransaction<P> {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub common: TxCommon,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub payload: P,
    /// `Some` selects the partial fee delegation type.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub fee_ratio: Option<FeeRatio>,
    pub fee_payer: Option<Address>,
    pub fee_payer_signatures: Vec<Signature>,
}

impl<P: TxPayload> FeeDelegatedTransaction<P> {
    pub const fn new(common: TxCommon, payload: P, fee_ratio: Option<FeeRatio>) -> Self {
        Self { common, payload, fee_ratio, fee_payer: None, fee_payer_signatures: Vec::new() }
    }

    #[must_use]
    pub fn with_fee_payer(mut self, fee_payer: Address) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Builds the transaction from textual parameters, validating every field.
    ///
    /// # Errors
    /// Returns `Err` if a parameter is malformed.
    pub fn from_params(
        common: &TxCommonParams,
        payload: &P::Params,
        fee_delegation: &FeeDelegationParams,
    ) -> Result<Self, ValidationError> {
        let fee_ratio = match fee_delegation.fee_ratio.as_deref() {
            Some(ratio) if !validation::is_unset(ratio) => Some(validation::parse_fee_ratio(ratio)?),
            _ => None,
        };
        Ok(Self {
            common: TxCommon::try_from(common)?,
            payload: P::from_params(payload)?,
            fee_ratio,
            fee_payer: validation::parse_optional_address(
                "feePayer",
                fee_delegation.fee_payer.as_deref(),
            )?,
            fee_payer_signatures: fee_delegation
                .fee_payer_signatures
                .iter()
                .copied()
                .filter(|signature| !signature.is_empty())
                .collect(),
        })
    }

    /// Decodes a raw transaction of either the full or the partial fee delegation type.
    ///
    /// # Errors
    /// Returns `Err` if the tag belongs to another type or the body is malformed.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let tag = raw.first().copied().ok_or(DecodeError::Empty)?;
        let expected = if Some(tag) == P::TX_TYPES[2].tag() { P::TX_TYPES[2] } else { P::TX_TYPES[1] };
        Self::decode_exact(raw, expected)
    }

    /// Decodes a raw transaction, which must carry the tag of `expected`.
    ///
    /// # Errors
    /// Returns `Err` if the tag differs from the one of `expected` or the body is malformed.
    pub fn decode_exact(raw: &[u8], expected: TxType) -> Result<Self, DecodeError> {
        let (tag, rlp) = split_tag(raw)?;
        let with_fee_ratio = expected == P::TX_TYPES[2];
        if Some(tag) != expected.tag() || !(with_fee_ratio || expected == P::TX_TYPES[1]) {
            return Err(DecodeError::UnknownOrMismatchedTag { tag, expected: Some(expected) });
        }

        let signatures_index = 3 + P::FIELD_COUNT + usize::from(with_fee_ratio);
        check_item_count(&rlp, signatures_index + 3)?;
        let (mut common, fields) = rlp_decode_fields::<P>(&rlp, with_fee_ratio)?;
        common.signatures = rlp.signatures_at(signatures_index)?;
        let fee_payer = rlp.opt_at(signatures_index + 1)?;
        let fee_payer_signatures = rlp.signatures_at(signatures_index + 2)?;
        common.chain_id = TxCommon::chain_id_from(&common.signatures)
            .or_else(|| TxCommon::chain_id_from(&fee_payer_signatures));
        Ok(Self {
            common,
            payload: fields.payload,
            fee_ratio: fields.fee_ratio,
            fee_payer,
            fee_payer_signatures,
        })
    }

    /// Neither unset nor the zero address.
    fn has_fee_payer(&self) -> bool {
        self.fee_payer.is_some_and(|fee_payer| !fee_payer.is_zero())
    }
}

impl<P: TxPayload> TransactionT for FeeDelegatedTransaction<P> {
    fn tx_type(&self) -> TxType {
        if self.fee_ratio.is_some() {
            P::TX_TYPES[2]
        } else {
            P::TX_TYPES[1]
        }
    }

    fn common(&self) -> &TxCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut TxCommon {
        &mut self.common
    }

    fn rlp_encode(&self) -> Result<Bytes, ValidationError> {
        rlp_encode_raw(
            self.tx_type(),
            &self.common,
            &self.payload,
            self.fee_ratio,
            Some((self.fee_payer.as_ref(), &self.fee_payer_signatures)),
        )
    }

    fn rlp_encode_for_signature(&self) -> Result<Bytes, ValidationError> {
        rlp_encode_signing_payload(self.tx_type(), &self.common, &self.payload, self.fee_ratio, None)
    }

    /// `keccak256(tag ++ RLP([..fields, signatures]))`, the fee payer part left out.
    fn sender_tx_hash(&self) -> Result<H256, ValidationError> {
        rlp_encode_raw(self.tx_type(), &self.common, &self.payload, self.fee_ratio, None)
            .map(|raw| DefaultCrypto::keccak256(raw))
    }

    fn same_fields(&self, other: &Self) -> bool {
        let same_fee_payer = match (self.fee_payer, other.fee_payer) {
            (Some(this), Some(other)) => this == other,
            _ => true,
        };
        same_fee_payer &&
            self.fee_ratio == other.fee_ratio &&
            self.common.same_fields(&other.common, false) &&
            self.payload == other.payload
    }

    /// Only while neither signature list holds a signature.
    fn fill_unset_from(&mut self, other: &Self) {
        if !self.fee_payer_signatures.is_empty() || !self.common.signatures.is_empty() {
            return;
        }
        self.common.fill_unset_from(&other.common);
        if !self.has_fee_payer() && other.has_fee_payer() {
            self.fee_payer = other.fee_payer;
        }
    }

    fn append_signatures_from(&mut self, other: &Self) -> Result<(), ValidationError> {
        self.append_signatures(&other.common.signatures)?;
        self.append_fee_payer_signatures(&other.fee_payer_signatures);
        Ok(())
    }
}

impl<P: TxPayload> FeeDelegatedTransactionT for FeeDelegatedTransaction<P> {
    fn fee_payer(&self) -> Option<Address> {
        self.fee_payer
    }

    fn set_fee_payer(&mut self, fee_payer: Address) {
        self.fee_payer = Some(fee_payer);
    }

    fn fee_ratio(&self) -> Option<FeeRatio> {
        self.fee_ratio
    }

    fn fee_payer_signatures(&self) -> &[Signature] {
        &self.fee_payer_signatures
    }

    fn append_fee_payer_signatures(&mut self, signatures: &[Signature]) {
        self.fee_payer_signatures
            .extend(signatures.iter().filter(|signature| !signature.is_empty()));
    }

    fn rlp_encode_for_fee_payer_signature(&self) -> Result<Bytes, ValidationError> {
        self.common.validate_optional_values(true)?;
        let fee_payer = self.fee_payer.ok_or(ValidationError::MissingField("feePayer"))?;
        rlp_encode_signing_payload(
            self.tx_type(),
            &self.common,
            &self.payload,
            self.fee_ratio,
            Some(&fee_payer),
        )
    }
}
