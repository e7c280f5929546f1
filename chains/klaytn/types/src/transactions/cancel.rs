use super::{rlp_decode_fee_ratio, PayloadFields, TxPayload};
use crate::{
    error::ValidationError,
    rlp_utils::{RlpExt, RlpStreamExt},
    tx_type::TxType,
    validation::FeeRatio,
    Address,
};
use rlp::{DecoderError, Rlp, RlpStream};

/// Cancels the pending transaction of the sender that uses the same nonce.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cancel;

impl TxPayload for Cancel {
    const TX_TYPES: [TxType; 3] =
        [TxType::Cancel, TxType::FeeDelegatedCancel, TxType::FeeDelegatedCancelWithRatio];
    const FIELD_COUNT: usize = 1;
    type Params = ();

    fn from_params(_: &Self::Params) -> Result<Self, ValidationError> {
        Ok(Self)
    }

    fn rlp_append_fields(
        &self,
        stream: &mut RlpStream,
        from: Option<&Address>,
        fee_ratio: Option<FeeRatio>,
    ) {
        stream.append_opt(from);
        if let Some(fee_ratio) = fee_ratio {
            stream.append(&fee_ratio);
        }
    }

    fn rlp_decode_fields(
        rlp: &Rlp,
        offset: usize,
        with_fee_ratio: bool,
    ) -> Result<PayloadFields<Self>, DecoderError> {
        Ok(PayloadFields {
            payload: Self,
            from: rlp.opt_at(offset)?,
            fee_ratio: rlp_decode_fee_ratio(rlp, offset + 1, with_fee_ratio)?,
        })
    }
}
