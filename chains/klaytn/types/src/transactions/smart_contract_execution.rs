use super::{rlp_decode_fee_ratio, PayloadFields, TxPayload};
use crate::{
    error::ValidationError,
    rlp_utils::{RlpExt, RlpStreamExt},
    tx_type::TxType,
    validation::{self, FeeRatio},
    Address, Bytes, U256,
};
use rlp::{DecoderError, Rlp, RlpStream};

/// Calls a deployed smart contract.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SmartContractExecution {
    pub to: Address,
    pub value: U256,
    /// ABI encoded call data.
    pub input: Bytes,
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SmartContractExecutionParams {
    pub to: String,
    pub value: String,
    pub input: String,
}

impl TxPayload for SmartContractExecution {
    const TX_TYPES: [TxType; 3] = [
        TxType::SmartContractExecution,
        TxType::FeeDelegatedSmartContractExecution,
        TxType::FeeDelegatedSmartContractExecutionWithRatio,
    ];
    const FIELD_COUNT: usize = 4;
    type Params = SmartContractExecutionParams;

    fn from_params(params: &Self::Params) -> Result<Self, ValidationError> {
        Ok(Self {
            to: validation::parse_address("to", &params.to)?,
            value: validation::parse_u256("value", &params.value)?,
            input: validation::parse_data("input", &params.input)?,
        })
    }

    fn rlp_append_fields(
        &self,
        stream: &mut RlpStream,
        from: Option<&Address>,
        fee_ratio: Option<FeeRatio>,
    ) {
        stream.append(&self.to).append(&self.value).append_opt(from).append(&self.input);
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
            payload: Self {
                to: rlp.val_at(offset)?,
                value: rlp.val_at(offset + 1)?,
                input: rlp.val_at(offset + 3)?,
            },
            from: rlp.opt_at(offset + 2)?,
            fee_ratio: rlp_decode_fee_ratio(rlp, offset + 4, with_fee_ratio)?,
        })
    }
}
