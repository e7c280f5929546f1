//! Textual transaction parameters, as received from callers before validation.
//!
//! Quantities accept "0x" prefixed hex or decimal, optional values accept `""` or `"0x"`
//! as unset.
use crate::signature::Signature;

/// Fields shared by every transaction type.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct TxCommonParams {
    pub from: Option<String>,
    pub nonce: Option<String>,
    pub gas: String,
    pub gas_price: Option<String>,
    pub chain_id: Option<String>,
    pub signatures: Vec<Signature>,
}

/// Fields of the fee delegated transaction types.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct FeeDelegationParams {
    pub fee_payer: Option<String>,
    /// Set for the partial fee delegation types only.
    pub fee_ratio: Option<String>,
    pub fee_payer_signatures: Vec<Signature>,
}
