//! Parsing of the textual field values accepted by the parameter structs.
//!
//! Addresses are 20 bytes of hex with an optional "0x" prefix. Quantities are either
//! "0x" prefixed hex or decimal. `""` and `"0x"` mark an optional field as unset.
use crate::{error::ValidationError, Address, Bytes, U256};
use std::str::FromStr;

/// Percentage of the fee paid by the fee payer, in `1..=99`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(try_from = "u8", into = "u8"))]
pub struct FeeRatio(u8);

impl FeeRatio {
    /// # Errors
    /// Returns `Err` if the ratio is outside `1..=99`.
    pub fn new(ratio: u8) -> Result<Self, ValidationError> {
        if (1..=99).contains(&ratio) {
            Ok(Self(ratio))
        } else {
            Err(ValidationError::invalid("feeRatio", ratio.to_string()))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for FeeRatio {
    type Error = ValidationError;

    fn try_from(ratio: u8) -> Result<Self, Self::Error> {
        Self::new(ratio)
    }
}

impl From<FeeRatio> for u8 {
    fn from(ratio: FeeRatio) -> Self {
        ratio.0
    }
}

impl rlp::Encodable for FeeRatio {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        <u8 as rlp::Encodable>::rlp_append(&self.0, s);
    }
}

impl rlp::Decodable for FeeRatio {
    fn decode(rlp: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        let ratio: u8 = rlp.as_val()?;
        Self::new(ratio).map_err(|_| rlp::DecoderError::Custom("fee ratio out of range"))
    }
}

/// `true` for the values marking an optional field as unset.
#[must_use]
pub fn is_unset(value: &str) -> bool {
    value.is_empty() || value == "0x"
}

/// # Errors
/// Returns `Err` unless `value` is 40 hex digits, optionally "0x" prefixed.
pub fn parse_address(name: &'static str, value: &str) -> Result<Address, ValidationError> {
    let hex = value.strip_prefix("0x").unwrap_or(value);
    if hex.len() != 40 {
        return Err(ValidationError::invalid(name, value));
    }
    Address::from_str(hex).map_err(|_| ValidationError::invalid(name, value))
}

/// Like [`parse_address`], `None` when the value is unset.
///
/// # Errors
/// Returns `Err` if the value is set but not a valid address.
pub fn parse_optional_address(
    name: &'static str,
    value: Option<&str>,
) -> Result<Option<Address>, ValidationError> {
    match value {
        Some(value) if !is_unset(value) => parse_address(name, value).map(Some),
        _ => Ok(None),
    }
}

/// # Errors
/// Returns `Err` unless `value` is a non-negative hex ("0x" prefixed) or decimal integer.
pub fn parse_u256(name: &'static str, value: &str) -> Result<U256, ValidationError> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            U256::from_str_radix(hex, 16).ok()
        },
        Some(_) => None,
        None if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
            U256::from_dec_str(value).ok()
        },
        None => None,
    };
    parsed.ok_or_else(|| ValidationError::invalid(name, value))
}

/// # Errors
/// Returns `Err` unless `value` is a quantity fitting into 64 bits.
pub fn parse_u64(name: &'static str, value: &str) -> Result<u64, ValidationError> {
    let quantity = parse_u256(name, value)?;
    if quantity > U256::from(u64::MAX) {
        return Err(ValidationError::invalid(name, value));
    }
    Ok(quantity.low_u64())
}

/// # Errors
/// Returns `Err` if the value is set but not a valid quantity.
pub fn parse_optional_u64(
    name: &'static str,
    value: Option<&str>,
) -> Result<Option<u64>, ValidationError> {
    match value {
        Some(value) if !is_unset(value) => parse_u64(name, value).map(Some),
        _ => Ok(None),
    }
}

/// # Errors
/// Returns `Err` if the value is set but not a valid quantity.
pub fn parse_optional_u256(
    name: &'static str,
    value: Option<&str>,
) -> Result<Option<U256>, ValidationError> {
    match value {
        Some(value) if !is_unset(value) => parse_u256(name, value).map(Some),
        _ => Ok(None),
    }
}

/// # Errors
/// Returns `Err` unless `value` is an even number of hex digits, optionally "0x" prefixed.
pub fn parse_data(name: &'static str, value: &str) -> Result<Bytes, ValidationError> {
    value.parse::<Bytes>().map_err(|_| ValidationError::invalid(name, value))
}

/// # Errors
/// Returns `Err` if the ratio is not an integer in `1..=99`.
pub fn parse_fee_ratio(value: &str) -> Result<FeeRatio, ValidationError> {
    let ratio = parse_u64("feeRatio", value)?;
    u8::try_from(ratio)
        .map_err(|_| ValidationError::invalid("feeRatio", value))
        .and_then(FeeRatio::new)
}
