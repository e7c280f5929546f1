use crate::{tx_type::TxType, Address};

/// Rejected field values, or transaction state that does not allow the requested operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {name}: {value:?}")]
    InvalidField { name: &'static str, value: String },
    #[error("{0} is missing")]
    MissingField(&'static str),
    #[error("cannot fill {field}: {reason}")]
    CannotFill { field: &'static str, reason: &'static str },
    #[error("the address of the keyring ({actual:#x}) differs from the {field} address ({expected:#x})")]
    AddressMismatch { field: &'static str, expected: Address, actual: Address },
    #[error("a decoupled keyring cannot sign a legacy transaction")]
    IncompatibleKeyType,
    #[error("{0} is not a fee delegated transaction type")]
    NotFeeDelegated(TxType),
    #[error("{0} cannot include more than one signature")]
    TooManySignatures(TxType),
}

impl ValidationError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidField { name, value: value.into() }
    }
}

/// Failure to decode a raw transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("raw transaction is empty")]
    Empty,
    #[error("raw transaction is not valid hex: {0}")]
    InvalidHex(String),
    #[error("unknown or mismatched transaction type tag 0x{tag:02x}")]
    UnknownOrMismatchedTag { tag: u8, expected: Option<TxType> },
    #[error("unexpected bytes after the transaction body")]
    TrailingBytes,
    #[error("malformed rlp: {0}")]
    Rlp(#[from] rlp::DecoderError),
}

/// Failure while merging signatures of raw transactions into a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("raw transaction #{index} differs from the transaction being combined")]
    InconsistentTransaction { index: usize },
    #[error("raw transaction #{index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
