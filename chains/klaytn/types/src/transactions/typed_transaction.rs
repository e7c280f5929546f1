use super::{
    AccountUpdate, BasicTransaction, Cancel, ChainDataAnchoring, FeeDelegatedTransaction,
    FeeDelegatedTransactionT, LegacyTransaction, SmartContractDeploy, SmartContractExecution,
    TransactionT, TxCommon, ValueTransfer, ValueTransferMemo,
};
use crate::{
    error::{DecodeError, MergeError, ValidationError},
    signature::Signature,
    tx_type::TxType,
    Bytes, H256,
};

macro_rules! typed_transaction {
    (
        basic { $( $basic:ident($basic_ty:ty), )* }
        fee_delegated { $( $fd:ident($fd_ty:ty), )* }
    ) => {
        /// Every transaction type understood by the codec.
        ///
        /// Fee delegated variants cover both the full and the partial (`WithRatio`) type,
        /// selected by their `fee_ratio`.
        #[derive(Clone, PartialEq, Eq, Debug)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(tag = "type")
        )]
        pub enum TypedTransaction {
            $( $basic($basic_ty), )*
            $( $fd($fd_ty), )*
        }

        impl TypedTransaction {
            /// The fee delegation part, `None` for types paid by the sender.
            #[must_use]
            pub fn fee_delegated(&self) -> Option<&dyn FeeDelegatedTransactionT> {
                match self {
                    $( Self::$fd(tx) => Some(tx), )*
                    _ => None,
                }
            }

            #[must_use]
            pub fn fee_delegated_mut(&mut self) -> Option<&mut dyn FeeDelegatedTransactionT> {
                match self {
                    $( Self::$fd(tx) => Some(tx), )*
                    _ => None,
                }
            }
        }

        impl TransactionT for TypedTransaction {
            fn tx_type(&self) -> TxType {
                match self {
                    $( Self::$basic(tx) => tx.tx_type(), )*
                    $( Self::$fd(tx) => tx.tx_type(), )*
                }
            }

            fn common(&self) -> &TxCommon {
                match self {
                    $( Self::$basic(tx) => tx.common(), )*
                    $( Self::$fd(tx) => tx.common(), )*
                }
            }

            fn common_mut(&mut self) -> &mut TxCommon {
                match self {
                    $( Self::$basic(tx) => tx.common_mut(), )*
                    $( Self::$fd(tx) => tx.common_mut(), )*
                }
            }

            fn rlp_encode(&self) -> Result<Bytes, ValidationError> {
                match self {
                    $( Self::$basic(tx) => tx.rlp_encode(), )*
                    $( Self::$fd(tx) => tx.rlp_encode(), )*
                }
            }

            fn rlp_encode_for_signature(&self) -> Result<Bytes, ValidationError> {
                match self {
                    $( Self::$basic(tx) => tx.rlp_encode_for_signature(), )*
                    $( Self::$fd(tx) => tx.rlp_encode_for_signature(), )*
                }
            }

            fn sender_tx_hash(&self) -> Result<H256, ValidationError> {
                match self {
                    $( Self::$basic(tx) => tx.sender_tx_hash(), )*
                    $( Self::$fd(tx) => tx.sender_tx_hash(), )*
                }
            }

            fn append_signatures(&mut self, signatures: &[Signature]) -> Result<(), ValidationError> {
                match self {
                    $( Self::$basic(tx) => tx.append_signatures(signatures), )*
                    $( Self::$fd(tx) => tx.append_signatures(signatures), )*
                }
            }

            /// Transactions of different types never match.
            fn same_fields(&self, other: &Self) -> bool {
                match (self, other) {
                    $( (Self::$basic(this), Self::$basic(other)) => this.same_fields(other), )*
                    $( (Self::$fd(this), Self::$fd(other)) => this.same_fields(other), )*
                    _ => false,
                }
            }

            fn fill_unset_from(&mut self, other: &Self) {
                match (self, other) {
                    $( (Self::$basic(this), Self::$basic(other)) => this.fill_unset_from(other), )*
                    $( (Self::$fd(this), Self::$fd(other)) => this.fill_unset_from(other), )*
                    _ => {},
                }
            }

            fn append_signatures_from(&mut self, other: &Self) -> Result<(), ValidationError> {
                match (self, other) {
                    $( (Self::$basic(this), Self::$basic(other)) => this.append_signatures_from(other), )*
                    $( (Self::$fd(this), Self::$fd(other)) => this.append_signatures_from(other), )*
                    // unreachable after `same_fields`
                    _ => Ok(()),
                }
            }
        }

        $(
            impl From<$basic_ty> for TypedTransaction {
                fn from(tx: $basic_ty) -> Self {
                    Self::$basic(tx)
                }
            }
        )*

        $(
            impl From<$fd_ty> for TypedTransaction {
                fn from(tx: $fd_ty) -> Self {
                    Self::$fd(tx)
                }
            }
        )*
    };
}

typed_transaction! {
    basic {
        Legacy(LegacyTransaction),
        ValueTransfer(BasicTransaction<ValueTransfer>),
        ValueTransferMemo(BasicTransaction<ValueTransferMemo>),
        AccountUpdate(BasicTransaction<AccountUpdate>),
        SmartContractDeploy(BasicTransaction<SmartContractDeploy>),
        SmartContractExecution(BasicTransaction<SmartContractExecution>),
        Cancel(BasicTransaction<Cancel>),
        ChainDataAnchoring(BasicTransaction<ChainDataAnchoring>),
    }
    fee_delegated {
        FeeDelegatedValueTransfer(FeeDelegatedTransaction<ValueTransfer>),
        FeeDelegatedValueTransferMemo(FeeDelegatedTransaction<ValueTransferMemo>),
        FeeDelegatedAccountUpdate(FeeDelegatedTransaction<AccountUpdate>),
        FeeDelegatedSmartContractDeploy(FeeDelegatedTransaction<SmartContractDeploy>),
        FeeDelegatedSmartContractExecution(FeeDelegatedTransaction<SmartContractExecution>),
        FeeDelegatedCancel(FeeDelegatedTransaction<Cancel>),
        FeeDelegatedChainDataAnchoring(FeeDelegatedTransaction<ChainDataAnchoring>),
    }
}

impl TypedTransaction {
    /// Decodes a raw transaction of any registered type.
    ///
    /// # Errors
    /// Returns `Err` if the type tag is unknown or the body is malformed.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let tag = raw.first().copied().ok_or(DecodeError::Empty)?;
        // legacy transactions always start with a byte >= 0xc0.
        if tag >= 0xc0 {
            return LegacyTransaction::decode(raw).map(Self::Legacy);
        }
        let tx_type = TxType::from_tag(tag)
            .ok_or(DecodeError::UnknownOrMismatchedTag { tag, expected: None })?;
        tx_type.decoder()(raw)
    }

    /// Decodes a raw transaction given as hex, with or without the "0x" prefix.
    ///
    /// # Errors
    /// Returns `Err` if the string is not hex or [`TypedTransaction::decode`] fails.
    pub fn decode_hex(raw: &str) -> Result<Self, DecodeError> {
        let raw = const_hex::decode(raw).map_err(|error| DecodeError::InvalidHex(error.to_string()))?;
        Self::decode(&raw)
    }

    /// Decodes a raw transaction which must be of type `expected`.
    ///
    /// # Errors
    /// Returns `Err` if the raw transaction is of another type or is malformed.
    pub fn decode_as(expected: TxType, raw: &[u8]) -> Result<Self, DecodeError> {
        let tag = raw.first().copied().ok_or(DecodeError::Empty)?;
        if expected == TxType::Legacy && tag < 0xc0 {
            return Err(DecodeError::UnknownOrMismatchedTag { tag, expected: Some(expected) });
        }
        expected.decoder()(raw)
    }

    /// Merges the signatures of raw transactions encoding this same transaction, in order,
    /// and returns the raw encoding of the result.
    ///
    /// While this transaction holds no signature, its unset nonce, gas price and fee payer
    /// are taken from the candidates. A rejected candidate leaves the signatures merged from
    /// the previous ones in place.
    ///
    /// # Errors
    /// Returns `Err` naming the first raw transaction that cannot be decoded or differs from
    /// this one in anything but its signatures.
    pub fn combine_signed_raw_transactions<I, R>(&mut self, raws: I) -> Result<Bytes, MergeError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        for (index, raw) in raws.into_iter().enumerate() {
            let candidate = Self::decode(raw.as_ref())
                .map_err(|source| MergeError::Decode { index, source })?;
            self.combine(&candidate, index)?;
        }
        Ok(self.rlp_encode()?)
    }
}
