use crate::{
    error::DecodeError,
    transactions::{
        AccountUpdate, BasicTransaction, Cancel, ChainDataAnchoring, FeeDelegatedTransaction,
        LegacyTransaction, SmartContractDeploy, SmartContractExecution, TypedTransaction,
        ValueTransfer, ValueTransferMemo,
    },
};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Decodes a raw transaction of one registered type.
pub type Decoder = fn(&[u8]) -> Result<TypedTransaction, DecodeError>;

/// Key role used by a keyring to pick the signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoleGroup {
    Transaction = 0,
    AccountUpdate = 1,
    FeePayer = 2,
}

impl RoleGroup {
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How the transaction fee is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeDelegation {
    /// The sender pays.
    None,
    /// The fee payer pays the whole fee.
    Full,
    /// The fee payer pays `feeRatio` percent of the fee.
    Partial,
}

macro_rules! tx_types {
    ($( $variant:ident = $tag:literal, $name:literal, $delegation:ident; )*) => {
        /// Registry of every transaction type understood by the codec.
        ///
        /// `Legacy` carries no tag on the wire, its raw form is a bare RLP list.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum TxType {
            Legacy,
            $( $variant, )*
        }

        impl TxType {
            pub const ALL: &'static [Self] = &[Self::Legacy, $( Self::$variant, )*];

            /// Wire tag, `None` for legacy transactions.
            #[must_use]
            pub const fn tag(self) -> Option<u8> {
                match self {
                    Self::Legacy => None,
                    $( Self::$variant => Some($tag), )*
                }
            }

            #[must_use]
            pub const fn from_tag(tag: u8) -> Option<Self> {
                match tag {
                    $( $tag => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// Type identifier, as reported by the node RPC.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    Self::Legacy => "TxTypeLegacyTransaction",
                    $( Self::$variant => $name, )*
                }
            }

            #[must_use]
            pub const fn fee_delegation(self) -> FeeDelegation {
                match self {
                    Self::Legacy => FeeDelegation::None,
                    $( Self::$variant => FeeDelegation::$delegation, )*
                }
            }
        }
    };
}

tx_types! {
    ValueTransfer = 0x08, "TxTypeValueTransfer", None;
    FeeDelegatedValueTransfer = 0x09, "TxTypeFeeDelegatedValueTransfer", Full;
    FeeDelegatedValueTransferWithRatio = 0x0a, "TxTypeFeeDelegatedValueTransferWithRatio", Partial;
    ValueTransferMemo = 0x10, "TxTypeValueTransferMemo", None;
    FeeDelegatedValueTransferMemo = 0x11, "TxTypeFeeDelegatedValueTransferMemo", Full;
    FeeDelegatedValueTransferMemoWithRatio = 0x12, "TxTypeFeeDelegatedValueTransferMemoWithRatio", Partial;
    AccountUpdate = 0x20, "TxTypeAccountUpdate", None;
    FeeDelegatedAccountUpdate = 0x21, "TxTypeFeeDelegatedAccountUpdate", Full;
    FeeDelegatedAccountUpdateWithRatio = 0x22, "TxTypeFeeDelegatedAccountUpdateWithRatio", Partial;
    SmartContractDeploy = 0x28, "TxTypeSmartContractDeploy", None;
    FeeDelegatedSmartContractDeploy = 0x29, "TxTypeFeeDelegatedSmartContractDeploy", Full;
    FeeDelegatedSmartContractDeployWithRatio = 0x2a, "TxTypeFeeDelegatedSmartContractDeployWithRatio", Partial;
    SmartContractExecution = 0x30, "TxTypeSmartContractExecution", None;
    FeeDelegatedSmartContractExecution = 0x31, "TxTypeFeeDelegatedSmartContractExecution", Full;
    FeeDelegatedSmartContractExecutionWithRatio = 0x32, "TxTypeFeeDelegatedSmartContractExecutionWithRatio", Partial;
    Cancel = 0x38, "TxTypeCancel", None;
    FeeDelegatedCancel = 0x39, "TxTypeFeeDelegatedCancel", Full;
    FeeDelegatedCancelWithRatio = 0x3a, "TxTypeFeeDelegatedCancelWithRatio", Partial;
    ChainDataAnchoring = 0x48, "TxTypeChainDataAnchoring", None;
    FeeDelegatedChainDataAnchoring = 0x49, "TxTypeFeeDelegatedChainDataAnchoring", Full;
    FeeDelegatedChainDataAnchoringWithRatio = 0x4a, "TxTypeFeeDelegatedChainDataAnchoringWithRatio", Partial;
}

impl TxType {
    #[must_use]
    pub const fn is_fee_delegated(self) -> bool {
        !matches!(self.fee_delegation(), FeeDelegation::None)
    }

    #[must_use]
    pub const fn is_partial_fee_delegated(self) -> bool {
        matches!(self.fee_delegation(), FeeDelegation::Partial)
    }

    /// Role of the key signing as sender. Account updates are signed with the
    /// account-update key, everything else with the transaction key.
    #[must_use]
    pub const fn role(self) -> RoleGroup {
        match self {
            Self::AccountUpdate |
            Self::FeeDelegatedAccountUpdate |
            Self::FeeDelegatedAccountUpdateWithRatio => RoleGroup::AccountUpdate,
            _ => RoleGroup::Transaction,
        }
    }

    /// Decode function bound to this type. The returned decoder rejects raw
    /// transactions carrying any other tag.
    #[must_use]
    pub fn decoder(self) -> Decoder {
        match self {
            Self::Legacy => |raw| LegacyTransaction::decode(raw).map(TypedTransaction::Legacy),
            Self::ValueTransfer => |raw| {
                BasicTransaction::<ValueTransfer>::decode(raw).map(TypedTransaction::ValueTransfer)
            },
            Self::FeeDelegatedValueTransfer => |raw| {
                FeeDelegatedTransaction::<ValueTransfer>::decode_exact(
                    raw,
                    Self::FeeDelegatedValueTransfer,
                )
                .map(TypedTransaction::FeeDelegatedValueTransfer)
            },
            Self::FeeDelegatedValueTransferWithRatio => |raw| {
                FeeDelegatedTransaction::<ValueTransfer>::decode_exact(
                    raw,
                    Self::FeeDelegatedValueTransferWithRatio,
                )
                .map(TypedTransaction::FeeDelegatedValueTransfer)
            },
            Self::ValueTransferMemo => |raw| {
                BasicTransaction::<ValueTransferMemo>::decode(raw)
                    .map(TypedTransaction::ValueTransferMemo)
            },
            Self::FeeDelegatedValueTransferMemo => |raw| {
                FeeDelegatedTransaction::<ValueTransferMemo>::decode_exact(
                    raw,
                    Self::FeeDelegatedValueTransferMemo,
                )
                .map(TypedTransaction::FeeDelegatedValueTransferMemo)
            },
            Self::FeeDelegatedValueTransferMemoWithRatio => |raw| {
                FeeDelegatedTransaction::<ValueTransferMemo>::decode_exact(
                    raw,
                    Self::FeeDelegatedValueTransferMemoWithRatio,
                )
                .map(TypedTransaction::FeeDelegatedValueTransferMemo)
            },
            Self::AccountUpdate => |raw| {
                BasicTransaction::<AccountUpdate>::decode(raw).map(TypedTransaction::AccountUpdate)
            },
            Self::FeeDelegatedAccountUpdate => |raw| {
                FeeDelegatedTransaction::<AccountUpdate>::decode_exact(
                    raw,
                    Self::FeeDelegatedAccountUpdate,
                )
                .map(TypedTransaction::FeeDelegatedAccountUpdate)
            },
            Self::FeeDelegatedAccountUpdateWithRatio => |raw| {
                FeeDelegatedTransaction::<AccountUpdate>::decode_exact(
                    raw,
                    Self::FeeDelegatedAccountUpdateWithRatio,
                )
                .map(TypedTransaction::FeeDelegatedAccountUpdate)
            },
            Self::SmartContractDeploy => |raw| {
                BasicTransaction::<SmartContractDeploy>::decode(raw)
                    .map(TypedTransaction::SmartContractDeploy)
            },
            Self::FeeDelegatedSmartContractDeploy => |raw| {
                FeeDelegatedTransaction::<SmartContractDeploy>::decode_exact(
                    raw,
                    Self::FeeDelegatedSmartContractDeploy,
                )
                .map(TypedTransaction::FeeDelegatedSmartContractDeploy)
            },
            Self::FeeDelegatedSmartContractDeployWithRatio => |raw| {
                FeeDelegatedTransaction::<SmartContractDeploy>::decode_exact(
                    raw,
                    Self::FeeDelegatedSmartContractDeployWithRatio,
                )
                .map(TypedTransaction::FeeDelegatedSmartContractDeploy)
            },
            Self::SmartContractExecution => |raw| {
                BasicTransaction::<SmartContractExecution>::decode(raw)
                    .map(TypedTransaction::SmartContractExecution)
            },
            Self::FeeDelegatedSmartContractExecution => |raw| {
                FeeDelegatedTransaction::<SmartContractExecution>::decode_exact(
                    raw,
                    Self::FeeDelegatedSmartContractExecution,
                )
                .map(TypedTransaction::FeeDelegatedSmartContractExecution)
            },
            Self::FeeDelegatedSmartContractExecutionWithRatio => |raw| {
                FeeDelegatedTransaction::<SmartContractExecution>::decode_exact(
                    raw,
                    Self::FeeDelegatedSmartContractExecutionWithRatio,
                )
                .map(TypedTransaction::FeeDelegatedSmartContractExecution)
            },
            Self::Cancel => {
                |raw| BasicTransaction::<Cancel>::decode(raw).map(TypedTransaction::Cancel)
            },
            Self::FeeDelegatedCancel => |raw| {
                FeeDelegatedTransaction::<Cancel>::decode_exact(raw, Self::FeeDelegatedCancel)
                    .map(TypedTransaction::FeeDelegatedCancel)
            },
            Self::FeeDelegatedCancelWithRatio => |raw| {
                FeeDelegatedTransaction::<Cancel>::decode_exact(
                    raw,
                    Self::FeeDelegatedCancelWithRatio,
                )
                .map(TypedTransaction::FeeDelegatedCancel)
            },
            Self::ChainDataAnchoring => |raw| {
                BasicTransaction::<ChainDataAnchoring>::decode(raw)
                    .map(TypedTransaction::ChainDataAnchoring)
            },
            Self::FeeDelegatedChainDataAnchoring => |raw| {
                FeeDelegatedTransaction::<ChainDataAnchoring>::decode_exact(
                    raw,
                    Self::FeeDelegatedChainDataAnchoring,
                )
                .map(TypedTransaction::FeeDelegatedChainDataAnchoring)
            },
            Self::FeeDelegatedChainDataAnchoringWithRatio => |raw| {
                FeeDelegatedTransaction::<ChainDataAnchoring>::decode_exact(
                    raw,
                    Self::FeeDelegatedChainDataAnchoringWithRatio,
                )
                .map(TypedTransaction::FeeDelegatedChainDataAnchoring)
            },
        }
    }
}

impl Display for TxType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction type: {0}")]
pub struct UnknownTxType(pub String);

impl FromStr for TxType {
    type Err = UnknownTxType;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|tx_type| tx_type.name() == name)
            .ok_or_else(|| UnknownTxType(name.to_string()))
    }
}
