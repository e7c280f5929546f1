use super::{rlp_decode_fee_ratio, PayloadFields, TxPayload};
use crate::{
    error::ValidationError,
    rlp_utils::{RlpExt, RlpStreamExt},
    tx_type::TxType,
    validation::{self, FeeRatio},
    Address, Bytes,
};
use rlp::{DecoderError, Rlp, RlpStream};

/// Replaces the key of the sender account.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct AccountUpdate {
    /// The new account key, already RLP encoded. Carried opaquely.
    pub account_key: Bytes,
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct AccountUpdateParams {
    pub account_key: String,
}

impl TxPayload for AccountUpdate {
    const TX_TYPES: [TxType; 3] = [
        TxType::AccountUpdate,
        TxType::FeeDelegatedAccountUpdate,
        TxType::FeeDelegatedAccountUpdateWithRatio,
    ];
    const FIELD_COUNT: usize = 2;
    type Params = AccountUpdateParams;

    fn from_params(params: &Self::Params) -> Result<Self, ValidationError> {
        let account_key = validation::parse_data("accountKey", &params.account_key)?;
        if account_key.is_empty() {
            return Err(ValidationError::invalid("accountKey", params.account_key.as_str()));
        }
        Ok(Self { account_key })
    }

    fn rlp_append_fields(
        &self,
        stream: &mut RlpStream,
        from: Option<&Address>,
        fee_ratio: Option<FeeRatio>,
    ) {
        stream.append_opt(from).append(&self.account_key);
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
            payload: Self { account_key: rlp.val_at(offset + 1)? },
            from: rlp.opt_at(offset)?,
            fee_ratio: rlp_decode_fee_ratio(rlp, offset + 2, with_fee_ratio)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AccountUpdate, AccountUpdateParams};
    use crate::{
        transactions::{
            tests::{check_basic, check_fee_delegated},
            TransactionT, TxPayload,
        },
        tx_type::{RoleGroup, TxType},
        Bytes, H256,
    };
    use hex_literal::hex;

    static UNSIGNED: &[u8] = &hex!("20e58204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0b8201c0c4c3018080");
    static SIGNING_PAYLOAD: &[u8] = &hex!("e6a2e1208204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0b8201c0018080");
    static SIGNED: &[u8] = &hex!("20f8678204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0b8201c0f845f84325a0f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29aa06748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc");
    static FD_SIGNED: &[u8] = &hex!("21f8c38204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0b8201c0f845f84325a0f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29aa06748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc945a0043070275d9f6054307ee7348bd660849d90ff845f84326a0f45cf8d7f88c08e6b6ec0b3b562f34ca94283e4689021987abb6b0772ddfd80aa0298fe2c5aeabb6a518f4cbb5ff39631a5d88be505d3923374f65fdcf63c2955b");
    static FD_RATIO_SIGNED: &[u8] = &hex!("22f8c48204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0b8201c01ef845f84325a0f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29aa06748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc945a0043070275d9f6054307ee7348bd660849d90ff845f84326a0f45cf8d7f88c08e6b6ec0b3b562f34ca94283e4689021987abb6b0772ddfd80aa0298fe2c5aeabb6a518f4cbb5ff39631a5d88be505d3923374f65fdcf63c2955b");

    // legacy account key
    fn build_account_update() -> AccountUpdate {
        AccountUpdate { account_key: Bytes::from(hex!("01c0")) }
    }

    #[test]
    fn account_update_codec_works() {
        check_basic(
            build_account_update(),
            UNSIGNED,
            SIGNING_PAYLOAD,
            SIGNED,
            hex!("934d78079e936a109e249368346f94fa8f99e4e5c119a24d7931d3840cf201ff"),
        );
    }

    #[test]
    fn fee_delegated_account_update_codec_works() {
        let tx = check_fee_delegated(
            build_account_update(),
            None,
            FD_SIGNED,
            hex!("262a5f12e9e5026886d3e2dba373e90d2b63c36a61517613676176580395e660"),
        );
        assert_eq!(
            tx.sender_tx_hash().unwrap(),
            H256(hex!("dac7ad5f9e21884abbbceed5fc893929b9125a57a25cd9e31f20fc350509c565"))
        );
        assert_eq!(tx.tx_type().role(), RoleGroup::AccountUpdate);
        let tx = check_fee_delegated(
            build_account_update(),
            Some(30),
            FD_RATIO_SIGNED,
            hex!("da40c32ec65a0a15c97e937a2d81f1eb0099d5f584474606fb554c4e95e69308"),
        );
        assert_eq!(tx.tx_type(), TxType::FeeDelegatedAccountUpdateWithRatio);
    }

    #[test]
    fn account_key_is_required() {
        let params = AccountUpdateParams { account_key: "0x".into() };
        assert!(AccountUpdate::from_params(&params).is_err());
        let params = AccountUpdateParams { account_key: "0x01c0".into() };
        assert_eq!(AccountUpdate::from_params(&params).unwrap(), build_account_update());
    }
}
