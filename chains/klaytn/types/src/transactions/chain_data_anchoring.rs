use super::{rlp_decode_fee_ratio, PayloadFields, TxPayload};
use crate::{
    error::ValidationError,
    rlp_utils::{RlpExt, RlpStreamExt},
    tx_type::TxType,
    validation::{self, FeeRatio},
    Address, Bytes,
};
use rlp::{DecoderError, Rlp, RlpStream};

/// Anchors service chain data, usually a block summary, to the main chain.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ChainDataAnchoring {
    /// RLP encoded anchored data.
    pub input: Bytes,
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ChainDataAnchoringParams {
    pub input: String,
}

impl TxPayload for ChainDataAnchoring {
    const TX_TYPES: [TxType; 3] = [
        TxType::ChainDataAnchoring,
        TxType::FeeDelegatedChainDataAnchoring,
        TxType::FeeDelegatedChainDataAnchoringWithRatio,
    ];
    const FIELD_COUNT: usize = 2;
    type Params = ChainDataAnchoringParams;

    fn from_params(params: &Self::Params) -> Result<Self, ValidationError> {
        Ok(Self { input: validation::parse_data("input", &params.input)? })
    }

    fn rlp_append_fields(
        &self,
        stream: &mut RlpStream,
        from: Option<&Address>,
        fee_ratio: Option<FeeRatio>,
    ) {
        stream.append_opt(from).append(&self.input);
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
            payload: Self { input: rlp.val_at(offset + 1)? },
            from: rlp.opt_at(offset)?,
            fee_ratio: rlp_decode_fee_ratio(rlp, offset + 2, with_fee_ratio)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ChainDataAnchoring;
    use crate::{
        transactions::{
            tests::{check_basic, check_fee_delegated},
            TransactionT,
        },
        Bytes, H256,
    };
    use hex_literal::hex;

    static UNSIGNED: &[u8] = &hex!("48f8468204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0ba3f8a6a00000000000000000000000000000000000000000000000000000000000000000c4c3018080");
    static SIGNING_PAYLOAD: &[u8] = &hex!("f849b844f842488204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0ba3f8a6a00000000000000000000000000000000000000000000000000000000000000000018080");
    static SIGNED: &[u8] = &hex!("48f8888204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0ba3f8a6a00000000000000000000000000000000000000000000000000000000000000000f845f84325a0f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29aa06748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc");
    static FD_SIGNED: &[u8] = &hex!("49f8e48204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0ba3f8a6a00000000000000000000000000000000000000000000000000000000000000000f845f84325a0f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29aa06748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc945a0043070275d9f6054307ee7348bd660849d90ff845f84326a0f45cf8d7f88c08e6b6ec0b3b562f34ca94283e4689021987abb6b0772ddfd80aa0298fe2c5aeabb6a518f4cbb5ff39631a5d88be505d3923374f65fdcf63c2955b");
    static FD_RATIO_SIGNED: &[u8] = &hex!("4af8e58204d219830f424094a94f5374fce5edbc8e2a8697c15331677e6ebf0ba3f8a6a000000000000000000000000000000000000000000000000000000000000000001ef845f84325a0f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29aa06748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc945a0043070275d9f6054307ee7348bd660849d90ff845f84326a0f45cf8d7f88c08e6b6ec0b3b562f34ca94283e4689021987abb6b0772ddfd80aa0298fe2c5aeabb6a518f4cbb5ff39631a5d88be505d3923374f65fdcf63c2955b");

    fn build_anchoring() -> ChainDataAnchoring {
        ChainDataAnchoring {
            input: Bytes::from(hex!(
                "f8a6a00000000000000000000000000000000000000000000000000000000000000000"
            )),
        }
    }

    #[test]
    fn chain_data_anchoring_codec_works() {
        check_basic(
            build_anchoring(),
            UNSIGNED,
            SIGNING_PAYLOAD,
            SIGNED,
            hex!("6dd8d2902ce7f757e5c0d5312d3de0d05d2bba7adf101e1ffaf5ace8056d6abe"),
        );
    }

    #[test]
    fn fee_delegated_chain_data_anchoring_codec_works() {
        let tx = check_fee_delegated(
            build_anchoring(),
            None,
            FD_SIGNED,
            hex!("235e23b50ef1820deaaea83bbaa8202d9ced2edc7be5a37e75e54e8dfa7f0e42"),
        );
        assert_eq!(
            tx.sender_tx_hash().unwrap(),
            H256(hex!("901bef527d7426aa8573d90de783c4393109c51c1c5a03eb57d618b035e04805"))
        );
        check_fee_delegated(
            build_anchoring(),
            Some(30),
            FD_RATIO_SIGNED,
            hex!("5ecf96911e17be08077b48e34629efe84f69f25a070b25ac91118bfcebc1a672"),
        );
    }
}
