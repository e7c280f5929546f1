use super::{rlp_decode_fee_ratio, PayloadFields, TxPayload};
use crate::{
    error::ValidationError,
    rlp_utils::{RlpExt, RlpStreamExt},
    tx_type::TxType,
    validation::{self, FeeRatio},
    Address, Bytes, U256,
};
use rlp::{DecoderError, Rlp, RlpStream};

/// Format of the deployed code. The network only accepts EVM bytecode.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodeFormat {
    #[default]
    Evm = 0,
}

impl rlp::Encodable for CodeFormat {
    fn rlp_append(&self, s: &mut RlpStream) {
        <u8 as rlp::Encodable>::rlp_append(&(*self as u8), s);
    }
}

impl rlp::Decodable for CodeFormat {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        match rlp.as_val::<u8>()? {
            0 => Ok(Self::Evm),
            _ => Err(DecoderError::Custom("unsupported code format")),
        }
    }
}

/// Deploys a smart contract.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SmartContractDeploy {
    /// Always `None` for transactions accepted by the network.
    pub to: Option<Address>,
    pub value: U256,
    /// Contract bytecode followed by the encoded constructor arguments.
    pub input: Bytes,
    pub human_readable: bool,
    pub code_format: CodeFormat,
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct SmartContractDeployParams {
    pub to: Option<String>,
    pub value: String,
    pub input: String,
    pub human_readable: bool,
    /// Quantity, `""` selects EVM.
    pub code_format: String,
}

impl TxPayload for SmartContractDeploy {
    const TX_TYPES: [TxType; 3] = [
        TxType::SmartContractDeploy,
        TxType::FeeDelegatedSmartContractDeploy,
        TxType::FeeDelegatedSmartContractDeployWithRatio,
    ];
    const FIELD_COUNT: usize = 6;
    type Params = SmartContractDeployParams;

    fn from_params(params: &Self::Params) -> Result<Self, ValidationError> {
        if let Some(to) = params.to.as_deref().filter(|to| !validation::is_unset(to)) {
            return Err(ValidationError::invalid("to", to));
        }
        if params.human_readable {
            return Err(ValidationError::invalid("humanReadable", "true"));
        }
        if !validation::is_unset(&params.code_format) &&
            validation::parse_u64("codeFormat", &params.code_format)? != CodeFormat::Evm as u64
        {
            return Err(ValidationError::invalid("codeFormat", params.code_format.as_str()));
        }
        Ok(Self {
            to: None,
            value: validation::parse_u256("value", &params.value)?,
            input: validation::parse_data("input", &params.input)?,
            human_readable: false,
            code_format: CodeFormat::Evm,
        })
    }

    fn rlp_append_fields(
        &self,
        stream: &mut RlpStream,
        from: Option<&Address>,
        fee_ratio: Option<FeeRatio>,
    ) {
        stream
            .append_opt(self.to.as_ref())
            .append(&self.value)
            .append_opt(from)
            .append(&self.input)
            .append(&self.human_readable);
        if let Some(fee_ratio) = fee_ratio {
            stream.append(&fee_ratio);
        }
        stream.append(&self.code_format);
    }

    fn rlp_decode_fields(
        rlp: &Rlp,
        offset: usize,
        with_fee_ratio: bool,
    ) -> Result<PayloadFields<Self>, DecoderError> {
        let fee_ratio = rlp_decode_fee_ratio(rlp, offset + 5, with_fee_ratio)?;
        let code_format_index = offset + 5 + usize::from(with_fee_ratio);
        Ok(PayloadFields {
            payload: Self {
                to: rlp.opt_at(offset)?,
                value: rlp.val_at(offset + 1)?,
                input: rlp.val_at(offset + 3)?,
                human_readable: rlp.val_at(offset + 4)?,
                code_format: rlp.val_at(code_format_index)?,
            },
            from: rlp.opt_at(offset + 2)?,
            fee_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CodeFormat, SmartContractDeploy, SmartContractDeployParams};
    use crate::{
        error::ValidationError,
        transactions::{
            tests::{check_basic, check_fee_delegated},
            BasicTransaction, TransactionT, TxPayload,
        },
        Bytes, H256, U256,
    };
    use hex_literal::hex;

    static UNSIGNED: &[u8] = &hex!("28f8398204d219830f4240808094a94f5374fce5edbc8e2a8697c15331677e6ebf0b92608060405234801561001057600080fd5b508080c4c3018080");
    static SIGNING_PAYLOAD: &[u8] = &hex!("f83ab6f5288204d219830f4240808094a94f5374fce5edbc8e2a8697c15331677e6ebf0b92608060405234801561001057600080fd5b508080018080");
    static SIGNED: &[u8] = &hex!("28f87b8204d219830f4240808094a94f5374fce5edbc8e2a8697c15331677e6ebf0b92608060405234801561001057600080fd5b508080f845f84325a0f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29aa06748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc");
    static FD_SIGNED: &[u8] = &hex!("29f8d78204d219830f4240808094a94f5374fce5edbc8e2a8697c15331677e6ebf0b92608060405234801561001057600080fd5b508080f845f84325a0f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29aa06748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc945a0043070275d9f6054307ee7348bd660849d90ff845f84326a0f45cf8d7f88c08e6b6ec0b3b562f34ca94283e4689021987abb6b0772ddfd80aa0298fe2c5aeabb6a518f4cbb5ff39631a5d88be505d3923374f65fdcf63c2955b");
    // fee ratio sits between humanReadable and codeFormat
    static FD_RATIO_SIGNED: &[u8] = &hex!("2af8d88204d219830f4240808094a94f5374fce5edbc8e2a8697c15331677e6ebf0b92608060405234801561001057600080fd5b50801e80f845f84325a0f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29aa06748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc945a0043070275d9f6054307ee7348bd660849d90ff845f84326a0f45cf8d7f88c08e6b6ec0b3b562f34ca94283e4689021987abb6b0772ddfd80aa0298fe2c5aeabb6a518f4cbb5ff39631a5d88be505d3923374f65fdcf63c2955b");

    fn build_deploy() -> SmartContractDeploy {
        SmartContractDeploy {
            input: Bytes::from(hex!("608060405234801561001057600080fd5b50")),
            ..SmartContractDeploy::default()
        }
    }

    #[test]
    fn code_format_rlp_is_a_single_item() {
        let mut stream = rlp::RlpStream::new_list(2);
        stream.append(&CodeFormat::Evm).append(&0u8);
        assert_eq!(&stream.out()[..], &hex!("c28080"));
        assert_eq!(
            rlp::Rlp::new(&hex!("c101")).val_at::<CodeFormat>(0),
            Err(rlp::DecoderError::Custom("unsupported code format"))
        );
    }

    #[test]
    fn smart_contract_deploy_codec_works() {
        check_basic(
            build_deploy(),
            UNSIGNED,
            SIGNING_PAYLOAD,
            SIGNED,
            hex!("2c8f342aea75904f8231663abed8d626a8d1aed991282dff305c4e7116f41d6f"),
        );
    }

    #[test]
    fn fee_delegated_smart_contract_deploy_codec_works() {
        let tx = check_fee_delegated(
            build_deploy(),
            None,
            FD_SIGNED,
            hex!("8bac3987627215daaac32b6670ee2803ebcce921161f77aa85b8396f80b94657"),
        );
        assert_eq!(
            tx.sender_tx_hash().unwrap(),
            H256(hex!("5da0e5bea82199eec15770e8030cb460518bb9e13d41710ee9bb1ffb87ebf773"))
        );
        check_fee_delegated(
            build_deploy(),
            Some(30),
            FD_RATIO_SIGNED,
            hex!("f3835b6d1bae5d09fce6d04e95d0cc69499c18c6dcc5e0b6f44e0ed7e814364f"),
        );
    }

    #[test]
    fn unsupported_code_format_is_rejected() {
        let mut raw = SIGNED.to_vec();
        // codeFormat is the item right before the signature list
        let index = raw.len() - 72;
        assert_eq!(raw[index], 0x80);
        raw[index] = 0x01;
        assert!(BasicTransaction::<SmartContractDeploy>::decode(&raw).is_err());
    }

    #[test]
    fn deploy_params_are_restricted() {
        let params = SmartContractDeployParams {
            to: Some("0x".into()),
            value: "0x0".into(),
            input: "0x608060405234801561001057600080fd5b50".into(),
            human_readable: false,
            code_format: "0x0".into(),
        };
        assert_eq!(SmartContractDeploy::from_params(&params).unwrap(), build_deploy());
        assert_eq!(SmartContractDeploy::from_params(&params).unwrap().value, U256::zero());

        let human_readable = SmartContractDeployParams { human_readable: true, ..params.clone() };
        assert_eq!(
            SmartContractDeploy::from_params(&human_readable),
            Err(ValidationError::InvalidField { name: "humanReadable", value: "true".into() })
        );
        let code_format = SmartContractDeployParams { code_format: "0x1".into(), ..params.clone() };
        assert!(SmartContractDeploy::from_params(&code_format).is_err());
        let to = SmartContractDeployParams {
            to: Some("0x7b65b75d204abed71587c9e519a89277766ee1d0".into()),
            ..params
        };
        assert!(SmartContractDeploy::from_params(&to).is_err());
    }
}
