use super::{rlp_body, TransactionT, TxCommon};
use crate::{
    error::{DecodeError, ValidationError},
    params::TxCommonParams,
    rlp_utils::{RlpExt, RlpStreamExt},
    signature::Signature,
    tx_type::TxType,
    validation,
    Address, Bytes, U256,
};
use rlp::{DecoderError, RlpStream};

#[cfg(feature = "with-crypto")]
use crate::crypto::DefaultCrypto;

/// Untagged transaction compatible with the Ethereum pre-[EIP-2718] format, signed with
/// an [EIP-155] payload.
///
/// Carries a single signature and no sender, the sender is the signer.
///
/// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
/// [EIP-155]: https://eips.ethereum.org/EIPS/eip-155
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct LegacyTransaction {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub common: TxCommon,
    /// `None` deploys a contract.
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct LegacyTransactionParams {
    pub to: Option<String>,
    pub value: String,
    pub input: String,
}

impl LegacyTransaction {
    /// # Errors
    /// Returns `Err` if a parameter is malformed.
    pub fn from_params(
        common: &TxCommonParams,
        params: &LegacyTransactionParams,
    ) -> Result<Self, ValidationError> {
        let mut tx = Self {
            common: TxCommon::try_from(common)?,
            to: validation::parse_optional_address("to", params.to.as_deref())?,
            value: validation::parse_u256("value", &params.value)?,
            input: validation::parse_data("input", &params.input)?,
        };
        let signatures = std::mem::take(&mut tx.common.signatures);
        tx.append_signatures(&signatures)?;
        Ok(tx)
    }

    /// Decodes `RLP([nonce, gasPrice, gas, to, value, input (, v, r, s)])`.
    ///
    /// # Errors
    /// Returns `Err` if the raw transaction is not a 6 or 9 items RLP list.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let rlp = rlp_body(raw)?;
        let signature = match rlp.item_count()? {
            6 => None,
            9 => Some(Signature { v: rlp.val_at(6)?, r: rlp.val_at(7)?, s: rlp.val_at(8)? }),
            _ => return Err(DecoderError::RlpIncorrectListLen.into()),
        };
        let signatures: Vec<Signature> =
            signature.into_iter().filter(|signature| !signature.is_empty()).collect();
        let common = TxCommon {
            from: None,
            nonce: Some(rlp.val_at(0)?),
            gas: rlp.val_at(2)?,
            gas_price: Some(rlp.val_at(1)?),
            chain_id: TxCommon::chain_id_from(&signatures),
            signatures,
        };
        Ok(Self {
            common,
            to: rlp.opt_at(3)?,
            value: rlp.val_at(4)?,
            input: rlp.val_at(5)?,
        })
    }

    fn rlp_append_fields(&self, stream: &mut RlpStream) -> Result<(), ValidationError> {
        let nonce = self.common.require_nonce()?;
        let gas_price = self.common.require_gas_price()?;
        stream
            .append(&nonce)
            .append(&gas_price)
            .append(&self.common.gas)
            .append_opt(self.to.as_ref())
            .append(&self.value)
            .append(&self.input);
        Ok(())
    }

    /// Senders are compared when both are known. A signed transaction without `from`
    /// is sent by the key behind its signature.
    fn same_sender(&self, other: &Self) -> bool {
        match (self.common.from, other.common.from) {
            (Some(this), Some(other)) => this == other,
            (Some(from), None) => other.is_unsigned_or_signed_by(from),
            (None, Some(from)) => self.is_unsigned_or_signed_by(from),
            (None, None) => true,
        }
    }

    #[cfg(feature = "with-crypto")]
    fn is_unsigned_or_signed_by(&self, address: Address) -> bool {
        let Some(signature) = self.common.signatures.first() else {
            return true;
        };
        let signer = self
            .signature_hash()
            .ok()
            .and_then(|hash| DefaultCrypto::secp256k1_ecdsa_recover(signature, hash).ok());
        signer == Some(address)
    }

    #[cfg(not(feature = "with-crypto"))]
    fn is_unsigned_or_signed_by(&self, _address: Address) -> bool {
        true
    }
}

impl TransactionT for LegacyTransaction {
    fn tx_type(&self) -> TxType {
        TxType::Legacy
    }

    fn common(&self) -> &TxCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut TxCommon {
        &mut self.common
    }

    /// Unsigned transactions carry the empty placeholder signature.
    fn rlp_encode(&self) -> Result<Bytes, ValidationError> {
        let signature = self.common.signatures.first().copied().unwrap_or(Signature::EMPTY);
        let mut stream = RlpStream::new_list(9);
        self.rlp_append_fields(&mut stream)?;
        stream.append(&signature.v).append(&signature.r).append(&signature.s);
        Ok(stream.out().freeze().into())
    }

    fn rlp_encode_for_signature(&self) -> Result<Bytes, ValidationError> {
        self.common.validate_optional_values(true)?;
        let chain_id = self.common.chain_id.unwrap_or_default();
        let mut stream = RlpStream::new_list(9);
        self.rlp_append_fields(&mut stream)?;
        stream.append(&chain_id).append(&0u8).append(&0u8);
        Ok(stream.out().freeze().into())
    }

    /// Keeps at most one signature. Appending the signature already held is a no-op.
    fn append_signatures(&mut self, signatures: &[Signature]) -> Result<(), ValidationError> {
        let mut current = self.common.signatures.first().copied();
        for signature in signatures.iter().filter(|signature| !signature.is_empty()) {
            match current {
                None => current = Some(*signature),
                Some(existing) if existing == *signature => {},
                Some(_) => return Err(ValidationError::TooManySignatures(TxType::Legacy)),
            }
        }
        self.common.signatures = current.into_iter().collect();
        Ok(())
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.common.same_fields(&other.common, true) &&
            self.same_sender(other) &&
            self.to == other.to &&
            self.value == other.value &&
            self.input == other.input
    }

    fn fill_unset_from(&mut self, other: &Self) {
        self.common.fill_unset_from(&other.common);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{LegacyTransaction, LegacyTransactionParams};
    use crate::{
        error::{DecodeError, ValidationError},
        params::TxCommonParams,
        signature::{RecoveryId, Signature},
        transactions::{TransactionT, TxCommon},
        tx_type::TxType,
        Address, Bytes, H256, U256,
    };
    use hex_literal::hex;

    // https://eips.ethereum.org/EIPS/eip-155#example
    static SIGNING_PAYLOAD: &[u8] = &hex!("ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080");
    static SIGNED: &[u8] = &hex!("f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83");
    static UNSIGNED_SHORT: &[u8] = &hex!("e9098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080");

    pub fn build_legacy() -> (LegacyTransaction, Signature) {
        let tx = LegacyTransaction {
            common: TxCommon::new(21000)
                .with_nonce(9)
                .with_gas_price(20_000_000_000u64)
                .with_chain_id(1),
            to: Some(Address::from(hex!("3535353535353535353535353535353535353535"))),
            value: U256::from(1_000_000_000_000_000_000u64),
            input: Bytes::new(),
        };
        let signature = Signature {
            v: RecoveryId::new(37),
            r: hex!("28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276").into(),
            s: hex!("67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83").into(),
        };
        (tx, signature)
    }

    #[test]
    fn legacy_codec_works() {
        let (mut tx, signature) = build_legacy();
        assert_eq!(&tx.rlp_encode_for_signature().unwrap()[..], SIGNING_PAYLOAD);
        assert_eq!(
            tx.signature_hash().unwrap(),
            H256(hex!("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"))
        );
        // placeholder signature
        assert_eq!(&tx.rlp_encode().unwrap()[..], SIGNING_PAYLOAD);

        tx.append_signatures(&[signature]).unwrap();
        assert_eq!(&tx.rlp_encode().unwrap()[..], SIGNED);
        assert_eq!(
            tx.tx_hash().unwrap(),
            H256(hex!("33469b22e9f636356c4160a87eb19df52b7412e8eac32a4a55ffe88ea8350788"))
        );
        assert_eq!(tx.sender_tx_hash().unwrap(), tx.tx_hash().unwrap());
        assert_eq!(LegacyTransaction::decode(SIGNED).unwrap(), tx);
    }

    #[test]
    fn unsigned_forms_decode_without_signature() {
        let (tx, _) = build_legacy();
        let short = LegacyTransaction::decode(UNSIGNED_SHORT).unwrap();
        let placeholder = LegacyTransaction::decode(SIGNING_PAYLOAD).unwrap();
        for decoded in [short, placeholder] {
            assert!(decoded.common.signatures.is_empty());
            assert_eq!(decoded.common.chain_id, None);
            assert!(decoded.same_fields(&tx));
        }
        assert_eq!(
            LegacyTransaction::decode(&hex!("c3010203")),
            Err(DecodeError::Rlp(rlp::DecoderError::RlpIncorrectListLen))
        );
    }

    #[test]
    fn only_one_signature_is_kept() {
        let (mut tx, signature) = build_legacy();
        tx.append_signatures(&[Signature::EMPTY, signature]).unwrap();
        tx.append_signatures(&[signature]).unwrap();
        assert_eq!(tx.common.signatures, vec![signature]);

        let other = Signature { s: U256::one(), ..signature };
        assert_eq!(
            tx.append_signatures(&[other]),
            Err(ValidationError::TooManySignatures(TxType::Legacy))
        );
        assert_eq!(tx.common.signatures, vec![signature]);
    }

    #[test]
    fn from_params_works() {
        let common = TxCommonParams {
            nonce: Some("0x9".into()),
            gas: "21000".into(),
            gas_price: Some("20000000000".into()),
            chain_id: Some("1".into()),
            ..TxCommonParams::default()
        };
        let params = LegacyTransactionParams {
            to: Some("0x3535353535353535353535353535353535353535".into()),
            value: "0xde0b6b3a7640000".into(),
            input: "0x".into(),
        };
        assert_eq!(LegacyTransaction::from_params(&common, &params).unwrap(), build_legacy().0);
    }
}
