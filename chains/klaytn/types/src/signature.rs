use crate::U256;

/// An ECDSA signature tuple, RLP encoded as `[v, r, s]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Signature {
    /// The ECDSA recovery id, Klaytn always encodes the chain id into it
    /// (`v = y_parity + 35 + chain_id * 2`).
    pub v: RecoveryId,
    /// The ECDSA signature r
    pub r: U256,
    /// The ECDSA signature s
    pub s: U256,
}

impl Signature {
    /// Placeholder written on the wire where no signature exists yet, `[0x01, 0x80, 0x80]`.
    pub const EMPTY: Self = Self { v: RecoveryId::new(1), r: U256::zero(), s: U256::zero() };

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn to_raw_signature(&self, output: &mut [u8; 65]) {
        self.r.to_big_endian(&mut output[0..32]);
        self.s.to_big_endian(&mut output[32..64]);
        output[64] = self.v.y_parity() as u8;
    }
}

impl rlp::Encodable for Signature {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(3).append(&self.v).append(&self.r).append(&self.s);
    }
}

impl rlp::Decodable for Signature {
    fn decode(rlp: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }
        Ok(Self { v: rlp.val_at(0)?, r: rlp.val_at(1)?, s: rlp.val_at(2)? })
    }
}

/// The ECDSA recovery id, encodes the parity of the y-coordinate and the chain id.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct RecoveryId(u64);

impl RecoveryId {
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the parity (0 for even, 1 for odd) of the y-value of a secp256k1 signature.
    #[must_use]
    pub const fn y_parity(self) -> u64 {
        let v = self.as_u64();

        // [EIP-155]: https://eips.ethereum.org/EIPS/eip-155
        if v >= 35 {
            return (v - 35) & 1;
        }

        if v == 27 || v == 28 {
            return v - 27;
        }

        v & 1
    }

    /// Chain id encoded in `v`, if any.
    #[must_use]
    pub const fn chain_id(self) -> Option<u64> {
        let v = self.as_u64();
        if v >= 35 {
            Some((v - 35) >> 1)
        } else {
            None
        }
    }

    /// Applies [EIP155](https://github.com/ethereum/EIPs/blob/master/EIPS/eip-155.md),
    /// `None` when the resulting `v` does not fit in a u64.
    #[must_use]
    pub fn as_eip155<I: Into<u64>>(self, chain_id: I) -> Option<u64> {
        chain_id.into().checked_mul(2)?.checked_add(35 + self.y_parity())
    }
}

impl From<RecoveryId> for u64 {
    fn from(v: RecoveryId) -> Self {
        v.as_u64()
    }
}

impl From<u64> for RecoveryId {
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl rlp::Encodable for RecoveryId {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        <u64 as rlp::Encodable>::rlp_append(&self.0, s);
    }
}

impl rlp::Decodable for RecoveryId {
    fn decode(rlp: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        <u64 as rlp::Decodable>::decode(rlp).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::{RecoveryId, Signature};
    use crate::U256;
    use hex_literal::hex;

    #[test]
    fn empty_signature_wire_format() {
        assert_eq!(&rlp::encode(&Signature::EMPTY)[..], &hex!("c3018080"));
        let decoded: Signature = rlp::decode(&hex!("c3018080")).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn signature_rlp_uses_minimal_integers() {
        let signature = Signature {
            v: RecoveryId::new(0x4055),
            r: U256::from(0x0102u64),
            s: hex!("00000000000000000000000000000000000000000000000000000000000000ff").into(),
        };
        let encoded = rlp::encode(&signature);
        assert_eq!(&encoded[..], &hex!("c882405582010281ff"));
        assert_eq!(rlp::decode::<Signature>(&encoded).unwrap(), signature);
    }

    #[test]
    fn klaytn_recovery_id_encodes_chain_id() {
        // cypress: 8217 * 2 + 35 + parity
        let v = RecoveryId::new(0).as_eip155(8217u64).unwrap();
        assert_eq!(v, 0x4055);
        assert_eq!(RecoveryId::new(0).as_eip155(u64::MAX / 2 - 17), Some(u64::MAX));
        assert_eq!(RecoveryId::new(1).as_eip155(u64::MAX / 2 - 17), None);
        assert_eq!(RecoveryId::new(0).as_eip155(u64::MAX / 2), None);
        assert_eq!(RecoveryId::new(0).as_eip155(u64::MAX), None);
        assert_eq!(RecoveryId::new(v).chain_id(), Some(8217));
        assert_eq!(RecoveryId::new(0x4056).y_parity(), 1);
        assert_eq!(Signature::EMPTY.v.chain_id(), None);
    }
}
