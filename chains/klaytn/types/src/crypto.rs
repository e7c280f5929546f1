pub use crate::{
    signature::{RecoveryId, Signature},
    Address, H256,
};

/// cryptographic hash function and secp256k1 ECDSA signature recovery implementation
pub trait Crypto {
    type Error;

    fn keccak256_to(data: impl AsRef<[u8]>, output: &mut [u8; 32]);

    fn keccak256(data: impl AsRef<[u8]>) -> H256 {
        let mut hash = [0u8; 32];
        Self::keccak256_to(data, &mut hash);
        hash.into()
    }

    /// Verify and recover a `SECP256k1` ECDSA signature.
    ///
    /// - `signature` is signature passed in RSV format.
    /// - `message_hash` is the keccak256 hash of the message.
    ///
    /// # Errors
    /// Returns `Err` if the signature is bad, otherwise the recovered address.
    fn secp256k1_ecdsa_recover(
        signature: &Signature,
        message_hash: H256,
    ) -> Result<Address, Self::Error>;
}

pub trait Signer {
    type Error;

    /// Sign a message an arbitrary message.
    ///
    /// # Errors
    /// Returns `Err` if the message can't be signed.
    fn sign<I: AsRef<[u8]>>(
        &self,
        message: I,
        chain_id: Option<u64>,
    ) -> Result<Signature, Self::Error>;

    /// Sign the given message digest.
    ///
    /// # Errors
    /// Returns `Err` if the message can't be signed.
    fn sign_prehash(&self, prehash: H256, chain_id: Option<u64>) -> Result<Signature, Self::Error>;
}

pub struct DefaultCrypto;

impl DefaultCrypto {
    pub fn keccak256_to(data: impl AsRef<[u8]>, output: &mut [u8; 32]) {
        use sha3::Digest;
        let mut hasher = sha3::Keccak256::new();
        hasher.update(data);
        hasher.finalize_into(output.into());
    }

    #[must_use]
    pub fn keccak256(data: impl AsRef<[u8]>) -> H256 {
        use sha3::Digest;
        let hash: [u8; 32] = sha3::Keccak256::digest(data).into();
        hash.into()
    }

    /// # Errors
    /// Returns `Err` if the signature is malformed or does not recover to a public key.
    #[cfg(feature = "with-crypto")]
    pub fn secp256k1_ecdsa_recover(
        signature: &Signature,
        message_hash: H256,
    ) -> Result<Address, libsecp256k1::Error> {
        let mut sig = [0u8; 65];
        signature.to_raw_signature(&mut sig);
        let rid = libsecp256k1::RecoveryId::parse(sig[64])?;
        let sig = libsecp256k1::Signature::parse_overflowing_slice(&sig[0..64])?;
        let msg = libsecp256k1::Message::parse(message_hash.as_fixed_bytes());
        let pubkey = libsecp256k1::recover(&msg, &sig, &rid)?;
        let uncompressed = pubkey.serialize();
        let hash = Self::keccak256(&uncompressed[1..]);
        Ok(Address::from(hash))
    }
}

#[cfg(feature = "with-crypto")]
impl Crypto for DefaultCrypto {
    type Error = libsecp256k1::Error;

    fn keccak256_to(data: impl AsRef<[u8]>, output: &mut [u8; 32]) {
        Self::keccak256_to(data, output);
    }

    fn keccak256(data: impl AsRef<[u8]>) -> H256 {
        Self::keccak256(data)
    }

    fn secp256k1_ecdsa_recover(
        signature: &Signature,
        message_hash: H256,
    ) -> Result<Address, Self::Error> {
        Self::secp256k1_ecdsa_recover(signature, message_hash)
    }
}

/// A secp256k1 private key and the address derived from it.
#[cfg(feature = "with-crypto")]
#[derive(Clone)]
pub struct Keypair {
    keypair: secp256k1::Keypair,
}

#[cfg(feature = "with-crypto")]
impl Keypair {
    /// Create a new private key from a slice of bytes.
    ///
    /// # Errors
    /// Returns `Err` if the slice is greater than secp256k1 curve order.
    pub fn from_bytes<I: AsRef<[u8]>>(bytes: I) -> Result<Self, secp256k1::Error> {
        Self::from_slice(bytes.as_ref())
    }

    /// Create a new private key from a slice of bytes.
    ///
    /// # Errors
    /// Returns `Err` if the slice is greater than secp256k1 curve order.
    pub fn from_slice(slice: &[u8]) -> Result<Self, secp256k1::Error> {
        let secret = secp256k1::SecretKey::from_slice(slice)?;
        let keypair = secret.keypair(secp256k1::SECP256K1);
        Ok(Self { keypair })
    }

    #[must_use]
    pub fn pubkey_uncompressed(&self) -> [u8; 65] {
        self.keypair.public_key().serialize_uncompressed()
    }

    #[must_use]
    pub fn address(&self) -> Address {
        let uncompressed = self.pubkey_uncompressed();
        let hash = DefaultCrypto::keccak256(&uncompressed[1..]);
        Address::from(hash)
    }
}

#[cfg(feature = "with-crypto")]
impl core::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Keypair").field("address", &self.address()).finish_non_exhaustive()
    }
}

#[cfg(feature = "with-crypto")]
impl Signer for Keypair {
    type Error = secp256k1::Error;

    fn sign<I: AsRef<[u8]>>(
        &self,
        msg: I,
        chain_id: Option<u64>,
    ) -> Result<Signature, Self::Error> {
        self.sign_prehash(DefaultCrypto::keccak256(msg.as_ref()), chain_id)
    }

    fn sign_prehash(&self, prehash: H256, chain_id: Option<u64>) -> Result<Signature, Self::Error> {
        use crate::U256;
        use secp256k1::Message;

        let msg = Message::from_digest(prehash.0);
        let sig =
            secp256k1::SECP256K1.sign_ecdsa_recoverable(&msg, &self.keypair.secret_key());
        let (recovery_id, compact) = sig.serialize_compact();
        let r = U256::from_big_endian(&compact[0..32]);
        let s = U256::from_big_endian(&compact[32..64]);
        let v = u8::try_from(recovery_id.to_i32())
            .map_err(|_| secp256k1::Error::InvalidRecoveryId)
            .map(u64::from)?
            & 1;

        // Signatures whose s-value is greater than secp256k1n/2 are rejected by the network.
        let secp256k1_half_n = U256::from_big_endian(&secp256k1::constants::CURVE_ORDER) >> 1;
        if s > secp256k1_half_n {
            return Err(secp256k1::Error::IncorrectSignature);
        }
        let v = match chain_id {
            Some(chain_id) => RecoveryId::new(v)
                .as_eip155(chain_id)
                .ok_or(secp256k1::Error::InvalidRecoveryId)?,
            None => v,
        };
        Ok(Signature { v: RecoveryId::new(v), r, s })
    }
}

#[cfg(all(test, feature = "with-crypto"))]
mod tests {
    use super::{Crypto, DefaultCrypto, Keypair, Signer};
    use crate::{
        signature::{RecoveryId, Signature},
        Address, H256,
    };
    use hex_literal::hex;

    #[test]
    fn keccak256_works() {
        assert_eq!(
            DefaultCrypto::keccak256(b""),
            H256(hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"))
        );
        let mut output = [0u8; 32];
        <DefaultCrypto as Crypto>::keccak256_to(b"", &mut output);
        assert_eq!(H256(output), DefaultCrypto::keccak256(b""));
    }

    #[test]
    fn ecdsa_recover_works() {
        let signature = Signature {
            v: RecoveryId::new(0x1c),
            r: hex!("c8fc04e29b0859a7f265b67af7d4c5c6bc9e3d5a8de4950f89fa71a12a3cf8ae").into(),
            s: hex!("7dd15a10f9f2c8d1519a6044d880d04756798fc23923ff94f4823df8dc5b987a").into(),
        };
        let msg_hash =
            H256(hex!("341467bdde941ac08fc0ced98fbbb0db1d9d393909fda333288843b49525faf0"));
        let expected = Address::from(hex!("32be343b94f860124dc4fee278fdcbd38c102d88"));
        assert_eq!(DefaultCrypto::secp256k1_ecdsa_recover(&signature, msg_hash).unwrap(), expected);
    }

    #[test]
    fn sign_prehash_works() {
        let keypair =
            Keypair::from_bytes(hex!("fad9c8855b740a0b7ed4c221dbad0f33a83a49cad6b3fe8d5817ac83d38b6a19"))
                .unwrap();
        assert_eq!(keypair.address(), Address::from(hex!("96216849c49358b10257cb55b28ea603c874b05e")));

        let msg = hex!("e9808501ec5b05eb8301f6d194645d7d9f679a3b8aa4e7eedad709db14f6d3f44182dead808205398080");
        let expected = Signature {
            v: RecoveryId::new(0xa96),
            r: hex!("e138cf75eb34e837cf7cec412a89f48792e49f5a9c8693df722c7705584d813f").into(),
            s: hex!("2a1ff44833e17fd7439b2aff374c6fbe9fb1d4353c84188f6467891dfce409c5").into(),
        };
        let signature = keypair.sign(msg, Some(1337)).unwrap();
        assert_eq!(signature, expected);

        let prehash = DefaultCrypto::keccak256(msg);
        assert_eq!(DefaultCrypto::secp256k1_ecdsa_recover(&signature, prehash).unwrap(), keypair.address());
    }
}
