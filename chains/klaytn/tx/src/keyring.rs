use rosetta_klaytn_types::{
    crypto::{Keypair, Signer},
    ext::secp256k1,
    Address, RecoveryId, RoleGroup, Signature, H256,
};

/// Holds the keys of one account and signs digests on its behalf.
///
/// A keyring is decoupled when its address is not derived from its key, which is
/// the case for every account using more than one key.
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait Keyring {
    type Error: std::error::Error + Send + Sync + 'static;

    fn address(&self) -> Address;

    fn is_decoupled(&self) -> bool;

    /// Signs `hash` with the `index`-th key of `role`.
    ///
    /// # Errors
    /// Returns `Err` if no such key exists or signing fails.
    fn sign(
        &self,
        hash: H256,
        chain_id: u64,
        role: RoleGroup,
        index: usize,
    ) -> Result<Signature, Self::Error>;

    /// Signs `hash` with every key of `role`, in key order.
    ///
    /// # Errors
    /// Returns `Err` if the role has no key or signing fails.
    fn sign_all(
        &self,
        hash: H256,
        chain_id: u64,
        role: RoleGroup,
    ) -> Result<Vec<Signature>, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum KeyringError {
    #[error("key index {index} is out of range, the {role:?} role holds {len} keys")]
    IndexOutOfRange { role: RoleGroup, index: usize, len: usize },
    #[error("no key is available for the {0:?} role")]
    NoKey(RoleGroup),
    #[error("chain id {0} cannot be encoded in a signature")]
    ChainIdOutOfRange(u64),
    #[error(transparent)]
    Secp256k1(#[from] secp256k1::Error),
}

/// `v` holds `35 + 2 * chain_id + parity`.
fn check_chain_id(chain_id: u64) -> Result<(), KeyringError> {
    match RecoveryId::new(1).as_eip155(chain_id) {
        Some(_) => Ok(()),
        None => Err(KeyringError::ChainIdOutOfRange(chain_id)),
    }
}

fn sign_with(
    keys: &[Keypair],
    hash: H256,
    chain_id: u64,
    role: RoleGroup,
    index: usize,
) -> Result<Signature, KeyringError> {
    check_chain_id(chain_id)?;
    let key =
        keys.get(index).ok_or(KeyringError::IndexOutOfRange { role, index, len: keys.len() })?;
    Ok(key.sign_prehash(hash, Some(chain_id))?)
}

fn sign_all_with(
    keys: &[Keypair],
    hash: H256,
    chain_id: u64,
) -> Result<Vec<Signature>, KeyringError> {
    check_chain_id(chain_id)?;
    keys.iter()
        .map(|key| key.sign_prehash(hash, Some(chain_id)).map_err(KeyringError::from))
        .collect()
}

/// One key, used for every role.
#[derive(Debug, Clone)]
pub struct SingleKeyring {
    address: Address,
    key: Keypair,
}

impl SingleKeyring {
    pub fn new(key: Keypair) -> Self {
        Self { address: key.address(), key }
    }

    /// # Errors
    /// Returns `Err` if `secret` is not a valid secp256k1 secret key.
    pub fn from_bytes<I: AsRef<[u8]>>(secret: I) -> Result<Self, KeyringError> {
        Ok(Self::new(Keypair::from_bytes(secret)?))
    }

    /// Keyring of an account whose key was updated away from the one derived from
    /// its address.
    pub const fn decoupled(address: Address, key: Keypair) -> Self {
        Self { address, key }
    }

    pub const fn key(&self) -> &Keypair {
        &self.key
    }
}

impl Keyring for SingleKeyring {
    type Error = KeyringError;

    fn address(&self) -> Address {
        self.address
    }

    fn is_decoupled(&self) -> bool {
        self.address != self.key.address()
    }

    fn sign(
        &self,
        hash: H256,
        chain_id: u64,
        role: RoleGroup,
        index: usize,
    ) -> Result<Signature, Self::Error> {
        sign_with(std::slice::from_ref(&self.key), hash, chain_id, role, index)
    }

    fn sign_all(
        &self,
        hash: H256,
        chain_id: u64,
        _role: RoleGroup,
    ) -> Result<Vec<Signature>, Self::Error> {
        sign_all_with(std::slice::from_ref(&self.key), hash, chain_id)
    }
}

/// Several keys, all of them used for every role.
#[derive(Debug, Clone)]
pub struct MultipleKeyring {
    address: Address,
    keys: Vec<Keypair>,
}

impl MultipleKeyring {
    /// # Errors
    /// Returns `Err` if `keys` is empty.
    pub fn new(address: Address, keys: Vec<Keypair>) -> Result<Self, KeyringError> {
        if keys.is_empty() {
            return Err(KeyringError::NoKey(RoleGroup::Transaction));
        }
        Ok(Self { address, keys })
    }

    pub fn keys(&self) -> &[Keypair] {
        &self.keys
    }
}

impl Keyring for MultipleKeyring {
    type Error = KeyringError;

    fn address(&self) -> Address {
        self.address
    }

    fn is_decoupled(&self) -> bool {
        true
    }

    fn sign(
        &self,
        hash: H256,
        chain_id: u64,
        role: RoleGroup,
        index: usize,
    ) -> Result<Signature, Self::Error> {
        sign_with(&self.keys, hash, chain_id, role, index)
    }

    fn sign_all(
        &self,
        hash: H256,
        chain_id: u64,
        _role: RoleGroup,
    ) -> Result<Vec<Signature>, Self::Error> {
        sign_all_with(&self.keys, hash, chain_id)
    }
}

/// Separate keys per [`RoleGroup`], indexed by [`RoleGroup::index`].
///
/// Roles without keys sign with the transaction role keys.
#[derive(Debug, Clone)]
pub struct RoleBasedKeyring {
    address: Address,
    keys: [Vec<Keypair>; 3],
}

impl RoleBasedKeyring {
    pub const fn new(address: Address, keys: [Vec<Keypair>; 3]) -> Self {
        Self { address, keys }
    }

    /// # Errors
    /// Returns `Err` if neither `role` nor the transaction role holds a key.
    pub fn keys_by_role(&self, role: RoleGroup) -> Result<&[Keypair], KeyringError> {
        let keys = &self.keys[role.index()];
        if !keys.is_empty() {
            return Ok(keys);
        }
        let fallback = &self.keys[RoleGroup::Transaction.index()];
        if fallback.is_empty() {
            return Err(KeyringError::NoKey(role));
        }
        Ok(fallback)
    }
}

impl Keyring for RoleBasedKeyring {
    type Error = KeyringError;

    fn address(&self) -> Address {
        self.address
    }

    fn is_decoupled(&self) -> bool {
        true
    }

    fn sign(
        &self,
        hash: H256,
        chain_id: u64,
        role: RoleGroup,
        index: usize,
    ) -> Result<Signature, Self::Error> {
        sign_with(self.keys_by_role(role)?, hash, chain_id, role, index)
    }

    fn sign_all(
        &self,
        hash: H256,
        chain_id: u64,
        role: RoleGroup,
    ) -> Result<Vec<Signature>, Self::Error> {
        sign_all_with(self.keys_by_role(role)?, hash, chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Keyring, KeyringError, MultipleKeyring, RoleBasedKeyring, SingleKeyring};
    use hex_literal::hex;
    use rosetta_klaytn_types::{
        crypto::{Keypair, Signer},
        ext::secp256k1,
        Address, DefaultCrypto, RecoveryId, RoleGroup, Signature, H256,
    };

    const SENDER_KEY: [u8; 32] =
        hex!("45a915e4d060149eb4365960e6a7a45f334393093061116b197e3240065ff2d8");
    const OTHER_KEY: [u8; 32] =
        hex!("4646464646464646464646464646464646464646464646464646464646464646");

    fn keypair(secret: [u8; 32]) -> Keypair {
        Keypair::from_bytes(secret).unwrap()
    }

    #[test]
    fn single_keyring_signs_deterministically() {
        let keyring = SingleKeyring::from_bytes(SENDER_KEY).unwrap();
        assert_eq!(keyring.address(), Address::from(hex!("a94f5374fce5edbc8e2a8697c15331677e6ebf0b")));
        assert!(!keyring.is_decoupled());

        // sender signing hash of the value transfer codec fixture
        let hash = H256(hex!("aa7665566c9508140bb91e36a948fc8f61c4518400a69562432d17e064f3ce43"));
        let expected = Signature {
            v: RecoveryId::new(0x25),
            r: hex!("f3d0cd43661cabf53425535817c5058c27781f478cb5459874feaa462ed3a29a").into(),
            s: hex!("6748abe186269ff10b8100a4b7d7fea274b53ea2905acbf498dc8b5ab1bf4fbc").into(),
        };
        assert_eq!(keyring.sign(hash, 1, RoleGroup::Transaction, 0).unwrap(), expected);
        assert_eq!(keyring.sign_all(hash, 1, RoleGroup::FeePayer).unwrap(), vec![expected]);
        assert!(matches!(
            keyring.sign(hash, 1, RoleGroup::Transaction, 1),
            Err(KeyringError::IndexOutOfRange { index: 1, len: 1, .. })
        ));
    }

    #[test]
    fn chain_ids_beyond_the_signature_range_are_rejected() {
        let keyring = SingleKeyring::from_bytes(SENDER_KEY).unwrap();
        let hash = H256::repeat_byte(0x11);
        for chain_id in [u64::MAX, u64::MAX / 2] {
            assert!(matches!(
                keyring.sign(hash, chain_id, RoleGroup::Transaction, 0),
                Err(KeyringError::ChainIdOutOfRange(id)) if id == chain_id
            ));
            assert!(matches!(
                keyring.sign_all(hash, chain_id, RoleGroup::Transaction),
                Err(KeyringError::ChainIdOutOfRange(_))
            ));
        }
        assert!(matches!(
            keypair(SENDER_KEY).sign_prehash(hash, Some(u64::MAX)),
            Err(secp256k1::Error::InvalidRecoveryId)
        ));
        assert!(keyring.sign(hash, u64::MAX / 2 - 18, RoleGroup::Transaction, 0).is_ok());
    }

    #[test]
    fn decoupled_single_keyring_keeps_its_address() {
        let address = Address::from(hex!("5a0043070275d9f6054307ee7348bd660849d90f"));
        let keyring = SingleKeyring::decoupled(address, keypair(SENDER_KEY));
        assert_eq!(keyring.address(), address);
        assert!(keyring.is_decoupled());
    }

    #[test]
    fn multiple_keyring_signs_with_every_key() {
        let address = Address::repeat_byte(0xaa);
        assert!(MultipleKeyring::new(address, Vec::new()).is_err());

        let keyring =
            MultipleKeyring::new(address, vec![keypair(SENDER_KEY), keypair(OTHER_KEY)]).unwrap();
        assert!(keyring.is_decoupled());
        let hash = DefaultCrypto::keccak256(b"klaytn");
        let signatures = keyring.sign_all(hash, 1001, RoleGroup::Transaction).unwrap();
        assert_eq!(signatures.len(), 2);
        for (signature, key) in signatures.iter().zip(keyring.keys()) {
            assert_eq!(signature.v.chain_id(), Some(1001));
            assert_eq!(DefaultCrypto::secp256k1_ecdsa_recover(signature, hash).unwrap(), key.address());
        }
        assert_eq!(keyring.sign(hash, 1001, RoleGroup::Transaction, 1).unwrap(), signatures[1]);
    }

    #[test]
    fn role_based_keyring_falls_back_to_transaction_keys() {
        let address = Address::repeat_byte(0xaa);
        let keyring = RoleBasedKeyring::new(
            address,
            [vec![keypair(SENDER_KEY)], Vec::new(), vec![keypair(OTHER_KEY)]],
        );
        let hash = DefaultCrypto::keccak256(b"klaytn");
        let recover = |role| {
            let signature = keyring.sign(hash, 1, role, 0).unwrap();
            DefaultCrypto::secp256k1_ecdsa_recover(&signature, hash).unwrap()
        };
        assert_eq!(recover(RoleGroup::Transaction), keypair(SENDER_KEY).address());
        assert_eq!(recover(RoleGroup::AccountUpdate), keypair(SENDER_KEY).address());
        assert_eq!(recover(RoleGroup::FeePayer), keypair(OTHER_KEY).address());

        let empty = RoleBasedKeyring::new(address, [Vec::new(), Vec::new(), Vec::new()]);
        assert!(matches!(
            empty.sign_all(hash, 1, RoleGroup::FeePayer),
            Err(KeyringError::NoKey(RoleGroup::FeePayer))
        ));
    }
}
