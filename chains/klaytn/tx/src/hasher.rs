use rosetta_klaytn_types::{
    FeeDelegatedTransactionT, TransactionT, TypedTransaction, ValidationError, H256,
};

/// Computes the digests handed to the keyring for signing.
#[auto_impl::auto_impl(&, Arc, Box)]
pub trait TransactionHasher {
    /// # Errors
    /// Returns `Err` if the sender signing payload cannot be encoded.
    fn signature_hash(&self, tx: &TypedTransaction) -> Result<H256, ValidationError>;

    /// # Errors
    /// Returns `Err` if the transaction is not fee delegated or the fee payer signing
    /// payload cannot be encoded.
    fn fee_payer_signature_hash(&self, tx: &TypedTransaction) -> Result<H256, ValidationError>;
}

/// `keccak256` of the signing payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHasher;

impl TransactionHasher for DefaultHasher {
    fn signature_hash(&self, tx: &TypedTransaction) -> Result<H256, ValidationError> {
        tx.signature_hash()
    }

    fn fee_payer_signature_hash(&self, tx: &TypedTransaction) -> Result<H256, ValidationError> {
        tx.fee_delegated()
            .ok_or_else(|| ValidationError::NotFeeDelegated(tx.tx_type()))?
            .fee_payer_signature_hash()
    }
}
