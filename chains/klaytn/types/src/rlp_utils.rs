use crate::signature::Signature;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

pub trait RlpStreamExt {
    /// Appends an optional value, `None` is written as the empty string.
    ///
    /// ```
    /// use rlp::RlpStream;
    /// use rosetta_klaytn_types::rlp_utils::RlpStreamExt;
    /// let mut stream = RlpStream::new_list(2);
    /// stream.append_opt(Some(&"cat")).append_opt(Option::<&u32>::None);
    /// let out = stream.out();
    /// assert_eq!(out, vec![0xc5, 0x83, b'c', b'a', b't', 0x80]);
    /// ```
    fn append_opt<E: Encodable>(&mut self, value: Option<&E>) -> &mut Self;

    /// Appends a signature list. An empty list is written as `[EMPTY]`, the placeholder
    /// the network expects for a missing signature.
    fn append_signatures(&mut self, signatures: &[Signature]) -> &mut Self;
}

impl RlpStreamExt for RlpStream {
    fn append_opt<E: Encodable>(&mut self, opt: Option<&E>) -> &mut Self {
        if let Some(inner) = opt {
            self.append(inner);
        } else {
            self.append(&"");
        }
        self
    }

    fn append_signatures(&mut self, signatures: &[Signature]) -> &mut Self {
        if signatures.is_empty() {
            self.begin_list(1).append(&Signature::EMPTY);
        } else {
            self.begin_list(signatures.len());
            for signature in signatures {
                self.append(signature);
            }
        }
        self
    }
}

pub trait RlpExt {
    #[allow(clippy::missing_errors_doc)]
    fn opt_at<T: Decodable>(&self, index: usize) -> Result<Option<T>, DecoderError>;

    /// Decodes a signature list, dropping the empty placeholder signatures.
    #[allow(clippy::missing_errors_doc)]
    fn signatures_at(&self, index: usize) -> Result<Vec<Signature>, DecoderError>;
}

impl RlpExt for Rlp<'_> {
    fn opt_at<T: Decodable>(&self, index: usize) -> Result<Option<T>, DecoderError> {
        let item = self.at(index)?;
        if item.is_empty() {
            if item.is_data() {
                return Ok(None);
            }
            return Err(DecoderError::RlpExpectedToBeData);
        }
        item.as_val().map(Some)
    }

    fn signatures_at(&self, index: usize) -> Result<Vec<Signature>, DecoderError> {
        let signatures = self.list_at::<Signature>(index)?;
        Ok(signatures.into_iter().filter(|signature| !signature.is_empty()).collect())
    }
}
