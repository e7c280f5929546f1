use std::{
    borrow::Borrow,
    fmt::{Debug, Display, Formatter, LowerHex, Result as FmtResult},
    ops::Deref,
    str::FromStr,
};

/// Wrapper type around [`bytes::Bytes`] displayed and parsed as "0x" prefixed hex strings.
#[derive(Clone, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Bytes(pub bytes::Bytes);

impl Bytes {
    /// Creates a new empty `Bytes`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(bytes::Bytes::new())
    }

    /// Creates a new `Bytes` from a static slice, without copying.
    ///
    /// ```
    /// use rosetta_klaytn_types::Bytes;
    ///
    /// let b = Bytes::from_static(b"hello");
    /// assert_eq!(&b[..], b"hello");
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_static(bytes: &'static [u8]) -> Self {
        Self(bytes::Bytes::from_static(bytes))
    }

    /// Hex representation with the "0x" prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        const_hex::encode_prefixed(self.0.as_ref())
    }
}

impl Debug for Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Bytes({})", self.to_hex())
    }
}

impl Display for Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.to_hex())
    }
}

impl LowerHex for Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.to_hex())
    }
}

impl Deref for Bytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_ref()
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Borrow<[u8]> for Bytes {
    fn borrow(&self) -> &[u8] {
        self.as_ref()
    }
}

impl FromIterator<u8> for Bytes {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        iter.into_iter().collect::<bytes::Bytes>().into()
    }
}

impl From<bytes::Bytes> for Bytes {
    fn from(src: bytes::Bytes) -> Self {
        Self(src)
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(src: Vec<u8>) -> Self {
        Self(src.into())
    }
}

impl From<&[u8]> for Bytes {
    fn from(src: &[u8]) -> Self {
        Self(bytes::Bytes::copy_from_slice(src))
    }
}

impl<const N: usize> From<[u8; N]> for Bytes {
    fn from(src: [u8; N]) -> Self {
        Self(bytes::Bytes::copy_from_slice(src.as_slice()))
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(value: Bytes) -> Self {
        value.0.into()
    }
}

impl PartialEq<[u8]> for Bytes {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_ref() == other
    }
}

impl PartialEq<Vec<u8>> for Bytes {
    fn eq(&self, other: &Vec<u8>) -> bool {
        self.as_ref() == &other[..]
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Failed to parse bytes: {0}")]
pub struct ParseBytesError(#[from] const_hex::FromHexError);

impl FromStr for Bytes {
    type Err = ParseBytesError;

    /// Parses a hex string, the "0x" prefix is optional.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hex = value.strip_prefix("0x").unwrap_or(value);
        Ok(const_hex::decode(hex)?.into())
    }
}

impl rlp::Encodable for Bytes {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.encoder().encode_value(&self.0[..]);
    }
}

impl rlp::Decodable for Bytes {
    fn decode(rlp: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        <Vec<u8> as rlp::Decodable>::decode(rlp).map(Into::into)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Bytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Bytes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <String as serde::Deserialize>::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Bytes;

    #[test]
    fn parse_and_display_hex() {
        let bytes: Bytes = "0xdeadbeef".parse().unwrap();
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(bytes.to_string(), "0xdeadbeef");
        assert_eq!("deadbeef".parse::<Bytes>().unwrap(), bytes);
        assert_eq!("0x".parse::<Bytes>().unwrap(), Bytes::new());
        assert!("0xabc".parse::<Bytes>().is_err());
        assert!("0xzz".parse::<Bytes>().is_err());
    }

    #[test]
    fn rlp_encodes_as_string() {
        assert_eq!(&rlp::encode(&Bytes::new())[..], &[0x80]);
        assert_eq!(&rlp::encode(&Bytes::from_static(&[0x7f]))[..], &[0x7f]);
        assert_eq!(&rlp::encode(&Bytes::from_static(&[0x80]))[..], &[0x81, 0x80]);
        let decoded: Bytes = rlp::decode(&[0x82, 0x12, 0x34]).unwrap();
        assert_eq!(decoded, vec![0x12, 0x34]);
    }

    #[test]
    fn rlp_counts_as_a_single_list_item() {
        let mut stream = rlp::RlpStream::new_list(2);
        stream.append(&Bytes::from_static(&[0x12, 0x34])).append(&0u8);
        assert_eq!(&stream.out()[..], &[0xc4, 0x82, 0x12, 0x34, 0x80]);
    }
}
