use alloc::boxed::Box;

use zeroize::Zeroize;

use super::hash::HashAlgorithm;

/// HMAC bound to one hash function, e.g. HMAC-SHA384.
pub trait Hmac: Send + Sync {
    /// Key an HMAC instance.
    fn with_key(&self, key: &[u8]) -> Box<dyn Key>;

    /// Output length of the underlying hash (`L` in RFC 2104).
    fn hash_output_len(&self) -> usize;

    /// The underlying hash.
    fn hash_algorithm(&self) -> HashAlgorithm;
}

/// An HMAC output. Wiped on drop, since tags double as HKDF pseudorandom keys.
#[derive(Clone)]
pub struct Tag {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl Tag {
    /// Largest tag this can hold (HMAC-SHA512).
    pub const MAX_LEN: usize = 64;

    /// Copy a tag of at most [`Tag::MAX_LEN`] bytes.
    pub fn new(tag: &[u8]) -> Self {
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..tag.len()].copy_from_slice(tag);
        Self {
            buf,
            used: tag.len(),
        }
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

impl Drop for Tag {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

/// A keyed HMAC instance.
pub trait Key: Send + Sync {
    /// MAC over the concatenation of `parts`.
    fn sign(&self, parts: &[&[u8]]) -> Tag {
        self.sign_concat(&[], parts, &[])
    }

    /// MAC over `first || middle[0] || .. || middle[n] || last`.
    ///
    /// HKDF-Expand feeds `T(i-1)`, `info` and the block counter through this
    /// without joining them first.
    fn sign_concat(&self, first: &[u8], middle: &[&[u8]], last: &[u8]) -> Tag;

    /// Length of tags from this key.
    fn tag_len(&self) -> usize;
}
