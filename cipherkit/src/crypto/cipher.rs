use alloc::vec::Vec;
use core::fmt;

use zeroize::Zeroize;

use crate::enums::CipherSuite;
use crate::error::{ApiMisuse, Error};

/// An AEAD cipher bound to one algorithm family.
///
/// Instances are produced unkeyed by [`Factory::make_aead()`][]; the caller
/// installs a [`TrafficKey`] with [`Aead::set_key()`] before use.  Sealed
/// output is `ciphertext || tag`.
///
/// [`Factory::make_aead()`]: crate::Factory::make_aead()
pub trait Aead: Send + Sync {
    /// The cipher suite this AEAD was built for.
    fn suite(&self) -> CipherSuite;

    /// Required key length in bytes.
    fn key_len(&self) -> usize;

    /// Required IV (and nonce) length in bytes.
    fn iv_len(&self) -> usize;

    /// Length of the authentication tag appended by [`Aead::seal()`].
    fn tag_len(&self) -> usize;

    /// Install `key`, replacing any previous key.
    ///
    /// Fails with [`Error::InvalidKeyLength`] if the key or IV length does not
    /// match this algorithm.
    fn set_key(&mut self, key: TrafficKey) -> Result<(), Error>;

    /// The IV installed by [`Aead::set_key()`].
    fn iv(&self) -> Result<&Iv, Error>;

    /// Reserve `headroom` extra bytes of capacity in every sealed output buffer,
    /// so callers can append trailing data without reallocating.
    fn set_encrypted_buffer_headroom(&mut self, headroom: usize);

    /// Encrypt and authenticate `plaintext` under an explicit `nonce`.
    fn seal(&self, nonce: &Nonce, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error>;

    /// Verify and decrypt `ciphertext` under an explicit `nonce`.
    ///
    /// Fails with [`Error::AuthenticationFailed`] if the tag does not verify.
    fn open(&self, nonce: &Nonce, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, Error>;

    /// Seal using the record nonce for sequence number `seq`.
    fn encrypt(&self, aad: &[u8], plaintext: &[u8], seq: u64) -> Result<Vec<u8>, Error> {
        let nonce = Nonce::new(self.iv()?, seq);
        self.seal(&nonce, aad, plaintext)
    }

    /// Open using the record nonce for sequence number `seq`.
    fn decrypt(&self, aad: &[u8], ciphertext: &[u8], seq: u64) -> Result<Vec<u8>, Error> {
        let nonce = Nonce::new(self.iv()?, seq);
        self.open(&nonce, aad, ciphertext)
    }
}

/// Symmetric key material for one direction: an AEAD key and its IV.
pub struct TrafficKey {
    /// The AEAD key.
    pub key: AeadKey,
    /// The static IV that per-message nonces are derived from.
    pub iv: Iv,
}

impl TrafficKey {
    /// Copy `key` and `iv` into a new `TrafficKey`.
    ///
    /// Lengths are checked against the algorithm when the key is installed;
    /// here only the storage limits are enforced.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            key: AeadKey::new(key)?,
            iv: Iv::new(iv)?,
        })
    }

    /// Check the lengths of this key against an algorithm's requirements.
    pub(crate) fn check_lengths(&self, key_len: usize, iv_len: usize) -> Result<(), Error> {
        if self.key.as_ref().len() != key_len {
            return Err(Error::InvalidKeyLength {
                expected: key_len,
                actual: self.key.as_ref().len(),
            });
        }
        if self.iv.len() != iv_len {
            return Err(Error::InvalidKeyLength {
                expected: iv_len,
                actual: self.iv.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for TrafficKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrafficKey")
            .field("key_len", &self.key.as_ref().len())
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

/// A write or read IV.
#[derive(Clone)]
pub struct Iv {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl Iv {
    /// Create a new `Iv` from a byte slice.
    ///
    /// Returns an error if the length of `value` exceeds [`Self::MAX_LEN`].
    pub fn new(value: &[u8]) -> Result<Self, Error> {
        if value.len() > Self::MAX_LEN {
            return Err(Error::InvalidKeyLength {
                expected: Self::MAX_LEN,
                actual: value.len(),
            });
        }
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..value.len()].copy_from_slice(value);
        Ok(Self {
            buf,
            used: value.len(),
        })
    }

    /// Return the IV length.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.used
    }

    /// Largest IV in the ciphers we support: AEGIS-256 takes a 32-byte nonce.
    pub const MAX_LEN: usize = 32;
}

impl AsRef<[u8]> for Iv {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

impl Drop for Iv {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

/// A nonce.  This is unique for all messages on a connection direction.
pub struct Nonce {
    buf: [u8; Iv::MAX_LEN],
    len: usize,
}

impl Nonce {
    /// Combine an `Iv` and sequence number to produce a unique nonce.
    ///
    /// This is `iv ^ seq` where `seq` is encoded as a big-endian integer,
    /// right-aligned against the end of the IV.
    #[inline]
    pub fn new(iv: &Iv, seq: u64) -> Self {
        let iv_len = iv.len();
        let mut buf = [0u8; Iv::MAX_LEN];

        let seq_bytes = seq.to_be_bytes();
        let n = iv_len.min(seq_bytes.len());
        buf[iv_len - n..iv_len].copy_from_slice(&seq_bytes[seq_bytes.len() - n..]);

        buf[..iv_len]
            .iter_mut()
            .zip(iv.as_ref())
            .for_each(|(s, iv)| *s ^= *iv);

        Self { buf, len: iv_len }
    }
}

impl AsRef<[u8]> for Nonce {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// A key for an AEAD algorithm.
///
/// This is a value type for a byte string up to `AeadKey::MAX_LEN` bytes in length.
pub struct AeadKey {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl AeadKey {
    /// Copy `key` into a new `AeadKey`.
    pub fn new(key: &[u8]) -> Result<Self, Error> {
        if key.len() > Self::MAX_LEN {
            return Err(Error::InvalidKeyLength {
                expected: Self::MAX_LEN,
                actual: key.len(),
            });
        }
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..key.len()].copy_from_slice(key);
        Ok(Self {
            buf,
            used: key.len(),
        })
    }

    /// Largest possible AEAD key in the ciphersuites we support.
    pub const MAX_LEN: usize = 32;
}

impl Drop for AeadKey {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

impl AsRef<[u8]> for AeadKey {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

/// Return the key-not-installed error, for AEADs used before `set_key`.
pub(crate) fn key_not_installed() -> Error {
    ApiMisuse::KeyNotInstalled.into()
}
