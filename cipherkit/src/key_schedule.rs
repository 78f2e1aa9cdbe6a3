use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::crypto::hash::{self, Hash};
use crate::crypto::hkdf::{self, Hkdf, OkmBlock};
use crate::crypto::hmac::{self, Hmac};
use crate::error::Error;

/// The TLS 1.3 key derivation functions, bound to one hash function.
///
/// Obtain one from [`crate::Factory::make_key_deriver()`].
pub trait KeyDerivation: Send + Sync {
    /// `HashLen` of the bound hash function.
    fn hash_len(&self) -> usize;

    /// Hash of the empty string.
    fn blank_hash(&self) -> &'static [u8];

    /// One-shot hash of `data`.
    fn hash(&self, data: &[u8]) -> hash::Output;

    /// HMAC of `data` under `key`.
    fn hmac(&self, key: &[u8], data: &[u8]) -> hmac::Tag;

    /// `HKDF-Extract(salt, ikm)`.
    ///
    /// An empty `salt` is `HashLen` zero bytes.
    fn hkdf_extract(&self, salt: &[u8], ikm: &[u8]) -> OkmBlock;

    /// `HKDF-Expand(secret, info, len)`.
    fn hkdf_expand(&self, secret: &OkmBlock, info: &[u8], len: usize) -> Result<Vec<u8>, Error>;

    /// [HKDF-Expand-Label] of `len` bytes.
    ///
    /// [HKDF-Expand-Label]: <https://www.rfc-editor.org/rfc/rfc8446#section-7.1>
    fn expand_label(
        &self,
        secret: &OkmBlock,
        label: &[u8],
        context: &[u8],
        len: usize,
    ) -> Result<Vec<u8>, Error>;

    /// `Derive-Secret(secret, label, messages)` given the transcript hash of
    /// `messages`.
    fn derive_secret(
        &self,
        secret: &OkmBlock,
        label: &[u8],
        messages_hash: &[u8],
    ) -> Result<OkmBlock, Error>;
}

/// [`KeyDerivation`] over a [`Hash`], its [`Hmac`] and the matching [`Hkdf`].
pub struct KeyDerivationImpl {
    hash: &'static dyn Hash,
    hmac: &'static dyn Hmac,
    hkdf: &'static dyn Hkdf,
    label_prefix: &'static [u8],
}

impl KeyDerivationImpl {
    /// Make a key deriver using the TLS 1.3 `"tls13 "` label prefix.
    pub fn new(
        hash: &'static dyn Hash,
        hmac: &'static dyn Hmac,
        hkdf: &'static dyn Hkdf,
    ) -> Self {
        debug_assert_eq!(hash.output_len(), hkdf.hash_len());
        Self {
            hash,
            hmac,
            hkdf,
            label_prefix: TLS13_LABEL_PREFIX,
        }
    }

    /// Replace the label prefix used by [`KeyDerivation::expand_label()`].
    ///
    /// Protocols that reuse the TLS 1.3 key schedule under their own name
    /// (for example DTLS 1.3 with `"dtls13"`) use this.
    pub fn with_label_prefix(mut self, prefix: &'static [u8]) -> Self {
        self.label_prefix = prefix;
        self
    }

    pub(crate) fn boxed(self) -> Box<dyn KeyDerivation> {
        Box::new(self)
    }
}

const TLS13_LABEL_PREFIX: &[u8] = b"tls13 ";

impl KeyDerivation for KeyDerivationImpl {
    fn hash_len(&self) -> usize {
        self.hash.output_len()
    }

    fn blank_hash(&self) -> &'static [u8] {
        self.hash.blank_hash()
    }

    fn hash(&self, data: &[u8]) -> hash::Output {
        self.hash.hash(data)
    }

    fn hmac(&self, key: &[u8], data: &[u8]) -> hmac::Tag {
        self.hmac.with_key(key).sign(&[data])
    }

    fn hkdf_extract(&self, salt: &[u8], ikm: &[u8]) -> OkmBlock {
        self.hkdf.extract_prk(Some(salt), ikm)
    }

    fn hkdf_expand(&self, secret: &OkmBlock, info: &[u8], len: usize) -> Result<Vec<u8>, Error> {
        let expander = self.hkdf.expander_for_okm(secret);
        hkdf::expand_to_vec(expander.as_ref(), &[info], len).map_err(|e| {
            Error::LengthExceeded {
                requested: len,
                maximum: e.maximum,
            }
        })
    }

    fn expand_label(
        &self,
        secret: &OkmBlock,
        label: &[u8],
        context: &[u8],
        len: usize,
    ) -> Result<Vec<u8>, Error> {
        let full_label_len = self.label_prefix.len() + label.len();
        if full_label_len > u8::MAX as usize {
            return Err(Error::LengthExceeded {
                requested: full_label_len,
                maximum: u8::MAX as usize,
            });
        }
        if context.len() > u8::MAX as usize {
            return Err(Error::LengthExceeded {
                requested: context.len(),
                maximum: u8::MAX as usize,
            });
        }
        let output_len = u16::try_from(len).map_err(|_| Error::LengthExceeded {
            requested: len,
            maximum: 255 * self.hash_len(),
        })?;

        // struct {
        //     uint16 length = Length;
        //     opaque label<7..255> = "tls13 " + Label;
        //     opaque context<0..255> = Context;
        // } HkdfLabel;
        let output_len = output_len.to_be_bytes();
        let label_len = [full_label_len as u8];
        let context_len = [context.len() as u8];
        let info = &[
            &output_len[..],
            &label_len[..],
            self.label_prefix,
            label,
            &context_len[..],
            context,
        ];

        let expander = self.hkdf.expander_for_okm(secret);
        hkdf::expand_to_vec(expander.as_ref(), info, len).map_err(|e| Error::LengthExceeded {
            requested: len,
            maximum: e.maximum,
        })
    }

    fn derive_secret(
        &self,
        secret: &OkmBlock,
        label: &[u8],
        messages_hash: &[u8],
    ) -> Result<OkmBlock, Error> {
        let derived = zeroize::Zeroizing::new(self.expand_label(
            secret,
            label,
            messages_hash,
            self.hash_len(),
        )?);
        Ok(OkmBlock::new(&derived))
    }
}
