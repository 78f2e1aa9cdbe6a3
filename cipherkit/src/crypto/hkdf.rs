//! HKDF ([RFC 5869]) as used by the TLS 1.3 key schedule and by HPKE.
//!
//! [RFC 5869]: https://www.rfc-editor.org/rfc/rfc5869

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use zeroize::Zeroize;

use super::hash::HashAlgorithm;
use super::hmac;

/// HKDF bound to one hash function.
///
/// `HashLen` below is that hash's output length. [`HkdfUsingHmac`] builds this
/// on any [`hmac::Hmac`].
pub trait Hkdf: Send + Sync {
    /// `HKDF-Extract(salt, 0^HashLen)`.
    fn extract_from_zero_ikm(&self, salt: Option<&[u8]>) -> Box<dyn HkdfExpander>;

    /// `HKDF-Extract(salt, secret)`, ready to expand.
    ///
    /// An absent or empty `salt` means `HashLen` zero bytes.
    fn extract_from_secret(&self, salt: Option<&[u8]>, secret: &[u8]) -> Box<dyn HkdfExpander>;

    /// `HKDF-Extract(salt, secret)` as a value.
    ///
    /// HPKE keeps extracted PRKs around (`psk_id_hash`, `info_hash`, the
    /// key schedule secret) where TLS 1.3 expands them straight away.
    fn extract_prk(&self, salt: Option<&[u8]>, secret: &[u8]) -> OkmBlock;

    /// Expand from an existing PRK.
    fn expander_for_okm(&self, okm: &OkmBlock) -> Box<dyn HkdfExpander>;

    /// `HashLen`.
    fn hash_len(&self) -> usize;

    /// The hash this HKDF is bound to.
    fn hash_algorithm(&self) -> HashAlgorithm;
}

/// `HKDF-Expand` with a fixed `PRK`.
///
/// `info` is passed as a list of slices and treated as their concatenation,
/// so callers can feed a label structure without assembling it.
pub trait HkdfExpander: Send + Sync {
    /// Fill `output` with `HKDF-Expand(PRK, info, output.len())`.
    ///
    /// Fails, leaving `output` untouched, past `255 * HashLen` bytes.
    fn expand_slice(&self, info: &[&[u8]], output: &mut [u8]) -> Result<(), OutputLengthError>;

    /// `HKDF-Expand(PRK, info, HashLen)`, which cannot fail.
    fn expand_block(&self, info: &[&[u8]]) -> OkmBlock;

    /// `HashLen`, at most [`OkmBlock::MAX_LEN`].
    fn hash_len(&self) -> usize;
}

/// [`Hkdf`] over an HMAC.
pub struct HkdfUsingHmac<'a>(pub &'a dyn hmac::Hmac);

impl HkdfUsingHmac<'_> {
    fn salt_or_zeroes<'s>(
        &self,
        salt: Option<&'s [u8]>,
        zeroes: &'s [u8; OkmBlock::MAX_LEN],
    ) -> &'s [u8] {
        match salt {
            Some(salt) if !salt.is_empty() => salt,
            _ => &zeroes[..self.0.hash_output_len()],
        }
    }
}

impl Hkdf for HkdfUsingHmac<'_> {
    fn extract_from_zero_ikm(&self, salt: Option<&[u8]>) -> Box<dyn HkdfExpander> {
        let ikm = [0u8; OkmBlock::MAX_LEN];
        self.extract_from_secret(salt, &ikm[..self.0.hash_output_len()])
    }

    fn extract_from_secret(&self, salt: Option<&[u8]>, secret: &[u8]) -> Box<dyn HkdfExpander> {
        self.expander_for_okm(&self.extract_prk(salt, secret))
    }

    fn extract_prk(&self, salt: Option<&[u8]>, secret: &[u8]) -> OkmBlock {
        let zeroes = [0u8; OkmBlock::MAX_LEN];
        let prk = self
            .0
            .with_key(self.salt_or_zeroes(salt, &zeroes))
            .sign(&[secret]);
        OkmBlock::new(prk.as_ref())
    }

    fn expander_for_okm(&self, okm: &OkmBlock) -> Box<dyn HkdfExpander> {
        Box::new(HmacExpander(self.0.with_key(okm.as_ref())))
    }

    fn hash_len(&self) -> usize {
        self.0.hash_output_len()
    }

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.0.hash_algorithm()
    }
}

/// The PRK, already keyed into an HMAC.
struct HmacExpander(Box<dyn hmac::Key>);

impl HmacExpander {
    /// `T(i) = HMAC(PRK, T(i-1) || info || i)`, written block by block.
    ///
    /// `output` must be at most `255 * HashLen` long so the counter fits a byte.
    fn fill(&self, info: &[&[u8]], output: &mut [u8]) {
        let mut previous = hmac::Tag::new(&[]);
        let mut counter = 0u8;
        for block in output.chunks_mut(self.0.tag_len()) {
            counter += 1;
            previous = self
                .0
                .sign_concat(previous.as_ref(), info, &[counter]);
            block.copy_from_slice(&previous.as_ref()[..block.len()]);
        }
    }

    fn maximum(&self) -> usize {
        255 * self.0.tag_len()
    }
}

impl HkdfExpander for HmacExpander {
    fn expand_slice(&self, info: &[&[u8]], output: &mut [u8]) -> Result<(), OutputLengthError> {
        let maximum = self.maximum();
        if output.len() > maximum {
            return Err(OutputLengthError { maximum });
        }
        self.fill(info, output);
        Ok(())
    }

    fn expand_block(&self, info: &[&[u8]]) -> OkmBlock {
        let mut scratch = [0u8; OkmBlock::MAX_LEN];
        let len = self.0.tag_len();
        self.fill(info, &mut scratch[..len]);
        let block = OkmBlock::new(&scratch[..len]);
        scratch.zeroize();
        block
    }

    fn hash_len(&self) -> usize {
        self.0.tag_len()
    }
}

/// `HKDF-Expand(PRK, info, len)` into a new vector.
pub fn expand_to_vec(
    expander: &dyn HkdfExpander,
    info: &[&[u8]],
    len: usize,
) -> Result<Vec<u8>, OutputLengthError> {
    let maximum = 255 * expander.hash_len();
    if len > maximum {
        return Err(OutputLengthError { maximum });
    }

    let mut output = vec![0u8; len];
    expander.expand_slice(info, &mut output)?;
    Ok(output)
}

/// One `HashLen`-sized block of key material. Wiped on drop.
#[derive(Clone)]
pub struct OkmBlock {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl OkmBlock {
    /// Largest block this can hold (SHA-512).
    pub const MAX_LEN: usize = 64;

    /// Copy key material of at most [`OkmBlock::MAX_LEN`] bytes.
    pub fn new(secret: &[u8]) -> Self {
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..secret.len()].copy_from_slice(secret);
        Self {
            buf,
            used: secret.len(),
        }
    }
}

impl AsRef<[u8]> for OkmBlock {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

impl Drop for OkmBlock {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

/// A requested expansion was longer than `255 * HashLen`.
#[derive(Debug)]
pub struct OutputLengthError {
    /// `255 * HashLen` for the refusing expander.
    pub maximum: usize,
}
