use alloc::vec::Vec;
use core::fmt;

use super::SuiteId;
use crate::crypto::hkdf::{expand_to_vec, Hkdf, OkmBlock};
use crate::error::Error;

/// The protocol label prefix of RFC 9180.
pub const HPKE_V1: &[u8] = b"HPKE-v1";

/// HKDF with HPKE's labeled extract and expand.
///
/// Every label is prefixed with a protocol tag and the suite identifier, so
/// derivations made for different protocols or suites cannot collide.
///
/// See [RFC 9180 §4 "Cryptographic Dependencies"][0].
///
/// [0]: https://www.rfc-editor.org/rfc/rfc9180.html#section-4
#[derive(Clone, Copy)]
pub struct LabeledHkdf {
    prefix: &'static [u8],
    hkdf: &'static dyn Hkdf,
}

impl LabeledHkdf {
    /// Labeled HKDF over `hkdf`, with labels prefixed by `prefix`.
    pub const fn new(prefix: &'static [u8], hkdf: &'static dyn Hkdf) -> Self {
        Self { prefix, hkdf }
    }

    /// Plain `Extract(salt, ikm)`.
    pub fn extract(&self, salt: &[u8], ikm: &[u8]) -> OkmBlock {
        self.hkdf.extract_prk(Some(salt), ikm)
    }

    /// `LabeledExtract(salt, label, ikm)`.
    pub fn labeled_extract(
        &self,
        salt: &[u8],
        label: &[u8],
        ikm: &[u8],
        suite_id: &SuiteId,
    ) -> OkmBlock {
        // def LabeledExtract(salt, label, ikm):
        //   labeled_ikm = concat("HPKE-v1", suite_id, label, ikm)
        //   return Extract(salt, labeled_ikm)
        let labeled_ikm = zeroize::Zeroizing::new(
            [self.prefix, suite_id.as_ref(), label, ikm].concat(),
        );
        self.extract(salt, &labeled_ikm)
    }

    /// `LabeledExpand(prk, label, info, len)`.
    ///
    /// Fails with [`Error::LengthExceeded`] when `len` is more than
    /// `255 * HashLen`; nothing is expanded in that case.
    pub fn labeled_expand(
        &self,
        prk: &OkmBlock,
        label: &[u8],
        info: &[u8],
        suite_id: &SuiteId,
        len: usize,
    ) -> Result<Vec<u8>, Error> {
        let maximum = 255 * self.hash_len();
        if len > maximum {
            return Err(Error::LengthExceeded {
                requested: len,
                maximum,
            });
        }

        // def LabeledExpand(prk, label, info, L):
        //   labeled_info = concat(I2OSP(L, 2), "HPKE-v1", suite_id,
        //                         label, info)
        //   return Expand(prk, labeled_info, L)
        let output_len = (len as u16).to_be_bytes();
        let labeled_info = &[
            &output_len[..],
            self.prefix,
            suite_id.as_ref(),
            label,
            info,
        ];

        let expander = self.hkdf.expander_for_okm(prk);
        expand_to_vec(expander.as_ref(), labeled_info, len).map_err(|e| Error::LengthExceeded {
            requested: len,
            maximum: e.maximum,
        })
    }

    /// `HashLen` of the bound hash function.
    pub fn hash_len(&self) -> usize {
        self.hkdf.hash_len()
    }
}

impl fmt::Debug for LabeledHkdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabeledHkdf")
            .field(
                "prefix",
                &core::str::from_utf8(self.prefix).unwrap_or("<binary>"),
            )
            .field("hash", &self.hkdf.hash_algorithm())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::prelude::v1::*;

    use super::*;
    use crate::hpke::{build_suite_id, AeadId, KdfId, KemId};
    use crate::provider::{HKDF_SHA256, HKDF_SHA512};

    fn x25519_suite() -> SuiteId {
        build_suite_id(
            KemId::DHKEM_X25519_HKDF_SHA256,
            KdfId::HKDF_SHA256,
            AeadId::AES_128_GCM,
        )
    }

    #[test]
    fn key_schedule_secret_matches_rfc9180_a1() {
        // RFC 9180 A.1.1: shared_secret, then psk_id_hash/info_hash/secret.
        let hkdf = LabeledHkdf::new(HPKE_V1, &HKDF_SHA256);
        let suite_id = x25519_suite();
        let shared_secret =
            hex::decode("fe0e18c9f024ce43799ae393c7e8fe8fce9d218875e8227b0187c04e7d2ea1fc")
                .unwrap();
        let info = hex::decode("4f6465206f6e2061204772656369616e2055726e").unwrap();

        let psk_id_hash = hkdf.labeled_extract(b"", b"psk_id_hash", b"", &suite_id);
        let info_hash = hkdf.labeled_extract(b"", b"info_hash", &info, &suite_id);
        let context = [&[0u8][..], psk_id_hash.as_ref(), info_hash.as_ref()].concat();
        let secret = hkdf.labeled_extract(&shared_secret, b"secret", b"", &suite_id);

        let key = hkdf
            .labeled_expand(&secret, b"key", &context, &suite_id, 16)
            .unwrap();
        assert_eq!(hex::encode(key), "4531685d41d65f03dc48f6b8302c05b0");
        let nonce = hkdf
            .labeled_expand(&secret, b"base_nonce", &context, &suite_id, 12)
            .unwrap();
        assert_eq!(hex::encode(nonce), "56d890e5accaaf011cff4b7d");
    }

    #[test]
    fn expand_is_deterministic() {
        let hkdf = LabeledHkdf::new(b"HPKE-05 ", &HKDF_SHA256);
        let prk = hkdf.extract(b"salt", b"ikm");
        let a = hkdf
            .labeled_expand(&prk, b"sec", b"ctx", &x25519_suite(), 42)
            .unwrap();
        let b = hkdf
            .labeled_expand(&prk, b"sec", b"ctx", &x25519_suite(), 42)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 42);
    }

    #[test]
    fn prefix_and_suite_separate_outputs() {
        let v1 = LabeledHkdf::new(HPKE_V1, &HKDF_SHA256);
        let draft = LabeledHkdf::new(b"HPKE-05 ", &HKDF_SHA256);
        let prk = v1.extract(b"", b"ikm");
        let other_suite = build_suite_id(
            KemId::DHKEM_X25519_HKDF_SHA256,
            KdfId::HKDF_SHA256,
            AeadId::AES_256_GCM,
        );

        let base = v1
            .labeled_expand(&prk, b"exp", b"", &x25519_suite(), 32)
            .unwrap();
        assert_ne!(
            base,
            draft
                .labeled_expand(&prk, b"exp", b"", &x25519_suite(), 32)
                .unwrap()
        );
        assert_ne!(
            base,
            v1.labeled_expand(&prk, b"exp", b"", &other_suite, 32)
                .unwrap()
        );
    }

    #[test]
    fn length_boundary() {
        let hkdf = LabeledHkdf::new(HPKE_V1, &HKDF_SHA512);
        let prk = hkdf.extract(b"", b"ikm");
        assert_eq!(hkdf.hash_len(), 64);

        assert_eq!(
            hkdf.labeled_expand(&prk, b"sec", b"", &x25519_suite(), 255 * 64)
                .unwrap()
                .len(),
            16320
        );
        assert_eq!(
            hkdf.labeled_expand(&prk, b"sec", b"", &x25519_suite(), 255 * 64 + 1),
            Err(Error::LengthExceeded {
                requested: 16321,
                maximum: 16320
            })
        );
        assert!(hkdf
            .labeled_expand(&prk, b"sec", b"", &x25519_suite(), usize::MAX)
            .is_err());
    }
}
