//! Error types used throughout cipherkit.

use alloc::string::String;
use core::fmt;

use crate::enums::{CipherSuite, HashAlgorithm, NamedGroup};
use crate::hpke::{AeadId, KdfId, KemId};

/// cipherkit reports failures using this type.
///
/// Each variant is a distinct kind so that callers can tell a setup bug
/// ([`Error::UnsupportedAlgorithm`]) apart from a security event
/// ([`Error::AuthenticationFailed`]) or an operational limit
/// ([`Error::SequenceExhausted`]).
#[non_exhaustive]
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// A group, cipher suite or algorithm was not recognised, or its backend
    /// is disabled.  Never substituted with a default.
    UnsupportedAlgorithm(Unsupported),

    /// More output was requested from an HKDF expansion than it can produce.
    ///
    /// `maximum` is `255 * HashLen` for the bound hash function.
    LengthExceeded {
        /// How many bytes were asked for.
        requested: usize,
        /// The largest acceptable request.
        maximum: usize,
    },

    /// AEAD tag verification failed.  The connection should be treated as
    /// compromised; the same ciphertext must not be retried.
    AuthenticationFailed,

    /// The sequence number space of an encryption context is used up.
    ///
    /// This is terminal for the context.
    SequenceExhausted,

    /// The AEAD refused to encrypt.
    EncryptError,

    /// A peer key share was malformed or produced a degenerate secret.
    InvalidKeyShare,

    /// Key or IV material was the wrong length for the algorithm.
    InvalidKeyLength {
        /// Length required by the algorithm.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },

    /// A certificate could not be parsed.
    InvalidCertificate(String),

    /// The caller misused the API.
    ///
    /// This only results from the ordering or parameter values of calls, so
    /// these can be determined and fixed by reading the code.
    ApiMisuse(ApiMisuse),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAlgorithm(what) => write!(f, "unsupported algorithm: {what}"),
            Self::LengthExceeded { requested, maximum } => write!(
                f,
                "requested output length {requested} exceeds maximum of {maximum}"
            ),
            Self::AuthenticationFailed => write!(f, "message authentication failed"),
            Self::SequenceExhausted => write!(f, "sequence numbers exhausted"),
            Self::EncryptError => write!(f, "cannot encrypt message"),
            Self::InvalidKeyShare => write!(f, "invalid key share"),
            Self::InvalidKeyLength { expected, actual } => write!(
                f,
                "invalid key material length: expected {expected}, got {actual}"
            ),
            Self::InvalidCertificate(err) => write!(f, "invalid peer certificate: {err}"),
            Self::ApiMisuse(why) => write!(f, "API misuse: {why:?}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<Unsupported> for Error {
    #[inline]
    fn from(e: Unsupported) -> Self {
        Self::UnsupportedAlgorithm(e)
    }
}

impl From<ApiMisuse> for Error {
    #[inline]
    fn from(e: ApiMisuse) -> Self {
        Self::ApiMisuse(e)
    }
}

/// What was requested when an [`Error::UnsupportedAlgorithm`] was returned.
#[non_exhaustive]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Unsupported {
    /// A key exchange group.
    Group(NamedGroup),
    /// A cipher suite (for AEAD, key derivation or transcript hashing).
    CipherSuite(CipherSuite),
    /// A hash function.
    Hash(HashAlgorithm),
    /// An HPKE KEM.
    Kem(KemId),
    /// An HPKE KDF.
    Kdf(KdfId),
    /// An HPKE AEAD.
    Aead(AeadId),
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(g) => write!(f, "key exchange group {g:?}"),
            Self::CipherSuite(cs) => write!(f, "cipher suite {cs:?}"),
            Self::Hash(h) => write!(f, "hash algorithm {h:?}"),
            Self::Kem(k) => write!(f, "HPKE KEM {k:?}"),
            Self::Kdf(k) => write!(f, "HPKE KDF {k:?}"),
            Self::Aead(a) => write!(f, "HPKE AEAD {a:?}"),
        }
    }
}

impl core::error::Error for Unsupported {}

/// Describes cases of API misuse
///
/// Variants here should be sufficiently detailed that the action needed is clear.
#[non_exhaustive]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ApiMisuse {
    /// An AEAD was used before [`Aead::set_key()`][] installed a key.
    ///
    /// [`Aead::set_key()`]: crate::crypto::cipher::Aead::set_key()
    KeyNotInstalled,

    /// A key exchange was completed before
    /// [`KeyExchange::generate_key_pair()`][] was called.
    ///
    /// [`KeyExchange::generate_key_pair()`]: crate::crypto::kx::KeyExchange::generate_key_pair()
    KeyExchangeNotStarted,

    /// A key share was requested before one exists.
    ///
    /// A post-quantum responder only has a key share (the ciphertext) once the
    /// shared secret has been generated.
    KeyShareUnavailable,

    /// Only one of the PSK and PSK identity was supplied to HPKE setup.
    InconsistentPskInputs,
}

impl fmt::Display for ApiMisuse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl core::error::Error for ApiMisuse {}

#[cfg(test)]
mod tests {
    use std::prelude::v1::*;
    use std::{format, println, vec};

    use super::*;

    #[test]
    fn smoke() {
        let all = vec![
            Error::UnsupportedAlgorithm(Unsupported::Group(NamedGroup::X448)),
            Error::UnsupportedAlgorithm(Unsupported::CipherSuite(CipherSuite::Unknown(0x1304))),
            Error::UnsupportedAlgorithm(Unsupported::Hash(HashAlgorithm::Unknown(2))),
            Error::UnsupportedAlgorithm(Unsupported::Kem(KemId::DHKEM_X448_HKDF_SHA512)),
            Error::UnsupportedAlgorithm(Unsupported::Kdf(KdfId::Unknown(4))),
            Error::UnsupportedAlgorithm(Unsupported::Aead(AeadId::EXPORT_ONLY)),
            Error::LengthExceeded {
                requested: 8161,
                maximum: 8160,
            },
            Error::AuthenticationFailed,
            Error::SequenceExhausted,
            Error::EncryptError,
            Error::InvalidKeyShare,
            Error::InvalidKeyLength {
                expected: 16,
                actual: 15,
            },
            Error::InvalidCertificate("bad der".into()),
            Error::ApiMisuse(ApiMisuse::KeyNotInstalled),
        ];

        for err in all {
            println!("{err:?}:");
            println!("  fmt '{err}'");
        }
    }

    #[test]
    fn length_exceeded_display_names_both_bounds() {
        let err = Error::LengthExceeded {
            requested: 8161,
            maximum: 8160,
        };
        assert_eq!(
            format!("{err}"),
            "requested output length 8161 exceeds maximum of 8160"
        );
    }

    #[test]
    fn unsupported_hpke_components_are_named() {
        assert_eq!(
            Error::from(Unsupported::Kdf(KdfId::Unknown(4))).to_string(),
            "unsupported algorithm: HPKE KDF KdfId(0x4)"
        );
        assert_eq!(
            Unsupported::Kdf(KdfId::HKDF_SHA384).to_string(),
            "HPKE KDF HKDF_SHA384"
        );
        assert_ne!(
            Unsupported::Kdf(KdfId::Unknown(2)),
            Unsupported::Hash(HashAlgorithm::Unknown(2))
        );
    }

    #[test]
    fn conversions_pick_the_right_variant() {
        assert_eq!(
            Error::from(Unsupported::Group(NamedGroup::X448)),
            Error::UnsupportedAlgorithm(Unsupported::Group(NamedGroup::X448))
        );
        assert_eq!(
            Error::from(ApiMisuse::InconsistentPskInputs),
            Error::ApiMisuse(ApiMisuse::InconsistentPskInputs)
        );
        assert_ne!(Error::AuthenticationFailed, Error::SequenceExhausted);
    }
}
