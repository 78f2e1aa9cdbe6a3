use alloc::boxed::Box;
use core::fmt;

use crate::cert::{CertificateEntry, CertificateParser, PeerCert, WebPkiCertificateParser};
use crate::crypto::cipher::Aead;
use crate::crypto::hash::Hash;
use crate::crypto::hkdf::Hkdf;
use crate::crypto::hmac::Hmac;
use crate::crypto::kx::{HybridKeyExchange, KeyExchange, KeyExchangeMode};
use crate::enums::{CipherSuite, HashAlgorithm, NamedGroup};
use crate::error::{Error, Unsupported};
use crate::hash_hs::{HandshakeContext, HandshakeContextImpl};
use crate::hpke::{DhKem, Kem, KemId};
use crate::key_schedule::{KeyDerivation, KeyDerivationImpl};
use crate::log::{debug, warn};
use crate::provider::aead::{Aegis, AegisVariant, Aes128Gcm, Aes128Ocb, Aes256Gcm, Chacha20Poly1305};
use crate::provider::kx::{P256Dh, P384Dh, P521Dh, Secp256r1, Secp384r1, Secp521r1, X25519Dh, X25519};
use crate::provider::mlkem::{MlKem1024, MlKem512, MlKem768};
use crate::provider::{hash, hmac, HKDF_SHA256, HKDF_SHA384, HKDF_SHA512};

/// Makes the cryptographic primitives a negotiated TLS 1.3 or HPKE
/// connection needs.
///
/// Every method is a pure function of its arguments and the factory's
/// configuration: nothing is cached, and each call returns a fresh object
/// owned by the caller.  Identifiers the factory cannot serve give
/// [`Error::UnsupportedAlgorithm`].
pub trait Factory: Send + Sync {
    /// A key exchange for `group`.
    ///
    /// `mode` matters only for KEM-based groups, and for the post-quantum
    /// half of a hybrid group.
    fn make_key_exchange(
        &self,
        group: NamedGroup,
        mode: KeyExchangeMode,
    ) -> Result<Box<dyn KeyExchange>, Error>;

    /// An unkeyed AEAD for `suite`.
    fn make_aead(&self, suite: CipherSuite) -> Result<Box<dyn Aead>, Error>;

    /// The TLS 1.3 key deriver paired with `suite`.
    fn make_key_deriver(&self, suite: CipherSuite) -> Result<Box<dyn KeyDerivation>, Error>;

    /// An empty handshake transcript for `suite`.
    fn make_handshake_context(
        &self,
        suite: CipherSuite,
    ) -> Result<Box<dyn HandshakeContext>, Error>;

    /// Parse the certificate in `entry`.
    ///
    /// `leaf` says whether it is the end-entity certificate of its chain.
    fn make_peer_cert(
        &self,
        entry: CertificateEntry,
        leaf: bool,
    ) -> Result<Box<dyn PeerCert>, Error>;

    /// HKDF over `hash`.
    fn make_hkdf(&self, hash: HashAlgorithm) -> Result<&'static dyn Hkdf, Error>;

    /// The HPKE KEM identified by `kem`.
    fn make_kem(&self, kem: KemId) -> Result<Box<dyn Kem>, Error>;
}

/// Which optional backends a [`MultiBackendFactory`] may use.
///
/// The default enables the post-quantum groups and leaves the AEGIS suites
/// off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    /// Serve the ML-KEM groups and the hybrids built on them.
    pub post_quantum: bool,
    /// Serve `TLS13_AEGIS_128L_SHA256` and `TLS13_AEGIS_256_SHA512`.
    pub aegis: bool,
}

impl BackendConfig {
    /// Set whether the post-quantum groups are served.
    pub fn with_post_quantum(mut self, enabled: bool) -> Self {
        self.post_quantum = enabled;
        self
    }

    /// Set whether the AEGIS suites are served.
    pub fn with_aegis(mut self, enabled: bool) -> Self {
        self.aegis = enabled;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            post_quantum: true,
            aegis: false,
        }
    }
}

/// A [`Factory`] over the RustCrypto primitives in [`crate::provider`].
///
/// Groups, suites and KEMs dispatch as follows:
///
/// | identifier | primitive |
/// |---|---|
/// | `secp256r1`, `secp384r1`, `secp521r1`, `X25519` | ECDH |
/// | `MLKEM512`, `MLKEM768`, `MLKEM1024` | ML-KEM (post-quantum) |
/// | `secp256r1MLKEM768`, `secp384r1MLKEM1024` | hybrid (post-quantum) |
/// | AES-GCM, ChaCha20-Poly1305, AES-128-OCB suites | that AEAD |
/// | AEGIS suites | AEGIS (only with [`BackendConfig::aegis`]) |
/// | DHKEM over P-256, P-384, P-521, X25519 | [`DhKem`] |
///
/// Certificates are parsed with [`WebPkiCertificateParser`] unless another
/// parser is supplied.
pub struct MultiBackendFactory {
    config: BackendConfig,
    certificate_parser: &'static dyn CertificateParser,
}

impl MultiBackendFactory {
    /// Make a factory with the given configuration.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            certificate_parser: &WebPkiCertificateParser,
        }
    }

    /// Parse certificates with `parser` instead.
    pub fn with_certificate_parser(mut self, parser: &'static dyn CertificateParser) -> Self {
        self.certificate_parser = parser;
        self
    }

    /// The configuration this factory was made with.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn post_quantum_allowed(&self, group: NamedGroup) -> Result<(), Error> {
        match self.config.post_quantum {
            true => Ok(()),
            false => Err(unsupported(Unsupported::Group(group))),
        }
    }

    fn classical_key_exchange(group: NamedGroup) -> Option<Box<dyn KeyExchange>> {
        match group {
            NamedGroup::X25519 => Some(Box::new(X25519::new())),
            NamedGroup::secp256r1 => Some(Box::new(Secp256r1::new())),
            NamedGroup::secp384r1 => Some(Box::new(Secp384r1::new())),
            NamedGroup::secp521r1 => Some(Box::new(Secp521r1::new())),
            _ => None,
        }
    }

    fn post_quantum_key_exchange(
        group: NamedGroup,
        mode: KeyExchangeMode,
    ) -> Option<Box<dyn KeyExchange>> {
        match group {
            NamedGroup::MLKEM512 => Some(Box::new(MlKem512::new(mode))),
            NamedGroup::MLKEM768 => Some(Box::new(MlKem768::new(mode))),
            NamedGroup::MLKEM1024 => Some(Box::new(MlKem1024::new(mode))),
            _ => None,
        }
    }
}

impl Default for MultiBackendFactory {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

impl fmt::Debug for MultiBackendFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiBackendFactory")
            .field("config", &self.config)
            .field("certificate_parser", &self.certificate_parser)
            .finish()
    }
}

impl Factory for MultiBackendFactory {
    fn make_key_exchange(
        &self,
        group: NamedGroup,
        mode: KeyExchangeMode,
    ) -> Result<Box<dyn KeyExchange>, Error> {
        if let Some(kx) = Self::classical_key_exchange(group) {
            debug!("Using classical key exchange for {:?}", group);
            return Ok(kx);
        }

        if let Some(kx) = Self::post_quantum_key_exchange(group, mode) {
            self.post_quantum_allowed(group)?;
            debug!("Using ML-KEM key exchange for {:?} as {:?}", group, mode);
            return Ok(kx);
        }

        if let Some((classical, post_quantum)) = group.hybrid_components() {
            self.post_quantum_allowed(group)?;
            let (Some(classical), Some(post_quantum)) = (
                Self::classical_key_exchange(classical),
                Self::post_quantum_key_exchange(post_quantum, mode),
            ) else {
                return Err(unsupported(Unsupported::Group(group)));
            };
            debug!("Using hybrid key exchange for {:?} as {:?}", group, mode);
            return Ok(Box::new(HybridKeyExchange::new(
                group,
                classical,
                post_quantum,
            )));
        }

        Err(unsupported(Unsupported::Group(group)))
    }

    fn make_aead(&self, suite: CipherSuite) -> Result<Box<dyn Aead>, Error> {
        let aead: Box<dyn Aead> = match suite {
            CipherSuite::TLS13_AES_128_GCM_SHA256 => Box::new(Aes128Gcm::new(suite)),
            CipherSuite::TLS13_AES_256_GCM_SHA384 => Box::new(Aes256Gcm::new(suite)),
            CipherSuite::TLS13_CHACHA20_POLY1305_SHA256 => Box::new(Chacha20Poly1305::new(suite)),
            CipherSuite::TLS13_AES_128_OCB_SHA256_EXPERIMENTAL => Box::new(Aes128Ocb::new(suite)),
            CipherSuite::TLS13_AEGIS_128L_SHA256 if self.config.aegis => {
                Box::new(Aegis::new(AegisVariant::Aegis128L))
            }
            CipherSuite::TLS13_AEGIS_256_SHA512 if self.config.aegis => {
                Box::new(Aegis::new(AegisVariant::Aegis256))
            }
            _ => return Err(unsupported(Unsupported::CipherSuite(suite))),
        };
        debug!("Using AEAD for {:?}", suite);
        Ok(aead)
    }

    fn make_key_deriver(&self, suite: CipherSuite) -> Result<Box<dyn KeyDerivation>, Error> {
        let (hash, hmac, hkdf) = suite
            .hash_algorithm()
            .and_then(hash_suite)
            .ok_or_else(|| unsupported(Unsupported::CipherSuite(suite)))?;
        debug!(
            "Using {:?} key derivation for {:?}",
            hash.algorithm(),
            suite
        );
        Ok(KeyDerivationImpl::new(hash, hmac, hkdf).boxed())
    }

    fn make_handshake_context(
        &self,
        suite: CipherSuite,
    ) -> Result<Box<dyn HandshakeContext>, Error> {
        // The transcript hash for AEGIS-256 is SHA-384, not the suite's
        // SHA-512.  Peers agree on this pairing, so it must not change.
        let transcript_hash = match suite {
            CipherSuite::TLS13_AES_128_GCM_SHA256
            | CipherSuite::TLS13_CHACHA20_POLY1305_SHA256
            | CipherSuite::TLS13_AES_128_OCB_SHA256_EXPERIMENTAL
            | CipherSuite::TLS13_AEGIS_128L_SHA256 => HashAlgorithm::SHA256,
            CipherSuite::TLS13_AES_256_GCM_SHA384 | CipherSuite::TLS13_AEGIS_256_SHA512 => {
                HashAlgorithm::SHA384
            }
            _ => return Err(unsupported(Unsupported::CipherSuite(suite))),
        };
        let (hash, hmac, hkdf) = hash_suite(transcript_hash)
            .ok_or_else(|| unsupported(Unsupported::CipherSuite(suite)))?;
        debug!(
            "Using {:?} handshake transcript for {:?}",
            transcript_hash, suite
        );
        Ok(Box::new(HandshakeContextImpl::new(hash, hmac, hkdf)))
    }

    fn make_peer_cert(
        &self,
        entry: CertificateEntry,
        leaf: bool,
    ) -> Result<Box<dyn PeerCert>, Error> {
        self.certificate_parser
            .parse_peer_certificate(entry.cert_data, leaf)
    }

    fn make_hkdf(&self, hash: HashAlgorithm) -> Result<&'static dyn Hkdf, Error> {
        hash_suite(hash)
            .map(|(_, _, hkdf)| hkdf)
            .ok_or_else(|| unsupported(Unsupported::Hash(hash)))
    }

    fn make_kem(&self, kem: KemId) -> Result<Box<dyn Kem>, Error> {
        let dh_kem = match kem {
            KemId::DHKEM_P256_HKDF_SHA256 => DhKem::new(kem, &P256Dh, &HKDF_SHA256),
            KemId::DHKEM_P384_HKDF_SHA384 => DhKem::new(kem, &P384Dh, &HKDF_SHA384),
            KemId::DHKEM_P521_HKDF_SHA512 => DhKem::new(kem, &P521Dh, &HKDF_SHA512),
            KemId::DHKEM_X25519_HKDF_SHA256 => DhKem::new(kem, &X25519Dh, &HKDF_SHA256),
            _ => return Err(unsupported(Unsupported::Kem(kem))),
        };
        debug!("Using {:?}", dh_kem);
        Ok(Box::new(dh_kem))
    }
}

type HashSuite = (&'static dyn Hash, &'static dyn Hmac, &'static dyn Hkdf);

fn hash_suite(algorithm: HashAlgorithm) -> Option<HashSuite> {
    match algorithm {
        HashAlgorithm::SHA256 => Some((&hash::SHA256, &hmac::HMAC_SHA256, &HKDF_SHA256)),
        HashAlgorithm::SHA384 => Some((&hash::SHA384, &hmac::HMAC_SHA384, &HKDF_SHA384)),
        HashAlgorithm::SHA512 => Some((&hash::SHA512, &hmac::HMAC_SHA512, &HKDF_SHA512)),
        _ => None,
    }
}

fn unsupported(what: Unsupported) -> Error {
    warn!("Refusing unsupported {}", what);
    Error::UnsupportedAlgorithm(what)
}
