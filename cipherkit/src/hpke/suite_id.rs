use crate::enums::{CipherSuite, HashAlgorithm, NamedGroup};
use crate::error::{Error, Unsupported};

enum_builder! {
    /// The Key Encapsulation Mechanism (`Kem`) type for HPKE operations.
    /// Listed by IANA, as specified in [RFC 9180 Section 7.1]
    ///
    /// [RFC 9180 Section 7.1]: <https://datatracker.ietf.org/doc/html/rfc9180#kemid-values>
    #[repr(u16)]
    pub enum KemId {
        DHKEM_P256_HKDF_SHA256 => 0x0010,
        DHKEM_P384_HKDF_SHA384 => 0x0011,
        DHKEM_P521_HKDF_SHA512 => 0x0012,
        DHKEM_X25519_HKDF_SHA256 => 0x0020,
        DHKEM_X448_HKDF_SHA512 => 0x0021,
    }
}

enum_builder! {
    /// The Key Derivation Function (`Kdf`) type for HPKE operations.
    /// Listed by IANA, as specified in [RFC 9180 Section 7.2]
    ///
    /// [RFC 9180 Section 7.2]: <https://datatracker.ietf.org/doc/html/rfc9180#name-key-derivation-functions-kd>
    #[repr(u16)]
    pub enum KdfId {
        HKDF_SHA256 => 0x0001,
        HKDF_SHA384 => 0x0002,
        HKDF_SHA512 => 0x0003,
    }
}

enum_builder! {
    /// The Authenticated Encryption with Associated Data (`Aead`) type for HPKE operations.
    /// Listed by IANA, as specified in [RFC 9180 Section 7.3]
    ///
    /// [RFC 9180 Section 7.3]: <https://datatracker.ietf.org/doc/html/rfc9180#name-authenticated-encryption-wi>
    #[repr(u16)]
    pub enum AeadId {
        AES_128_GCM => 0x0001,
        AES_256_GCM => 0x0002,
        CHACHA20_POLY_1305 => 0x0003,
        EXPORT_ONLY => 0xFFFF,
    }
}

impl KemId {
    /// The hash function of this KEM's internal KDF.
    pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
        match self {
            Self::DHKEM_P256_HKDF_SHA256 | Self::DHKEM_X25519_HKDF_SHA256 => {
                Some(HashAlgorithm::SHA256)
            }
            Self::DHKEM_P384_HKDF_SHA384 => Some(HashAlgorithm::SHA384),
            Self::DHKEM_P521_HKDF_SHA512 | Self::DHKEM_X448_HKDF_SHA512 => {
                Some(HashAlgorithm::SHA512)
            }
            Self::Unknown(_) => None,
        }
    }
}

impl KdfId {
    /// The hash function underlying this KDF.
    pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
        match self {
            Self::HKDF_SHA256 => Some(HashAlgorithm::SHA256),
            Self::HKDF_SHA384 => Some(HashAlgorithm::SHA384),
            Self::HKDF_SHA512 => Some(HashAlgorithm::SHA512),
            Self::Unknown(_) => None,
        }
    }
}

impl AeadId {
    /// The TLS 1.3 cipher suite whose AEAD this is.
    ///
    /// `EXPORT_ONLY` has no AEAD and so no suite.
    pub fn cipher_suite(&self) -> Option<CipherSuite> {
        match self {
            Self::AES_128_GCM => Some(CipherSuite::TLS13_AES_128_GCM_SHA256),
            Self::AES_256_GCM => Some(CipherSuite::TLS13_AES_256_GCM_SHA384),
            Self::CHACHA20_POLY_1305 => Some(CipherSuite::TLS13_CHACHA20_POLY1305_SHA256),
            _ => None,
        }
    }
}

impl TryFrom<NamedGroup> for KemId {
    type Error = Error;

    fn try_from(group: NamedGroup) -> Result<Self, Self::Error> {
        match group {
            NamedGroup::secp256r1 => Ok(Self::DHKEM_P256_HKDF_SHA256),
            NamedGroup::secp384r1 => Ok(Self::DHKEM_P384_HKDF_SHA384),
            NamedGroup::secp521r1 => Ok(Self::DHKEM_P521_HKDF_SHA512),
            NamedGroup::X25519 => Ok(Self::DHKEM_X25519_HKDF_SHA256),
            NamedGroup::X448 => Ok(Self::DHKEM_X448_HKDF_SHA512),
            other => Err(Unsupported::Group(other).into()),
        }
    }
}

impl TryFrom<HashAlgorithm> for KdfId {
    type Error = Error;

    fn try_from(hash: HashAlgorithm) -> Result<Self, Self::Error> {
        match hash {
            HashAlgorithm::SHA256 => Ok(Self::HKDF_SHA256),
            HashAlgorithm::SHA384 => Ok(Self::HKDF_SHA384),
            HashAlgorithm::SHA512 => Ok(Self::HKDF_SHA512),
            other => Err(Unsupported::Hash(other).into()),
        }
    }
}

impl TryFrom<CipherSuite> for AeadId {
    type Error = Error;

    fn try_from(suite: CipherSuite) -> Result<Self, Self::Error> {
        match suite {
            CipherSuite::TLS13_AES_128_GCM_SHA256 => Ok(Self::AES_128_GCM),
            CipherSuite::TLS13_AES_256_GCM_SHA384 => Ok(Self::AES_256_GCM),
            CipherSuite::TLS13_CHACHA20_POLY1305_SHA256 => Ok(Self::CHACHA20_POLY_1305),
            other => Err(Unsupported::CipherSuite(other).into()),
        }
    }
}

/// A domain-separation tag mixed into every labeled derivation.
///
/// See the bottom of [RFC 9180 §4](https://www.rfc-editor.org/rfc/rfc9180.html#section-4).
/// The HPKE form is `"HPKE" ‖ kem ‖ kdf ‖ aead` and the KEM form is
/// `"KEM" ‖ kem`, each identifier a big-endian `u16`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SuiteId {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl SuiteId {
    const MAX_LEN: usize = 10;

    fn from_parts(parts: &[&[u8]]) -> Self {
        let mut buf = [0u8; Self::MAX_LEN];
        let mut used = 0;
        for part in parts {
            buf[used..used + part.len()].copy_from_slice(part);
            used += part.len();
        }
        Self { buf, used }
    }
}

impl AsRef<[u8]> for SuiteId {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

impl core::fmt::Debug for SuiteId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SuiteId(")?;
        for b in self.as_ref() {
            write!(f, "{b:02x}")?;
        }
        f.write_str(")")
    }
}

/// The HPKE suite identifier for `(kem, kdf, aead)`.
pub fn build_suite_id(kem: KemId, kdf: KdfId, aead: AeadId) -> SuiteId {
    SuiteId::from_parts(&[
        b"HPKE",
        &kem.to_be_bytes(),
        &kdf.to_be_bytes(),
        &aead.to_be_bytes(),
    ])
}

/// The suite identifier DHKEM uses for its internal derivations.
pub fn kem_suite_id(kem: KemId) -> SuiteId {
    SuiteId::from_parts(&[b"KEM", &kem.to_be_bytes()])
}

/// The HPKE suite identifier for a negotiated TLS group, hash and cipher suite.
///
/// Fails when any of the three has no HPKE code point.
pub fn generate_suite_id(
    group: NamedGroup,
    hash: HashAlgorithm,
    suite: CipherSuite,
) -> Result<SuiteId, Error> {
    Ok(build_suite_id(
        KemId::try_from(group)?,
        KdfId::try_from(hash)?,
        AeadId::try_from(suite)?,
    ))
}
