//! RustCrypto implementations of the [`crate::crypto`] interfaces.
//!
//! These are what [`crate::MultiBackendFactory`] hands out.  The hash, HMAC
//! and HKDF instances are statics and can be used directly.

use crate::crypto::hkdf::HkdfUsingHmac;

/// AEAD ciphers: AES-GCM, ChaCha20-Poly1305, AES-OCB and AEGIS.
pub mod aead;

/// SHA-2 hash functions.
pub mod hash;

/// HMAC over the SHA-2 hash functions.
pub mod hmac;

/// Classical key exchange groups and their DHKEM counterparts.
pub mod kx;

/// ML-KEM key encapsulation, used as a key exchange.
pub mod mlkem;

/// HKDF-SHA256.
pub static HKDF_SHA256: HkdfUsingHmac<'static> = HkdfUsingHmac(&hmac::HMAC_SHA256);
/// HKDF-SHA384.
pub static HKDF_SHA384: HkdfUsingHmac<'static> = HkdfUsingHmac(&hmac::HMAC_SHA384);
/// HKDF-SHA512.
pub static HKDF_SHA512: HkdfUsingHmac<'static> = HkdfUsingHmac(&hmac::HMAC_SHA512);
