//! Interfaces the rest of the crate uses to reach cryptographic primitives.
//!
//! Every algorithm is reached through a trait object, so the factory can
//! hand out classical, hybrid and experimental backends behind one
//! interface.  The RustCrypto implementations of these traits live in
//! [`crate::provider`].

/// AEAD ciphers, keys and nonces.
pub mod cipher;

/// Hashing interfaces.
pub mod hash;

/// HKDF interfaces and the HMAC-based implementation.
pub mod hkdf;

/// HMAC interfaces.
pub mod hmac;

/// Key exchange interfaces, including hybrid composition.
pub mod kx;
