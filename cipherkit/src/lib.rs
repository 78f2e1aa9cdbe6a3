//! # cipherkit - primitive selection and HPKE contexts for TLS 1.3
//!
//! cipherkit is the part of a TLS 1.3 / HPKE stack that turns negotiated
//! identifiers into working cryptography. It does two jobs:
//!
//! * Given a [`CipherSuite`] or [`NamedGroup`], a [`Factory`] builds the
//!   correctly-paired primitives: key exchange (classical, pure ML-KEM, or
//!   hybrid), AEAD, key derivation, transcript hashing and peer certificates.
//! * Given derived keying material, an [`hpke::EncryptionContext`] seals and
//!   opens messages under an advancing nonce and exports secrets bound to a
//!   context string, following [RFC 9180].
//!
//! The handshake state machine, record framing and certificate validation
//! policy are not part of this crate.
//!
//! ## Getting started
//!
//! ```
//! use cipherkit::{CipherSuite, Factory, MultiBackendFactory};
//! use cipherkit::crypto::cipher::TrafficKey;
//!
//! let factory = MultiBackendFactory::default();
//! let mut aead = factory
//!     .make_aead(CipherSuite::TLS13_AES_128_GCM_SHA256)
//!     .unwrap();
//! aead.set_key(TrafficKey::new(&[0x42; 16], &[0x24; 12]).unwrap())
//!     .unwrap();
//!
//! let sealed = aead.encrypt(b"header", b"hello", 0).unwrap();
//! let opened = aead.decrypt(b"header", &sealed, 0).unwrap();
//! assert_eq!(opened, b"hello");
//! ```
//!
//! ## Crate features
//!
//! - `logging` (enabled by default): make the crate use the `log` crate to
//!   report what primitives were selected and why a request was refused.
//!   Key material is never logged.
//!
//! - `std` (enabled by default): enable the `std` support of the
//!   certificate parsing dependencies.
//!
//! [RFC 9180]: https://www.rfc-editor.org/rfc/rfc9180.html

#![no_std]
#![forbid(unsafe_code, unused_must_use)]
#![deny(
    clippy::alloc_instead_of_core,
    clippy::clone_on_ref_ptr,
    clippy::std_instead_of_core,
    clippy::use_self,
    unused_import_braces
)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::manual_let_else,
    clippy::or_fun_call,
    clippy::semicolon_if_nothing_returned
)]
// Enum variants mirror IANA registry names.
#![allow(non_camel_case_types, clippy::upper_case_acronyms)]
// Enable documentation for all features on docs.rs
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// This `extern crate` plus the `#![no_std]` attribute changes the default prelude from
// `std::prelude` to `core::prelude`. That forces one to _explicitly_ import (`use`) everything that
// is in `std::prelude` but not in `core::prelude`. This helps maintain no-std support as even
// developers that are not interested in, or aware of, no-std support and / or that never run
// `cargo build --no-default-features` locally will get errors when they rely on `std::prelude` API.
#[cfg(any(feature = "std", test))]
extern crate std;

// log for logging (optional).
#[cfg(feature = "logging")]
use log;

#[cfg(not(feature = "logging"))]
#[allow(unused_macros, unused_imports)]
mod log {
    macro_rules! trace    ( ($($tt:tt)*) => {{}} );
    macro_rules! debug    ( ($($tt:tt)*) => {{}} );
    macro_rules! warn     ( ($($tt:tt)*) => {{}} );
    macro_rules! error    ( ($($tt:tt)*) => {{}} );
    pub(crate) use {debug, error, trace, warn};
}

#[macro_use]
mod macros;

mod cert;
pub mod crypto;
mod enums;
mod error;
mod factory;
mod hash_hs;
pub mod hpke;
mod key_schedule;
pub mod provider;

/// The certificate types of [`CertificateEntry`] and [`PeerCert`].
pub use pki_types;

pub use crate::cert::{CertificateEntry, CertificateParser, PeerCert, WebPkiCertificateParser};
pub use crate::enums::{CipherSuite, HashAlgorithm, NamedGroup};
pub use crate::error::{ApiMisuse, Error, Unsupported};
pub use crate::factory::{BackendConfig, Factory, MultiBackendFactory};
pub use crate::hash_hs::{HandshakeContext, HandshakeContextImpl};
pub use crate::key_schedule::{KeyDerivation, KeyDerivationImpl};
