//! Hybrid Public Key Encryption, [RFC 9180].
//!
//! The centre of this module is [`EncryptionContext`], one direction of an
//! HPKE channel: it seals and opens messages under an advancing nonce and
//! exports secrets bound to a context string.  Contexts are normally made by
//! [`setup_sender`] and [`setup_receiver`]; a context can also be built
//! directly from an already-keyed AEAD and an exporter secret.
//!
//! The labeled key derivation is exposed as [`LabeledHkdf`], and the suite
//! identifiers that domain-separate it by [`build_suite_id`] and
//! [`kem_suite_id`].
//!
//! [RFC 9180]: https://www.rfc-editor.org/rfc/rfc9180.html

mod context;
mod dhkem;
mod hkdf;
mod setup;
mod suite_id;

pub use context::{ContextState, EncryptionContext, ExporterSecret};
pub use dhkem::{DhGroup, DhKem, Kem};
pub use hkdf::{LabeledHkdf, HPKE_V1};
pub use setup::{setup_receiver, setup_sender, HpkeSuite, PskInput};
pub use suite_id::{
    build_suite_id, generate_suite_id, kem_suite_id, AeadId, KdfId, KemId, SuiteId,
};
