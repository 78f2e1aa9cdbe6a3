use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use super::{LabeledHkdf, SuiteId};
use crate::crypto::cipher::Aead;
use crate::crypto::hkdf::OkmBlock;
use crate::error::Error;
use crate::log::{trace, warn};

/// Where an [`EncryptionContext`] is in its life.
#[allow(clippy::exhaustive_enums)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Messages can be sealed and opened.
    Active,
    /// The sequence number space is used up.  Every further `seal` or
    /// `open` fails with [`Error::SequenceExhausted`]; a new context is
    /// needed.
    Exhausted,
}

/// The secret an [`EncryptionContext`] exports from.
pub struct ExporterSecret(OkmBlock);

impl ExporterSecret {
    /// Wrap raw exporter secret bytes.
    ///
    /// The secret can be at most 64 bytes, the largest supported `HashLen`.
    pub fn new(secret: &[u8]) -> Result<Self, Error> {
        if secret.len() > OkmBlock::MAX_LEN {
            return Err(Error::InvalidKeyLength {
                expected: OkmBlock::MAX_LEN,
                actual: secret.len(),
            });
        }
        Ok(Self(OkmBlock::new(secret)))
    }
}

impl From<OkmBlock> for ExporterSecret {
    fn from(okm: OkmBlock) -> Self {
        Self(okm)
    }
}

impl fmt::Debug for ExporterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterSecret")
            .field("len", &self.0.as_ref().len())
            .finish()
    }
}

/// One direction of an HPKE channel.
///
/// Holds a keyed AEAD whose IV is the base nonce, and a sequence number that
/// advances once per [`seal`] or [`open`].  The nonce for each message is the
/// base nonce XORed with the big-endian sequence number, so the sender and
/// receiver must process messages in the same order.
///
/// See [RFC 9180 §5.2 "Encryption and Decryption"][0].
///
/// [`seal`]: EncryptionContext::seal
/// [`open`]: EncryptionContext::open
/// [0]: https://www.rfc-editor.org/rfc/rfc9180.html#section-5.2
pub struct EncryptionContext {
    aead: Box<dyn Aead>,
    exporter_secret: ExporterSecret,
    hkdf: LabeledHkdf,
    suite_id: SuiteId,
    seq: u64,
    state: ContextState,
}

impl EncryptionContext {
    /// Make a context from an AEAD that already has its key and base nonce
    /// installed.
    pub fn new(
        aead: Box<dyn Aead>,
        exporter_secret: ExporterSecret,
        hkdf: LabeledHkdf,
        suite_id: SuiteId,
    ) -> Self {
        trace!(
            "HPKE context for {:?} using {:?} with {:?}",
            aead.suite(),
            hkdf,
            suite_id
        );
        Self {
            aead,
            exporter_secret,
            hkdf,
            suite_id,
            seq: 0,
            state: ContextState::Active,
        }
    }

    /// Encrypt and authenticate `plaintext`, authenticating `aad` too.
    ///
    /// The output is the ciphertext with the tag appended.  The sequence
    /// number advances only on success.
    pub fn seal(&mut self, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        // def Context<S>.Seal(aad, pt):
        //   ct = Seal(self.key, self.ComputeNonce(self.seq), aad, pt)
        //   self.IncrementSeq()
        //   return ct
        self.check_active()?;
        let ciphertext = self
            .aead
            .encrypt(aad, plaintext, self.seq)?;
        self.increment_seq();
        Ok(ciphertext)
    }

    /// Decrypt and verify `ciphertext`, which must authenticate `aad`.
    ///
    /// The sequence number advances whether or not the message
    /// authenticates, so a rejected ciphertext is never retried under the
    /// same nonce.
    pub fn open(&mut self, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        self.check_active()?;
        let result = self
            .aead
            .decrypt(aad, ciphertext, self.seq);
        self.increment_seq();
        result
    }

    /// Export `len` bytes bound to `context`.
    ///
    /// This does not touch the sequence number, and works in every state.
    ///
    /// See [RFC 9180 §5.3 "Secret Export"][0].
    ///
    /// [0]: https://www.rfc-editor.org/rfc/rfc9180.html#section-5.3
    pub fn export_secret(&self, context: &[u8], len: usize) -> Result<Vec<u8>, Error> {
        // def Context.Export(exporter_context, L):
        //   return LabeledExpand(self.exporter_secret, "sec",
        //                        exporter_context, L)
        self.hkdf.labeled_expand(
            &self.exporter_secret.0,
            b"sec",
            context,
            &self.suite_id,
            len,
        )
    }

    /// The sequence number the next `seal` or `open` will use.
    pub fn sequence_number(&self) -> u64 {
        self.seq
    }

    /// Whether the context can still seal and open.
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// The suite identifier bound into exports.
    pub fn suite_id(&self) -> &SuiteId {
        &self.suite_id
    }

    fn check_active(&self) -> Result<(), Error> {
        match self.state {
            ContextState::Active => Ok(()),
            ContextState::Exhausted => Err(Error::SequenceExhausted),
        }
    }

    fn increment_seq(&mut self) {
        // def Context<ROLE>.IncrementSeq():
        //   if self.seq >= (1 << (8*Nn)) - 1:
        //     raise MessageLimitReachedError
        //   self.seq += 1
        self.seq += 1;
        if self.seq == u64::MAX {
            warn!("HPKE context sequence numbers exhausted");
            self.state = ContextState::Exhausted;
        }
    }

    #[cfg(test)]
    fn with_sequence_number(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }
}

impl fmt::Debug for EncryptionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionContext")
            .field("suite", &self.aead.suite())
            .field("suite_id", &self.suite_id)
            .field("seq", &self.seq)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::prelude::v1::*;
    use std::vec;

    use super::*;
    use crate::crypto::cipher::TrafficKey;
    use crate::enums::CipherSuite;
    use crate::factory::{Factory, MultiBackendFactory};
    use crate::hpke::{build_suite_id, AeadId, KdfId, KemId};
    use crate::provider::HKDF_SHA256;

    const EXPORTER_SECRET: &str =
        "60f5fe76e2699f98c19eab82fecf330b990ac32694a8e40e598e2326d0e29150";

    fn context(suite: CipherSuite, key: &[u8], iv: &[u8]) -> EncryptionContext {
        let mut aead = MultiBackendFactory::default()
            .make_aead(suite)
            .unwrap();
        aead.set_key(TrafficKey::new(key, iv).unwrap())
            .unwrap();
        aead.set_encrypted_buffer_headroom(10);
        EncryptionContext::new(
            aead,
            ExporterSecret::new(&hex::decode(EXPORTER_SECRET).unwrap()).unwrap(),
            LabeledHkdf::new(b"HPKE-05 ", &HKDF_SHA256),
            build_suite_id(
                KemId::DHKEM_X25519_HKDF_SHA256,
                KdfId::HKDF_SHA256,
                AeadId::AES_128_GCM,
            ),
        )
    }

    fn aes128() -> EncryptionContext {
        context(CipherSuite::TLS13_AES_128_GCM_SHA256, &[0x11; 16], &[0x22; 12])
    }

    #[test]
    fn sequence_advances_on_seal() {
        let mut ctx = aes128();
        assert_eq!(ctx.sequence_number(), 0);
        ctx.seal(b"", b"one").unwrap();
        ctx.seal(b"", b"two").unwrap();
        assert_eq!(ctx.sequence_number(), 2);
        assert_eq!(ctx.state(), ContextState::Active);
    }

    #[test]
    fn nonce_for_nth_message_is_base_nonce_xor_n() {
        let mut ctx = aes128();
        for _ in 0..5 {
            ctx.seal(b"aad", b"filler").unwrap();
        }
        let sealed = ctx.seal(b"aad", b"sixth").unwrap();

        let mut nonce = [0x22u8; 12];
        nonce[11] ^= 5;
        let mut aead = MultiBackendFactory::default()
            .make_aead(CipherSuite::TLS13_AES_128_GCM_SHA256)
            .unwrap();
        aead.set_key(TrafficKey::new(&[0x11; 16], &nonce).unwrap())
            .unwrap();
        assert_eq!(aead.decrypt(b"aad", &sealed, 0).unwrap(), b"sixth");
    }

    #[test]
    fn failed_open_still_advances() {
        let mut sender = aes128();
        let mut receiver = aes128();

        let first = sender.seal(b"", b"first").unwrap();
        let second = sender.seal(b"", b"second").unwrap();

        let mut tampered = first.clone();
        tampered[0] ^= 1;
        assert_eq!(
            receiver.open(b"", &tampered),
            Err(Error::AuthenticationFailed)
        );
        assert_eq!(receiver.sequence_number(), 1);

        // the untampered first message now fails too: its nonce is spent
        assert_eq!(receiver.open(b"", &first), Err(Error::AuthenticationFailed));
        assert_eq!(receiver.sequence_number(), 2);

        let mut receiver = aes128();
        assert_eq!(receiver.open(b"", &first).unwrap(), b"first");
        assert_eq!(receiver.open(b"", &second).unwrap(), b"second");
    }

    #[test]
    fn exhaustion_is_terminal() {
        let mut sender = aes128().with_sequence_number(u64::MAX - 2);
        sender.seal(b"", b"a").unwrap();
        assert_eq!(sender.state(), ContextState::Active);
        let last = sender.seal(b"", b"b").unwrap();
        assert_eq!(sender.state(), ContextState::Exhausted);
        assert_eq!(sender.sequence_number(), u64::MAX);
        assert_eq!(sender.seal(b"", b"c"), Err(Error::SequenceExhausted));
        assert_eq!(sender.sequence_number(), u64::MAX);

        let mut receiver = aes128().with_sequence_number(u64::MAX - 1);
        assert_eq!(receiver.open(b"", &last).unwrap(), b"b");
        assert_eq!(receiver.open(b"", &last), Err(Error::SequenceExhausted));

        // exports keep working
        assert_eq!(sender.export_secret(b"ctx", 16).unwrap().len(), 16);
    }

    #[test]
    fn export_does_not_touch_sequence() {
        let mut ctx = aes128();
        ctx.seal(b"", b"x").unwrap();
        let a = ctx.export_secret(b"Context-0", 32).unwrap();
        let b = ctx.export_secret(b"Context-1", 32).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, ctx.export_secret(b"Context-0", 32).unwrap());
        assert_eq!(ctx.sequence_number(), 1);
    }

    #[test]
    fn export_length_boundary() {
        let ctx = aes128();
        assert_eq!(ctx.export_secret(b"", 255 * 32).unwrap().len(), 8160);
        assert_eq!(
            ctx.export_secret(b"", 255 * 32 + 1),
            Err(Error::LengthExceeded {
                requested: 8161,
                maximum: 8160
            })
        );
        assert!(ctx.export_secret(b"", usize::MAX).is_err());
    }

    #[test]
    fn oversized_exporter_secret_is_refused() {
        assert!(ExporterSecret::new(&vec![0u8; 65]).is_err());
        assert!(ExporterSecret::new(&[0u8; 64]).is_ok());
    }

    #[test]
    fn debug_does_not_leak_secrets() {
        let ctx = aes128();
        let text = std::format!("{ctx:?}");
        assert!(text.contains("seq: 0"));
        assert!(!text.contains("60f5fe"));
        assert_eq!(
            std::format!("{:?}", ExporterSecret::new(&[1u8; 32]).unwrap()),
            "ExporterSecret { len: 32 }"
        );
    }
}
