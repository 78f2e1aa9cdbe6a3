use alloc::boxed::Box;

use crate::crypto::hash::{self, Hash};
use crate::crypto::hkdf::{Hkdf, OkmBlock};
use crate::crypto::hmac::{self, Hmac};
use crate::enums::HashAlgorithm;
use crate::error::Error;
use crate::key_schedule::{KeyDerivation, KeyDerivationImpl};

/// A running hash of the handshake transcript.
///
/// Obtain one from [`crate::Factory::make_handshake_context()`].
pub trait HandshakeContext: Send + Sync {
    /// Hash a handshake message (or any byte slice) into the transcript.
    fn append_to_transcript(&mut self, data: &[u8]);

    /// The transcript hash so far.
    ///
    /// More messages can be appended afterwards.
    fn handshake_context(&self) -> hash::Output;

    /// The `verify_data` of a Finished message sent under `base_key`.
    ///
    /// This is `HMAC(finished_key, transcript_hash)` where `finished_key` is
    /// `HKDF-Expand-Label(base_key, "finished", "", HashLen)`.
    fn finished_data(&self, base_key: &OkmBlock) -> Result<hmac::Tag, Error>;

    /// The hash function this transcript uses.
    fn algorithm(&self) -> HashAlgorithm;

    /// Fork the transcript, so the copy can diverge from this one.
    fn clone_box(&self) -> Box<dyn HandshakeContext>;
}

/// [`HandshakeContext`] over an incremental [`Hash`].
pub struct HandshakeContextImpl {
    ctx: Box<dyn hash::Context>,
    hash: &'static dyn Hash,
    hmac: &'static dyn Hmac,
    hkdf: &'static dyn Hkdf,
}

impl HandshakeContextImpl {
    /// Start an empty transcript.
    pub fn new(
        hash: &'static dyn Hash,
        hmac: &'static dyn Hmac,
        hkdf: &'static dyn Hkdf,
    ) -> Self {
        Self {
            ctx: hash.start(),
            hash,
            hmac,
            hkdf,
        }
    }
}

impl HandshakeContext for HandshakeContextImpl {
    fn append_to_transcript(&mut self, data: &[u8]) {
        self.ctx.update(data);
    }

    fn handshake_context(&self) -> hash::Output {
        self.ctx.fork_finish()
    }

    fn finished_data(&self, base_key: &OkmBlock) -> Result<hmac::Tag, Error> {
        let kd = KeyDerivationImpl::new(self.hash, self.hmac, self.hkdf);
        let finished_key = kd.derive_secret(base_key, b"finished", &[])?;
        Ok(kd.hmac(
            finished_key.as_ref(),
            self.handshake_context().as_ref(),
        ))
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.hash.algorithm()
    }

    fn clone_box(&self) -> Box<dyn HandshakeContext> {
        Box::new(Self {
            ctx: self.ctx.fork(),
            hash: self.hash,
            hmac: self.hmac,
            hkdf: self.hkdf,
        })
    }
}
