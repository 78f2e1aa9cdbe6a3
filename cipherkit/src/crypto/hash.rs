use alloc::boxed::Box;

pub use crate::enums::HashAlgorithm;

/// A hash function that backs a transcript or a key schedule.
pub trait Hash: Send + Sync {
    /// A fresh incremental computation.
    fn start(&self) -> Box<dyn Context>;

    /// One-shot digest of `data`.
    fn hash(&self, data: &[u8]) -> Output;

    /// Digest length in bytes.
    fn output_len(&self) -> usize;

    /// The registry identifier of this function.
    fn algorithm(&self) -> HashAlgorithm;

    /// `hash(b"")`, which is also the transcript hash of an empty handshake.
    fn blank_hash(&self) -> &'static [u8];
}

/// A digest held inline, long enough for SHA-512.
#[derive(Clone)]
pub struct Output {
    buf: [u8; Self::MAX_LEN],
    used: usize,
}

impl Output {
    /// Largest digest this can hold.
    pub const MAX_LEN: usize = 64;

    /// Copy a digest of at most [`Output::MAX_LEN`] bytes.
    pub fn new(digest: &[u8]) -> Self {
        debug_assert!(digest.len() <= Self::MAX_LEN);
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..digest.len()].copy_from_slice(digest);
        Self {
            buf,
            used: digest.len(),
        }
    }
}

impl AsRef<[u8]> for Output {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

/// A running hash over a growing transcript.
pub trait Context: Send + Sync {
    /// The digest of everything added so far, leaving this context usable.
    fn fork_finish(&self) -> Output;

    /// An independent copy sharing the data added so far.
    fn fork(&self) -> Box<dyn Context>;

    /// Consume the context and return its digest.
    fn finish(self: Box<Self>) -> Output;

    /// Append `data` to the transcript.
    fn update(&mut self, data: &[u8]);
}
