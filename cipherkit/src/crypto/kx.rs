use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use zeroize::Zeroize;

use crate::enums::NamedGroup;
use crate::error::Error;
use crate::log::trace;

/// Which side of a key exchange we are.
///
/// Symmetric (Diffie-Hellman style) algorithms ignore this.  KEM-based
/// algorithms need it: the initiator generates a key pair and later
/// decapsulates, the responder encapsulates to the initiator's key.
#[allow(clippy::exhaustive_enums)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyExchangeMode {
    /// The side sending the first key share (a TLS client).
    Initiator,
    /// The side answering a key share (a TLS server).
    Responder,
}

/// A key exchange in progress, for one named group.
pub trait KeyExchange: Send + Sync {
    /// Generate this side's key material.
    ///
    /// For a KEM responder there is nothing to generate ahead of the peer's
    /// share, and this does nothing.
    fn generate_key_pair(&mut self) -> Result<(), Error>;

    /// The key share to send to the peer.
    ///
    /// For a KEM responder this is the ciphertext, which only exists after
    /// [`KeyExchange::generate_shared_secret()`].
    fn key_share(&self) -> Result<Vec<u8>, Error>;

    /// Complete the exchange with the peer's key share.
    fn generate_shared_secret(&mut self, peer_key_share: &[u8]) -> Result<SharedSecret, Error>;

    /// Length of the key share this side expects to receive from the peer.
    fn expected_peer_key_share_len(&self) -> usize;

    /// The group this exchange is for.
    fn group(&self) -> NamedGroup;
}

/// The result from a key exchange.
///
/// Zeroed on drop.
pub struct SharedSecret {
    buf: Vec<u8>,
}

impl SharedSecret {
    /// Returns the shared secret as a slice of bytes.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

impl From<&[u8]> for SharedSecret {
    fn from(source: &[u8]) -> Self {
        Self {
            buf: source.to_vec(),
        }
    }
}

impl From<Vec<u8>> for SharedSecret {
    fn from(buf: Vec<u8>) -> Self {
        Self { buf }
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("len", &self.buf.len())
            .finish()
    }
}

/// A hybrid of one classical and one post-quantum key exchange.
///
/// Key shares and shared secrets are both `classical || post_quantum`.  The
/// mode is only meaningful to the post-quantum component.
pub struct HybridKeyExchange {
    classical: Box<dyn KeyExchange>,
    post_quantum: Box<dyn KeyExchange>,
    name: NamedGroup,
}

impl HybridKeyExchange {
    /// Compose `classical` and `post_quantum` into the hybrid group `name`.
    pub fn new(
        name: NamedGroup,
        classical: Box<dyn KeyExchange>,
        post_quantum: Box<dyn KeyExchange>,
    ) -> Self {
        Self {
            classical,
            post_quantum,
            name,
        }
    }

    /// Split a received share into its classical and post-quantum parts.
    fn split<'a>(&self, share: &'a [u8]) -> Option<(&'a [u8], &'a [u8])> {
        let classical_len = self.classical.expected_peer_key_share_len();
        if share.len() != self.expected_peer_key_share_len() {
            return None;
        }
        Some(share.split_at(classical_len))
    }
}

impl KeyExchange for HybridKeyExchange {
    fn generate_key_pair(&mut self) -> Result<(), Error> {
        self.classical.generate_key_pair()?;
        self.post_quantum.generate_key_pair()
    }

    fn key_share(&self) -> Result<Vec<u8>, Error> {
        let mut share = self.classical.key_share()?;
        share.extend_from_slice(&self.post_quantum.key_share()?);
        Ok(share)
    }

    fn generate_shared_secret(&mut self, peer_key_share: &[u8]) -> Result<SharedSecret, Error> {
        let (classical_share, post_quantum_share) = self
            .split(peer_key_share)
            .ok_or(Error::InvalidKeyShare)?;
        trace!(
            "{:?}: splitting peer share into {} + {} bytes",
            self.name,
            classical_share.len(),
            post_quantum_share.len()
        );

        let cl = self
            .classical
            .generate_shared_secret(classical_share)?;
        let pq = self
            .post_quantum
            .generate_shared_secret(post_quantum_share)?;

        let mut secret = Vec::with_capacity(cl.secret_bytes().len() + pq.secret_bytes().len());
        secret.extend_from_slice(cl.secret_bytes());
        secret.extend_from_slice(pq.secret_bytes());
        Ok(SharedSecret::from(secret))
    }

    fn expected_peer_key_share_len(&self) -> usize {
        self.classical.expected_peer_key_share_len()
            + self
                .post_quantum
                .expected_peer_key_share_len()
    }

    fn group(&self) -> NamedGroup {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    /// A fake exchange whose share and secret are fixed bytes.
    struct Fixed {
        share: Vec<u8>,
        secret: Vec<u8>,
        peer_len: usize,
    }

    impl KeyExchange for Fixed {
        fn generate_key_pair(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn key_share(&self) -> Result<Vec<u8>, Error> {
            Ok(self.share.clone())
        }

        fn generate_shared_secret(&mut self, peer: &[u8]) -> Result<SharedSecret, Error> {
            assert_eq!(peer.len(), self.peer_len);
            Ok(SharedSecret::from(&self.secret[..]))
        }

        fn expected_peer_key_share_len(&self) -> usize {
            self.peer_len
        }

        fn group(&self) -> NamedGroup {
            NamedGroup::Unknown(0)
        }
    }

    fn hybrid() -> HybridKeyExchange {
        HybridKeyExchange::new(
            NamedGroup::secp256r1MLKEM768,
            Box::new(Fixed {
                share: vec![1; 3],
                secret: vec![0xc1; 2],
                peer_len: 3,
            }),
            Box::new(Fixed {
                share: vec![2; 5],
                secret: vec![0xb2; 4],
                peer_len: 6,
            }),
        )
    }

    #[test]
    fn shares_and_secrets_are_classical_first() {
        let mut kx = hybrid();
        kx.generate_key_pair().unwrap();
        assert_eq!(kx.key_share().unwrap(), vec![1, 1, 1, 2, 2, 2, 2, 2]);
        assert_eq!(kx.expected_peer_key_share_len(), 9);

        let secret = kx
            .generate_shared_secret(&[0u8; 9])
            .unwrap();
        assert_eq!(
            secret.secret_bytes(),
            &[0xc1, 0xc1, 0xb2, 0xb2, 0xb2, 0xb2]
        );
        assert_eq!(kx.group(), NamedGroup::secp256r1MLKEM768);
    }

    #[test]
    fn wrong_length_peer_share_is_rejected() {
        let mut kx = hybrid();
        assert_eq!(
            kx.generate_shared_secret(&[0u8; 8])
                .unwrap_err(),
            Error::InvalidKeyShare
        );
        assert_eq!(
            kx.generate_shared_secret(&[0u8; 10])
                .unwrap_err(),
            Error::InvalidKeyShare
        );
    }
}
