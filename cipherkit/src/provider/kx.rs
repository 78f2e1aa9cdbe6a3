use alloc::vec::Vec;

use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::crypto::kx::{KeyExchange, SharedSecret};
use crate::enums::NamedGroup;
use crate::error::{ApiMisuse, Error};
use crate::hpke::DhGroup;

/// X25519 key exchange.
///
/// The public key outlives the exchange: it is still the key share after
/// the shared secret has been generated.
pub struct X25519 {
    priv_key: Option<x25519_dalek::EphemeralSecret>,
    pub_key: Option<x25519_dalek::PublicKey>,
}

impl X25519 {
    pub(crate) fn new() -> Self {
        Self {
            priv_key: None,
            pub_key: None,
        }
    }
}

const X25519_LEN: usize = 32;

impl KeyExchange for X25519 {
    fn generate_key_pair(&mut self) -> Result<(), Error> {
        let priv_key = x25519_dalek::EphemeralSecret::random_from_rng(OsRng);
        self.pub_key = Some(x25519_dalek::PublicKey::from(&priv_key));
        self.priv_key = Some(priv_key);
        Ok(())
    }

    fn key_share(&self) -> Result<Vec<u8>, Error> {
        self.pub_key
            .as_ref()
            .map(|pub_key| pub_key.as_bytes().to_vec())
            .ok_or_else(|| ApiMisuse::KeyExchangeNotStarted.into())
    }

    fn generate_shared_secret(&mut self, peer_key_share: &[u8]) -> Result<SharedSecret, Error> {
        let priv_key = self
            .priv_key
            .take()
            .ok_or(ApiMisuse::KeyExchangeNotStarted)?;
        let peer: [u8; X25519_LEN] = peer_key_share
            .try_into()
            .map_err(|_| Error::InvalidKeyShare)?;

        let shared_secret = priv_key.diffie_hellman(&x25519_dalek::PublicKey::from(peer));
        if !shared_secret.was_contributory() {
            return Err(Error::InvalidKeyShare);
        }
        Ok(SharedSecret::from(&shared_secret.as_bytes()[..]))
    }

    fn expected_peer_key_share_len(&self) -> usize {
        X25519_LEN
    }

    fn group(&self) -> NamedGroup {
        NamedGroup::X25519
    }
}

/// X25519 as a static Diffie-Hellman group for DHKEM.
pub(crate) struct X25519Dh;

impl DhGroup for X25519Dh {
    fn generate(&self) -> (Zeroizing<Vec<u8>>, Vec<u8>) {
        let secret = x25519_dalek::StaticSecret::random_from_rng(OsRng);
        let public = x25519_dalek::PublicKey::from(&secret);
        (
            Zeroizing::new(secret.to_bytes().to_vec()),
            public.as_bytes().to_vec(),
        )
    }

    fn public_key(&self, secret: &[u8]) -> Result<Vec<u8>, Error> {
        let secret = x25519_secret(secret)?;
        Ok(x25519_dalek::PublicKey::from(&secret)
            .as_bytes()
            .to_vec())
    }

    fn dh(&self, secret: &[u8], peer: &[u8]) -> Result<SharedSecret, Error> {
        let secret = x25519_secret(secret)?;
        let peer: [u8; X25519_LEN] = peer
            .try_into()
            .map_err(|_| Error::InvalidKeyShare)?;
        let shared = secret.diffie_hellman(&x25519_dalek::PublicKey::from(peer));
        if !shared.was_contributory() {
            return Err(Error::InvalidKeyShare);
        }
        Ok(SharedSecret::from(&shared.as_bytes()[..]))
    }

    fn public_key_len(&self) -> usize {
        X25519_LEN
    }
}

fn x25519_secret(secret: &[u8]) -> Result<x25519_dalek::StaticSecret, Error> {
    let bytes: [u8; X25519_LEN] = secret
        .try_into()
        .map_err(|_| Error::InvalidKeyLength {
            expected: X25519_LEN,
            actual: secret.len(),
        })?;
    Ok(x25519_dalek::StaticSecret::from(bytes))
}

/// Defines ECDHE over a NIST curve, for both TLS key exchange and DHKEM.
///
/// Public keys are SEC1 uncompressed points.
macro_rules! nist_curve {
    ($kx:ident, $dh:ident, $curve:ident, $group:expr, $point_len:expr, $doc:literal) => {
        #[doc = $doc]
        pub struct $kx {
            priv_key: Option<$curve::ecdh::EphemeralSecret>,
            pub_key: Option<Vec<u8>>,
        }

        impl $kx {
            pub(crate) fn new() -> Self {
                Self {
                    priv_key: None,
                    pub_key: None,
                }
            }
        }

        impl KeyExchange for $kx {
            fn generate_key_pair(&mut self) -> Result<(), Error> {
                use $curve::elliptic_curve::sec1::ToEncodedPoint;

                let priv_key = $curve::ecdh::EphemeralSecret::random(&mut OsRng);
                let pub_key = priv_key
                    .public_key()
                    .to_encoded_point(false)
                    .as_bytes()
                    .to_vec();
                self.priv_key = Some(priv_key);
                self.pub_key = Some(pub_key);
                Ok(())
            }

            fn key_share(&self) -> Result<Vec<u8>, Error> {
                self.pub_key
                    .clone()
                    .ok_or_else(|| ApiMisuse::KeyExchangeNotStarted.into())
            }

            fn generate_shared_secret(
                &mut self,
                peer_key_share: &[u8],
            ) -> Result<SharedSecret, Error> {
                let priv_key = self
                    .priv_key
                    .take()
                    .ok_or(ApiMisuse::KeyExchangeNotStarted)?;
                if peer_key_share.len() != $point_len {
                    return Err(Error::InvalidKeyShare);
                }
                let peer = $curve::PublicKey::from_sec1_bytes(peer_key_share)
                    .map_err(|_| Error::InvalidKeyShare)?;
                let shared = priv_key.diffie_hellman(&peer);
                Ok(SharedSecret::from(&shared.raw_secret_bytes()[..]))
            }

            fn expected_peer_key_share_len(&self) -> usize {
                $point_len
            }

            fn group(&self) -> NamedGroup {
                $group
            }
        }

        pub(crate) struct $dh;

        impl DhGroup for $dh {
            fn generate(&self) -> (Zeroizing<Vec<u8>>, Vec<u8>) {
                use $curve::elliptic_curve::sec1::ToEncodedPoint;

                let secret = $curve::SecretKey::random(&mut OsRng);
                let public = secret
                    .public_key()
                    .to_encoded_point(false)
                    .as_bytes()
                    .to_vec();
                (Zeroizing::new(secret.to_bytes().to_vec()), public)
            }

            fn public_key(&self, secret: &[u8]) -> Result<Vec<u8>, Error> {
                use $curve::elliptic_curve::sec1::ToEncodedPoint;

                let secret = $curve::SecretKey::from_slice(secret).map_err(|_| {
                    Error::InvalidKeyLength {
                        expected: $point_len / 2,
                        actual: secret.len(),
                    }
                })?;
                Ok(secret
                    .public_key()
                    .to_encoded_point(false)
                    .as_bytes()
                    .to_vec())
            }

            fn dh(&self, secret: &[u8], peer: &[u8]) -> Result<SharedSecret, Error> {
                let secret = $curve::SecretKey::from_slice(secret).map_err(|_| {
                    Error::InvalidKeyLength {
                        expected: $point_len / 2,
                        actual: secret.len(),
                    }
                })?;
                let peer = $curve::PublicKey::from_sec1_bytes(peer)
                    .map_err(|_| Error::InvalidKeyShare)?;
                let shared = $curve::elliptic_curve::ecdh::diffie_hellman(
                    secret.to_nonzero_scalar(),
                    peer.as_affine(),
                );
                Ok(SharedSecret::from(&shared.raw_secret_bytes()[..]))
            }

            fn public_key_len(&self) -> usize {
                $point_len
            }
        }
    };
}

nist_curve!(
    Secp256r1,
    P256Dh,
    p256,
    NamedGroup::secp256r1,
    65,
    "ECDHE over NIST P-256."
);
nist_curve!(
    Secp384r1,
    P384Dh,
    p384,
    NamedGroup::secp384r1,
    97,
    "ECDHE over NIST P-384."
);
nist_curve!(
    Secp521r1,
    P521Dh,
    p521,
    NamedGroup::secp521r1,
    133,
    "ECDHE over NIST P-521."
);

#[cfg(test)]
mod tests {
    use std::prelude::v1::*;
    use std::vec;

    use super::*;

    fn agree(mut a: Box<dyn KeyExchange>, mut b: Box<dyn KeyExchange>) {
        a.generate_key_pair().unwrap();
        b.generate_key_pair().unwrap();
        let a_share = a.key_share().unwrap();
        let b_share = b.key_share().unwrap();
        assert_eq!(a_share.len(), b.expected_peer_key_share_len());

        let a_secret = a.generate_shared_secret(&b_share).unwrap();
        let b_secret = b.generate_shared_secret(&a_share).unwrap();
        assert_eq!(a_secret.secret_bytes(), b_secret.secret_bytes());
    }

    #[test]
    fn classical_groups_agree() {
        agree(Box::new(X25519::new()), Box::new(X25519::new()));
        agree(Box::new(Secp256r1::new()), Box::new(Secp256r1::new()));
        agree(Box::new(Secp384r1::new()), Box::new(Secp384r1::new()));
        agree(Box::new(Secp521r1::new()), Box::new(Secp521r1::new()));
    }

    #[test]
    fn share_before_generation_is_misuse() {
        let kx = Secp256r1::new();
        assert_eq!(
            kx.key_share(),
            Err(Error::ApiMisuse(ApiMisuse::KeyExchangeNotStarted))
        );
        let mut kx = X25519::new();
        assert!(matches!(
            kx.generate_shared_secret(&[9u8; 32]),
            Err(Error::ApiMisuse(ApiMisuse::KeyExchangeNotStarted))
        ));
    }

    #[test]
    fn share_survives_shared_secret() {
        let mut a = X25519::new();
        let mut b = X25519::new();
        a.generate_key_pair().unwrap();
        b.generate_key_pair().unwrap();
        let share = b.key_share().unwrap();
        b.generate_shared_secret(&a.key_share().unwrap())
            .unwrap();
        assert_eq!(b.key_share().unwrap(), share);

        // the secret key is single-use
        assert!(matches!(
            b.generate_shared_secret(&a.key_share().unwrap()),
            Err(Error::ApiMisuse(ApiMisuse::KeyExchangeNotStarted))
        ));
    }

    #[test]
    fn low_order_x25519_point_is_rejected() {
        let mut kx = X25519::new();
        kx.generate_key_pair().unwrap();
        assert!(matches!(
            kx.generate_shared_secret(&[0u8; 32]),
            Err(Error::InvalidKeyShare)
        ));
    }

    #[test]
    fn malformed_points_are_rejected() {
        let mut kx = Secp384r1::new();
        kx.generate_key_pair().unwrap();
        assert!(matches!(
            kx.generate_shared_secret(&vec![4u8; 97]),
            Err(Error::InvalidKeyShare)
        ));

        let mut kx = Secp256r1::new();
        kx.generate_key_pair().unwrap();
        assert!(matches!(
            kx.generate_shared_secret(&[4u8; 64]),
            Err(Error::InvalidKeyShare)
        ));
    }

    #[test]
    fn static_dh_agrees_with_itself() {
        let groups: [&dyn DhGroup; 4] = [&X25519Dh, &P256Dh, &P384Dh, &P521Dh];
        for group in groups {
            let (sk_a, pk_a) = group.generate();
            let (sk_b, pk_b) = group.generate();
            assert_eq!(pk_a.len(), group.public_key_len());
            assert_eq!(group.public_key(&sk_a).unwrap(), pk_a);

            let ab = group.dh(&sk_a, &pk_b).unwrap();
            let ba = group.dh(&sk_b, &pk_a).unwrap();
            assert_eq!(ab.secret_bytes(), ba.secret_bytes());
        }
    }
}
