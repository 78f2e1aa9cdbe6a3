use alloc::vec::Vec;
use core::fmt;

use zeroize::Zeroizing;

use super::{kem_suite_id, KemId, LabeledHkdf, HPKE_V1};
use crate::crypto::hkdf::Hkdf;
use crate::crypto::kx::SharedSecret;
use crate::error::Error;

/// A Diffie-Hellman group with static (reusable) secret keys.
///
/// Secret keys are the group's raw scalar encoding; public keys are the
/// encoding RFC 9180 `SerializePublicKey` uses (SEC1 uncompressed for the
/// NIST curves, the raw u-coordinate for X25519).
pub trait DhGroup: Send + Sync {
    /// Generate a fresh key pair, returning `(secret, public)`.
    fn generate(&self) -> (Zeroizing<Vec<u8>>, Vec<u8>);

    /// The public key of `secret`.
    fn public_key(&self, secret: &[u8]) -> Result<Vec<u8>, Error>;

    /// `DH(secret, peer)`.
    fn dh(&self, secret: &[u8], peer: &[u8]) -> Result<SharedSecret, Error>;

    /// Length of an encoded public key.
    fn public_key_len(&self) -> usize;
}

/// A key encapsulation mechanism as HPKE uses it.
///
/// See [RFC 9180 §4 "Cryptographic Dependencies"][0].
///
/// [0]: https://www.rfc-editor.org/rfc/rfc9180.html#section-4
pub trait Kem: Send + Sync {
    /// The IANA identifier of this KEM.
    fn id(&self) -> KemId;

    /// Generate a recipient key pair, returning `(secret, public)`.
    fn generate_key_pair(&self) -> (Zeroizing<Vec<u8>>, Vec<u8>);

    /// Make a fresh shared secret for `recipient`, returning it with the
    /// encapsulation the recipient needs to recover it.
    fn encap(&self, recipient: &[u8]) -> Result<(SharedSecret, Vec<u8>), Error>;

    /// Recover the shared secret from `enc` with the recipient's secret key.
    fn decap(&self, enc: &[u8], recipient_secret: &[u8]) -> Result<SharedSecret, Error>;

    /// `Nsecret`: the length of the shared secrets this KEM produces.
    fn secret_len(&self) -> usize;
}

/// DHKEM: a [`Kem`] built from a [`DhGroup`] and an HKDF.
///
/// See [RFC 9180 §4.1 "DH-Based KEM (DHKEM)"][0].
///
/// [0]: https://www.rfc-editor.org/rfc/rfc9180.html#section-4.1
pub struct DhKem {
    id: KemId,
    group: &'static dyn DhGroup,
    hkdf: LabeledHkdf,
}

impl DhKem {
    /// DHKEM identified as `id`, over `group`, deriving with `hkdf`.
    pub const fn new(id: KemId, group: &'static dyn DhGroup, hkdf: &'static dyn Hkdf) -> Self {
        Self {
            id,
            group,
            hkdf: LabeledHkdf::new(HPKE_V1, hkdf),
        }
    }

    /// `Encap` with a caller-chosen ephemeral secret key.
    pub(crate) fn encap_with_ephemeral(
        &self,
        recipient: &[u8],
        ephemeral_secret: &[u8],
    ) -> Result<(SharedSecret, Vec<u8>), Error> {
        // def Encap(pkR):
        //   skE, pkE = GenerateKeyPair()
        //   dh = DH(skE, pkR)
        //   enc = SerializePublicKey(pkE)
        //
        //   pkRm = SerializePublicKey(pkR)
        //   kem_context = concat(enc, pkRm)
        //
        //   shared_secret = ExtractAndExpand(dh, kem_context)
        //   return shared_secret, enc
        if recipient.len() != self.group.public_key_len() {
            return Err(Error::InvalidKeyShare);
        }
        let enc = self.group.public_key(ephemeral_secret)?;
        let dh = self.group.dh(ephemeral_secret, recipient)?;
        let kem_context = [&enc[..], recipient].concat();

        let shared_secret = self.extract_and_expand(dh.secret_bytes(), &kem_context)?;
        Ok((shared_secret, enc))
    }

    fn extract_and_expand(&self, dh: &[u8], kem_context: &[u8]) -> Result<SharedSecret, Error> {
        // def ExtractAndExpand(dh, kem_context):
        //   eae_prk = LabeledExtract("", "eae_prk", dh)
        //   shared_secret = LabeledExpand(eae_prk, "shared_secret",
        //                                 kem_context, Nsecret)
        //   return shared_secret
        let suite_id = kem_suite_id(self.id);
        let eae_prk = self
            .hkdf
            .labeled_extract(b"", b"eae_prk", dh, &suite_id);
        self.hkdf
            .labeled_expand(
                &eae_prk,
                b"shared_secret",
                kem_context,
                &suite_id,
                self.secret_len(),
            )
            .map(SharedSecret::from)
    }
}

impl Kem for DhKem {
    fn id(&self) -> KemId {
        self.id
    }

    fn generate_key_pair(&self) -> (Zeroizing<Vec<u8>>, Vec<u8>) {
        self.group.generate()
    }

    fn encap(&self, recipient: &[u8]) -> Result<(SharedSecret, Vec<u8>), Error> {
        let (ephemeral_secret, _) = self.group.generate();
        self.encap_with_ephemeral(recipient, &ephemeral_secret)
    }

    fn decap(&self, enc: &[u8], recipient_secret: &[u8]) -> Result<SharedSecret, Error> {
        // def Decap(enc, skR):
        //   pkE = DeserializePublicKey(enc)
        //   dh = DH(skR, pkE)
        //
        //   pkRm = SerializePublicKey(pk(skR))
        //   kem_context = concat(enc, pkRm)
        //
        //   shared_secret = ExtractAndExpand(dh, kem_context)
        //   return shared_secret
        if enc.len() != self.group.public_key_len() {
            return Err(Error::InvalidKeyShare);
        }
        let dh = self.group.dh(recipient_secret, enc)?;
        let pk_rm = self.group.public_key(recipient_secret)?;
        let kem_context = [enc, &pk_rm[..]].concat();

        self.extract_and_expand(dh.secret_bytes(), &kem_context)
    }

    fn secret_len(&self) -> usize {
        self.hkdf.hash_len()
    }
}

impl fmt::Debug for DhKem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DhKem")
            .field(&self.id)
            .finish()
    }
}
