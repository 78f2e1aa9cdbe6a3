use alloc::vec::Vec;

use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{self, AeadCore, AeadInPlace, KeyInit, KeySizeUser};

use crate::crypto::cipher::{key_not_installed, Aead, Iv, Nonce, TrafficKey};
use crate::enums::CipherSuite;
use crate::error::Error;

/// AES-128-GCM.
pub(crate) type Aes128Gcm = RustCryptoAead<aes_gcm::Aes128Gcm>;
/// AES-256-GCM.
pub(crate) type Aes256Gcm = RustCryptoAead<aes_gcm::Aes256Gcm>;
/// ChaCha20-Poly1305.
pub(crate) type Chacha20Poly1305 = RustCryptoAead<chacha20poly1305::ChaCha20Poly1305>;
/// AES-128-OCB with a 96-bit nonce and 128-bit tag.
pub(crate) type Aes128Ocb = RustCryptoAead<ocb3::Ocb3<aes::Aes128>>;

/// An [`Aead`] over any RustCrypto `AeadInPlace` implementation.
pub struct RustCryptoAead<C> {
    suite: CipherSuite,
    state: Option<(C, Iv)>,
    headroom: usize,
}

impl<C> RustCryptoAead<C> {
    pub(crate) fn new(suite: CipherSuite) -> Self {
        Self {
            suite,
            state: None,
            headroom: 0,
        }
    }
}

impl<C> RustCryptoAead<C>
where
    C: AeadInPlace + KeyInit + Send + Sync,
{
    fn cipher_for(&self, nonce: &Nonce) -> Result<&C, Error> {
        let (cipher, _) = self
            .state
            .as_ref()
            .ok_or_else(key_not_installed)?;
        if nonce.as_ref().len() != self.iv_len() {
            return Err(Error::InvalidKeyLength {
                expected: self.iv_len(),
                actual: nonce.as_ref().len(),
            });
        }
        Ok(cipher)
    }
}

impl<C> Aead for RustCryptoAead<C>
where
    C: AeadInPlace + KeyInit + Send + Sync,
{
    fn suite(&self) -> CipherSuite {
        self.suite
    }

    fn key_len(&self) -> usize {
        <C as KeySizeUser>::key_size()
    }

    fn iv_len(&self) -> usize {
        <C as AeadCore>::NonceSize::USIZE
    }

    fn tag_len(&self) -> usize {
        <C as AeadCore>::TagSize::USIZE
    }

    fn set_key(&mut self, key: TrafficKey) -> Result<(), Error> {
        key.check_lengths(self.key_len(), self.iv_len())?;
        let cipher = C::new_from_slice(key.key.as_ref()).map_err(|_| Error::InvalidKeyLength {
            expected: self.key_len(),
            actual: key.key.as_ref().len(),
        })?;
        self.state = Some((cipher, key.iv.clone()));
        Ok(())
    }

    fn iv(&self) -> Result<&Iv, Error> {
        self.state
            .as_ref()
            .map(|(_, iv)| iv)
            .ok_or_else(key_not_installed)
    }

    fn set_encrypted_buffer_headroom(&mut self, headroom: usize) {
        self.headroom = headroom;
    }

    fn seal(&self, nonce: &Nonce, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let cipher = self.cipher_for(nonce)?;

        let mut payload = Vec::with_capacity(plaintext.len() + self.tag_len() + self.headroom);
        payload.extend_from_slice(plaintext);
        cipher
            .encrypt_in_place(
                aead::Nonce::<C>::from_slice(nonce.as_ref()),
                aad,
                &mut payload,
            )
            .map_err(|_| Error::EncryptError)?;
        Ok(payload)
    }

    fn open(&self, nonce: &Nonce, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let cipher = self.cipher_for(nonce)?;

        if ciphertext.len() < self.tag_len() {
            return Err(Error::AuthenticationFailed);
        }

        let mut payload = ciphertext.to_vec();
        cipher
            .decrypt_in_place(
                aead::Nonce::<C>::from_slice(nonce.as_ref()),
                aad,
                &mut payload,
            )
            .map_err(|_| Error::AuthenticationFailed)?;
        Ok(payload)
    }
}

/// Which AEGIS variant an [`Aegis`] instance runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AegisVariant {
    Aegis128L,
    Aegis256,
}

/// AEGIS-128L or AEGIS-256 with a 128-bit tag.
pub struct Aegis {
    variant: AegisVariant,
    key: Option<TrafficKey>,
    headroom: usize,
}

impl Aegis {
    pub(crate) fn new(variant: AegisVariant) -> Self {
        Self {
            variant,
            key: None,
            headroom: 0,
        }
    }

    fn installed(&self) -> Result<&TrafficKey, Error> {
        self.key
            .as_ref()
            .ok_or_else(key_not_installed)
    }
}

const AEGIS_TAG_LEN: usize = 16;

impl Aead for Aegis {
    fn suite(&self) -> CipherSuite {
        match self.variant {
            AegisVariant::Aegis128L => CipherSuite::TLS13_AEGIS_128L_SHA256,
            AegisVariant::Aegis256 => CipherSuite::TLS13_AEGIS_256_SHA512,
        }
    }

    fn key_len(&self) -> usize {
        match self.variant {
            AegisVariant::Aegis128L => 16,
            AegisVariant::Aegis256 => 32,
        }
    }

    fn iv_len(&self) -> usize {
        self.key_len()
    }

    fn tag_len(&self) -> usize {
        AEGIS_TAG_LEN
    }

    fn set_key(&mut self, key: TrafficKey) -> Result<(), Error> {
        key.check_lengths(self.key_len(), self.iv_len())?;
        self.key = Some(key);
        Ok(())
    }

    fn iv(&self) -> Result<&Iv, Error> {
        Ok(&self.installed()?.iv)
    }

    fn set_encrypted_buffer_headroom(&mut self, headroom: usize) {
        self.headroom = headroom;
    }

    fn seal(&self, nonce: &Nonce, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let key = self.installed()?;

        let mut payload = Vec::with_capacity(plaintext.len() + AEGIS_TAG_LEN + self.headroom);
        payload.extend_from_slice(plaintext);
        let tag = match self.variant {
            AegisVariant::Aegis128L => {
                let (k, n) = aegis_params::<16>(key.key.as_ref(), nonce.as_ref())?;
                aegis::aegis128l::Aegis128L::<AEGIS_TAG_LEN>::new(&k, &n)
                    .encrypt_in_place(&mut payload, aad)
            }
            AegisVariant::Aegis256 => {
                let (k, n) = aegis_params::<32>(key.key.as_ref(), nonce.as_ref())?;
                aegis::aegis256::Aegis256::<AEGIS_TAG_LEN>::new(&k, &n)
                    .encrypt_in_place(&mut payload, aad)
            }
        };
        payload.extend_from_slice(&tag);
        Ok(payload)
    }

    fn open(&self, nonce: &Nonce, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let key = self.installed()?;

        let Some(body_len) = ciphertext.len().checked_sub(AEGIS_TAG_LEN) else {
            return Err(Error::AuthenticationFailed);
        };
        let (body, tag) = ciphertext.split_at(body_len);
        let mut tag_array = [0u8; AEGIS_TAG_LEN];
        tag_array.copy_from_slice(tag);

        let mut payload = body.to_vec();
        let verified = match self.variant {
            AegisVariant::Aegis128L => {
                let (k, n) = aegis_params::<16>(key.key.as_ref(), nonce.as_ref())?;
                aegis::aegis128l::Aegis128L::<AEGIS_TAG_LEN>::new(&k, &n).decrypt_in_place(
                    &mut payload,
                    &tag_array,
                    aad,
                )
            }
            AegisVariant::Aegis256 => {
                let (k, n) = aegis_params::<32>(key.key.as_ref(), nonce.as_ref())?;
                aegis::aegis256::Aegis256::<AEGIS_TAG_LEN>::new(&k, &n).decrypt_in_place(
                    &mut payload,
                    &tag_array,
                    aad,
                )
            }
        };
        verified.map_err(|_| Error::AuthenticationFailed)?;
        Ok(payload)
    }
}

/// AEGIS variants take key and nonce of equal, fixed size.
fn aegis_params<const N: usize>(key: &[u8], nonce: &[u8]) -> Result<([u8; N], [u8; N]), Error> {
    let key = <[u8; N]>::try_from(key).map_err(|_| Error::InvalidKeyLength {
        expected: N,
        actual: key.len(),
    })?;
    let nonce = <[u8; N]>::try_from(nonce).map_err(|_| Error::InvalidKeyLength {
        expected: N,
        actual: nonce.len(),
    })?;
    Ok((key, nonce))
}

#[cfg(test)]
mod tests {
    use std::prelude::v1::*;
    use std::vec;

    use super::*;

    fn keyed(mut aead: impl Aead, key_len: usize, iv_len: usize) -> impl Aead {
        aead.set_key(TrafficKey::new(&vec![0x11; key_len], &vec![0x22; iv_len]).unwrap())
            .unwrap();
        aead
    }

    #[test]
    fn unkeyed_aead_refuses_to_work() {
        let aead = Aes128Gcm::new(CipherSuite::TLS13_AES_128_GCM_SHA256);
        assert!(matches!(aead.iv(), Err(Error::ApiMisuse(_))));
        assert!(matches!(
            aead.encrypt(b"", b"hello", 0),
            Err(Error::ApiMisuse(_))
        ));
        let aegis = Aegis::new(AegisVariant::Aegis256);
        assert!(matches!(
            aegis.decrypt(b"", &[0u8; 32], 0),
            Err(Error::ApiMisuse(_))
        ));
    }

    #[test]
    fn wrong_key_length_is_refused() {
        let mut aead = Aes256Gcm::new(CipherSuite::TLS13_AES_256_GCM_SHA384);
        assert_eq!(
            aead.set_key(TrafficKey::new(&[0u8; 16], &[0u8; 12]).unwrap()),
            Err(Error::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        );

        let mut aegis = Aegis::new(AegisVariant::Aegis128L);
        assert_eq!(
            aegis.set_key(TrafficKey::new(&[0u8; 16], &[0u8; 12]).unwrap()),
            Err(Error::InvalidKeyLength {
                expected: 16,
                actual: 12
            })
        );
    }

    #[test]
    fn sizes() {
        let ocb = Aes128Ocb::new(CipherSuite::TLS13_AES_128_OCB_SHA256_EXPERIMENTAL);
        assert_eq!((ocb.key_len(), ocb.iv_len(), ocb.tag_len()), (16, 12, 16));
        let chacha = Chacha20Poly1305::new(CipherSuite::TLS13_CHACHA20_POLY1305_SHA256);
        assert_eq!(
            (chacha.key_len(), chacha.iv_len(), chacha.tag_len()),
            (32, 12, 16)
        );
        let aegis = Aegis::new(AegisVariant::Aegis256);
        assert_eq!((aegis.key_len(), aegis.iv_len(), aegis.tag_len()), (32, 32, 16));
    }

    #[test]
    fn aegis_round_trip_and_tamper_detection() {
        for (variant, len) in [(AegisVariant::Aegis128L, 16), (AegisVariant::Aegis256, 32)] {
            let aead = keyed(Aegis::new(variant), len, len);
            let sealed = aead
                .encrypt(b"aad", b"attack at dawn", 7)
                .unwrap();
            assert_eq!(sealed.len(), 14 + 16);
            assert_eq!(
                aead.decrypt(b"aad", &sealed, 7).unwrap(),
                b"attack at dawn"
            );

            let mut tampered = sealed.clone();
            tampered[0] ^= 1;
            assert_eq!(
                aead.decrypt(b"aad", &tampered, 7),
                Err(Error::AuthenticationFailed)
            );
            assert_eq!(
                aead.decrypt(b"aad", &sealed, 8),
                Err(Error::AuthenticationFailed)
            );
            assert_eq!(
                aead.decrypt(b"aad", &sealed[..15], 7),
                Err(Error::AuthenticationFailed)
            );
        }
    }

    #[test]
    fn ocb_round_trip() {
        let aead = keyed(
            Aes128Ocb::new(CipherSuite::TLS13_AES_128_OCB_SHA256_EXPERIMENTAL),
            16,
            12,
        );
        let sealed = aead.encrypt(b"", b"", 0).unwrap();
        assert_eq!(sealed.len(), 16);
        assert_eq!(aead.decrypt(b"", &sealed, 0).unwrap(), b"");
        assert_eq!(
            aead.decrypt(b"x", &sealed, 0),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    fn headroom_is_reserved_in_sealed_output() {
        let mut aead = keyed(
            Aes128Gcm::new(CipherSuite::TLS13_AES_128_GCM_SHA256),
            16,
            12,
        );
        aead.set_encrypted_buffer_headroom(64);
        let sealed = aead.encrypt(b"", b"abc", 0).unwrap();
        assert_eq!(sealed.len(), 3 + 16);
        assert!(sealed.capacity() >= 3 + 16 + 64);
    }
}
