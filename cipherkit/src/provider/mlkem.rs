use alloc::vec::Vec;

use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{Ciphertext, Encoded, EncodedSizeUser, KemCore};
use rand_core::OsRng;

use crate::crypto::kx::{KeyExchange, KeyExchangeMode, SharedSecret};
use crate::enums::NamedGroup;
use crate::error::{ApiMisuse, Error};

/// Defines a pure ML-KEM key exchange.
///
/// The initiator generates a key pair and sends the encapsulation key; it
/// later decapsulates the responder's ciphertext.  The responder has nothing
/// to generate up front: it encapsulates to the initiator's key, and its key
/// share is the resulting ciphertext.
macro_rules! ml_kem {
    ($name:ident, $kem:ty, $group:expr, $ek_len:expr, $ct_len:expr, $doc:literal) => {
        #[doc = $doc]
        pub struct $name {
            mode: KeyExchangeMode,
            decapsulation_key: Option<<$kem as KemCore>::DecapsulationKey>,
            key_share: Option<Vec<u8>>,
        }

        impl $name {
            pub(crate) fn new(mode: KeyExchangeMode) -> Self {
                Self {
                    mode,
                    decapsulation_key: None,
                    key_share: None,
                }
            }

            fn encapsulate(&mut self, encapsulation_key: &[u8]) -> Result<SharedSecret, Error> {
                if encapsulation_key.len() != $ek_len {
                    return Err(Error::InvalidKeyShare);
                }
                let encoded =
                    Encoded::<<$kem as KemCore>::EncapsulationKey>::try_from(encapsulation_key)
                        .map_err(|_| Error::InvalidKeyShare)?;
                let ek = <$kem as KemCore>::EncapsulationKey::from_bytes(&encoded);
                let (ciphertext, shared) = ek
                    .encapsulate(&mut OsRng)
                    .map_err(|_| Error::InvalidKeyShare)?;
                self.key_share = Some(ciphertext.to_vec());
                Ok(SharedSecret::from(&shared[..]))
            }

            fn decapsulate(&mut self, ciphertext: &[u8]) -> Result<SharedSecret, Error> {
                let dk = self
                    .decapsulation_key
                    .take()
                    .ok_or(ApiMisuse::KeyExchangeNotStarted)?;
                if ciphertext.len() != $ct_len {
                    return Err(Error::InvalidKeyShare);
                }
                let ciphertext = Ciphertext::<$kem>::try_from(ciphertext)
                    .map_err(|_| Error::InvalidKeyShare)?;
                let shared = dk
                    .decapsulate(&ciphertext)
                    .map_err(|_| Error::InvalidKeyShare)?;
                Ok(SharedSecret::from(&shared[..]))
            }
        }

        impl KeyExchange for $name {
            fn generate_key_pair(&mut self) -> Result<(), Error> {
                if self.mode == KeyExchangeMode::Responder {
                    return Ok(());
                }
                let (dk, ek) = <$kem as KemCore>::generate(&mut OsRng);
                self.key_share = Some(ek.as_bytes().to_vec());
                self.decapsulation_key = Some(dk);
                Ok(())
            }

            fn key_share(&self) -> Result<Vec<u8>, Error> {
                match (&self.key_share, self.mode) {
                    (Some(share), _) => Ok(share.clone()),
                    (None, KeyExchangeMode::Initiator) => {
                        Err(ApiMisuse::KeyExchangeNotStarted.into())
                    }
                    (None, KeyExchangeMode::Responder) => {
                        Err(ApiMisuse::KeyShareUnavailable.into())
                    }
                }
            }

            fn generate_shared_secret(
                &mut self,
                peer_key_share: &[u8],
            ) -> Result<SharedSecret, Error> {
                match self.mode {
                    KeyExchangeMode::Initiator => self.decapsulate(peer_key_share),
                    KeyExchangeMode::Responder => self.encapsulate(peer_key_share),
                }
            }

            fn expected_peer_key_share_len(&self) -> usize {
                match self.mode {
                    KeyExchangeMode::Initiator => $ct_len,
                    KeyExchangeMode::Responder => $ek_len,
                }
            }

            fn group(&self) -> NamedGroup {
                $group
            }
        }
    };
}

ml_kem!(
    MlKem512,
    ml_kem::MlKem512,
    NamedGroup::MLKEM512,
    800,
    768,
    "ML-KEM-512 (FIPS 203)."
);
ml_kem!(
    MlKem768,
    ml_kem::MlKem768,
    NamedGroup::MLKEM768,
    1184,
    1088,
    "ML-KEM-768 (FIPS 203)."
);
ml_kem!(
    MlKem1024,
    ml_kem::MlKem1024,
    NamedGroup::MLKEM1024,
    1568,
    1568,
    "ML-KEM-1024 (FIPS 203)."
);
