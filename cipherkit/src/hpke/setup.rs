use alloc::vec::Vec;

use zeroize::Zeroizing;

use super::{
    build_suite_id, AeadId, EncryptionContext, ExporterSecret, KdfId, KemId, LabeledHkdf, HPKE_V1,
};
use crate::crypto::cipher::TrafficKey;
use crate::crypto::hkdf::OkmBlock;
use crate::error::{ApiMisuse, Error, Unsupported};
use crate::factory::Factory;
use crate::log::debug;

/// The algorithms of an HPKE ciphersuite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HpkeSuite {
    /// The key encapsulation mechanism.
    pub kem: KemId,
    /// The key derivation function.
    pub kdf: KdfId,
    /// The AEAD protecting messages.
    pub aead: AeadId,
}

/// A pre-shared key and its identifier, for PSK mode.
///
/// Both empty means base mode.  Supplying only one of them is an error.
#[derive(Clone, Copy, Default)]
pub struct PskInput<'a> {
    /// The pre-shared key.
    pub psk: &'a [u8],
    /// The identifier of `psk`.
    pub psk_id: &'a [u8],
}

impl<'a> PskInput<'a> {
    /// No pre-shared key: base mode.
    pub const NONE: Self = Self {
        psk: &[],
        psk_id: &[],
    };

    fn mode(&self) -> Result<Mode, Error> {
        // def VerifyPSKInputs(mode, psk, psk_id):
        //   got_psk = (psk != default_psk)
        //   got_psk_id = (psk_id != default_psk_id)
        //   if got_psk != got_psk_id:
        //     raise Exception("Inconsistent PSK inputs")
        match (self.psk.is_empty(), self.psk_id.is_empty()) {
            (true, true) => Ok(Mode::Base),
            (false, false) => Ok(Mode::Psk),
            _ => Err(ApiMisuse::InconsistentPskInputs.into()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Mode {
    Base = 0x00,
    Psk = 0x01,
}

/// Set up the sending side of an HPKE channel to `recipient`'s public key.
///
/// Returns the encapsulation to send to the recipient, and the sender's
/// context.
///
/// See [RFC 9180 §5.1 "Creating the Encryption Context"][0].
///
/// [0]: https://www.rfc-editor.org/rfc/rfc9180.html#section-5.1
pub fn setup_sender(
    factory: &dyn Factory,
    suite: HpkeSuite,
    recipient: &[u8],
    info: &[u8],
    psk: PskInput<'_>,
) -> Result<(Vec<u8>, EncryptionContext), Error> {
    let mode = psk.mode()?;
    let kem = factory.make_kem(suite.kem)?;
    let (shared_secret, enc) = kem.encap(recipient)?;
    let context = key_schedule(
        factory,
        suite,
        mode,
        shared_secret.secret_bytes(),
        info,
        psk,
    )?;
    Ok((enc, context))
}

/// Set up the receiving side of an HPKE channel, from the sender's
/// encapsulation `enc` and the recipient's secret key.
pub fn setup_receiver(
    factory: &dyn Factory,
    suite: HpkeSuite,
    enc: &[u8],
    recipient_secret: &[u8],
    info: &[u8],
    psk: PskInput<'_>,
) -> Result<EncryptionContext, Error> {
    let mode = psk.mode()?;
    let kem = factory.make_kem(suite.kem)?;
    let shared_secret = kem.decap(enc, recipient_secret)?;
    key_schedule(
        factory,
        suite,
        mode,
        shared_secret.secret_bytes(),
        info,
        psk,
    )
}

fn key_schedule(
    factory: &dyn Factory,
    suite: HpkeSuite,
    mode: Mode,
    shared_secret: &[u8],
    info: &[u8],
    psk: PskInput<'_>,
) -> Result<EncryptionContext, Error> {
    debug!("HPKE key schedule for {:?} in {:?} mode", suite, mode);

    let hash = suite
        .kdf
        .hash_algorithm()
        .ok_or(Unsupported::Kdf(suite.kdf))?;
    let cipher_suite = suite
        .aead
        .cipher_suite()
        .ok_or(Unsupported::Aead(suite.aead))?;
    let hkdf = LabeledHkdf::new(HPKE_V1, factory.make_hkdf(hash)?);
    let mut aead = factory.make_aead(cipher_suite)?;
    let suite_id = build_suite_id(suite.kem, suite.kdf, suite.aead);

    // def KeySchedule<ROLE>(mode, shared_secret, info, psk, psk_id):
    //   psk_id_hash = LabeledExtract("", "psk_id_hash", psk_id)
    //   info_hash = LabeledExtract("", "info_hash", info)
    //   key_schedule_context = concat(mode, psk_id_hash, info_hash)
    let psk_id_hash = hkdf.labeled_extract(b"", b"psk_id_hash", psk.psk_id, &suite_id);
    let info_hash = hkdf.labeled_extract(b"", b"info_hash", info, &suite_id);
    let context = [&[mode as u8][..], psk_id_hash.as_ref(), info_hash.as_ref()].concat();

    //   secret = LabeledExtract(shared_secret, "secret", psk)
    //   key = LabeledExpand(secret, "key", key_schedule_context, Nk)
    //   base_nonce = LabeledExpand(secret, "base_nonce",
    //                              key_schedule_context, Nn)
    //   exporter_secret = LabeledExpand(secret, "exp",
    //                                   key_schedule_context, Nh)
    let secret = hkdf.labeled_extract(shared_secret, b"secret", psk.psk, &suite_id);
    let key = Zeroizing::new(hkdf.labeled_expand(
        &secret,
        b"key",
        &context,
        &suite_id,
        aead.key_len(),
    )?);
    let base_nonce = Zeroizing::new(hkdf.labeled_expand(
        &secret,
        b"base_nonce",
        &context,
        &suite_id,
        aead.iv_len(),
    )?);
    let exporter_secret = Zeroizing::new(hkdf.labeled_expand(
        &secret,
        b"exp",
        &context,
        &suite_id,
        hkdf.hash_len(),
    )?);

    aead.set_key(TrafficKey::new(&key, &base_nonce)?)?;
    Ok(EncryptionContext::new(
        aead,
        ExporterSecret::from(OkmBlock::new(&exporter_secret)),
        hkdf,
        suite_id,
    ))
}
