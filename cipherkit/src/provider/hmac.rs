use alloc::boxed::Box;
use core::marker::PhantomData;

use hmac::digest::core_api::BlockSizeUser;
use hmac::{Mac, SimpleHmac};
use sha2::Digest;

use crate::crypto;
use crate::crypto::hash::HashAlgorithm;

/// HMAC-SHA256.
pub static HMAC_SHA256: Hmac<sha2::Sha256> = Hmac::new(HashAlgorithm::SHA256);
/// HMAC-SHA384.
pub static HMAC_SHA384: Hmac<sha2::Sha384> = Hmac::new(HashAlgorithm::SHA384);
/// HMAC-SHA512.
pub static HMAC_SHA512: Hmac<sha2::Sha512> = Hmac::new(HashAlgorithm::SHA512);

/// HMAC over a `sha2` digest, backed by the `hmac` crate.
pub struct Hmac<D> {
    algorithm: HashAlgorithm,
    digest: PhantomData<fn() -> D>,
}

impl<D> Hmac<D> {
    const fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            digest: PhantomData,
        }
    }
}

impl<D> crypto::hmac::Hmac for Hmac<D>
where
    D: Digest + BlockSizeUser + Clone + Send + Sync + 'static,
{
    fn with_key(&self, key: &[u8]) -> Box<dyn crypto::hmac::Key> {
        Box::new(Key(
            <SimpleHmac<D> as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length"),
        ))
    }

    fn hash_output_len(&self) -> usize {
        <D as Digest>::output_size()
    }

    fn hash_algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

struct Key<D: Digest + BlockSizeUser>(SimpleHmac<D>);

impl<D> crypto::hmac::Key for Key<D>
where
    D: Digest + BlockSizeUser + Clone + Send + Sync + 'static,
{
    fn sign_concat(&self, first: &[u8], middle: &[&[u8]], last: &[u8]) -> crypto::hmac::Tag {
        let mut ctx = self.0.clone();
        ctx.update(first);
        for d in middle {
            ctx.update(d);
        }
        ctx.update(last);
        crypto::hmac::Tag::new(&ctx.finalize().into_bytes()[..])
    }

    fn tag_len(&self) -> usize {
        <D as Digest>::output_size()
    }
}
