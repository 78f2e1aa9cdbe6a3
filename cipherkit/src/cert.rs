use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use pki_types::CertificateDer;

use crate::error::Error;

/// One entry of a TLS 1.3 `Certificate` message.
#[derive(Clone, Debug, PartialEq)]
pub struct CertificateEntry {
    /// The DER-encoded certificate.
    pub cert_data: CertificateDer<'static>,
    /// Encoded per-certificate extensions, carried opaquely.
    pub extensions: Vec<u8>,
}

impl CertificateEntry {
    /// An entry with no extensions.
    pub fn new(cert_data: CertificateDer<'static>) -> Self {
        Self {
            cert_data,
            extensions: Vec::new(),
        }
    }
}

/// A certificate presented by the peer, after structural parsing.
///
/// Nothing about trust has been decided at this point.
pub trait PeerCert: fmt::Debug + Send + Sync {
    /// The DER encoding of the certificate.
    fn der(&self) -> &CertificateDer<'static>;

    /// Whether this was the first (end-entity) certificate of the chain.
    fn is_leaf(&self) -> bool;
}

/// Turns raw certificate bytes into a [`PeerCert`].
pub trait CertificateParser: fmt::Debug + Send + Sync {
    /// Parse `der`, failing with [`Error::InvalidCertificate`] when it is not
    /// a well-formed X.509 certificate.
    fn parse_peer_certificate(
        &self,
        der: CertificateDer<'static>,
        leaf: bool,
    ) -> Result<Box<dyn PeerCert>, Error>;
}

/// A [`CertificateParser`] using `rustls-webpki`'s X.509 parser.
#[derive(Debug, Default)]
pub struct WebPkiCertificateParser;

impl CertificateParser for WebPkiCertificateParser {
    fn parse_peer_certificate(
        &self,
        der: CertificateDer<'static>,
        leaf: bool,
    ) -> Result<Box<dyn PeerCert>, Error> {
        webpki::EndEntityCert::try_from(&der)
            .map_err(|e| Error::InvalidCertificate(format!("{e}")))?;
        Ok(Box::new(WebPkiPeerCert { der, leaf }))
    }
}

#[derive(Debug)]
struct WebPkiPeerCert {
    der: CertificateDer<'static>,
    leaf: bool,
}

impl PeerCert for WebPkiPeerCert {
    fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    fn is_leaf(&self) -> bool {
        self.leaf
    }
}
