use cipherkit::pki_types::CertificateDer;
use cipherkit::{
    CertificateEntry, CertificateParser, Error, Factory, MultiBackendFactory, PeerCert,
    WebPkiCertificateParser,
};

fn self_signed() -> CertificateEntry {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    CertificateEntry::new(certified.cert.der().clone())
}

#[test]
fn parses_generated_certificate() {
    let factory = MultiBackendFactory::default();
    let entry = self_signed();
    let der = entry.cert_data.clone();

    let leaf = factory
        .make_peer_cert(entry.clone(), true)
        .unwrap();
    assert!(leaf.is_leaf());
    assert_eq!(leaf.der(), &der);

    let intermediate = factory
        .make_peer_cert(entry, false)
        .unwrap();
    assert!(!intermediate.is_leaf());
}

#[test]
fn rejects_truncated_certificate() {
    let factory = MultiBackendFactory::default();
    let mut entry = self_signed();
    let truncated = entry.cert_data.as_ref()[..40].to_vec();
    entry.cert_data = truncated.into();

    assert!(matches!(
        factory.make_peer_cert(entry, true),
        Err(Error::InvalidCertificate(_))
    ));
}

#[derive(Debug)]
struct Opaque;

#[derive(Debug)]
struct OpaqueCert(CertificateEntry, bool);

impl PeerCert for OpaqueCert {
    fn der(&self) -> &CertificateDer<'static> {
        &self.0.cert_data
    }

    fn is_leaf(&self) -> bool {
        self.1
    }
}

impl CertificateParser for Opaque {
    fn parse_peer_certificate(
        &self,
        der: CertificateDer<'static>,
        leaf: bool,
    ) -> Result<Box<dyn PeerCert>, Error> {
        Ok(Box::new(OpaqueCert(CertificateEntry::new(der), leaf)))
    }
}

#[test]
fn custom_parser_is_used() {
    static OPAQUE: Opaque = Opaque;
    let factory = MultiBackendFactory::default().with_certificate_parser(&OPAQUE);

    let garbage = CertificateEntry::new(vec![1, 2, 3].into());
    let cert = factory.make_peer_cert(garbage, true).unwrap();
    assert_eq!(cert.der().as_ref(), &[1, 2, 3]);

    assert!(WebPkiCertificateParser
        .parse_peer_certificate(vec![1, 2, 3].into(), true)
        .is_err());
}
