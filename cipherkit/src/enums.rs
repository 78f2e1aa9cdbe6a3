enum_builder! {
    /// The `CipherSuite` TLS protocol enum.  Values in this enum are taken
    /// from the various RFCs covering TLS, and are listed by IANA.
    /// The `Unknown` item is used when processing unrecognised ordinals.
    ///
    /// The AEGIS and OCB values follow the code points assigned by their
    /// respective drafts and are only usable when the matching backend is
    /// enabled.
    #[repr(u16)]
    pub enum CipherSuite {
        TLS13_AES_128_GCM_SHA256 => 0x1301,
        TLS13_AES_256_GCM_SHA384 => 0x1302,
        TLS13_CHACHA20_POLY1305_SHA256 => 0x1303,
        TLS13_AEGIS_256_SHA512 => 0x1306,
        TLS13_AEGIS_128L_SHA256 => 0x1307,
        TLS13_AES_128_OCB_SHA256_EXPERIMENTAL => 0xff01,
    }
}

enum_builder! {
    /// The `NamedGroup` TLS protocol enum.  Values in this enum are taken
    /// from the various RFCs covering TLS, and are listed by IANA.
    /// The `Unknown` item is used when processing unrecognised ordinals.
    #[repr(u16)]
    pub enum NamedGroup {
        secp256r1 => 0x0017,
        secp384r1 => 0x0018,
        secp521r1 => 0x0019,
        X25519 => 0x001d,
        X448 => 0x001e,
        MLKEM512 => 0x0200,
        MLKEM768 => 0x0201,
        MLKEM1024 => 0x0202,
        secp256r1MLKEM768 => 0x11eb,
        secp384r1MLKEM1024 => 0x11ed,
    }
}

impl NamedGroup {
    /// Split a hybrid group into its classical and post-quantum parts.
    ///
    /// Returns `None` for groups that are not hybrids.
    pub fn hybrid_components(&self) -> Option<(Self, Self)> {
        match self {
            Self::secp256r1MLKEM768 => Some((Self::secp256r1, Self::MLKEM768)),
            Self::secp384r1MLKEM1024 => Some((Self::secp384r1, Self::MLKEM1024)),
            _ => None,
        }
    }

    /// Whether this group relies (entirely or partly) on a post-quantum KEM.
    pub fn is_post_quantum(&self) -> bool {
        matches!(
            self,
            Self::MLKEM512
                | Self::MLKEM768
                | Self::MLKEM1024
                | Self::secp256r1MLKEM768
                | Self::secp384r1MLKEM1024
        )
    }
}

enum_builder! {
    /// The `HashAlgorithm` TLS protocol enum.  Values in this enum are taken
    /// from the various RFCs covering TLS, and are listed by IANA.
    /// The `Unknown` item is used when processing unrecognised ordinals.
    #[repr(u8)]
    pub enum HashAlgorithm {
        SHA256 => 0x04,
        SHA384 => 0x05,
        SHA512 => 0x06,
    }
}

impl CipherSuite {
    /// The hash function this suite pairs with for key derivation.
    ///
    /// Returns `None` for unknown suites.
    pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
        match self {
            Self::TLS13_AES_128_GCM_SHA256
            | Self::TLS13_CHACHA20_POLY1305_SHA256
            | Self::TLS13_AES_128_OCB_SHA256_EXPERIMENTAL
            | Self::TLS13_AEGIS_128L_SHA256 => Some(HashAlgorithm::SHA256),
            Self::TLS13_AES_256_GCM_SHA384 => Some(HashAlgorithm::SHA384),
            Self::TLS13_AEGIS_256_SHA512 => Some(HashAlgorithm::SHA512),
            Self::Unknown(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::format;

    use super::*;

    #[test]
    fn unknown_values_are_preserved() {
        assert_eq!(CipherSuite::from(0x1304), CipherSuite::Unknown(0x1304));
        assert_eq!(u16::from(CipherSuite::Unknown(0x1304)), 0x1304);
        assert_eq!(NamedGroup::from(0x6399), NamedGroup::Unknown(0x6399));
        assert_eq!(HashAlgorithm::from(0x02), HashAlgorithm::Unknown(0x02));
    }

    #[test]
    fn known_values_round_trip_through_integers() {
        assert_eq!(
            CipherSuite::from(0x1302),
            CipherSuite::TLS13_AES_256_GCM_SHA384
        );
        assert_eq!(u16::from(NamedGroup::secp256r1MLKEM768), 0x11eb);
        assert_eq!(NamedGroup::X25519.to_be_bytes(), [0x00, 0x1d]);
    }

    #[test]
    fn debug_formatting() {
        assert_eq!(
            format!("{:?}", CipherSuite::TLS13_AES_128_GCM_SHA256),
            "TLS13_AES_128_GCM_SHA256"
        );
        assert_eq!(
            format!("{:?}", NamedGroup::Unknown(0x1234)),
            "NamedGroup(0x1234)"
        );
        assert_eq!(NamedGroup::MLKEM768.as_str(), Some("MLKEM768"));
        assert_eq!(NamedGroup::Unknown(1).as_str(), None);
    }

    #[test]
    fn hybrid_groups_split_classical_first() {
        assert_eq!(
            NamedGroup::secp256r1MLKEM768.hybrid_components(),
            Some((NamedGroup::secp256r1, NamedGroup::MLKEM768))
        );
        assert_eq!(
            NamedGroup::secp384r1MLKEM1024.hybrid_components(),
            Some((NamedGroup::secp384r1, NamedGroup::MLKEM1024))
        );
        assert_eq!(NamedGroup::X25519.hybrid_components(), None);
        assert!(NamedGroup::secp256r1MLKEM768.is_post_quantum());
        assert!(!NamedGroup::secp521r1.is_post_quantum());
    }

    #[test]
    fn suites_pair_with_expected_hash() {
        assert_eq!(
            CipherSuite::TLS13_AES_256_GCM_SHA384.hash_algorithm(),
            Some(HashAlgorithm::SHA384)
        );
        assert_eq!(
            CipherSuite::TLS13_AEGIS_256_SHA512.hash_algorithm(),
            Some(HashAlgorithm::SHA512)
        );
        assert_eq!(
            CipherSuite::TLS13_AES_128_OCB_SHA256_EXPERIMENTAL.hash_algorithm(),
            Some(HashAlgorithm::SHA256)
        );
        assert_eq!(CipherSuite::Unknown(0).hash_algorithm(), None);
    }
}
