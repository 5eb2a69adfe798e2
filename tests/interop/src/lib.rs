//! Integration tests for the derkit workspace.
//! A certificate-shaped schema built entirely with the derive macros,
//! exercised end to end: tagging modes, defaults, optionals, lazy child
//! iteration, and the PEM pipeline.

use derkit_codec::{der_enum, der_oid_enum, der_sequence};
use derkit_codec::{Any, BitString, DateTime};

der_enum! {
    pub enum Version: u8 {
        V1 = 0,
        V2 = 1,
        V3 = 2,
    }
}

der_oid_enum! {
    pub enum SignatureAlg {
        Sha256WithRsa => [1, 2, 840, 113549, 1, 1, 11],
        EcdsaWithSha256 => [1, 2, 840, 10045, 4, 3, 2],
        Ed25519 => [1, 3, 101, 112],
    }
}

der_sequence! {
    pub struct AlgorithmIdentifier<'a> {
        algorithm: SignatureAlg,
        parameters: Option<Any<'a>>,
    }
}

der_sequence! {
    pub struct Validity {
        not_before: DateTime,
        not_after: DateTime,
    }
}

der_sequence! {
    pub struct SubjectPublicKeyInfo<'a> {
        algorithm: AlgorithmIdentifier<'a>,
        subject_public_key: BitString<'a>,
    }
}

der_sequence! {
    pub struct TbsCertificate<'a> {
        @explicit(0) version: Version = Version::V1,
        serial_number: u64,
        signature: AlgorithmIdentifier<'a>,
        issuer: Any<'a>,
        validity: Validity,
        subject: Any<'a>,
        subject_public_key_info: SubjectPublicKeyInfo<'a>,
        @implicit(1) issuer_unique_id: Option<BitString<'a>>,
        @implicit(2) subject_unique_id: Option<BitString<'a>>,
        @explicit(3) extensions: Option<Any<'a>>,
    }
}

der_sequence! {
    pub struct Certificate<'a> {
        tbs_certificate: TbsCertificate<'a>,
        signature_algorithm: AlgorithmIdentifier<'a>,
        signature_value: BitString<'a>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use derkit_codec::{decode, encode, pem, DerError, OctetString, Tag};
    use derkit_types::DateTimeFormat;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn hex_of(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn ed25519_alg() -> AlgorithmIdentifier<'static> {
        AlgorithmIdentifier {
            algorithm: SignatureAlg::Ed25519,
            parameters: None,
        }
    }

    fn validity() -> Validity {
        Validity {
            not_before: DateTime::new(DateTimeFormat::Utc, 2024, 1, 15, 13, 30, 0).unwrap(),
            not_after: DateTime::new(DateTimeFormat::Generalized, 2124, 1, 15, 13, 30, 0).unwrap(),
        }
    }

    fn empty_name() -> Any<'static> {
        Any {
            tag: Tag::SEQUENCE,
            content: &[],
        }
    }

    fn tbs(version: Version, extensions: Option<Any<'_>>) -> TbsCertificate<'_> {
        TbsCertificate {
            version,
            serial_number: 0x01020304,
            signature: ed25519_alg(),
            issuer: empty_name(),
            validity: validity(),
            subject: empty_name(),
            subject_public_key_info: SubjectPublicKeyInfo {
                algorithm: ed25519_alg(),
                subject_public_key: BitString::new(0, b"0123456789abcdef0123456789abcdef")
                    .unwrap(),
            },
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions,
        }
    }

    // -------------------------------------------------------
    // 1. AlgorithmIdentifier against known bytes
    // -------------------------------------------------------
    #[test]
    fn test_algorithm_identifier_known_encoding() {
        let der = encode(&ed25519_alg()).unwrap();
        assert_eq!(hex_of(&der), "300506032b6570");
        assert_eq!(decode::<AlgorithmIdentifier>(&der).unwrap(), ed25519_alg());
    }

    #[test]
    fn test_algorithm_identifier_with_null_params() {
        let alg = AlgorithmIdentifier {
            algorithm: SignatureAlg::Sha256WithRsa,
            parameters: Some(Any {
                tag: Tag::NULL,
                content: &[],
            }),
        };
        let der = encode(&alg).unwrap();
        assert_eq!(hex_of(&der), "300d06092a864886f70d01010b0500");
        assert_eq!(decode::<AlgorithmIdentifier>(&der).unwrap(), alg);
    }

    #[test]
    fn test_unknown_oid_rejected() {
        // SEQUENCE { OID 1.2.3 }
        let der = hex("300406022a03");
        assert_eq!(
            decode::<AlgorithmIdentifier>(&der),
            Err(DerError::UnknownOid)
        );
    }

    // -------------------------------------------------------
    // 2. Defaults and tagging modes
    // -------------------------------------------------------
    #[test]
    fn test_default_version_is_omitted() {
        let value = tbs(Version::V1, None);
        let der = encode(&value).unwrap();
        let mut dec = derkit_codec::Decoder::new(&der);
        let seq = dec.sequence().unwrap();
        // the first element inside the SEQUENCE is already the serial
        assert_eq!(seq.peek_tag().unwrap(), Tag::INTEGER);
        let decoded = decode::<TbsCertificate>(&der).unwrap();
        assert_eq!(decoded.version, Version::V1);
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_v3_version_is_explicitly_tagged() {
        let der = encode(&tbs(Version::V3, None)).unwrap();
        let mut dec = derkit_codec::Decoder::new(&der);
        let seq = dec.sequence().unwrap();
        let start = seq.position();
        // [0] EXPLICIT { INTEGER 2 }
        assert_eq!(&der[start..start + 5], &hex("a003020102")[..]);
        assert_eq!(decode::<TbsCertificate>(&der).unwrap().version, Version::V3);
    }

    #[test]
    fn test_unique_ids_use_implicit_tags() {
        let mut value = tbs(Version::V3, None);
        value.issuer_unique_id = Some(BitString::new(0, b"iid").unwrap());
        value.subject_unique_id = Some(BitString::new(4, &[0x30]).unwrap());
        let der = encode(&value).unwrap();
        let body = hex_of(&der);
        // [1] and [2] primitive, carrying the pad octet then the data
        assert!(body.contains("810400696964"), "{body}");
        assert!(body.contains("82020430"), "{body}");
        let decoded = decode::<TbsCertificate>(&der).unwrap();
        assert_eq!(decoded, value);
    }

    // -------------------------------------------------------
    // 3. Full certificate round-trip and stability
    // -------------------------------------------------------
    #[test]
    fn test_certificate_roundtrip() {
        let ext1 = encode(&OctetString(b"ext-1")).unwrap();
        let ext2 = encode(&OctetString(b"ext-2")).unwrap();
        let mut ext_list = ext1.clone();
        ext_list.extend_from_slice(&ext2);

        let cert = Certificate {
            tbs_certificate: tbs(
                Version::V3,
                Some(Any {
                    tag: Tag::SEQUENCE,
                    content: &ext_list,
                }),
            ),
            signature_algorithm: ed25519_alg(),
            signature_value: BitString::new(0, &[0xAB; 64]).unwrap(),
        };

        let der = encode(&cert).unwrap();
        let decoded = decode::<Certificate>(&der).unwrap();
        assert_eq!(decoded, cert);

        // byte stability of the decode-encode cycle
        assert_eq!(encode(&decoded).unwrap(), der);
    }

    #[test]
    fn test_extension_children_iterate_lazily() {
        let ext1 = encode(&OctetString(b"ext-1")).unwrap();
        let ext2 = encode(&OctetString(b"ext-2")).unwrap();
        let mut ext_list = ext1.clone();
        ext_list.extend_from_slice(&ext2);

        let der = encode(&tbs(
            Version::V3,
            Some(Any {
                tag: Tag::SEQUENCE,
                content: &ext_list,
            }),
        ))
        .unwrap();

        let decoded = decode::<TbsCertificate>(&der).unwrap();
        let exts = decoded.extensions.expect("extensions present");
        let children: Result<Vec<OctetString>, _> =
            exts.decoder().iterate::<OctetString>().collect();
        let children = children.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].0, b"ext-1");
        assert_eq!(children[1].0, b"ext-2");
    }

    #[test]
    fn test_absent_optionals_skip_to_extensions() {
        let ext = encode(&OctetString(b"e")).unwrap();
        let der = encode(&tbs(
            Version::V1,
            Some(Any {
                tag: Tag::SEQUENCE,
                content: &ext,
            }),
        ))
        .unwrap();
        let decoded = decode::<TbsCertificate>(&der).unwrap();
        assert!(decoded.issuer_unique_id.is_none());
        assert!(decoded.subject_unique_id.is_none());
        assert!(decoded.extensions.is_some());
    }

    // -------------------------------------------------------
    // 4. Hostile inputs must error, never panic
    // -------------------------------------------------------
    #[test]
    fn test_truncations_error_cleanly() {
        let der = encode(&tbs(Version::V3, None)).unwrap();
        for cut in 0..der.len() {
            assert!(
                decode::<TbsCertificate>(&der[..cut]).is_err(),
                "prefix of {cut} octets accepted"
            );
        }
    }

    #[test]
    fn test_bit_flips_never_panic() {
        let der = encode(&tbs(Version::V3, None)).unwrap();
        for i in 0..der.len() {
            for bit in 0..8 {
                let mut mutated = der.clone();
                mutated[i] ^= 1 << bit;
                // any outcome is fine as long as it is not a panic, and a
                // successful decode must stay byte-stable
                if let Ok(v) = decode::<TbsCertificate>(&mutated) {
                    assert_eq!(encode(&v).unwrap(), mutated);
                }
            }
        }
    }

    // -------------------------------------------------------
    // 5. PEM pipeline
    // -------------------------------------------------------
    #[test]
    fn test_pem_pipeline() {
        let cert = Certificate {
            tbs_certificate: tbs(Version::V3, None),
            signature_algorithm: ed25519_alg(),
            signature_value: BitString::new(0, &[0xCD; 64]).unwrap(),
        };
        let der = encode(&cert).unwrap();
        let armored = pem::encode("CERTIFICATE", &der);
        let unwrapped = pem::parse_one(&armored, "CERTIFICATE").unwrap();
        assert_eq!(unwrapped, der);
        assert_eq!(decode::<Certificate>(&unwrapped).unwrap(), cert);
    }
}
