#![no_main]
use derkit_codec::{decode, der_enum, der_sequence, encode};
use derkit_codec::{Any, BitString, DateTime, OctetString};
use libfuzzer_sys::fuzz_target;

der_enum! {
    enum Kind: u8 {
        Plain = 0,
        Signed = 1,
        Sealed = 2,
    }
}

der_sequence! {
    struct Record<'a> {
        @explicit(0) kind: Kind = Kind::Plain,
        serial: u64,
        critical: bool,
        payload: OctetString<'a>,
        stamp: Option<DateTime>,
        @implicit(1) fingerprint: Option<BitString<'a>>,
        extra: Option<Any<'a>>,
    }
}

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = decode::<Record>(data) {
        let re = encode(&record).expect("re-encode of a decoded value");
        assert_eq!(re, data, "decode-encode must be byte-stable");
    }
});
