#![no_main]
use derkit_codec::oid::Oid;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(oid) = Oid::from_der_value(data) {
        assert_eq!(oid.to_der_value(), data, "value form must round-trip");
        let reparsed = Oid::from_dot(&oid.to_dot()).expect("dot form must round-trip");
        assert_eq!(reparsed, oid);
    }
});
