#![no_main]
use derkit_codec::{Any, Decoder};
use libfuzzer_sys::fuzz_target;

fn walk(dec: Decoder<'_>, depth: usize) {
    if depth == 0 {
        return;
    }
    let mut dec = dec;
    while !dec.is_empty() {
        match dec.any::<Any>() {
            Ok(any) if any.tag.constructed => walk(any.decoder(), depth - 1),
            Ok(_) => {}
            Err(_) => break,
        }
    }
}

fuzz_target!(|data: &[u8]| {
    walk(Decoder::new(data), 8);
});
