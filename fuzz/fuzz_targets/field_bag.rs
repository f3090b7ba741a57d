#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{read_field_bag, write_field_bag};

fuzz_target!(|data: &[u8]| {
    // Whatever reads must write back and read the same.
    if let Ok(bag) = read_field_bag(data) {
        let bytes = write_field_bag(&bag).expect("decoded bag must encode");
        assert_eq!(read_field_bag(&bytes).as_ref(), Ok(&bag));
    }
});
