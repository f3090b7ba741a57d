#![no_main]

use codec::{unwrap_container, wrap_container, ContainerLimits, Stored};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = unwrap_container(data, &Stored, &ContainerLimits::for_testing());

    // Treat the input as plaintext too.
    let raw = wrap_container(data, &Stored).expect("wrap");
    let back = unwrap_container(&raw, &Stored, &ContainerLimits::unlimited()).expect("unwrap");
    assert_eq!(back, data);
});
