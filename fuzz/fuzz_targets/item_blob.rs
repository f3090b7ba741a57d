#![no_main]

use item::{rekey_item, unwrap_item, wrap_item};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(item) = unwrap_item(data) {
        let _ = rekey_item(data, 0);
        let blob = wrap_item(item.kind, &item.values, item.key).expect("unpacked values rewrap");
        assert_eq!(unwrap_item(&blob).map(|again| again.values), Ok(item.values));
    }
});
