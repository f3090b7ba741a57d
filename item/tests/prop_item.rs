use item::{
    format_trade_code, parse_trade_code, rekey_item, unwrap_item, wrap_item, ItemKind, VALUE_COUNT,
};
use proptest::prelude::*;

fn arb_kind() -> impl Strategy<Value = ItemKind> {
    prop_oneof![Just(ItemKind::Item), Just(ItemKind::Weapon)]
}

/// A value vector whose first `present` slots hold in-range values.
fn arb_values(kind: ItemKind) -> impl Strategy<Value = Vec<Option<u64>>> {
    let slots: Vec<_> = kind
        .widths()
        .iter()
        .map(|&width| 0u64..(1u64 << width))
        .collect();
    (slots, 0..=VALUE_COUNT).prop_map(|(values, present)| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| (i < present).then_some(value))
            .collect()
    })
}

fn arb_item() -> impl Strategy<Value = (ItemKind, Vec<Option<u64>>)> {
    arb_kind().prop_flat_map(|kind| (Just(kind), arb_values(kind)))
}

proptest! {
    #[test]
    fn wrap_unwrap_roundtrip((kind, values) in arb_item(), key in any::<i32>()) {
        let blob = wrap_item(kind, &values, key).unwrap();
        let item = unwrap_item(&blob).unwrap();
        prop_assert_eq!(item.kind, kind);
        prop_assert_eq!(item.key, key);
        prop_assert_eq!(item.values, values);
    }

    #[test]
    fn rekey_matches_fresh_wrap(
        (kind, values) in arb_item(),
        old_key in any::<i32>(),
        new_key in any::<i32>(),
    ) {
        let blob = wrap_item(kind, &values, old_key).unwrap();
        let rekeyed = rekey_item(&blob, new_key).unwrap();
        prop_assert_eq!(&rekeyed, &wrap_item(kind, &values, new_key).unwrap());
        prop_assert_eq!(rekey_item(&rekeyed, new_key).unwrap(), rekeyed);
    }

    #[test]
    fn trade_code_roundtrip((kind, values) in arb_item(), key in any::<i32>()) {
        let blob = wrap_item(kind, &values, key).unwrap();
        prop_assert_eq!(parse_trade_code(&format_trade_code(&blob)), Some(blob));
    }

    #[test]
    fn unwrap_never_panics(blob in prop::collection::vec(any::<u8>(), 0..48)) {
        let _ = unwrap_item(&blob);
        let _ = rekey_item(&blob, 0);
    }
}
