//! Item blobs for WSG saves.
//!
//! An item is up to seventeen fixed-width unsigned values, packed
//! low-bit-first and obfuscated under a per-item 32-bit key:
//!
//! ```
//! use item::{unwrap_item, wrap_item, ItemKind};
//!
//! let values = [Some(3), Some(1200), Some(70_000), Some(44), Some(50), Some(50)];
//! let blob = wrap_item(ItemKind::Item, &values, 12345).unwrap();
//!
//! let item = unwrap_item(&blob).unwrap();
//! assert_eq!(item.key, 12345);
//! assert_eq!(&item.values[..6], &values);
//! assert!(item.values[6..].iter().all(Option::is_none));
//! ```
//!
//! Blobs can be re-keyed without knowing what the values mean, which is how
//! trade codes are normalized for export ([`rekey_item`]) and randomized on
//! import ([`KeySource`]).

mod blob;
mod error;
mod info;
mod layout;
mod pack;
mod trade;

pub use blob::{
    blob_key, rekey_item, unwrap_item, wrap_item, xor_keystream, Item, CHECKSUM_LEN, HEADER_LEN,
    MIN_BLOB_LEN,
};
pub use error::{ItemError, ItemResult};
pub use info::{AssetRef, ItemInfo};
pub use layout::{
    ItemKind, FIRST_PART, ITEM_HEADER_ASSET_BITS, ITEM_WIDTHS, VALUE_COUNT, VERSION_TAG,
    WEAPON_HEADER_ASSET_BITS, WEAPON_WIDTHS,
};
pub use pack::{pack_values, unpack_values};
pub use trade::{
    format_trade_code, parse_trade_code, parse_trade_codes, KeySource, TradeCode, TradeSection,
};
