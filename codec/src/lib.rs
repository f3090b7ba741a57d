//! Container framing and save-level operations for WSG saves.
//!
//! This is the crate that ties together bitstream, wire, schema and item to
//! read and write whole save files.
//!
//! # Features
//!
//! - SHA-1 envelope, LZO frame and `WSG` header handling
//! - Huffman coding of the player record
//! - The full player-record schema with its value codecs
//! - Item export and import as trade codes
//! - Quick edits of level, currency, storage sizes and unlocks
//! - JSON dumps, raw or schema-parsed
//!
//! # Design Principles
//!
//! - **Byte-exact** - Files written here match what the game writes.
//! - **Bounded** - Declared sizes are checked against [`ContainerLimits`] first.
//! - **Lenient where the game is** - A wrong header length is logged, not fatal.

mod compress;
mod container;
mod error;
mod huffman;
mod limits;
mod modify;
mod save;
mod save_schema;

#[cfg(feature = "lzo")]
pub use compress::Lzo;
pub use compress::{frame, unframe, Compressor, Stored, FRAME_HEADER_LEN, FRAME_MARKER};
pub use container::{
    inspect_container, unwrap_container, wrap_container, ByteOrder, ContainerHeader, DIGEST_LEN,
    HEADER_LEN, TAG, VERSION,
};
pub use error::{CodecError, CodecResult, LimitKind};
pub use huffman::HuffmanTree;
pub use limits::ContainerLimits;
pub use modify::{apply_changes, SaveChanges, Unlock};
pub use save::{
    bag_from_json, bag_to_json, decode_save, encode_save, export_items, import_items,
    record_from_json, record_to_json, BANK_FIELD, ITEMS_FIELD, WEAPONS_FIELD,
};
pub use save_schema::{save_schema, BLACK_MARKET, BLACK_MARKET_KEYS, BYTES, FLOAT, ITEM_INFO};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = ContainerLimits::default();
        let _ = Stored;
        let _ = HuffmanTree::Leaf(0);
        let _: CodecResult<()> = Ok(());
        assert_eq!(TAG, *b"WSG");
    }

    #[test]
    fn save_schema_builds() {
        assert!(save_schema().is_ok());
    }
}
