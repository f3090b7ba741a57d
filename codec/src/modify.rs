//! In-place edits of a player record.
//!
//! Changes are written as a comma-separated `name=value` list, for example
//! `money=99999999,eridium=99,unlocks=slaughterdome:truevaulthunter`.

use std::str::FromStr;

use item::{unwrap_item, wrap_item};
use tracing::debug;
use wire::{
    read_field_bag, read_packed, write_field_bag, write_packed, FieldBag, WireType, WireValue,
};

use crate::error::{CodecError, CodecResult};
use crate::save::{ITEMS_FIELD, WEAPONS_FIELD};

const LEVEL_FIELD: u32 = 2;
const EXPERIENCE_FIELD: u32 = 3;
const SKILL_POINTS_FIELD: u32 = 4;
const CURRENCY_FIELD: u32 = 6;
const PLAYTHROUGHS_FIELD: u32 = 7;
const SIZES_FIELD: u32 = 13;
const UNLOCKS_FIELD: u32 = 23;
const UNLOCK_NOTIFICATIONS_FIELD: u32 = 24;
const BLACK_MARKET_FIELD: u32 = 36;
const BANK_SIZE_FIELD: u32 = 56;

const MONEY: usize = 0;
const ERIDIUM: usize = 1;
const SERAPH: usize = 2;
const TOKENS: usize = 4;

const BACKPACK_UPGRADES: usize = 7;
const BANK_UPGRADES: usize = 8;

const SIZES_INVENTORY: u32 = 1;
const SIZES_WEAPON_SLOTS: u32 = 2;
const SIZES_WEAPON_SLOTS_SHOWN: u32 = 3;

const BASE_BACKPACK: u64 = 12;
const BACKPACK_STEP: u64 = 3;
const BASE_BANK: u64 = 6;
const BANK_STEP: u64 = 2;
const MAX_BANK_UPGRADES: u64 = 255;

const GRADE: usize = 4;
const QUALITY: usize = 5;

const SLAUGHTERDOME_UNLOCK: u8 = 1;

/// Content unlocked through [`SaveChanges::unlocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unlock {
    /// The Creature Slaughterdome arena.
    Slaughterdome,
    /// True Vault Hunter Mode.
    TrueVaultHunter,
}

impl FromStr for Unlock {
    type Err = CodecError;

    fn from_str(name: &str) -> CodecResult<Self> {
        match name {
            "slaughterdome" => Ok(Self::Slaughterdome),
            "truevaulthunter" => Ok(Self::TrueVaultHunter),
            _ => Err(CodecError::InvalidChange {
                change: name.to_owned(),
                reason: "unknown unlock",
            }),
        }
    }
}

/// Edits applied by [`apply_changes`]. `None` leaves a value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveChanges {
    /// Character level. Experience is moved into the level's range if needed.
    pub level: Option<u32>,
    pub skill_points: Option<u64>,
    pub money: Option<u64>,
    pub eridium: Option<u64>,
    pub seraph: Option<u64>,
    pub tokens: Option<u64>,
    /// Level for every leveled item; `Some(None)` uses the character level.
    pub item_levels: Option<Option<u64>>,
    /// Backpack size, rounded up to a whole number of upgrades.
    pub backpack: Option<u64>,
    /// Bank size, rounded up to a whole number of upgrades.
    pub bank: Option<u64>,
    /// Weapon slots, 2 to 4.
    pub gun_slots: Option<u64>,
    pub unlocks: Vec<Unlock>,
}

fn number<T: FromStr>(change: &str, value: Option<&str>) -> CodecResult<T> {
    value
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| CodecError::InvalidChange {
            change: change.to_owned(),
            reason: "expected a number",
        })
}

impl FromStr for SaveChanges {
    type Err = CodecError;

    fn from_str(text: &str) -> CodecResult<Self> {
        let mut changes = Self::default();
        for change in text.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let (name, value) = match change.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value)),
                None => (change, None),
            };
            match name {
                "level" => changes.level = Some(number(change, value)?),
                "skillpoints" => changes.skill_points = Some(number(change, value)?),
                "money" => changes.money = Some(number(change, value)?),
                "eridium" => changes.eridium = Some(number(change, value)?),
                "seraph" => changes.seraph = Some(number(change, value)?),
                "tokens" => changes.tokens = Some(number(change, value)?),
                "itemlevels" => {
                    changes.item_levels = Some(match value.map(str::trim) {
                        None | Some("") => None,
                        Some(_) => Some(number(change, value)?),
                    });
                }
                "backpack" => changes.backpack = Some(number(change, value)?),
                "bank" => changes.bank = Some(number(change, value)?),
                "gunslots" => {
                    let slots = number(change, value)?;
                    if !(2..=4).contains(&slots) {
                        return Err(CodecError::InvalidChange {
                            change: change.to_owned(),
                            reason: "gun slots must be 2, 3 or 4",
                        });
                    }
                    changes.gun_slots = Some(slots);
                }
                "unlocks" => {
                    for unlock in value.unwrap_or_default().split(':') {
                        changes.unlocks.push(unlock.trim().parse()?);
                    }
                }
                _ => {
                    return Err(CodecError::InvalidChange {
                        change: change.to_owned(),
                        reason: "unknown setting",
                    })
                }
            }
        }
        Ok(changes)
    }
}

/// Experience needed to reach `level`.
#[allow(clippy::cast_sign_loss)]
fn experience_for(level: u32) -> u64 {
    60.0f64.mul_add(f64::from(level).powf(2.8), -59.2) as u64
}

fn varint(bag: &FieldBag, field: u32) -> Option<u64> {
    bag.first(field).and_then(WireValue::as_u64)
}

/// Replaces the first value of `field`, adding it if absent.
fn set_first(bag: &mut FieldBag, field: u32, value: WireValue) {
    match bag.get_mut(field).and_then(|values| values.first_mut()) {
        Some(first) => *first = value,
        None => bag.push(field, value),
    }
}

fn packed(bag: &FieldBag, field: u32) -> CodecResult<Vec<u64>> {
    let Some(value) = bag.first(field) else {
        return Ok(Vec::new());
    };
    let bytes = value.as_bytes().ok_or(CodecError::MalformedEntry {
        field,
        reason: "expected packed varints",
    })?;
    Ok(read_packed(bytes, WireType::Varint)?)
}

fn set_packed(bag: &mut FieldBag, field: u32, values: &[u64]) -> CodecResult<()> {
    set_first(bag, field, WireValue::Bytes(write_packed(WireType::Varint, values)?));
    Ok(())
}

fn set_at(values: &mut Vec<u64>, index: usize, value: u64) {
    if values.len() <= index {
        values.resize(index + 1, 0);
    }
    values[index] = value;
}

fn update_nested(
    bag: &mut FieldBag,
    field: u32,
    update: impl FnOnce(&mut FieldBag),
) -> CodecResult<()> {
    let bytes = bag
        .first(field)
        .and_then(WireValue::as_bytes)
        .ok_or(CodecError::MalformedEntry {
            field,
            reason: "missing nested message",
        })?;
    let mut inner = read_field_bag(bytes)?;
    update(&mut inner);
    set_first(bag, field, WireValue::Bytes(write_field_bag(&inner)?));
    Ok(())
}

/// Re-levels every item above grade 1 in the backpack and weapon lists.
fn relevel_items(bag: &mut FieldBag, level: u64) -> CodecResult<usize> {
    let mut changed = 0;
    for field in [ITEMS_FIELD, WEAPONS_FIELD] {
        let Some(entries) = bag.get_mut(field) else {
            continue;
        };
        for entry in entries.iter_mut() {
            let WireValue::Bytes(bytes) = entry else {
                return Err(CodecError::MalformedEntry {
                    field,
                    reason: "entry is not a message",
                });
            };
            let mut inner = read_field_bag(bytes)?;
            let Some(WireValue::Bytes(blob)) = inner.first(1) else {
                return Err(CodecError::MalformedEntry {
                    field,
                    reason: "entry has no item blob",
                });
            };
            let mut item = unwrap_item(blob)?;
            if !item.values[GRADE].is_some_and(|grade| grade > 1) {
                continue;
            }
            item.values[GRADE] = Some(level);
            item.values[QUALITY] = Some(level);
            let blob = wrap_item(item.kind, &item.values, item.key)?;
            set_first(&mut inner, 1, WireValue::Bytes(blob));
            *bytes = write_field_bag(&inner)?;
            changed += 1;
        }
    }
    Ok(changed)
}

fn add_unlock(bag: &mut FieldBag, field: u32, unlock: u8) {
    let mut bytes = bag
        .first(field)
        .and_then(WireValue::as_bytes)
        .map(<[u8]>::to_vec)
        .unwrap_or_default();
    if !bytes.contains(&unlock) {
        bytes.push(unlock);
    }
    set_first(bag, field, WireValue::Bytes(bytes));
}

/// Applies `changes` to a player record.
pub fn apply_changes(bag: &mut FieldBag, changes: &SaveChanges) -> CodecResult<()> {
    if let Some(level) = changes.level {
        let lower = experience_for(level);
        let upper = experience_for(level.saturating_add(1));
        let mut experience = varint(bag, EXPERIENCE_FIELD).unwrap_or(0);
        if !(lower..upper).contains(&experience) {
            experience = lower;
            set_first(bag, EXPERIENCE_FIELD, WireValue::Varint(experience));
        }
        set_first(bag, LEVEL_FIELD, WireValue::Varint(u64::from(level)));
        debug!(level, experience, "set level");
    }

    if let Some(points) = changes.skill_points {
        set_first(bag, SKILL_POINTS_FIELD, WireValue::Varint(points));
    }

    let currency = [
        (MONEY, changes.money),
        (ERIDIUM, changes.eridium),
        (SERAPH, changes.seraph),
        (TOKENS, changes.tokens),
    ];
    if currency.iter().any(|(_, value)| value.is_some()) {
        let mut values = packed(bag, CURRENCY_FIELD)?;
        for (index, value) in currency {
            if let Some(value) = value {
                set_at(&mut values, index, value);
            }
        }
        set_packed(bag, CURRENCY_FIELD, &values)?;
        debug!(?values, "set currency");
    }

    if let Some(level) = changes.item_levels {
        let level = level
            .or_else(|| varint(bag, LEVEL_FIELD))
            .ok_or(CodecError::MalformedEntry {
                field: LEVEL_FIELD,
                reason: "record has no level",
            })?;
        let changed = relevel_items(bag, level)?;
        debug!(level, changed, "set item levels");
    }

    if let Some(size) = changes.backpack {
        let upgrades = size.saturating_sub(BASE_BACKPACK).div_ceil(BACKPACK_STEP);
        let size = BASE_BACKPACK + upgrades * BACKPACK_STEP;
        update_nested(bag, SIZES_FIELD, |sizes| {
            set_first(sizes, SIZES_INVENTORY, WireValue::Varint(size));
        })?;
        let mut market = packed(bag, BLACK_MARKET_FIELD)?;
        set_at(&mut market, BACKPACK_UPGRADES, upgrades);
        set_packed(bag, BLACK_MARKET_FIELD, &market)?;
        debug!(size, upgrades, "set backpack size");
    }

    if let Some(size) = changes.bank {
        let upgrades = size
            .saturating_sub(BASE_BANK)
            .div_ceil(BANK_STEP)
            .min(MAX_BANK_UPGRADES);
        let size = BASE_BANK + upgrades * BANK_STEP;
        set_first(bag, BANK_SIZE_FIELD, WireValue::Varint(size));
        let mut market = packed(bag, BLACK_MARKET_FIELD)?;
        set_at(&mut market, BANK_UPGRADES, upgrades);
        set_packed(bag, BLACK_MARKET_FIELD, &market)?;
        debug!(size, upgrades, "set bank size");
    }

    if let Some(slots) = changes.gun_slots {
        update_nested(bag, SIZES_FIELD, |sizes| {
            set_first(sizes, SIZES_WEAPON_SLOTS, WireValue::Varint(slots));
            let shown = varint(sizes, SIZES_WEAPON_SLOTS_SHOWN).unwrap_or(0);
            let max_shown = slots.saturating_sub(2);
            if shown > max_shown {
                set_first(sizes, SIZES_WEAPON_SLOTS_SHOWN, WireValue::Varint(max_shown));
            }
        })?;
    }

    for unlock in &changes.unlocks {
        match unlock {
            Unlock::Slaughterdome => {
                add_unlock(bag, UNLOCKS_FIELD, SLAUGHTERDOME_UNLOCK);
                add_unlock(bag, UNLOCK_NOTIFICATIONS_FIELD, SLAUGHTERDOME_UNLOCK);
            }
            Unlock::TrueVaultHunter => {
                if varint(bag, PLAYTHROUGHS_FIELD).unwrap_or(0) < 1 {
                    set_first(bag, PLAYTHROUGHS_FIELD, WireValue::Varint(1));
                }
            }
        }
        debug!(?unlock, "unlocked");
    }
    Ok(())
}
