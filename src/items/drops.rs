use super::types::{Drop, EquipmentSlot, Rarity};
use crate::core::constants::{
    DUNGEON_LEVELS_PER_RARITY, MAX_DROP_RARITY, MAX_VICTORY_DROPS,
};
use rand::Rng;

/// Rarity for a stage victory in the given world: `min(6, world)`.
pub fn rarity_for_world(world: u32) -> Rarity {
    Rarity::from_tier(world.min(MAX_DROP_RARITY))
}

/// Rarity for a dungeon boss of the given level.
pub fn rarity_for_boss_level(level: u32) -> Rarity {
    Rarity::from_tier((1 + level / DUNGEON_LEVELS_PER_RARITY).min(MAX_DROP_RARITY))
}

pub fn roll_random_slot(rng: &mut impl Rng) -> EquipmentSlot {
    EquipmentSlot::ALL[rng.gen_range(0..EquipmentSlot::ALL.len())]
}

/// Roll 0-3 equipment drops for a stage victory.
pub fn roll_victory_drops(world: u32, rng: &mut impl Rng) -> Vec<Drop> {
    let count = rng.gen_range(0..=MAX_VICTORY_DROPS);
    let rarity = rarity_for_world(world);
    (0..count)
        .map(|_| Drop {
            slot: roll_random_slot(rng),
            rarity,
            source_tier: world,
        })
        .collect()
}

/// Single guaranteed drop for a dungeon boss kill.
pub fn roll_boss_drop(boss_level: u32, rng: &mut impl Rng) -> Drop {
    Drop {
        slot: roll_random_slot(rng),
        rarity: rarity_for_boss_level(boss_level),
        source_tier: boss_level,
    }
}
