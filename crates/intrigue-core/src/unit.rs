//! Units, unit types and the veteran system.

use crate::map::TileCoord;
use crate::types::{CityId, PlayerId, UnitId, UnitTypeId, SINGLE_MOVE};
use serde::{Deserialize, Serialize};

/// A unit on the game map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub type_id: UnitTypeId,
    pub tile: TileCoord,
    /// Current hit points.
    pub hp: u32,
    /// Remaining movement fragments this turn.
    pub moves_left: u32,
    /// Index into the ruleset's veteran levels.
    pub veteran: usize,
    /// City supporting this unit.
    pub homecity: Option<CityId>,
}

impl Unit {
    /// Create a fresh, unpromoted unit at full strength.
    pub fn new(id: UnitId, owner: PlayerId, utype: &UnitType, tile: TileCoord) -> Self {
        Self {
            id,
            owner,
            type_id: utype.id.clone(),
            tile,
            hp: utype.hp,
            moves_left: utype.move_rate,
            veteran: 0,
            homecity: None,
        }
    }

    /// Use movement fragments, saturating at zero.
    pub fn use_movement(&mut self, cost: u32) {
        self.moves_left = self.moves_left.saturating_sub(cost);
    }
}

/// Capability flags relevant to diplomatic actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFlags {
    /// Can perform and defend against diplomatic actions.
    pub diplomat: bool,
    /// Improved odds in diplomatic battles; may steal repeatedly.
    pub spy: bool,
    /// Always wins as defender; beats any non-superspy as attacker.
    pub superspy: bool,
}

/// A ruleset unit type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    pub id: UnitTypeId,
    pub hp: u32,
    /// Movement fragments per turn.
    pub move_rate: u32,
    /// Shield cost to build.
    pub build_cost: u32,
    #[serde(default)]
    pub flags: UnitFlags,
}

impl UnitType {
    pub fn new(id: &str, hp: u32, moves: u32, build_cost: u32) -> Self {
        Self {
            id: id.to_string(),
            hp,
            move_rate: moves * SINGLE_MOVE,
            build_cost,
            flags: UnitFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: UnitFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Can this type take part in diplomatic battles as a defender?
    pub fn is_diplomatic_defender(&self) -> bool {
        self.flags.diplomat || self.flags.superspy
    }
}

/// One rung of the veteran ladder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VeteranLevel {
    pub name: String,
    /// Strength in percent; 100 is an unpromoted unit.
    pub power_fact: i32,
    /// Extra movement fragments.
    pub move_bonus: u32,
    /// Percent chance of reaching the next level after a diplomatic success.
    pub raise_chance: u32,
}

impl VeteranLevel {
    pub fn new(name: &str, power_fact: i32, move_bonus: u32, raise_chance: u32) -> Self {
        Self {
            name: name.to_string(),
            power_fact,
            move_bonus,
            raise_chance,
        }
    }
}
