//! Player state as seen by the action resolution core.

use crate::map::TileCoord;
use crate::types::{PlayerId, TechId, Turn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A player in the game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    /// Player index.
    pub id: PlayerId,
    /// Leader / display name.
    pub name: String,
    /// Nation adjective, e.g. "Roman".
    pub nation_adjective: String,
    /// Nation plural, e.g. "Romans".
    pub nation_plural: String,
    /// Current gold in treasury. Never negative after an action resolves.
    pub gold: i32,
    /// Known technologies.
    pub technologies: BTreeSet<TechId>,
    /// Bulbs accumulated toward the current research.
    pub bulbs_researched: i32,
    /// Players this player has an embassy with.
    pub embassies: BTreeSet<PlayerId>,
    /// Tiles whose terrain this player knows.
    pub known_tiles: BTreeSet<TileCoord>,
    /// Barbarian players execute diplomats instead of receiving embassies.
    pub is_barbarian: bool,
    pub is_alive: bool,
    /// Controlled by the built-in AI (receives incident callbacks).
    pub ai_controlled: bool,
    /// Turn of the most recent war-enabling action involving this player.
    pub last_war_action: Option<Turn>,
}

impl Player {
    /// Create a new player with default values.
    pub fn new(id: PlayerId, name: &str, adjective: &str, plural: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            nation_adjective: adjective.to_string(),
            nation_plural: plural.to_string(),
            gold: 0,
            technologies: BTreeSet::new(),
            bulbs_researched: 0,
            embassies: BTreeSet::new(),
            known_tiles: BTreeSet::new(),
            is_barbarian: false,
            is_alive: true,
            ai_controlled: false,
            last_war_action: None,
        }
    }

    pub fn has_tech(&self, tech_id: &str) -> bool {
        self.technologies.contains(tech_id)
    }

    pub fn has_embassy_with(&self, other: PlayerId) -> bool {
        self.embassies.contains(&other)
    }

    pub fn can_afford(&self, cost: i32) -> bool {
        self.gold >= cost
    }

    /// Spend gold, never dropping below zero.
    pub fn spend_gold(&mut self, amount: i32) {
        self.gold = (self.gold - amount).max(0);
    }

    pub fn add_gold(&mut self, amount: i32) {
        self.gold += amount;
    }

    /// Mark a tile as known. Returns true if it was new.
    pub fn learn_tile(&mut self, coord: TileCoord) -> bool {
        self.known_tiles.insert(coord)
    }
}
