//! Cities and city improvements.

use crate::map::TileCoord;
use crate::types::{BuildingId, CityId, PlayerId, Turn, UnitTypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A city on the game map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub owner: PlayerId,
    /// Founder of the city; used for buy-back incite discounts.
    pub original_owner: PlayerId,
    pub name: String,
    pub tile: TileCoord,
    /// Number of citizens. A city reduced to zero is destroyed.
    pub size: u32,
    pub food_stock: u32,
    /// Shields accumulated toward the current production.
    pub shield_stock: u32,
    pub production: ProductionItem,
    pub buildings: BTreeSet<BuildingId>,
    pub is_capital: bool,
    /// Citizen moods.
    pub happy: u32,
    pub unhappy: u32,
    pub angry: u32,
    pub celebrating: bool,
    /// Successful technology thefts from this city.
    pub steal_count: u32,
    /// Turn of the last plague outbreak.
    pub plague_turn: Option<Turn>,
}

impl City {
    /// Create a new size-1 city.
    pub fn new(id: CityId, owner: PlayerId, name: &str, tile: TileCoord) -> Self {
        Self {
            id,
            owner,
            original_owner: owner,
            name: name.to_string(),
            tile,
            size: 1,
            food_stock: 0,
            shield_stock: 0,
            production: ProductionItem::Unit("Warriors".to_string()),
            buildings: BTreeSet::new(),
            is_capital: false,
            happy: 0,
            unhappy: 0,
            angry: 0,
            celebrating: false,
            steal_count: 0,
            plague_turn: None,
        }
    }

    pub fn has_building(&self, building: &str) -> bool {
        self.buildings.contains(building)
    }

    /// A city is unhappy when its unhappy citizens outweigh the happy ones.
    pub fn is_unhappy(&self) -> bool {
        self.happy < self.unhappy + 2 * self.angry
    }
}

/// What a city is currently producing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionItem {
    Unit(UnitTypeId),
    Building(BuildingId),
}

impl std::fmt::Display for ProductionItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductionItem::Unit(name) | ProductionItem::Building(name) => write!(f, "{}", name),
        }
    }
}

/// A ruleset city improvement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub build_cost: u32,
    /// Percent chance a saboteur succeeds against it; 0 means immune.
    pub sabotage: u32,
}

impl Building {
    pub fn new(id: &str, build_cost: u32, sabotage: u32) -> Self {
        Self {
            id: id.to_string(),
            build_cost,
            sabotage,
        }
    }

    pub fn can_be_sabotaged(&self) -> bool {
        self.sabotage > 0
    }
}
