//! The entity registry: players, units, cities, tiles and diplomacy.
//!
//! Everything the action core touches lives here and is addressed by id.
//! Lookups return `Option` so that handlers must re-check liveness after
//! any step that may have destroyed an entity.

use crate::city::City;
use crate::diplomacy::DiplomacyState;
use crate::map::{Map, TileCoord};
use crate::player::Player;
use crate::types::{CityId, PlayerId, Turn, UnitId};
use crate::unit::{Unit, UnitType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The world state the action core operates on.
///
/// This struct is designed to be:
/// - Fully serializable so the savegame layer can persist it as-is
/// - Deterministic to iterate (ordered maps keyed by id)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    /// Current turn number.
    pub turn: Turn,
    /// All players, indexed by `PlayerId`.
    pub players: Vec<Player>,
    pub map: Map,
    units: BTreeMap<UnitId, Unit>,
    cities: BTreeMap<CityId, City>,
    pub diplomacy: DiplomacyState,
    next_unit_id: UnitId,
    next_city_id: CityId,
}

impl World {
    pub fn new(map: Map) -> Self {
        Self {
            turn: 1,
            players: Vec::new(),
            map,
            units: BTreeMap::new(),
            cities: BTreeMap::new(),
            diplomacy: DiplomacyState::default(),
            next_unit_id: 1,
            next_city_id: 1,
        }
    }

    /// Add a player; its id is overwritten with its index.
    pub fn add_player(&mut self, mut player: Player) -> PlayerId {
        let id = self.players.len() as PlayerId;
        player.id = id;
        self.players.push(player);
        id
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id as usize)
    }

    /// Ids of every living player.
    pub fn living_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_alive)
            .map(|p| p.id)
            .collect()
    }

    // ---------------------------------------------------------------------
    // Units
    // ---------------------------------------------------------------------

    /// Create a new unit and return its handle.
    pub fn create_unit(&mut self, owner: PlayerId, utype: &UnitType, tile: TileCoord) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, owner, utype, tile));
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn unit_alive(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Remove a unit from the registry. Callers go through
    /// `ActionContext::wipe_unit` so the removal is reported.
    pub(crate) fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Re-create `id` under a new owner with a fresh id, preserving its
    /// state. The old handle becomes dead. Returns the new handle.
    pub(crate) fn rehome_unit(&mut self, id: UnitId, new_owner: PlayerId) -> Option<UnitId> {
        let mut unit = self.units.remove(&id)?;
        let new_id = self.next_unit_id;
        self.next_unit_id += 1;
        unit.id = new_id;
        unit.owner = new_owner;
        self.units.insert(new_id, unit);
        Some(new_id)
    }

    /// Units on a tile, in id order.
    pub fn units_at(&self, tile: &TileCoord) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.tile == *tile)
            .map(|u| u.id)
            .collect()
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    // ---------------------------------------------------------------------
    // Cities
    // ---------------------------------------------------------------------

    /// Found a city and claim its tile.
    pub fn create_city(&mut self, owner: PlayerId, name: &str, tile: TileCoord) -> CityId {
        let id = self.next_city_id;
        self.next_city_id += 1;
        self.cities.insert(id, City::new(id, owner, name, tile));
        if let Some(t) = self.map.get_mut(&tile) {
            t.owner = Some(owner);
        }
        id
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(&id)
    }

    pub fn city_mut(&mut self, id: CityId) -> Option<&mut City> {
        self.cities.get_mut(&id)
    }

    pub fn city_alive(&self, id: CityId) -> bool {
        self.cities.contains_key(&id)
    }

    pub(crate) fn remove_city(&mut self, id: CityId) -> Option<City> {
        self.cities.remove(&id)
    }

    pub fn city_at(&self, tile: &TileCoord) -> Option<&City> {
        self.cities.values().find(|c| c.tile == *tile)
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    /// The player's capital, if it has one.
    pub fn capital_of(&self, player: PlayerId) -> Option<&City> {
        self.cities
            .values()
            .find(|c| c.owner == player && c.is_capital)
    }

    /// Closest city owned by `owner`; ties go to the lowest id.
    pub fn nearest_city(&self, owner: PlayerId, tile: &TileCoord) -> Option<CityId> {
        self.cities
            .values()
            .filter(|c| c.owner == owner)
            .min_by_key(|c| (c.tile.distance(tile), c.id))
            .map(|c| c.id)
    }

    // ---------------------------------------------------------------------
    // Diplomacy
    // ---------------------------------------------------------------------

    pub fn players_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        self.diplomacy.are_allied(a, b)
    }
}
