//! Shared fixture for handler tests.

use super::ActionContext;
use crate::action::Action;
use crate::dice::ScriptedDice;
use crate::events::{EventKind, Outbox};
use crate::map::{Map, Terrain, TileCoord};
use crate::player::Player;
use crate::ruleset::Ruleset;
use crate::settings::ServerSettings;
use crate::types::{CityId, PlayerId, UnitId};
use crate::world::World;

pub const ROMANS: PlayerId = 0;
pub const CARTHAGINIANS: PlayerId = 1;
pub const GREEKS: PlayerId = 2;

/// Carthage stands here; agents usually start next to it.
pub const TARGET: TileCoord = TileCoord { x: 6, y: 6 };
pub const BESIDE: TileCoord = TileCoord { x: 5, y: 6 };

pub struct Fixture {
    pub world: World,
    pub ruleset: Ruleset,
    pub settings: ServerSettings,
    pub dice: ScriptedDice,
    pub outbox: Outbox,
}

impl Fixture {
    /// Three nations on a 12x12 grassland map, at peace, with Rome and
    /// Carthage founded. Dice roll 99 until scripted.
    pub fn new() -> Self {
        let mut world = World::new(Map::filled(12, 12, Terrain::Grassland));
        world.add_player(Player::new(0, "Caesar", "Roman", "Romans"));
        world.add_player(Player::new(0, "Hannibal", "Carthaginian", "Carthaginians"));
        world.add_player(Player::new(0, "Alexander", "Greek", "Greeks"));
        world.create_city(ROMANS, "Rome", TileCoord::new(2, 6));
        world.create_city(CARTHAGINIANS, "Carthage", TARGET);
        Self {
            world,
            ruleset: Ruleset::classic(),
            settings: ServerSettings::default(),
            dice: ScriptedDice::always(99),
            outbox: Outbox::new(),
        }
    }

    pub fn ctx(&mut self) -> ActionContext<'_> {
        ActionContext::new(
            &mut self.world,
            &self.ruleset,
            &self.settings,
            &mut self.dice,
            &mut self.outbox,
        )
    }

    /// Replay `values`, then keep rolling 99: unscripted rolls fail
    /// missions and skip promotions.
    pub fn script(&mut self, values: &[u32]) {
        let mut dice = ScriptedDice::always(99);
        for value in values {
            dice.push(*value);
        }
        self.dice = dice;
    }

    pub fn spawn(&mut self, owner: PlayerId, kind: &str, tile: TileCoord) -> UnitId {
        let utype = self.ruleset.unit_type(kind).cloned().unwrap();
        self.world.create_unit(owner, &utype, tile)
    }

    pub fn action(&self, id: &str) -> Action {
        self.ruleset.action(id).cloned().unwrap()
    }

    pub fn carthage(&self) -> CityId {
        self.world.city_at(&TARGET).map(|c| c.id).unwrap()
    }

    pub fn events_for(&self, player: PlayerId) -> Vec<EventKind> {
        self.outbox
            .notices_for(player)
            .into_iter()
            .map(|n| n.event)
            .collect()
    }
}
