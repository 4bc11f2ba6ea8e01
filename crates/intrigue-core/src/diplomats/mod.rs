//! Diplomat and spy missions.
//!
//! Every mission runs the same pipeline:
//!
//! 1. sanity checks (no state changes on failure)
//! 2. infiltration: fight every diplomatic defender on the target tile
//! 3. the mission's own dice roll
//! 4. the effect itself, notices and the incident record
//! 5. escape, then the price of success (movement or the agent itself)
//!
//! Steps may destroy the agent, the target or both. Handlers only hold
//! `UnitId`/`CityId` handles and look them up again after any step that can
//! destroy something.

mod battle;
mod bribe;
mod contest;
mod embassy;
mod escape;
mod incite;
mod infiltrate;
mod investigate;
mod nuke;
mod poison;
mod sabotage_city;
mod sabotage_unit;
mod steal_gold;
mod steal_maps;
mod steal_tech;
#[cfg(test)]
pub(crate) mod testkit;

pub use battle::spy_attack;
pub use bribe::bribe_unit;
pub use contest::success_vs_defender;
pub use embassy::establish_embassy;
pub use escape::{attempt_escape, Escape};
pub use incite::incite_city;
pub use infiltrate::{infiltrate_tile, Infiltration};
pub use investigate::investigate_city;
pub use nuke::suitcase_nuke;
pub use poison::{poison_city, spread_plague};
pub use sabotage_city::{sabotage_city, SabotageTarget};
pub use sabotage_unit::sabotage_unit;
pub use steal_gold::steal_gold;
pub use steal_maps::steal_maps;
pub use steal_tech::steal_tech;

use crate::action::{Action, ActionResultKind, TargetKind};
use crate::consequence;
use crate::dice::Dice;
use crate::effects::{EffectContext, EffectKind};
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, IncidentClass, Message, Outbox, VictimLink, WipeReason};
use crate::map::TileCoord;
use crate::ruleset::Ruleset;
use crate::settings::ServerSettings;
use crate::types::{CityId, PlayerId, UnitId, SINGLE_MOVE};
use crate::unit::UnitFlags;
use crate::world::World;
use tracing::debug;

/// Everything an action needs for one call.
///
/// The context holds the world exclusively for the duration of the call.
pub struct ActionContext<'a> {
    pub world: &'a mut World,
    pub ruleset: &'a Ruleset,
    pub settings: &'a ServerSettings,
    pub dice: &'a mut dyn Dice,
    pub outbox: &'a mut Outbox,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        world: &'a mut World,
        ruleset: &'a Ruleset,
        settings: &'a ServerSettings,
        dice: &'a mut dyn Dice,
        outbox: &'a mut Outbox,
    ) -> Self {
        Self {
            world,
            ruleset,
            settings,
            dice,
            outbox,
        }
    }

    // ---------------------------------------------------------------------
    // Names for messages
    // ---------------------------------------------------------------------

    pub(crate) fn nation_plural(&self, player: PlayerId) -> String {
        self.world
            .player(player)
            .map(|p| p.nation_plural.clone())
            .unwrap_or_default()
    }

    pub(crate) fn nation_adjective(&self, player: PlayerId) -> String {
        self.world
            .player(player)
            .map(|p| p.nation_adjective.clone())
            .unwrap_or_default()
    }

    pub(crate) fn unit_name(&self, unit: UnitId) -> String {
        self.world
            .unit(unit)
            .map(|u| u.type_id.clone())
            .unwrap_or_default()
    }

    pub(crate) fn city_name(&self, city: CityId) -> String {
        self.world
            .city(city)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    pub(crate) fn unit_flags(&self, unit: UnitId) -> UnitFlags {
        self.world
            .unit(unit)
            .map(|u| self.ruleset.unit_flags(u))
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Remove a unit from the world and report why. Returns false if the
    /// unit was already gone.
    pub fn wipe_unit(&mut self, unit: UnitId, reason: WipeReason) -> bool {
        let Some(removed) = self.world.remove_unit(unit) else {
            return false;
        };
        debug!(unit, owner = removed.owner, reason = ?reason, "unit wiped");
        self.outbox.push(Dispatch::UnitRemoved {
            unit,
            owner: removed.owner,
            reason,
        });
        true
    }

    /// Remove a city; units it supported lose their home.
    pub(crate) fn remove_city(&mut self, city: CityId) {
        let Some(removed) = self.world.remove_city(city) else {
            return;
        };
        debug!(city, owner = removed.owner, "city destroyed");
        let supported: Vec<UnitId> = self
            .world
            .units()
            .filter(|u| u.homecity == Some(city))
            .map(|u| u.id)
            .collect();
        for id in supported {
            if let Some(unit) = self.world.unit_mut(id) {
                unit.homecity = None;
            }
        }
        if let Some(tile) = self.world.map.get_mut(&removed.tile) {
            tile.owner = None;
        }
        self.outbox.push(Dispatch::CityRemoved {
            city,
            owner: removed.owner,
        });
    }

    /// Shrink a city by `amount`. Returns false if the city was destroyed.
    pub(crate) fn reduce_city_size(&mut self, city: CityId, amount: u32) -> bool {
        let Some(c) = self.world.city_mut(city) else {
            return false;
        };
        if c.size <= amount {
            self.remove_city(city);
            return false;
        }
        c.size -= amount;
        c.food_stock = c.food_stock.min(c.size * 10);
        self.outbox.push(Dispatch::CityInfo { city });
        true
    }

    /// Charge a unit a single move.
    pub(crate) fn charge_single_move(&mut self, unit: UnitId) {
        if let Some(u) = self.world.unit_mut(unit) {
            u.use_movement(SINGLE_MOVE);
            self.outbox.push(Dispatch::UnitInfo { unit });
        }
    }

    /// Roll for promotion after a diplomatic victory.
    pub(crate) fn maybe_make_veteran(&mut self, unit: UnitId) -> bool {
        let Some(level) = self.world.unit(unit).map(|u| u.veteran) else {
            return false;
        };
        if level + 1 >= self.ruleset.veteran_levels.len() {
            return false;
        }
        let chance = self
            .ruleset
            .veteran_level(level)
            .map_or(0, |v| v.raise_chance);
        if self.dice.roll(100) >= chance {
            return false;
        }

        let Some(u) = self.world.unit_mut(unit) else {
            return false;
        };
        u.veteran += 1;
        let owner = u.owner;
        let tile = u.tile;
        let name = u.type_id.clone();
        let level_name = self
            .ruleset
            .veteran_level(level + 1)
            .map(|v| v.name.clone())
            .unwrap_or_default();
        self.outbox.notify(
            owner,
            Some(tile),
            EventKind::UnitPromoted,
            Message::Promoted {
                unit: name,
                level: level_name,
            },
        );
        self.outbox.push(Dispatch::UnitInfo { unit });
        true
    }

    /// Spend the actor the way the action says. Returns true if it was wiped.
    pub fn consume_actor(&mut self, unit: UnitId, action: &Action) -> bool {
        match action.consumes_actor {
            Some(consumption) => self.wipe_unit(unit, consumption.wipe_reason()),
            None => false,
        }
    }

    /// Pay for a successful action: the actor is spent or charged a move.
    pub fn conclude_success(&mut self, unit: UnitId, action: &Action) {
        if !self.world.unit_alive(unit) {
            return;
        }
        if action.consumes_actor() {
            self.consume_actor(unit, action);
        } else if action.move_cost_on_success {
            self.charge_single_move(unit);
        }
    }

    // ---------------------------------------------------------------------
    // Dice
    // ---------------------------------------------------------------------

    /// Success odds of an action in percent, after ruleset modifiers.
    pub fn action_odds(&self, action: &Action, agent: UnitId, victim: Option<PlayerId>, tile: TileCoord) -> u32 {
        let base = if action.dice_roll {
            self.settings.diplchance as i32
        } else {
            100
        };
        let agent_unit = self.world.unit(agent);
        let ctx = EffectContext {
            offender: agent_unit.map(|u| u.owner),
            victim,
            action: Some(action.id.as_str()),
            city: self.world.city_at(&tile),
            tile: Some(tile),
            tile_owner: self.world.map.owner(&tile),
            actor_flags: agent_unit.map(|u| self.ruleset.unit_flags(u)),
            ..Default::default()
        };
        let pct = self.ruleset.bonus(EffectKind::ActionOddsPct, &ctx);
        (base + base * pct / 100).clamp(0, 100) as u32
    }

    /// Did the mission's own dice roll fail? Certain odds need no roll.
    pub fn dice_roll_fails(&mut self, action: &Action, agent: UnitId, victim: Option<PlayerId>, tile: TileCoord) -> bool {
        let odds = self.action_odds(action, agent, victim, tile);
        if odds >= 100 {
            return false;
        }
        self.dice.roll(100) >= odds
    }

    /// The agent was caught after infiltrating: notify both sides, record
    /// the incident and remove the agent.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn agent_caught(
        &mut self,
        player: PlayerId,
        agent: UnitId,
        victim: Option<PlayerId>,
        tile: TileCoord,
        link: &VictimLink,
        action: &Action,
        victim_event: EventKind,
    ) {
        let agent_name = self.unit_name(agent);
        self.outbox.notify(
            player,
            Some(tile),
            EventKind::MyDiplomatFailed,
            Message::AgentCaught {
                agent: agent_name.clone(),
                action: action.ui_name.clone(),
            },
        );
        if let Some(v) = victim.filter(|v| *v != player) {
            let nation = self.nation_adjective(player);
            self.outbox.notify(
                v,
                Some(tile),
                victim_event,
                Message::CaughtEnemyAgent {
                    nation,
                    agent: agent_name,
                    action: action.ui_name.clone(),
                    link: link.clone(),
                },
            );
        }
        consequence::record(self, action, player, victim, tile, link, IncidentClass::Caught);
        self.wipe_unit(agent, WipeReason::Caught);
    }

    /// Incident class used when this action succeeds.
    pub(crate) fn success_class(action: &Action) -> IncidentClass {
        if action.reports_completion {
            IncidentClass::Complete
        } else {
            IncidentClass::Success
        }
    }

    /// Phrase the target of an action for messages.
    pub fn victim_link(&self, kind: TargetKind, tile: TileCoord, victim_unit: Option<UnitId>) -> VictimLink {
        match kind {
            TargetKind::City => match self.world.city_at(&tile) {
                Some(city) => VictimLink::City {
                    name: city.name.clone(),
                },
                None => VictimLink::Tile { tile },
            },
            TargetKind::Unit => match victim_unit.and_then(|id| self.world.unit(id)) {
                Some(unit) => VictimLink::Unit {
                    unit_type: unit.type_id.clone(),
                    tile,
                },
                None => VictimLink::Tile { tile },
            },
            TargetKind::Units => VictimLink::Units { tile },
            TargetKind::Tile => VictimLink::Tile { tile },
            TargetKind::SelfTarget => VictimLink::None,
        }
    }
}

/// Check the action is resolved by the right handler.
pub(crate) fn expect_result(action: &Action, expected: &[ActionResultKind]) -> Result<(), ActionError> {
    if expected.contains(&action.result) {
        Ok(())
    } else {
        Err(ActionError::WrongHandler {
            action: action.id.clone(),
            expected: expected[0],
        })
    }
}

/// Look up the acting unit and check its owner.
pub(crate) fn check_actor(ctx: &ActionContext, player: PlayerId, agent: UnitId) -> Result<TileCoord, ActionError> {
    if ctx.world.player(player).is_none() {
        return Err(ActionError::UnknownPlayer(player));
    }
    let unit = ctx.world.unit(agent).ok_or(ActionError::UnknownUnit(agent))?;
    if unit.owner != player {
        return Err(ActionError::NotOwner { unit: agent, player });
    }
    Ok(unit.tile)
}

/// Record a successful mission, let the agent try to slip away, then
/// charge the price of success.
#[allow(clippy::too_many_arguments)]
pub(crate) fn finish_mission(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    victim: Option<PlayerId>,
    tile: TileCoord,
    link: &VictimLink,
    city_related: bool,
    action: &Action,
) -> Result<(), ActionError> {
    consequence::record(
        ctx,
        action,
        player,
        victim,
        tile,
        link,
        ActionContext::success_class(action),
    );
    if action.escape && ctx.world.unit_alive(agent) {
        attempt_escape(ctx, player, agent, city_related, tile, link, action)?;
    }
    ctx.conclude_success(agent, action);
    Ok(())
}

/// Check the action is aimed at the kind of thing the handler resolves.
pub(crate) fn expect_target(action: &Action, target: TargetKind) -> Result<(), ActionError> {
    if action.target_kind == target {
        Ok(())
    } else {
        Err(ActionError::TargetKindMismatch {
            action: action.id.clone(),
            target,
        })
    }
}

/// Owner and location of a target city.
pub(crate) fn target_city(ctx: &ActionContext, city: CityId) -> Result<(PlayerId, TileCoord), ActionError> {
    ctx.world
        .city(city)
        .map(|c| (c.owner, c.tile))
        .ok_or(ActionError::UnknownCity(city))
}

/// Owner and location of a target unit.
pub(crate) fn target_unit(ctx: &ActionContext, unit: UnitId) -> Result<(PlayerId, TileCoord), ActionError> {
    ctx.world
        .unit(unit)
        .map(|u| (u.owner, u.tile))
        .ok_or(ActionError::UnknownUnit(unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::map::{Map, Terrain};
    use crate::player::Player;

    fn create_test_world(ruleset: &Ruleset) -> (World, UnitId) {
        let mut world = World::new(Map::filled(8, 8, Terrain::Grassland));
        world.add_player(Player::new(0, "Caesar", "Roman", "Romans"));
        world.add_player(Player::new(0, "Hannibal", "Carthaginian", "Carthaginians"));
        let spy = ruleset.unit_type("Spy").unwrap();
        let agent = world.create_unit(0, spy, TileCoord::new(1, 1));
        (world, agent)
    }

    #[test]
    fn test_wipe_unit_reports_once() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let (mut world, agent) = create_test_world(&ruleset);
        let mut dice = ScriptedDice::default();
        let mut outbox = Outbox::new();
        let mut ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);

        assert!(ctx.wipe_unit(agent, WipeReason::Caught));
        assert!(!ctx.wipe_unit(agent, WipeReason::Caught));
        assert_eq!(outbox.removals_of(agent), vec![WipeReason::Caught]);
    }

    #[test]
    fn test_conclude_success_consumes_or_charges() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let (mut world, agent) = create_test_world(&ruleset);
        let mut dice = ScriptedDice::default();
        let mut outbox = Outbox::new();
        let mut ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);

        let stay = ruleset.action("Establish Embassy Stay").unwrap();
        ctx.conclude_success(agent, stay);
        assert_eq!(ctx.world.unit(agent).unwrap().moves_left, 20);

        let spend = ruleset.action("Establish Embassy").unwrap();
        ctx.conclude_success(agent, spend);
        assert!(!ctx.world.unit_alive(agent));
        assert_eq!(outbox.removals_of(agent), vec![WipeReason::Used]);
    }

    #[test]
    fn test_maybe_make_veteran() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let (mut world, agent) = create_test_world(&ruleset);
        // green raises at 50%: 49 promotes, 50 does not
        let mut dice = ScriptedDice::new(&[50, 49]);
        let mut outbox = Outbox::new();
        let mut ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);

        assert!(!ctx.maybe_make_veteran(agent));
        assert!(ctx.maybe_make_veteran(agent));
        assert_eq!(ctx.world.unit(agent).unwrap().veteran, 1);
        assert_eq!(outbox.notices_for(0).len(), 1);
    }

    #[test]
    fn test_top_rank_is_never_promoted() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let (mut world, agent) = create_test_world(&ruleset);
        world.unit_mut(agent).unwrap().veteran = 3;
        let mut dice = ScriptedDice::default();
        let mut outbox = Outbox::new();
        let mut ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);
        assert!(!ctx.maybe_make_veteran(agent));
        assert_eq!(dice.rolls(), 0);
    }

    #[test]
    fn test_action_odds_modifiers() {
        let mut ruleset = Ruleset::classic();
        ruleset.effects.push(
            crate::effects::Effect::new(EffectKind::ActionOddsPct, 50).with_req(
                crate::effects::Requirement::Action {
                    action: "Steal Gold".to_string(),
                },
            ),
        );
        let settings = ServerSettings::default();
        let (mut world, agent) = create_test_world(&ruleset);
        let mut dice = ScriptedDice::default();
        let mut outbox = Outbox::new();
        let ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);

        let tile = TileCoord::new(2, 2);
        let steal = ruleset.action("Steal Gold").unwrap();
        let poison = ruleset.action("Poison City").unwrap();
        let embassy = ruleset.action("Establish Embassy").unwrap();
        assert_eq!(ctx.action_odds(steal, agent, Some(1), tile), 100);
        assert_eq!(ctx.action_odds(poison, agent, Some(1), tile), 80);
        assert_eq!(ctx.action_odds(embassy, agent, Some(1), tile), 100);
    }

    #[test]
    fn test_victim_link_by_target_kind() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let (mut world, agent) = create_test_world(&ruleset);
        let tile = TileCoord::new(1, 1);
        world.create_city(1, "Carthage", TileCoord::new(3, 3));
        let mut dice = ScriptedDice::default();
        let mut outbox = Outbox::new();
        let ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);

        assert_eq!(
            ctx.victim_link(TargetKind::City, TileCoord::new(3, 3), None),
            VictimLink::City {
                name: "Carthage".to_string()
            }
        );
        assert_eq!(
            ctx.victim_link(TargetKind::Unit, tile, Some(agent)),
            VictimLink::Unit {
                unit_type: "Spy".to_string(),
                tile
            }
        );
        assert_eq!(ctx.victim_link(TargetKind::Units, tile, None), VictimLink::Units { tile });
        assert_eq!(ctx.victim_link(TargetKind::SelfTarget, tile, None), VictimLink::None);
    }
}
