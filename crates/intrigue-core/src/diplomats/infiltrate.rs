//! Infiltration: getting past every diplomatic defender on a tile.

use super::{contest::success_vs_defender, ActionContext};
use crate::action::Action;
use crate::consequence;
use crate::error::ActionError;
use crate::events::{EventKind, IncidentClass, Message, WipeReason};
use crate::map::TileCoord;
use crate::types::{PlayerId, UnitId, SINGLE_MOVE};
use std::cmp::Reverse;
use tracing::debug;

/// Result of an infiltration attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Infiltration {
    /// No defender is left. `defender_owner` is the owner of the last
    /// defender beaten, if there was a fight at all.
    Clear { defender_owner: Option<PlayerId> },
    /// The agent lost a battle and has been wiped.
    Eliminated,
}

impl Infiltration {
    pub fn succeeded(&self) -> bool {
        matches!(self, Infiltration::Clear { .. })
    }
}

/// The strongest diplomatic defender on `tile` that would fight `player`'s
/// agent: superspies first, then spies, then the most experienced, then the
/// lowest id.
pub(crate) fn strongest_defender(
    ctx: &ActionContext,
    player: PlayerId,
    agent: UnitId,
    victim: Option<UnitId>,
    tile: &TileCoord,
) -> Option<UnitId> {
    ctx.world
        .units_at(tile)
        .into_iter()
        .filter(|id| *id != agent && Some(*id) != victim)
        .filter_map(|id| ctx.world.unit(id))
        .filter(|u| u.owner != player && !ctx.world.players_allied(player, u.owner))
        .filter_map(|u| {
            let utype = ctx.ruleset.unit_type(&u.type_id)?;
            utype.is_diplomatic_defender().then(|| {
                let key = (
                    utype.flags.superspy,
                    utype.flags.spy,
                    ctx.ruleset.power_fact(u.veteran),
                    Reverse(u.id),
                );
                (key, u.id)
            })
        })
        .max_by_key(|(key, _)| *key)
        .map(|(_, id)| id)
}

/// Fight every diplomatic defender on `tile` until none is left or the
/// agent falls.
///
/// `victim` is the unit the mission targets; it never defends. When the
/// agent loses, the incident is charged to `target_player`, or to the
/// defender's owner when there is no nominal target.
pub fn infiltrate_tile(
    ctx: &mut ActionContext,
    player: PlayerId,
    target_player: Option<PlayerId>,
    action: &Action,
    agent: UnitId,
    victim: Option<UnitId>,
    tile: TileCoord,
) -> Result<Infiltration, ActionError> {
    if !ctx.world.unit_alive(agent) {
        return Err(ActionError::UnknownUnit(agent));
    }
    let link = ctx.victim_link(action.target_kind, tile, victim);
    let mut defender_owner = None;

    while let Some(defender) = strongest_defender(ctx, player, agent, victim, &tile) {
        let owner = match ctx.world.unit(defender) {
            Some(u) => u.owner,
            None => break,
        };
        defender_owner = Some(owner);

        let agent_name = ctx.unit_name(agent);
        let defender_name = ctx.unit_name(defender);
        let won = success_vs_defender(ctx, agent, defender, tile);
        if let Some(unit) = ctx.world.unit_mut(agent) {
            unit.use_movement(SINGLE_MOVE);
        }

        if won {
            debug!(agent, defender, "infiltrate: defender eliminated");
            let attacker_nation = ctx.nation_adjective(player);
            ctx.outbox.notify(
                player,
                Some(tile),
                EventKind::MyDiplomatSuccess,
                Message::DefenderEliminated {
                    defender: defender_name.clone(),
                    agent: agent_name.clone(),
                },
            );
            ctx.outbox.notify(
                owner,
                Some(tile),
                EventKind::EnemyDiplomatFailed,
                Message::LostDefender {
                    defender: defender_name,
                    nation: attacker_nation.clone(),
                    agent: agent_name.clone(),
                    link: link.clone(),
                },
            );
            if let Some(target) = target_player.filter(|t| *t != owner && *t != player) {
                ctx.outbox.notify(
                    target,
                    Some(tile),
                    EventKind::EnemyDiplomatFailed,
                    Message::TargetDefended {
                        nation: attacker_nation,
                        agent: agent_name,
                        link: link.clone(),
                    },
                );
            }
            ctx.maybe_make_veteran(agent);
            ctx.wipe_unit(defender, WipeReason::Eliminated);
        } else {
            debug!(agent, defender, "infiltrate: agent eliminated");
            let defender_nation = ctx.nation_adjective(owner);
            let attacker_nation = ctx.nation_adjective(player);
            ctx.outbox.notify(
                player,
                Some(tile),
                EventKind::MyDiplomatFailed,
                Message::AgentEliminated {
                    agent: agent_name.clone(),
                    nation: defender_nation,
                    defender: defender_name.clone(),
                    link: link.clone(),
                },
            );
            ctx.outbox.notify(
                owner,
                Some(tile),
                EventKind::EnemyDiplomatFailed,
                Message::RepelledAgent {
                    defender: defender_name,
                    nation: attacker_nation,
                    agent: agent_name,
                    link: link.clone(),
                },
            );
            ctx.maybe_make_veteran(defender);
            let blamed = target_player.or(Some(owner));
            consequence::record(ctx, action, player, blamed, tile, &link, IncidentClass::Caught);
            ctx.wipe_unit(agent, WipeReason::Eliminated);
            return Ok(Infiltration::Eliminated);
        }
    }

    Ok(Infiltration::Clear { defender_owner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::diplomacy::DiplomaticStatus;
    use crate::events::Outbox;
    use crate::map::{Map, Terrain};
    use crate::player::Player;
    use crate::ruleset::Ruleset;
    use crate::settings::ServerSettings;
    use crate::world::World;

    const TILE: TileCoord = TileCoord { x: 4, y: 4 };

    fn create_test_world() -> World {
        let mut world = World::new(Map::filled(8, 8, Terrain::Grassland));
        world.add_player(Player::new(0, "Caesar", "Roman", "Romans"));
        world.add_player(Player::new(0, "Hannibal", "Carthaginian", "Carthaginians"));
        world.add_player(Player::new(0, "Alexander", "Greek", "Greeks"));
        world
    }

    fn spawn(world: &mut World, ruleset: &Ruleset, owner: PlayerId, kind: &str, tile: TileCoord) -> UnitId {
        world.create_unit(owner, ruleset.unit_type(kind).unwrap(), tile)
    }

    #[test]
    fn test_defender_order() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let mut world = create_test_world();
        let agent = spawn(&mut world, &ruleset, 0, "Spy", TileCoord::new(3, 4));
        spawn(&mut world, &ruleset, 1, "Warriors", TILE);
        spawn(&mut world, &ruleset, 1, "Diplomat", TILE);
        let veteran = spawn(&mut world, &ruleset, 1, "Diplomat", TILE);
        world.unit_mut(veteran).unwrap().veteran = 2;
        let spy = spawn(&mut world, &ruleset, 1, "Spy", TILE);
        spawn(&mut world, &ruleset, 0, "Spy", TILE);

        let mut dice = ScriptedDice::default();
        let mut outbox = Outbox::new();
        let ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);
        assert_eq!(strongest_defender(&ctx, 0, agent, None, &TILE), Some(spy));
        assert_eq!(strongest_defender(&ctx, 0, agent, Some(spy), &TILE), Some(veteran));
    }

    #[test]
    fn test_allies_do_not_defend() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let mut world = create_test_world();
        world.diplomacy.set_status(0, 2, DiplomaticStatus::Alliance);
        let agent = spawn(&mut world, &ruleset, 0, "Spy", TileCoord::new(3, 4));
        spawn(&mut world, &ruleset, 2, "Diplomat", TILE);

        let mut dice = ScriptedDice::default();
        let mut outbox = Outbox::new();
        let ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);
        assert_eq!(strongest_defender(&ctx, 0, agent, None, &TILE), None);
    }

    #[test]
    fn test_infiltration_clears_all_defenders() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let mut world = create_test_world();
        let agent = spawn(&mut world, &ruleset, 0, "Spy", TileCoord::new(3, 4));
        let first = spawn(&mut world, &ruleset, 1, "Diplomat", TILE);
        let second = spawn(&mut world, &ruleset, 1, "Diplomat", TILE);
        let action = ruleset.action("Sabotage City Escape").unwrap();

        // win, no promotion, win, no promotion
        let mut dice = ScriptedDice::new(&[0, 99, 0, 99]);
        let mut outbox = Outbox::new();
        let mut ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);
        let result = infiltrate_tile(&mut ctx, 0, Some(1), action, agent, None, TILE).unwrap();

        assert_eq!(result, Infiltration::Clear { defender_owner: Some(1) });
        assert!(!world.unit_alive(first));
        assert!(!world.unit_alive(second));
        // two contests, one move each
        assert_eq!(world.unit(agent).unwrap().moves_left, 10);
        assert_eq!(outbox.removals_of(first), vec![WipeReason::Eliminated]);
    }

    #[test]
    fn test_losing_agent_is_wiped_and_incident_recorded() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let mut world = create_test_world();
        let agent = spawn(&mut world, &ruleset, 0, "Diplomat", TileCoord::new(3, 4));
        let defender = spawn(&mut world, &ruleset, 1, "Spy", TILE);
        let action = ruleset.action("Steal Gold").unwrap();

        // 50 - 25 = 25: roll 25 loses; defender is not promoted
        let mut dice = ScriptedDice::new(&[25, 99]);
        let mut outbox = Outbox::new();
        let mut ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);
        let result = infiltrate_tile(&mut ctx, 0, None, action, agent, None, TILE).unwrap();

        assert_eq!(result, Infiltration::Eliminated);
        assert!(!world.unit_alive(agent));
        assert!(world.unit_alive(defender));
        assert_eq!(outbox.removals_of(agent), vec![WipeReason::Eliminated]);
        let incidents = outbox.incidents();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].class, IncidentClass::Caught);
        // inferred from the defender
        assert_eq!(incidents[0].victim, Some(1));
        assert!(world.diplomacy.has_casus_belli(1, 0));
    }

    #[test]
    fn test_empty_tile_is_clear_without_dice() {
        let ruleset = Ruleset::classic();
        let settings = ServerSettings::default();
        let mut world = create_test_world();
        let agent = spawn(&mut world, &ruleset, 0, "Spy", TileCoord::new(3, 4));
        let action = ruleset.action("Steal Gold").unwrap();

        let mut dice = ScriptedDice::default();
        let mut outbox = Outbox::new();
        let mut ctx = ActionContext::new(&mut world, &ruleset, &settings, &mut dice, &mut outbox);
        let result = infiltrate_tile(&mut ctx, 0, Some(1), action, agent, None, TILE).unwrap();
        assert_eq!(result, Infiltration::Clear { defender_owner: None });
        assert_eq!(dice.rolls(), 0);
        assert!(outbox.is_empty());
    }
}
