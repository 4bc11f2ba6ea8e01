use super::{check_actor, expect_result, expect_target, infiltrate_tile, target_unit, ActionContext};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::consequence;
use crate::cost::unit_bribe_cost;
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message, WipeReason};
use crate::map::TileCoord;
use crate::types::{PlayerId, UnitId};
use tracing::{debug, info};

/// Buy a foreign unit.
///
/// The unit changes hands under a new id; the old handle is reported as
/// removed with [`WipeReason::Bribed`]. The briber pays the full price and
/// the agent then steps onto the tile if it is free.
pub fn bribe_unit(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    victim: UnitId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::BribeUnit])?;
    expect_target(action, TargetKind::Unit)?;
    check_actor(ctx, player, agent)?;
    let (victim_owner, tile) = target_unit(ctx, victim)?;
    if victim_owner == player || ctx.world.players_allied(player, victim_owner) {
        debug!(agent, victim, "bribe-unit: not a foreign unit");
        return Ok(false);
    }

    let cost = unit_bribe_cost(ctx.world, ctx.ruleset, ctx.settings, victim, player)
        .ok_or(ActionError::UnknownUnit(victim))?;
    let victim_name = ctx.unit_name(victim);
    let affordable = ctx.world.player(player).is_some_and(|p| p.can_afford(cost));
    if !affordable {
        debug!(agent, victim, cost, "bribe-unit: not enough gold");
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::ActionFailed,
            Message::NotEnoughGoldToBribe {
                unit: victim_name,
                cost,
            },
        );
        return Ok(false);
    }

    let gate = infiltrate_tile(ctx, player, Some(victim_owner), action, agent, Some(victim), tile)?;
    if !gate.succeeded() {
        return Ok(false);
    }

    let link = ctx.victim_link(action.target_kind, tile, Some(victim));
    if ctx.dice_roll_fails(action, agent, Some(victim_owner), tile) {
        ctx.agent_caught(
            player,
            agent,
            Some(victim_owner),
            tile,
            &link,
            action,
            EventKind::EnemyDiplomatBribe,
        );
        return Ok(false);
    }

    let homecity = ctx.world.unit(agent).and_then(|u| u.homecity);
    let Some(bought) = ctx.world.rehome_unit(victim, player) else {
        return Err(ActionError::UnknownUnit(victim));
    };
    if let Some(unit) = ctx.world.unit_mut(bought) {
        unit.homecity = homecity;
    }
    ctx.outbox.push(Dispatch::UnitRemoved {
        unit: victim,
        owner: victim_owner,
        reason: WipeReason::Bribed,
    });
    ctx.outbox.push(Dispatch::UnitInfo { unit: bought });

    if let Some(p) = ctx.world.player_mut(player) {
        p.spend_gold(cost);
    }
    ctx.outbox.push(Dispatch::PlayerInfo { player });
    info!(player, victim, bought, cost, "unit bribed");

    ctx.maybe_make_veteran(agent);

    let agent_name = ctx.unit_name(agent);
    let nation = ctx.nation_plural(player);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatBribe,
        Message::UnitBribed {
            agent: agent_name,
            unit: victim_name.clone(),
        },
    );
    ctx.outbox.notify(
        victim_owner,
        Some(tile),
        EventKind::EnemyDiplomatBribe,
        Message::UnitBribedBy {
            nation,
            unit: victim_name,
        },
    );

    consequence::record(
        ctx,
        action,
        player,
        Some(victim_owner),
        tile,
        &link,
        ActionContext::success_class(action),
    );

    step_onto(ctx, player, agent, tile);
    ctx.conclude_success(agent, action);
    Ok(true)
}

/// Move the agent onto the tile the bought unit stands on, if it still has
/// movement and nothing hostile is there.
fn step_onto(ctx: &mut ActionContext, player: PlayerId, agent: UnitId, tile: TileCoord) {
    let Some(unit) = ctx.world.unit(agent) else {
        return;
    };
    if unit.moves_left == 0 || unit.tile == tile || unit.tile.distance(&tile) > 1 {
        return;
    }
    let hostile_units = ctx
        .world
        .units_at(&tile)
        .into_iter()
        .filter_map(|id| ctx.world.unit(id))
        .any(|u| !ctx.world.players_allied(player, u.owner));
    let hostile_city = ctx
        .world
        .city_at(&tile)
        .is_some_and(|c| !ctx.world.players_allied(player, c.owner));
    if hostile_units || hostile_city {
        return;
    }

    let cost = ctx.world.map.move_cost(&tile);
    if let Some(unit) = ctx.world.unit_mut(agent) {
        unit.tile = tile;
        unit.use_movement(cost);
    }
    debug!(agent, %tile, "bribe-unit: agent moved onto tile");
    ctx.outbox.push(Dispatch::UnitInfo { unit: agent });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diplomats::testkit::*;
    use crate::diplomacy::DiplomaticStatus;
    use crate::events::IncidentClass;

    const FIELD: TileCoord = TileCoord { x: 8, y: 8 };
    const NEXT: TileCoord = TileCoord { x: 7, y: 8 };

    fn bought_unit(fx: &Fixture) -> Option<UnitId> {
        fx.outbox.dispatches().iter().find_map(|d| match d {
            Dispatch::UnitInfo { unit } if fx.world.unit(*unit).is_some_and(|u| u.type_id == "Warriors") => {
                Some(*unit)
            }
            _ => None,
        })
    }

    #[test]
    fn test_bribe_transfers_unit_and_gold() {
        let mut fx = Fixture::new();
        fx.world.player_mut(ROMANS).unwrap().gold = 500;
        let agent = fx.spawn(ROMANS, "Diplomat", NEXT);
        let victim = fx.spawn(CARTHAGINIANS, "Warriors", FIELD);
        let action = fx.action("Bribe Unit");
        let cost = unit_bribe_cost(&fx.world, &fx.ruleset, &fx.settings, victim, ROMANS).unwrap();

        assert_eq!(bribe_unit(&mut fx.ctx(), ROMANS, agent, victim, &action), Ok(true));

        assert!(!fx.world.unit_alive(victim));
        assert_eq!(fx.outbox.removals_of(victim), vec![WipeReason::Bribed]);
        let bought = bought_unit(&fx).unwrap();
        assert_eq!(fx.world.unit(bought).unwrap().owner, ROMANS);
        assert_eq!(fx.world.player(ROMANS).unwrap().gold, 500 - cost);
        assert_eq!(fx.outbox.incidents()[0].class, IncidentClass::Success);
        let unit = fx.world.unit(agent).unwrap();
        assert_eq!(unit.tile, FIELD);
    }

    #[test]
    fn test_poor_briber_is_told_the_price() {
        let mut fx = Fixture::new();
        let agent = fx.spawn(ROMANS, "Diplomat", NEXT);
        let victim = fx.spawn(CARTHAGINIANS, "Warriors", FIELD);
        let action = fx.action("Bribe Unit");

        assert_eq!(bribe_unit(&mut fx.ctx(), ROMANS, agent, victim, &action), Ok(false));
        assert_eq!(fx.world.unit(victim).unwrap().owner, CARTHAGINIANS);
        assert_eq!(fx.world.unit(agent).unwrap().moves_left, 20);
        assert!(matches!(
            fx.outbox.notices_for(ROMANS)[0].message,
            Message::NotEnoughGoldToBribe { .. }
        ));
    }

    #[test]
    fn test_allied_units_cannot_be_bribed() {
        let mut fx = Fixture::new();
        fx.world.player_mut(ROMANS).unwrap().gold = 5000;
        fx.world
            .diplomacy
            .set_status(ROMANS, CARTHAGINIANS, DiplomaticStatus::Alliance);
        let agent = fx.spawn(ROMANS, "Diplomat", NEXT);
        let victim = fx.spawn(CARTHAGINIANS, "Warriors", FIELD);
        let action = fx.action("Bribe Unit");

        assert_eq!(bribe_unit(&mut fx.ctx(), ROMANS, agent, victim, &action), Ok(false));
        assert_eq!(fx.world.player(ROMANS).unwrap().gold, 5000);
        assert!(fx.outbox.is_empty());
    }

    #[test]
    fn test_agent_stays_when_tile_is_still_held() {
        let mut fx = Fixture::new();
        fx.world.player_mut(ROMANS).unwrap().gold = 500;
        let agent = fx.spawn(ROMANS, "Diplomat", NEXT);
        let victim = fx.spawn(CARTHAGINIANS, "Warriors", FIELD);
        fx.spawn(CARTHAGINIANS, "Phalanx", FIELD);
        let action = fx.action("Bribe Unit");

        assert_eq!(bribe_unit(&mut fx.ctx(), ROMANS, agent, victim, &action), Ok(true));
        assert_eq!(fx.world.unit(agent).unwrap().tile, NEXT);
    }
}
