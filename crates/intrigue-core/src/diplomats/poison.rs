//! Poisoning water supplies and spreading illness.

use super::{
    check_actor, expect_result, expect_target, finish_mission, infiltrate_tile, target_city,
    ActionContext,
};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message};
use crate::types::{CityId, PlayerId, UnitId};
use tracing::debug;

/// Poison the water supply of `city`, shrinking it by one citizen. A city
/// of size one dies.
pub fn poison_city(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::Poison])?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;
    if owner == player {
        debug!(agent, city, "poison: own city");
        return Ok(false);
    }

    if !infiltrate_tile(ctx, player, Some(owner), action, agent, None, tile)?.succeeded() {
        return Ok(false);
    }
    debug!(agent, city, "poison: infiltrated");

    let link = ctx.victim_link(action.target_kind, tile, None);
    if ctx.dice_roll_fails(action, agent, Some(owner), tile) {
        debug!(agent, city, "poison: caught");
        ctx.agent_caught(player, agent, Some(owner), tile, &link, action, EventKind::EnemyDiplomatPoison);
        return Ok(false);
    }

    let agent_name = ctx.unit_name(agent);
    let city_name = ctx.city_name(city);
    let nation = ctx.nation_plural(player);
    if ctx.reduce_city_size(city, 1) {
        if ctx.settings.poison_empties_food_stock {
            if let Some(c) = ctx.world.city_mut(city) {
                c.food_stock = 0;
            }
            ctx.outbox.push(Dispatch::CityInfo { city });
        }
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::MyDiplomatPoison,
            Message::WaterPoisoned {
                agent: agent_name,
                city: city_name.clone(),
            },
        );
        ctx.outbox.notify(
            owner,
            Some(tile),
            EventKind::EnemyDiplomatPoison,
            Message::WaterPoisonedBy {
                nation,
                city: city_name,
            },
        );
    } else {
        debug!(agent, city, "poison: city destroyed");
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::MyDiplomatPoison,
            Message::CityDestroyedByPoison {
                agent: agent_name,
                city: city_name.clone(),
            },
        );
        ctx.outbox.notify(
            owner,
            Some(tile),
            EventKind::EnemyDiplomatPoison,
            Message::CityDestroyedByPoisonBy {
                nation,
                city: city_name,
            },
        );
    }

    finish_mission(ctx, player, agent, Some(owner), tile, &link, true, action)?;
    Ok(true)
}

/// Infect `city` with illness. The city loses a citizen but never dies of
/// it, and the outbreak is remembered.
pub fn spread_plague(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::SpreadPlague])?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;
    if owner == player || !ctx.settings.illness_on {
        debug!(agent, city, "plague: not possible");
        return Ok(false);
    }

    if !infiltrate_tile(ctx, player, Some(owner), action, agent, None, tile)?.succeeded() {
        return Ok(false);
    }

    let link = ctx.victim_link(action.target_kind, tile, None);
    if ctx.dice_roll_fails(action, agent, Some(owner), tile) {
        debug!(agent, city, "plague: caught");
        ctx.agent_caught(player, agent, Some(owner), tile, &link, action, EventKind::EnemyDiplomatPoison);
        return Ok(false);
    }

    let turn = ctx.world.turn;
    let shrinks = ctx.world.city(city).is_some_and(|c| c.size > 1);
    if shrinks {
        ctx.reduce_city_size(city, 1);
    }
    if let Some(c) = ctx.world.city_mut(city) {
        c.plague_turn = Some(turn);
    }
    ctx.outbox.push(Dispatch::CityInfo { city });

    let agent_name = ctx.unit_name(agent);
    let city_name = ctx.city_name(city);
    let nation = ctx.nation_plural(player);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatPoison,
        Message::PlagueSpread {
            agent: agent_name,
            city: city_name.clone(),
        },
    );
    ctx.outbox.notify(
        owner,
        Some(tile),
        EventKind::CityPlague,
        Message::PlagueSpreadBy {
            nation,
            city: city_name,
        },
    );

    finish_mission(ctx, player, agent, Some(owner), tile, &link, true, action)?;
    Ok(true)
}
