use super::{
    check_actor, expect_result, expect_target, finish_mission, infiltrate_tile, target_city,
    ActionContext,
};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::cost::{city_incite_cost, INCITE_IMPOSSIBLE_COST};
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message, WipeReason};
use crate::map::TileCoord;
use crate::types::{CityId, PlayerId, TechId, UnitId};
use tracing::{debug, error, info};

/// Buy a foreign city.
///
/// The city, the units its owner keeps inside it and the units it supports
/// all change hands. The inciter also learns a technology from the old
/// owner if there is one to learn.
pub fn incite_city(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::InciteCity])?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;
    if owner == player {
        debug!(agent, city, "incite: own city");
        return Ok(false);
    }

    let cost = city_incite_cost(ctx.world, ctx.ruleset, ctx.settings, city, player)
        .ok_or(ActionError::UnknownCity(city))?;
    let affordable = cost < INCITE_IMPOSSIBLE_COST
        && ctx.world.player(player).is_some_and(|p| p.can_afford(cost));
    if !affordable {
        debug!(agent, city, cost, "incite: not enough gold");
        let city_name = ctx.city_name(city);
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::ActionFailed,
            Message::NotEnoughGoldToIncite {
                city: city_name,
                cost,
            },
        );
        return Ok(false);
    }

    if !infiltrate_tile(ctx, player, Some(owner), action, agent, None, tile)?.succeeded() {
        return Ok(false);
    }
    debug!(agent, city, "incite: infiltrated");

    let link = ctx.victim_link(action.target_kind, tile, None);
    if ctx.dice_roll_fails(action, agent, Some(owner), tile) {
        debug!(agent, city, "incite: caught");
        ctx.agent_caught(player, agent, Some(owner), tile, &link, action, EventKind::EnemyDiplomatIncite);
        return Ok(false);
    }

    if let Some(p) = ctx.world.player_mut(player) {
        p.spend_gold(cost);
    }
    ctx.outbox.push(Dispatch::PlayerInfo { player });
    info!(player, city, cost, "city incited");

    grant_free_tech(ctx, player, owner, tile);
    transfer_city(ctx, city, owner, player, tile);

    let city_name = ctx.city_name(city);
    let nation = ctx.nation_plural(player);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatIncite,
        Message::CityIncited {
            city: city_name.clone(),
        },
    );
    ctx.outbox.notify(
        owner,
        Some(tile),
        EventKind::EnemyDiplomatIncite,
        Message::CityRevolted {
            nation,
            city: city_name,
        },
    );

    finish_mission(ctx, player, agent, Some(owner), tile, &link, true, action)?;
    Ok(true)
}

fn grant_free_tech(ctx: &mut ActionContext, player: PlayerId, owner: PlayerId, tile: TileCoord) {
    let allow_holes = ctx.settings.tech_steal_allow_holes;
    let candidates: Vec<TechId> = match (ctx.world.player(player), ctx.world.player(owner)) {
        (Some(thief), Some(victim)) => ctx
            .ruleset
            .techs
            .stealable(&victim.technologies, &thief.technologies, allow_holes)
            .into_iter()
            .cloned()
            .collect(),
        _ => return,
    };
    if candidates.is_empty() {
        return;
    }
    let pick = ctx.dice.roll(candidates.len() as u32) as usize;
    let Some(tech) = candidates.get(pick).cloned() else {
        error!(player, pick, "incite: free tech pick out of range");
        return;
    };
    if let Some(p) = ctx.world.player_mut(player) {
        p.technologies.insert(tech.clone());
    }
    let nation = ctx.nation_plural(owner);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatIncite,
        Message::TechAcquired { tech, nation },
    );
}

fn transfer_city(ctx: &mut ActionContext, city: CityId, from: PlayerId, to: PlayerId, tile: TileCoord) {
    if let Some(c) = ctx.world.city_mut(city) {
        c.owner = to;
        c.shield_stock = 0;
        c.is_capital = false;
    }
    if let Some(t) = ctx.world.map.get_mut(&tile) {
        t.owner = Some(to);
    }

    let moving: Vec<UnitId> = ctx
        .world
        .units()
        .filter(|u| u.owner == from && (u.tile == tile || u.homecity == Some(city)))
        .map(|u| u.id)
        .collect();
    for old in moving {
        if let Some(new) = ctx.world.rehome_unit(old, to) {
            ctx.outbox.push(Dispatch::UnitRemoved {
                unit: old,
                owner: from,
                reason: WipeReason::CityLost,
            });
            ctx.outbox.push(Dispatch::UnitInfo { unit: new });
        }
    }
    ctx.outbox.push(Dispatch::CityInfo { city });
}
