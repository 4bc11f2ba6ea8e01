use super::{
    check_actor, expect_result, expect_target, finish_mission, infiltrate_tile, target_city,
    ActionContext,
};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::effects::{EffectContext, EffectKind};
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message};
use crate::map::TileCoord;
use crate::types::{CityId, PlayerId, UnitId};
use tracing::debug;

/// Copy parts of the city owner's map to the thief.
///
/// Every tile the victim knows and the thief does not is learned unless the
/// dice fall under `MapsStolenPct`. Tiles with a city are always learned.
pub fn steal_maps(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::StealMaps])?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;
    if owner == player {
        debug!(agent, city, "steal-maps: own city");
        return Ok(false);
    }

    if !infiltrate_tile(ctx, player, Some(owner), action, agent, None, tile)?.succeeded() {
        return Ok(false);
    }
    debug!(agent, city, "steal-maps: infiltrated");

    let link = ctx.victim_link(action.target_kind, tile, None);
    if ctx.dice_roll_fails(action, agent, Some(owner), tile) {
        debug!(agent, city, "steal-maps: caught");
        ctx.agent_caught(player, agent, Some(owner), tile, &link, action, EventKind::EnemyDiplomatTheft);
        return Ok(false);
    }

    let effect_ctx = EffectContext {
        offender: Some(player),
        victim: Some(owner),
        action: Some(action.id.as_str()),
        city: ctx.world.city(city),
        tile: Some(tile),
        tile_owner: ctx.world.map.owner(&tile),
        actor_flags: Some(ctx.unit_flags(agent)),
        ..Default::default()
    };
    let kept_pct = ctx
        .ruleset
        .bonus(EffectKind::MapsStolenPct, &effect_ctx)
        .clamp(0, 100) as u32;

    let unknown: Vec<TileCoord> = match (ctx.world.player(owner), ctx.world.player(player)) {
        (Some(victim), Some(thief)) => victim
            .known_tiles
            .iter()
            .filter(|t| !thief.known_tiles.contains(*t))
            .copied()
            .collect(),
        _ => Vec::new(),
    };
    let mut learned = Vec::new();
    for coord in unknown {
        if ctx.world.city_at(&coord).is_some() || ctx.dice.roll(100) >= kept_pct {
            learned.push(coord);
        }
    }
    let count = learned.len();
    if let Some(thief) = ctx.world.player_mut(player) {
        for coord in learned {
            thief.learn_tile(coord);
        }
    }
    ctx.outbox.push(Dispatch::PlayerInfo { player });
    debug!(agent, city, count, "steal-maps: stolen");

    let agent_name = ctx.unit_name(agent);
    let city_name = ctx.city_name(city);
    let nation = ctx.nation_plural(player);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatTheft,
        Message::MapsStolen {
            agent: agent_name,
            city: city_name.clone(),
        },
    );
    ctx.outbox.notify(
        owner,
        Some(tile),
        EventKind::EnemyDiplomatTheft,
        Message::MapsStolenBy {
            nation,
            city: city_name,
        },
    );

    finish_mission(ctx, player, agent, Some(owner), tile, &link, true, action)?;
    Ok(true)
}
