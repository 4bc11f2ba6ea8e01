use super::{
    attempt_escape, check_actor, expect_result, expect_target, infiltrate_tile, target_city,
    ActionContext,
};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::consequence;
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message, WipeReason};
use crate::map::TileCoord;
use crate::types::{CityId, PlayerId, UnitId};
use tracing::{debug, info};

/// Hide a nuclear device in a city and set it off.
///
/// An agent that can escape does so before the blast; one the action spends
/// is gone before the device goes off. Everything within `nuke_radius` of
/// the city is hit: units die, cities lose half their size.
pub fn suitcase_nuke(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::SuitcaseNuke])?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;
    if owner == player {
        debug!(agent, city, "suitcase-nuke: own city");
        return Ok(false);
    }

    if !infiltrate_tile(ctx, player, Some(owner), action, agent, None, tile)?.succeeded() {
        return Ok(false);
    }
    debug!(agent, city, "suitcase-nuke: infiltrated");

    let link = ctx.victim_link(action.target_kind, tile, None);
    if ctx.dice_roll_fails(action, agent, Some(owner), tile) {
        debug!(agent, city, "suitcase-nuke: caught");
        ctx.agent_caught(player, agent, Some(owner), tile, &link, action, EventKind::EnemyDiplomatSabotage);
        return Ok(false);
    }

    let agent_name = ctx.unit_name(agent);
    let city_name = ctx.city_name(city);
    let nation = ctx.nation_plural(player);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatSabotage,
        Message::DeviceHidden {
            agent: agent_name,
            city: city_name.clone(),
        },
    );
    ctx.outbox.notify(
        owner,
        Some(tile),
        EventKind::EnemyDiplomatSabotage,
        Message::CityNukedBy {
            nation,
            city: city_name,
        },
    );
    consequence::record(
        ctx,
        action,
        player,
        Some(owner),
        tile,
        &link,
        ActionContext::success_class(action),
    );

    if action.consumes_actor() {
        ctx.consume_actor(agent, action);
    } else if action.escape {
        attempt_escape(ctx, player, agent, true, tile, &link, action)?;
    }

    detonate(ctx, tile);
    info!(player, city, %tile, "suitcase nuke detonated");

    ctx.conclude_success(agent, action);
    Ok(true)
}

/// Destroy every unit and halve every city in the blast area.
fn detonate(ctx: &mut ActionContext, center: TileCoord) {
    let radius = ctx.settings.nuke_radius;
    for coord in ctx.world.map.square_around(&center, radius) {
        for unit in ctx.world.units_at(&coord) {
            let Some(victim) = ctx.world.unit(unit) else {
                continue;
            };
            let (owner, name) = (victim.owner, victim.type_id.clone());
            ctx.outbox.notify(
                owner,
                Some(coord),
                EventKind::UnitLost,
                Message::UnitNuked { unit: name, tile: coord },
            );
            ctx.wipe_unit(unit, WipeReason::Killed);
        }

        let Some((city, size)) = ctx.world.city_at(&coord).map(|c| (c.id, c.size)) else {
            continue;
        };
        if size / 2 > 0 {
            ctx.reduce_city_size(city, size / 2);
        }
    }

    ctx.outbox.push(Dispatch::NukeDetonated { tile: center, radius });
    for recipient in ctx.world.living_players() {
        ctx.outbox.notify(
            recipient,
            Some(center),
            EventKind::NuclearDetonation,
            Message::NuclearExplosion { tile: center },
        );
    }
}
