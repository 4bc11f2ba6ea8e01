use super::{
    check_actor, expect_result, expect_target, finish_mission, infiltrate_tile, target_city,
    ActionContext,
};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::effects::{EffectContext, EffectKind};
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message};
use crate::map::TileCoord;
use crate::types::{BuildingId, CityId, PlayerId, UnitId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a saboteur goes after.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SabotageTarget {
    /// Production or any vulnerable building, chosen by the dice.
    #[default]
    Random,
    Production,
    Building(BuildingId),
}

/// Destroy a city's production or one of its buildings.
///
/// Buildings resist: the saboteur must beat the building's vulnerability,
/// reduced by the city's saboteur resistance, or be caught.
pub fn sabotage_city(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    target: SabotageTarget,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(
        action,
        &[ActionResultKind::SabotageCity, ActionResultKind::SabotageCityTargeted],
    )?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;
    if owner == player {
        debug!(agent, city, "sabotage-city: own city");
        return Ok(false);
    }
    let target = if action.result == ActionResultKind::SabotageCity {
        SabotageTarget::Random
    } else {
        target
    };

    if !infiltrate_tile(ctx, player, Some(owner), action, agent, None, tile)?.succeeded() {
        return Ok(false);
    }
    debug!(agent, city, "sabotage-city: infiltrated");

    let link = ctx.victim_link(action.target_kind, tile, None);
    if ctx.dice_roll_fails(action, agent, Some(owner), tile) {
        debug!(agent, city, "sabotage-city: caught");
        ctx.agent_caught(player, agent, Some(owner), tile, &link, action, EventKind::EnemyDiplomatSabotage);
        return Ok(false);
    }

    let Some(target) = choose_target(ctx, player, agent, city, tile, target) else {
        ctx.charge_single_move(agent);
        return Ok(false);
    };

    let agent_name = ctx.unit_name(agent);
    let city_name = ctx.city_name(city);
    let nation = ctx.nation_plural(player);
    match target {
        SabotageTarget::Building(building) => {
            let vulnerability = vulnerability(ctx, player, owner, agent, city, tile, &building);
            if ctx.dice.roll(100) >= vulnerability {
                debug!(agent, city, building = %building, vulnerability, "sabotage-city: caught at the building");
                ctx.agent_caught(player, agent, Some(owner), tile, &link, action, EventKind::EnemyDiplomatSabotage);
                return Ok(false);
            }
            if let Some(c) = ctx.world.city_mut(city) {
                c.buildings.remove(&building);
            }
            debug!(agent, city, building = %building, "sabotage-city: building destroyed");
            ctx.outbox.notify(
                player,
                Some(tile),
                EventKind::MyDiplomatSabotage,
                Message::BuildingDestroyed {
                    agent: agent_name,
                    building: building.clone(),
                    city: city_name.clone(),
                },
            );
            ctx.outbox.notify(
                owner,
                Some(tile),
                EventKind::EnemyDiplomatSabotage,
                Message::BuildingDestroyedBy {
                    nation,
                    building,
                    city: city_name,
                },
            );
        }
        SabotageTarget::Production | SabotageTarget::Random => {
            let production = match ctx.world.city_mut(city) {
                Some(c) => {
                    c.shield_stock = 0;
                    c.production.to_string()
                }
                None => String::new(),
            };
            debug!(agent, city, "sabotage-city: production destroyed");
            ctx.outbox.notify(
                player,
                Some(tile),
                EventKind::MyDiplomatSabotage,
                Message::ProductionDestroyed {
                    agent: agent_name,
                    production: production.clone(),
                    city: city_name.clone(),
                },
            );
            ctx.outbox.notify(
                owner,
                Some(tile),
                EventKind::EnemyDiplomatSabotage,
                Message::ProductionDestroyedBy {
                    nation,
                    production,
                    city: city_name,
                },
            );
        }
    }
    ctx.outbox.push(Dispatch::CityInfo { city });

    finish_mission(ctx, player, agent, Some(owner), tile, &link, true, action)?;
    Ok(true)
}

/// Settle what gets destroyed. `None` after telling the saboteur there is
/// nothing (or not the wanted thing) to hit.
fn choose_target(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    tile: TileCoord,
    target: SabotageTarget,
) -> Option<SabotageTarget> {
    let agent_name = ctx.unit_name(agent);
    let city_name = ctx.city_name(city);
    let c = ctx.world.city(city)?;

    match target {
        SabotageTarget::Production => Some(SabotageTarget::Production),
        SabotageTarget::Building(building) => {
            let vulnerable = c.has_building(&building)
                && ctx
                    .ruleset
                    .building(&building)
                    .is_some_and(|b| b.can_be_sabotaged());
            if vulnerable {
                return Some(SabotageTarget::Building(building));
            }
            ctx.outbox.notify(
                player,
                Some(tile),
                EventKind::ActionFailed,
                Message::BuildingNotFound {
                    agent: agent_name,
                    building,
                    city: city_name,
                },
            );
            None
        }
        SabotageTarget::Random => {
            let mut candidates = Vec::new();
            if c.shield_stock > 0 {
                candidates.push(SabotageTarget::Production);
            }
            candidates.extend(
                c.buildings
                    .iter()
                    .filter(|b| ctx.ruleset.building(b).is_some_and(|b| b.can_be_sabotaged()))
                    .map(|b| SabotageTarget::Building(b.clone())),
            );
            if candidates.is_empty() {
                ctx.outbox.notify(
                    player,
                    Some(tile),
                    EventKind::ActionFailed,
                    Message::NothingToSabotage {
                        agent: agent_name,
                        city: city_name,
                    },
                );
                return None;
            }
            let pick = ctx.dice.roll(candidates.len() as u32) as usize;
            candidates.into_iter().nth(pick)
        }
    }
}

/// Percent chance the saboteur gets the building.
#[allow(clippy::too_many_arguments)]
fn vulnerability(
    ctx: &ActionContext,
    player: PlayerId,
    owner: PlayerId,
    agent: UnitId,
    city: CityId,
    tile: TileCoord,
    building: &str,
) -> u32 {
    let base = ctx.ruleset.building(building).map_or(0, |b| b.sabotage) as i32;
    let effect_ctx = EffectContext {
        offender: Some(player),
        victim: Some(owner),
        city: ctx.world.city(city),
        tile: Some(tile),
        tile_owner: ctx.world.map.owner(&tile),
        actor_flags: Some(ctx.unit_flags(agent)),
        ..Default::default()
    };
    let resistance = ctx.ruleset.bonus(EffectKind::SaboteurResistant, &effect_ctx);
    (base - base * resistance / 100).clamp(0, 100) as u32
}
