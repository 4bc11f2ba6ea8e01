//! Getting the agent home after a mission.

use super::ActionContext;
use crate::action::Action;
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message, VictimLink, WipeReason};
use crate::map::TileCoord;
use crate::types::{CityId, PlayerId, UnitId};
use tracing::{debug, error};

/// Outcome of an escape attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Escape {
    /// The agent is back in one of its owner's cities.
    Escaped { city: CityId },
    /// The agent did not make it. It has been wiped unless the action
    /// spends it anyway.
    Captured,
}

/// Try to bring `agent` back to the nearest friendly city.
///
/// Odds are `diplchance` plus the agent's veteran power over an unpromoted
/// unit, read at the time of the attempt. Superspies always make it home.
/// An action that spends its actor never lets it escape.
pub fn attempt_escape(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city_related: bool,
    tile: TileCoord,
    link: &VictimLink,
    action: &Action,
) -> Result<Escape, ActionError> {
    if !action.escape {
        return Err(ActionError::NotEscapeAction(action.id.clone()));
    }
    let (veteran, is_superspy, agent_name) = match ctx.world.unit(agent) {
        Some(unit) => (
            unit.veteran,
            ctx.ruleset.unit_flags(unit).superspy,
            unit.type_id.clone(),
        ),
        None => return Err(ActionError::UnknownUnit(agent)),
    };

    let chance = ctx.settings.diplchance as i32
        + (ctx.ruleset.power_fact(veteran) - ctx.ruleset.power_fact(0));
    let home = ctx.world.nearest_city(player, &tile);

    let escaped = match home {
        Some(_) if !action.consumes_actor() => {
            is_superspy || (ctx.dice.roll(100) as i32) < chance
        }
        _ => false,
    };

    if let (true, Some(city)) = (escaped, home) {
        let (city_name, city_tile) = match ctx.world.city(city) {
            Some(c) => (c.name.clone(), c.tile),
            None => {
                error!(agent, city, "escape: home city vanished");
                return Ok(Escape::Captured);
            }
        };
        debug!(agent, city, chance, "escape: agent made it home");
        ctx.outbox.notify(
            player,
            Some(city_tile),
            EventKind::MyDiplomatEscape,
            Message::AgentEscaped {
                agent: agent_name,
                city: city_name,
            },
        );
        ctx.maybe_make_veteran(agent);
        if let Some(unit) = ctx.world.unit_mut(agent) {
            unit.tile = city_tile;
            unit.moves_left = 0;
        }
        ctx.outbox.push(Dispatch::UnitInfo { unit: agent });
        return Ok(Escape::Escaped { city });
    }

    debug!(agent, chance, "escape: agent captured");
    let link = if city_related {
        link.clone()
    } else {
        VictimLink::None
    };
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatFailed,
        Message::AgentCaptured {
            agent: agent_name,
            link,
        },
    );
    if !action.consumes_actor() {
        ctx.wipe_unit(agent, WipeReason::Caught);
    }
    Ok(Escape::Captured)
}
