use super::{check_actor, expect_result, expect_target, target_city, ActionContext};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::consequence;
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message};
use crate::types::{CityId, PlayerId, UnitId};
use crate::unit::Unit;
use tracing::debug;

/// Send the full state of a foreign city, and the units inside it, to
/// the investigating player.
pub fn investigate_city(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::Investigate])?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;
    if owner == player {
        debug!(agent, city, "investigate: own city");
        return Ok(false);
    }

    let Some(snapshot) = ctx.world.city(city).cloned() else {
        return Err(ActionError::UnknownCity(city));
    };
    let units: Vec<Unit> = ctx
        .world
        .units_at(&tile)
        .into_iter()
        .filter_map(|id| ctx.world.unit(id).cloned())
        .collect();
    debug!(agent, city, units = units.len(), "investigate: report sent");
    ctx.outbox.push(Dispatch::CityReport {
        recipient: player,
        city: Box::new(snapshot),
        units,
    });

    let agent_name = ctx.unit_name(agent);
    let city_name = ctx.city_name(city);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatSuccess,
        Message::CityInvestigated {
            agent: agent_name,
            city: city_name,
        },
    );

    let link = ctx.victim_link(action.target_kind, tile, None);
    consequence::record(
        ctx,
        action,
        player,
        Some(owner),
        tile,
        &link,
        ActionContext::success_class(action),
    );
    ctx.conclude_success(agent, action);
    Ok(true)
}
