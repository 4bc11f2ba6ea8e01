use super::{
    check_actor, expect_result, expect_target, finish_mission, infiltrate_tile, target_unit,
    ActionContext,
};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message};
use crate::types::{PlayerId, UnitId};
use tracing::debug;

/// Halve the hit points of a foreign unit.
pub fn sabotage_unit(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    victim: UnitId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::SabotageUnit])?;
    expect_target(action, TargetKind::Unit)?;
    check_actor(ctx, player, agent)?;
    let (victim_owner, tile) = target_unit(ctx, victim)?;
    if victim_owner == player {
        debug!(agent, victim, "sabotage-unit: own unit");
        return Ok(false);
    }

    let victim_name = ctx.unit_name(victim);
    let too_weak = ctx.world.unit(victim).map_or(true, |u| u.hp < 2);
    if too_weak {
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::ActionFailed,
            Message::TargetTooWeak { unit: victim_name },
        );
        return Ok(false);
    }

    let gate = infiltrate_tile(ctx, player, Some(victim_owner), action, agent, Some(victim), tile)?;
    if !gate.succeeded() {
        return Ok(false);
    }

    let link = ctx.victim_link(action.target_kind, tile, Some(victim));
    if ctx.dice_roll_fails(action, agent, Some(victim_owner), tile) {
        debug!(agent, victim, "sabotage-unit: caught");
        ctx.agent_caught(
            player,
            agent,
            Some(victim_owner),
            tile,
            &link,
            action,
            EventKind::EnemyDiplomatSabotage,
        );
        return Ok(false);
    }

    if let Some(unit) = ctx.world.unit_mut(victim) {
        unit.hp /= 2;
    }
    ctx.outbox.push(Dispatch::UnitInfo { unit: victim });
    debug!(agent, victim, "sabotage-unit: done");

    let agent_name = ctx.unit_name(agent);
    let nation = ctx.nation_plural(player);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatSabotage,
        Message::UnitSabotaged {
            agent: agent_name,
            unit: victim_name.clone(),
        },
    );
    ctx.outbox.notify(
        victim_owner,
        Some(tile),
        EventKind::EnemyDiplomatSabotage,
        Message::UnitSabotagedBy {
            nation,
            unit: victim_name,
        },
    );

    finish_mission(ctx, player, agent, Some(victim_owner), tile, &link, false, action)?;
    Ok(true)
}
