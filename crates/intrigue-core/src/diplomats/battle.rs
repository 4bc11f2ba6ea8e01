use super::infiltrate::strongest_defender;
use super::{check_actor, expect_result, infiltrate_tile, ActionContext};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::consequence;
use crate::error::ActionError;
use crate::events::{EventKind, Message};
use crate::map::TileCoord;
use crate::types::{PlayerId, UnitId};
use tracing::debug;

/// Attack the diplomatic defenders on `tile` without any further mission.
pub fn spy_attack(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    tile: TileCoord,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::SpyAttack])?;
    if !matches!(action.target_kind, TargetKind::Units | TargetKind::Tile) {
        return Err(ActionError::TargetKindMismatch {
            action: action.id.clone(),
            target: TargetKind::Tile,
        });
    }
    check_actor(ctx, player, agent)?;

    let link = ctx.victim_link(action.target_kind, tile, None);
    if strongest_defender(ctx, player, agent, None, &tile).is_none() {
        debug!(agent, %tile, "spy-attack: nobody to fight");
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::ActionFailed,
            Message::NoDefenders { link },
        );
        return Ok(false);
    }

    let defender_owner = match infiltrate_tile(ctx, player, None, action, agent, None, tile)? {
        super::Infiltration::Clear { defender_owner } => defender_owner,
        super::Infiltration::Eliminated => return Ok(false),
    };
    debug!(agent, %tile, "spy-attack: tile cleared");

    let agent_name = ctx.unit_name(agent);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatSuccess,
        Message::DefendersEliminated {
            agent: agent_name,
            link: link.clone(),
        },
    );
    consequence::record(
        ctx,
        action,
        player,
        defender_owner,
        tile,
        &link,
        ActionContext::success_class(action),
    );
    ctx.conclude_success(agent, action);
    Ok(true)
}
