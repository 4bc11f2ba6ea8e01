use super::{check_actor, expect_result, expect_target, target_city, ActionContext};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::consequence;
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message, WipeReason};
use crate::types::{CityId, PlayerId, UnitId};
use tracing::debug;

/// Establish an embassy with the owner of `city`.
///
/// Embassies are not contested: there is no infiltration and no roll.
/// Barbarians execute the agent instead.
pub fn establish_embassy(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::Embassy])?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;

    if owner == player {
        debug!(agent, city, "embassy: own city");
        return Ok(false);
    }
    let already = ctx
        .world
        .player(player)
        .is_some_and(|p| p.has_embassy_with(owner));
    if already {
        let nation = ctx.nation_plural(owner);
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::ActionFailed,
            Message::AlreadyHaveEmbassy { nation },
        );
        return Ok(false);
    }

    let agent_name = ctx.unit_name(agent);
    let barbarian = ctx.world.player(owner).is_some_and(|p| p.is_barbarian);
    if barbarian {
        debug!(agent, city, "embassy: executed by barbarians");
        let nation = ctx.nation_plural(owner);
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::MyDiplomatFailed,
            Message::AgentExecuted {
                agent: agent_name,
                nation,
            },
        );
        ctx.wipe_unit(agent, WipeReason::Executed);
        return Ok(true);
    }

    if let Some(p) = ctx.world.player_mut(player) {
        p.embassies.insert(owner);
    }
    ctx.outbox.push(Dispatch::PlayerInfo { player });

    let city_name = ctx.city_name(city);
    let nation = ctx.nation_plural(player);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatEmbassy,
        Message::EmbassyEstablished {
            city: city_name.clone(),
        },
    );
    ctx.outbox.notify(
        owner,
        Some(tile),
        EventKind::EnemyDiplomatEmbassy,
        Message::EmbassyEstablishedBy {
            nation,
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
