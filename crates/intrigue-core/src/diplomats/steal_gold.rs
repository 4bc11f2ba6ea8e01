use super::{
    check_actor, expect_result, expect_target, finish_mission, infiltrate_tile, target_city,
    ActionContext,
};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::effects::{EffectContext, EffectKind};
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message};
use crate::types::{CityId, PlayerId, UnitId};
use tracing::debug;

/// Steal from the treasury of the owner of `city`.
///
/// The thief takes a random amount up to the ruleset's share of the victim's
/// gold; part of it may vanish into the agent's pockets on the way home.
pub fn steal_gold(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(action, &[ActionResultKind::StealGold])?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;
    let treasury = ctx.world.player(owner).map_or(0, |p| p.gold);
    if owner == player || treasury <= 0 {
        debug!(agent, city, treasury, "steal-gold: nothing to take");
        return Ok(false);
    }

    if !infiltrate_tile(ctx, player, Some(owner), action, agent, None, tile)?.succeeded() {
        return Ok(false);
    }
    debug!(agent, city, "steal-gold: infiltrated");

    let link = ctx.victim_link(action.target_kind, tile, None);
    if ctx.dice_roll_fails(action, agent, Some(owner), tile) {
        debug!(agent, city, "steal-gold: caught");
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
    let max_pm = ctx.ruleset.bonus(EffectKind::MaxStolenGoldPm, &effect_ctx).max(0) as i64;
    let share_pm = ctx
        .ruleset
        .bonus(EffectKind::ThiefsSharePm, &effect_ctx)
        .clamp(0, 1000) as i64;

    // Victim's gold is still `treasury`: infiltration never touches it.
    let reach = (treasury as i64 * max_pm / 1000).min(u32::MAX as i64) as u32;
    let take = (i64::from(ctx.dice.roll(reach)) + 1).min(treasury as i64);
    let give = take - take * share_pm / 1000;
    let (take, give) = (take as i32, give as i32);

    if let Some(victim) = ctx.world.player_mut(owner) {
        victim.spend_gold(take);
    }
    if let Some(thief) = ctx.world.player_mut(player) {
        thief.add_gold(give);
    }
    ctx.outbox.push(Dispatch::PlayerInfo { player });
    ctx.outbox.push(Dispatch::PlayerInfo { player: owner });
    debug!(agent, city, take, give, "steal-gold: stolen");

    let agent_name = ctx.unit_name(agent);
    let city_name = ctx.city_name(city);
    let nation = ctx.nation_plural(player);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatTheft,
        Message::GoldStolen {
            agent: agent_name,
            amount: give,
            city: city_name.clone(),
        },
    );
    ctx.outbox.notify(
        owner,
        Some(tile),
        EventKind::EnemyDiplomatTheft,
        Message::GoldStolenBy {
            nation,
            amount: take,
            city: city_name,
        },
    );

    finish_mission(ctx, player, agent, Some(owner), tile, &link, true, action)?;
    Ok(true)
}
