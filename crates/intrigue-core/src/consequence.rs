//! Casus belli ledger and incident notices.
//!
//! After an agent is caught or succeeds, the ruleset decides whether the
//! act gives anyone grounds for war. The ledger tells the parties, marks
//! the diplomatic states and reports the incident to the AI hook.

use crate::action::Action;
use crate::diplomats::ActionContext;
use crate::effects::{EffectContext, EffectKind};
use crate::events::{Audience, CasusBelliRange, Dispatch, EventKind, Incident, IncidentClass, Message, Outbox, VictimLink};
use crate::map::TileCoord;
use crate::ruleset::Ruleset;
use crate::types::PlayerId;
use crate::world::World;
use tracing::{debug, info};

/// Casus belli amount at which everyone is outraged.
pub const CASUS_BELLI_OUTRAGE: i32 = 1000;
/// Casus belli amount at which the victim gets grounds for war.
pub const CASUS_BELLI_VICTIM: i32 = 1;

const fn effect_for(class: IncidentClass) -> EffectKind {
    match class {
        IncidentClass::Caught => EffectKind::CasusBelliCaught,
        IncidentClass::Success => EffectKind::CasusBelliSuccess,
        IncidentClass::Complete => EffectKind::CasusBelliComplete,
    }
}

/// How far the grounds for war reach for this incident.
pub fn casus_belli_range(
    world: &World,
    ruleset: &Ruleset,
    action: &Action,
    offender: PlayerId,
    victim: Option<PlayerId>,
    tile: TileCoord,
    class: IncidentClass,
) -> CasusBelliRange {
    let ctx = EffectContext {
        offender: Some(offender),
        victim,
        action: Some(action.id.as_str()),
        city: world.city_at(&tile),
        tile: Some(tile),
        tile_owner: world.map.owner(&tile),
        dipl_status: victim.map(|v| world.diplomacy.get(offender, v).status),
        ..Default::default()
    };
    let amount = ruleset.bonus(effect_for(class), &ctx);

    if amount >= CASUS_BELLI_OUTRAGE {
        CasusBelliRange::InternationalOutrage
    } else if amount >= CASUS_BELLI_VICTIM {
        CasusBelliRange::VictimOnly
    } else {
        CasusBelliRange::None
    }
}

fn plural(world: &World, player: PlayerId) -> String {
    world
        .player(player)
        .map(|p| p.nation_plural.clone())
        .unwrap_or_default()
}

fn adjective(world: &World, player: PlayerId) -> String {
    world
        .player(player)
        .map(|p| p.nation_adjective.clone())
        .unwrap_or_default()
}

fn incident_message(
    world: &World,
    action: &Action,
    audience: Audience,
    offender: PlayerId,
    victim: Option<PlayerId>,
    link: &VictimLink,
    class: IncidentClass,
) -> Message {
    Message::Incident {
        class,
        audience,
        action: action.ui_name.clone(),
        offender: plural(world, offender),
        victim: victim.map(|v| adjective(world, v)),
        link: link.clone(),
    }
}

/// Tell the offender about the incident. Self-inflicted and ownerless
/// incidents are not reported.
#[allow(clippy::too_many_arguments)]
pub fn notify_actor(
    outbox: &mut Outbox,
    world: &World,
    action: &Action,
    offender: PlayerId,
    victim: Option<PlayerId>,
    tile: TileCoord,
    link: &VictimLink,
    class: IncidentClass,
) {
    if victim.map_or(true, |v| v == offender) {
        return;
    }
    let message = incident_message(world, action, Audience::Offender, offender, victim, link, class);
    outbox.notify(offender, Some(tile), EventKind::DiplomaticIncident, message);
}

/// Tell the victim about the incident. Same suppression as `notify_actor`.
#[allow(clippy::too_many_arguments)]
pub fn notify_victim(
    outbox: &mut Outbox,
    world: &World,
    action: &Action,
    offender: PlayerId,
    victim: Option<PlayerId>,
    tile: TileCoord,
    link: &VictimLink,
    class: IncidentClass,
) {
    let Some(victim_id) = victim.filter(|v| *v != offender) else {
        return;
    };
    let message = incident_message(world, action, Audience::Victim, offender, victim, link, class);
    outbox.notify(victim_id, Some(tile), EventKind::DiplomaticIncident, message);
}

/// Tell `recipient` about an incident, phrased for their role in it.
#[allow(clippy::too_many_arguments)]
pub fn notify_global(
    outbox: &mut Outbox,
    world: &World,
    recipient: PlayerId,
    action: &Action,
    offender: PlayerId,
    victim: Option<PlayerId>,
    tile: TileCoord,
    link: &VictimLink,
    class: IncidentClass,
) {
    let audience = if recipient == offender {
        Audience::Offender
    } else if victim == Some(recipient) {
        Audience::Victim
    } else {
        Audience::ThirdParty
    };
    let message = incident_message(world, action, audience, offender, victim, link, class);
    outbox.notify(recipient, Some(tile), EventKind::DiplomaticIncident, message);
}

/// Evaluate and record the consequences of an incident.
///
/// Returns the casus belli range that was applied. Acts against oneself
/// or against nobody are never reported to the two parties and grant
/// no victim-only casus belli; an outrage still reaches everyone.
pub fn record(
    ctx: &mut ActionContext,
    action: &Action,
    offender: PlayerId,
    victim: Option<PlayerId>,
    tile: TileCoord,
    link: &VictimLink,
    class: IncidentClass,
) -> CasusBelliRange {
    let range = casus_belli_range(ctx.world, ctx.ruleset, action, offender, victim, tile, class);
    if range == CasusBelliRange::None {
        debug!(action = %action.id, offender, victim = ?victim, "incident: no casus belli");
        return range;
    }
    let outrage = range == CasusBelliRange::InternationalOutrage;

    notify_actor(ctx.outbox, ctx.world, action, offender, victim, tile, link, class);
    notify_victim(ctx.outbox, ctx.world, action, offender, victim, tile, link, class);

    let living = ctx.world.living_players();
    if outrage {
        for &recipient in &living {
            notify_global(ctx.outbox, ctx.world, recipient, action, offender, victim, tile, link, class);
        }
    }

    let turns = ctx.settings.casus_belli_turns;
    let turn = ctx.world.turn;
    let holders: Vec<PlayerId> = if outrage {
        living.into_iter().filter(|p| *p != offender).collect()
    } else {
        victim.into_iter().filter(|v| *v != offender).collect()
    };
    for holder in holders {
        ctx.world.diplomacy.grant_casus_belli(holder, offender, turns);
        if let Some(player) = ctx.world.player_mut(holder) {
            player.last_war_action = Some(turn);
        }
    }
    if let Some(player) = ctx.world.player_mut(offender) {
        player.last_war_action = Some(turn);
    }

    info!(
        action = %action.id,
        offender,
        victim = ?victim,
        range = ?range,
        class = ?class,
        "casus belli"
    );

    ctx.outbox.push(Dispatch::Incident(Incident {
        class,
        range,
        action: action.id.clone(),
        offender,
        victim,
    }));
    ctx.outbox.push(Dispatch::PlayerInfo { player: offender });
    if let Some(v) = victim.filter(|v| *v != offender) {
        ctx.outbox.push(Dispatch::PlayerInfo { player: v });
    }

    range
}
