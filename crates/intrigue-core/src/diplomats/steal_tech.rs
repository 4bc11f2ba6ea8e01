use super::{
    check_actor, expect_result, expect_target, finish_mission, infiltrate_tile, target_city,
    ActionContext,
};
use crate::action::{Action, ActionResultKind, TargetKind};
use crate::error::ActionError;
use crate::events::{Dispatch, EventKind, Message};
use crate::map::TileCoord;
use crate::types::{CityId, PlayerId, TechId, UnitId};
use tracing::debug;

/// Steal a technology from the owner of `city`.
///
/// Untargeted thefts pick at random among what the thief could use;
/// targeted ones take `target_tech` and are one step harder. Every
/// earlier theft from the same city adds a step. Plain diplomats never
/// steal twice from one city.
pub fn steal_tech(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    city: CityId,
    target_tech: Option<&str>,
    action: &Action,
) -> Result<bool, ActionError> {
    expect_result(
        action,
        &[ActionResultKind::StealTech, ActionResultKind::StealTechTargeted],
    )?;
    expect_target(action, TargetKind::City)?;
    check_actor(ctx, player, agent)?;
    let (owner, tile) = target_city(ctx, city)?;
    let targeted = action.result == ActionResultKind::StealTechTargeted;
    if owner == player || (targeted && target_tech.is_none()) {
        debug!(agent, city, "steal-tech: nothing to aim at");
        return Ok(false);
    }

    if !infiltrate_tile(ctx, player, Some(owner), action, agent, None, tile)?.succeeded() {
        return Ok(false);
    }
    debug!(agent, city, "steal-tech: infiltrated");

    let link = ctx.victim_link(action.target_kind, tile, None);
    let times = ctx.world.city(city).map_or(0, |c| c.steal_count);
    if times > 0 && !ctx.unit_flags(agent).spy {
        debug!(agent, city, times, "steal-tech: city already robbed");
        ctx.agent_caught(player, agent, Some(owner), tile, &link, action, EventKind::EnemyDiplomatTheft);
        return Ok(false);
    }

    let mut count = times + u32::from(targeted);
    while count > 0 {
        if ctx.dice.roll(100) >= ctx.settings.diplchance {
            break;
        }
        count -= 1;
    }
    if count > 0 || ctx.dice_roll_fails(action, agent, Some(owner), tile) {
        debug!(agent, city, times, "steal-tech: caught");
        ctx.agent_caught(player, agent, Some(owner), tile, &link, action, EventKind::EnemyDiplomatTheft);
        return Ok(false);
    }

    let Some(tech) = choose_tech(ctx, player, agent, owner, city, tile, target_tech) else {
        ctx.charge_single_move(agent);
        return Ok(false);
    };

    let bulb_cost = ctx.ruleset.techs.get(&tech).map_or(0, |t| t.cost) as i32;
    let penalty = bulb_cost * ctx.settings.diplbulbcost as i32 / 100;
    if let Some(thief) = ctx.world.player_mut(player) {
        thief.technologies.insert(tech.clone());
        thief.bulbs_researched -= penalty;
    }
    if let Some(c) = ctx.world.city_mut(city) {
        c.steal_count += 1;
    }
    ctx.outbox.push(Dispatch::PlayerInfo { player });
    ctx.outbox.push(Dispatch::CityInfo { city });
    debug!(agent, city, tech = %tech, penalty, "steal-tech: stolen");

    let agent_name = ctx.unit_name(agent);
    let city_name = ctx.city_name(city);
    let nation = ctx.nation_plural(player);
    ctx.outbox.notify(
        player,
        Some(tile),
        EventKind::MyDiplomatTheft,
        Message::TechStolen {
            agent: agent_name,
            tech: tech.clone(),
            city: city_name.clone(),
        },
    );
    ctx.outbox.notify(
        owner,
        Some(tile),
        EventKind::EnemyDiplomatTheft,
        Message::TechStolenBy {
            nation,
            tech,
            city: city_name,
        },
    );

    finish_mission(ctx, player, agent, Some(owner), tile, &link, true, action)?;
    Ok(true)
}

/// Pick what to steal, or tell the thief why there is nothing.
#[allow(clippy::too_many_arguments)]
fn choose_tech(
    ctx: &mut ActionContext,
    player: PlayerId,
    agent: UnitId,
    owner: PlayerId,
    city: CityId,
    tile: TileCoord,
    target_tech: Option<&str>,
) -> Option<TechId> {
    let allow_holes = ctx.settings.tech_steal_allow_holes;
    let (Some(thief), Some(victim)) = (ctx.world.player(player), ctx.world.player(owner)) else {
        return None;
    };
    let city_name = ctx.city_name(city);

    if let Some(wanted) = target_tech {
        let gettable = victim.has_tech(wanted)
            && ctx
                .ruleset
                .techs
                .is_gettable(wanted, &thief.technologies, allow_holes);
        if gettable {
            return Some(wanted.to_string());
        }
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::ActionFailed,
            Message::TechNotStealable {
                tech: wanted.to_string(),
                city: city_name,
            },
        );
        return None;
    }

    let candidates: Vec<TechId> = ctx
        .ruleset
        .techs
        .stealable(&victim.technologies, &thief.technologies, allow_holes)
        .into_iter()
        .cloned()
        .collect();
    if candidates.is_empty() {
        let agent_name = ctx.unit_name(agent);
        ctx.outbox.notify(
            player,
            Some(tile),
            EventKind::ActionFailed,
            Message::NoTechToSteal {
                agent: agent_name,
                city: city_name,
            },
        );
        return None;
    }
    let pick = ctx.dice.roll(candidates.len() as u32) as usize;
    candidates.get(pick).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diplomats::testkit::*;
    use crate::events::{IncidentClass, WipeReason};

    fn create_rich_victim(fx: &mut Fixture) {
        let victim = fx.world.player_mut(CARTHAGINIANS).unwrap();
        for tech in ["Alphabet", "Writing", "Bronze Working"] {
            victim.technologies.insert(tech.to_string());
        }
    }

    #[test]
    fn test_first_theft_needs_no_roll() {
        let mut fx = Fixture::new();
        create_rich_victim(&mut fx);
        let carthage = fx.carthage();
        let agent = fx.spawn(ROMANS, "Diplomat", BESIDE);
        let action = fx.action("Steal Technology");

        // candidates in id order: Alphabet, Bronze Working, Writing
        fx.script(&[1]);
        assert_eq!(steal_tech(&mut fx.ctx(), ROMANS, agent, carthage, None, &action), Ok(true));

        assert!(fx.world.player(ROMANS).unwrap().has_tech("Bronze Working"));
        assert_eq!(fx.dice.requests, vec![3]);
        assert_eq!(fx.world.city(carthage).unwrap().steal_count, 1);
        assert_eq!(fx.outbox.removals_of(agent), vec![WipeReason::Used]);
    }

    #[test]
    fn test_diplomat_cannot_steal_twice() {
        let mut fx = Fixture::new();
        create_rich_victim(&mut fx);
        let carthage = fx.carthage();
        fx.world.city_mut(carthage).unwrap().steal_count = 1;
        let agent = fx.spawn(ROMANS, "Diplomat", BESIDE);
        let action = fx.action("Steal Technology");

        fx.script(&[0, 0, 0]);
        assert_eq!(steal_tech(&mut fx.ctx(), ROMANS, agent, carthage, None, &action), Ok(false));
        assert_eq!(fx.dice.rolls(), 0);
        assert_eq!(fx.outbox.removals_of(agent), vec![WipeReason::Caught]);
        assert_eq!(fx.outbox.incidents()[0].class, IncidentClass::Caught);
    }

    #[test]
    fn test_spy_rolls_once_per_earlier_theft() {
        let mut fx = Fixture::new();
        create_rich_victim(&mut fx);
        let carthage = fx.carthage();
        fx.world.city_mut(carthage).unwrap().steal_count = 2;
        let agent = fx.spawn(ROMANS, "Spy", BESIDE);
        let action = fx.action("Steal Technology Escape");

        // two difficulty rolls, the pick, the escape, no promotion
        fx.script(&[0, 79, 0, 0, 99]);
        assert_eq!(steal_tech(&mut fx.ctx(), ROMANS, agent, carthage, None, &action), Ok(true));
        assert_eq!(fx.dice.requests, vec![100, 100, 3, 100, 100]);
        assert_eq!(fx.world.city(carthage).unwrap().steal_count, 3);
        assert!(fx.world.unit_alive(agent));
    }

    #[test]
    fn test_failed_difficulty_roll_is_caught() {
        let mut fx = Fixture::new();
        create_rich_victim(&mut fx);
        let carthage = fx.carthage();
        fx.world.city_mut(carthage).unwrap().steal_count = 2;
        let agent = fx.spawn(ROMANS, "Spy", BESIDE);
        let action = fx.action("Steal Technology Escape");

        fx.script(&[0, 80]);
        assert_eq!(steal_tech(&mut fx.ctx(), ROMANS, agent, carthage, None, &action), Ok(false));
        assert!(!fx.world.unit_alive(agent));
        assert_eq!(fx.world.city(carthage).unwrap().steal_count, 2);
        assert!(fx.world.player(ROMANS).unwrap().technologies.is_empty());
    }

    #[test]
    fn test_targeted_theft() {
        let mut fx = Fixture::new();
        create_rich_victim(&mut fx);
        fx.settings.diplbulbcost = 50;
        let carthage = fx.carthage();
        let agent = fx.spawn(ROMANS, "Spy", BESIDE);
        let action = fx.action("Targeted Steal Technology Escape");

        // one difficulty roll for aiming, then the escape
        fx.script(&[0, 0, 99]);
        let result = steal_tech(&mut fx.ctx(), ROMANS, agent, carthage, Some("Writing"), &action);
        assert_eq!(result, Ok(true));
        let romans = fx.world.player(ROMANS).unwrap();
        assert!(romans.has_tech("Writing"));
        assert_eq!(romans.bulbs_researched, -20);
    }

    #[test]
    fn test_unknown_target_is_partial() {
        let mut fx = Fixture::new();
        create_rich_victim(&mut fx);
        let carthage = fx.carthage();
        let agent = fx.spawn(ROMANS, "Spy", BESIDE);
        let action = fx.action("Targeted Steal Technology Escape");

        fx.script(&[0]);
        let result = steal_tech(&mut fx.ctx(), ROMANS, agent, carthage, Some("Monarchy"), &action);
        assert_eq!(result, Ok(false));
        assert!(fx.world.unit_alive(agent));
        assert_eq!(fx.world.unit(agent).unwrap().moves_left, 20);
        assert!(fx.outbox.incidents().is_empty());
    }

    #[test]
    fn test_nothing_left_to_steal() {
        let mut fx = Fixture::new();
        let carthage = fx.carthage();
        let agent = fx.spawn(ROMANS, "Spy", BESIDE);
        let action = fx.action("Steal Technology Escape");

        assert_eq!(steal_tech(&mut fx.ctx(), ROMANS, agent, carthage, None, &action), Ok(false));
        assert!(fx.world.unit_alive(agent));
        assert!(matches!(
            fx.outbox.notices_for(ROMANS)[0].message,
            Message::NoTechToSteal { .. }
        ));
    }
}
