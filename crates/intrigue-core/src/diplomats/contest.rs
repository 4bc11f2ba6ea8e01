//! Diplomatic battles between two agents.

use super::ActionContext;
use crate::effects::{EffectContext, EffectKind};
use crate::map::TileCoord;
use crate::types::UnitId;
use tracing::{debug, error};

/// Base chance in percent that an attacking agent beats a defender.
const BASE_CHANCE: i32 = 50;
/// Odds shift for each side with the spy ability.
const SPY_BONUS: i32 = 25;

/// Does `attacker` beat `defender`, who stands on `defender_tile`?
///
/// A superspy always wins against anyone who is not one. Otherwise the
/// chance starts at 50%, moves 25 points for each side's spy ability and by
/// the difference in veteran power, is cut by the tile's spy resistance and
/// is clamped to 0..=100 before the roll.
pub fn success_vs_defender(
    ctx: &mut ActionContext,
    attacker: UnitId,
    defender: UnitId,
    defender_tile: TileCoord,
) -> bool {
    let (Some(att), Some(def)) = (ctx.world.unit(attacker), ctx.world.unit(defender)) else {
        error!(attacker, defender, "contest: agent missing from the world");
        return false;
    };
    let att_flags = ctx.ruleset.unit_flags(att);
    let def_flags = ctx.ruleset.unit_flags(def);

    if def_flags.superspy && !att_flags.superspy {
        return false;
    }
    if att_flags.superspy && !def_flags.superspy {
        return true;
    }

    let mut chance = BASE_CHANCE;
    if att_flags.spy {
        chance += SPY_BONUS;
    }
    if def_flags.spy {
        chance -= SPY_BONUS;
    }
    chance += ctx.ruleset.power_fact(att.veteran) - ctx.ruleset.power_fact(def.veteran);

    let effect_ctx = EffectContext {
        offender: Some(att.owner),
        victim: Some(def.owner),
        city: ctx.world.city_at(&defender_tile),
        tile: Some(defender_tile),
        tile_owner: ctx.world.map.owner(&defender_tile),
        actor_flags: Some(att_flags),
        ..Default::default()
    };
    let resistance = ctx.ruleset.bonus(EffectKind::SpyResistant, &effect_ctx);
    chance -= chance * resistance / 100;

    let chance = chance.clamp(0, 100) as u32;
    let roll = ctx.dice.roll(100);
    debug!(attacker, defender, chance, roll, "diplomatic battle");
    roll < chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::events::Outbox;
    use crate::map::{Map, Terrain};
    use crate::player::Player;
    use crate::ruleset::Ruleset;
    use crate::settings::ServerSettings;
    use crate::world::World;

    const TILE: TileCoord = TileCoord { x: 3, y: 3 };

    fn create_duel(ruleset: &Ruleset, attacker: &str, defender: &str) -> (World, UnitId, UnitId) {
        let mut world = World::new(Map::filled(8, 8, Terrain::Grassland));
        world.add_player(Player::new(0, "Caesar", "Roman", "Romans"));
        world.add_player(Player::new(0, "Hannibal", "Carthaginian", "Carthaginians"));
        let att = world.create_unit(0, ruleset.unit_type(attacker).unwrap(), TileCoord::new(2, 3));
        let def = world.create_unit(1, ruleset.unit_type(defender).unwrap(), TILE);
        (world, att, def)
    }

    fn fight(world: &mut World, ruleset: &Ruleset, dice: &mut ScriptedDice, att: UnitId, def: UnitId) -> bool {
        let settings = ServerSettings::default();
        let mut outbox = Outbox::new();
        let mut ctx = ActionContext::new(world, ruleset, &settings, dice, &mut outbox);
        success_vs_defender(&mut ctx, att, def, TILE)
    }

    #[test]
    fn test_superspy_defender_always_wins() {
        let ruleset = Ruleset::classic();
        let (mut world, att, def) = create_duel(&ruleset, "Spy", "Master Spy");
        let mut dice = ScriptedDice::always(0);
        assert!(!fight(&mut world, &ruleset, &mut dice, att, def));
        assert_eq!(dice.rolls(), 0);
    }

    #[test]
    fn test_superspy_attacker_always_wins() {
        let ruleset = Ruleset::classic();
        let (mut world, att, def) = create_duel(&ruleset, "Master Spy", "Spy");
        let mut dice = ScriptedDice::always(99);
        assert!(fight(&mut world, &ruleset, &mut dice, att, def));
        assert_eq!(dice.rolls(), 0);
    }

    #[test]
    fn test_missing_defender_is_a_loss() {
        let ruleset = Ruleset::classic();
        let (mut world, att, def) = create_duel(&ruleset, "Spy", "Diplomat");
        world.remove_unit(def);
        let mut dice = ScriptedDice::always(0);
        assert!(!fight(&mut world, &ruleset, &mut dice, att, def));
        assert_eq!(dice.rolls(), 0);
    }

    #[test]
    fn test_superspies_fight_at_even_odds() {
        let ruleset = Ruleset::classic();
        let (mut world, att, def) = create_duel(&ruleset, "Master Spy", "Master Spy");
        let mut dice = ScriptedDice::new(&[49, 50]);
        assert!(fight(&mut world, &ruleset, &mut dice, att, def));
        assert!(!fight(&mut world, &ruleset, &mut dice, att, def));
        assert_eq!(dice.requests, vec![100, 100]);
    }

    #[test]
    fn test_spy_against_diplomat() {
        let ruleset = Ruleset::classic();
        let (mut world, att, def) = create_duel(&ruleset, "Spy", "Diplomat");
        // 50 + 25 = 75
        let mut dice = ScriptedDice::new(&[74, 75]);
        assert!(fight(&mut world, &ruleset, &mut dice, att, def));
        assert!(!fight(&mut world, &ruleset, &mut dice, att, def));
    }

    #[test]
    fn test_veteran_power_shifts_odds() {
        let ruleset = Ruleset::classic();
        let (mut world, att, def) = create_duel(&ruleset, "Diplomat", "Diplomat");
        world.unit_mut(def).unwrap().veteran = 1;
        // 50 + (100 - 150) = 0: the attacker cannot win
        let mut dice = ScriptedDice::always(0);
        assert!(!fight(&mut world, &ruleset, &mut dice, att, def));

        world.unit_mut(def).unwrap().veteran = 0;
        world.unit_mut(att).unwrap().veteran = 3;
        // 50 + 100 = 150, clamped to 100: the attacker cannot lose
        let mut dice = ScriptedDice::always(99);
        assert!(fight(&mut world, &ruleset, &mut dice, att, def));
    }

    #[test]
    fn test_spy_resistance_cuts_chance() {
        let ruleset = Ruleset::classic();
        let (mut world, att, def) = create_duel(&ruleset, "Spy", "Diplomat");
        let city = world.create_city(1, "Carthage", TILE);
        world
            .city_mut(city)
            .unwrap()
            .buildings
            .insert("Courthouse".to_string());
        // 75 - 75 * 25 / 100 = 57
        let mut dice = ScriptedDice::new(&[56, 57]);
        assert!(fight(&mut world, &ruleset, &mut dice, att, def));
        assert!(!fight(&mut world, &ruleset, &mut dice, att, def));
    }
}
