//! Gold prices of bribing units and inciting cities.

use crate::effects::{EffectContext, EffectKind};
use crate::ruleset::Ruleset;
use crate::settings::ServerSettings;
use crate::types::{CityId, PlayerId, UnitId, SINGLE_MOVE};
use crate::world::World;

/// Price reported for cities that cannot be incited at all.
pub const INCITE_IMPOSSIBLE_COST: i32 = 1_000_000_000;

/// Gold `briber` must pay to take over `unit`. `None` if the unit is gone.
pub fn unit_bribe_cost(
    world: &World,
    ruleset: &Ruleset,
    settings: &ServerSettings,
    unit: UnitId,
    briber: PlayerId,
) -> Option<i32> {
    let unit = world.unit(unit)?;
    let utype = ruleset.unit_type(&unit.type_id)?;
    let owner_gold = world.player(unit.owner).map_or(0, |p| p.gold.max(0));

    let mut cost = (owner_gold as i64) + settings.base_bribe_cost as i64;

    // Distance to the owner's capital
    let dist = world
        .capital_of(unit.owner)
        .map(|capital| capital.tile.distance(&unit.tile))
        .unwrap_or(settings.unit_bribe_dist_max)
        .min(settings.unit_bribe_dist_max);
    cost /= dist as i64 + 2;

    cost = cost * utype.build_cost as i64 / 10;

    let ctx = EffectContext {
        offender: Some(briber),
        victim: Some(unit.owner),
        tile: Some(unit.tile),
        tile_owner: world.map.owner(&unit.tile),
        city: world.city_at(&unit.tile),
        ..Default::default()
    };
    cost += cost * ruleset.bonus(EffectKind::UnitBribeCostPct, &ctx) as i64 / 100;

    // Veterans are not cheap.
    if let Some(level) = ruleset.veteran_level(unit.veteran) {
        cost = cost * level.power_fact as i64 / 100;
        let move_rate = if utype.move_rate > 0 {
            utype.move_rate
        } else {
            SINGLE_MOVE
        };
        cost += cost * level.move_bonus as i64 / move_rate as i64;
    }

    // Damaged units come cheaper: half the price scales with health.
    let full_hp = utype.hp.max(1) as i64;
    cost = cost / 2 + (cost / 2) * unit.hp as i64 / full_hp;

    Some(cost.clamp(1, i32::MAX as i64) as i32)
}

/// Gold `inciter` must pay to make `city` revolt. `None` if the city is gone.
pub fn city_incite_cost(
    world: &World,
    ruleset: &Ruleset,
    settings: &ServerSettings,
    city: CityId,
    inciter: PlayerId,
) -> Option<i32> {
    let city = world.city(city)?;
    if city.is_capital {
        return Some(INCITE_IMPOSSIBLE_COST);
    }

    let owner_gold = world.player(city.owner).map_or(0, |p| p.gold.max(0));
    let mut cost = owner_gold as i64 + settings.base_incite_cost as i64;

    for id in world.units_at(&city.tile) {
        let build_cost = world
            .unit(id)
            .and_then(|u| ruleset.unit_type(&u.type_id))
            .map_or(0, |t| t.build_cost);
        cost += build_cost as i64 * settings.incite_unit_factor as i64;
    }
    for building in &city.buildings {
        let build_cost = ruleset.building(building).map_or(0, |b| b.build_cost);
        cost += build_cost as i64 * settings.incite_improvement_factor as i64;
    }

    // Stability bonuses
    if !city.is_unhappy() {
        cost *= 2;
    }
    if city.celebrating {
        cost *= 2;
    }

    // Buying back is cheap, conquered cities are cheaper too.
    if city.owner != city.original_owner {
        if inciter == city.original_owner {
            cost /= 2;
        } else {
            cost = cost * 2 / 3;
        }
    }

    let dist = world
        .capital_of(city.owner)
        .map(|capital| capital.tile.distance(&city.tile))
        .unwrap_or(settings.incite_dist_max)
        .min(settings.incite_dist_max);

    let size = (city.size as i64 + city.happy as i64
        - city.unhappy as i64
        - 3 * city.angry as i64)
        .max(1);
    cost *= size;
    cost *= settings.incite_total_factor as i64;
    cost /= dist as i64 + 3;

    let ctx = EffectContext {
        offender: Some(inciter),
        victim: Some(city.owner),
        city: Some(city),
        tile: Some(city.tile),
        tile_owner: world.map.owner(&city.tile),
        ..Default::default()
    };
    cost += cost * ruleset.bonus(EffectKind::InciteCostPct, &ctx) as i64 / 100;
    cost /= 100;

    Some(cost.clamp(0, INCITE_IMPOSSIBLE_COST as i64) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Map, Terrain, TileCoord};
    use crate::player::Player;

    fn create_test_world() -> (World, Ruleset) {
        let ruleset = Ruleset::classic();
        let mut world = World::new(Map::filled(40, 40, Terrain::Grassland));
        world.add_player(Player::new(0, "Caesar", "Roman", "Romans"));
        world.add_player(Player::new(0, "Hannibal", "Carthaginian", "Carthaginians"));
        (world, ruleset)
    }

    #[test]
    fn test_bribe_cost_without_capital() {
        let (mut world, ruleset) = create_test_world();
        let settings = ServerSettings::default();
        let warriors = ruleset.unit_type("Warriors").unwrap().clone();
        let unit = world.create_unit(1, &warriors, TileCoord::new(5, 5));

        // (0 + 750) / (32 + 2) = 22; * 10 / 10 = 22; full health keeps it whole.
        let cost = unit_bribe_cost(&world, &ruleset, &settings, unit, 0).unwrap();
        assert_eq!(cost, 22);
    }

    #[test]
    fn test_bribe_cost_rises_near_capital_and_for_veterans() {
        let (mut world, ruleset) = create_test_world();
        let settings = ServerSettings::default();
        let warriors = ruleset.unit_type("Warriors").unwrap().clone();
        let capital = world.create_city(1, "Carthage", TileCoord::new(5, 5));
        world.city_mut(capital).unwrap().is_capital = true;
        let unit = world.create_unit(1, &warriors, TileCoord::new(6, 5));

        let near = unit_bribe_cost(&world, &ruleset, &settings, unit, 0).unwrap();
        // 750 / 3 = 250
        assert_eq!(near, 250);

        world.unit_mut(unit).unwrap().veteran = 1;
        let veteran = unit_bribe_cost(&world, &ruleset, &settings, unit, 0).unwrap();
        assert_eq!(veteran, 374);

        world.unit_mut(unit).unwrap().hp = 5;
        let damaged = unit_bribe_cost(&world, &ruleset, &settings, unit, 0).unwrap();
        assert!(damaged < veteran);
    }

    #[test]
    fn test_capital_cannot_be_incited() {
        let (mut world, ruleset) = create_test_world();
        let settings = ServerSettings::default();
        let capital = world.create_city(1, "Carthage", TileCoord::new(5, 5));
        world.city_mut(capital).unwrap().is_capital = true;
        assert_eq!(
            city_incite_cost(&world, &ruleset, &settings, capital, 0),
            Some(INCITE_IMPOSSIBLE_COST)
        );
    }

    #[test]
    fn test_incite_cost_buy_back_is_cheaper() {
        let (mut world, ruleset) = create_test_world();
        let settings = ServerSettings::default();
        let city = world.create_city(1, "Utica", TileCoord::new(5, 5));
        world.city_mut(city).unwrap().original_owner = 0;

        let buy_back = city_incite_cost(&world, &ruleset, &settings, city, 0).unwrap();
        world.add_player(Player::new(0, "Alexander", "Greek", "Greeks"));
        let conquered = city_incite_cost(&world, &ruleset, &settings, city, 2).unwrap();
        assert!(buy_back < conquered);
        // 1000 * 2 (content) / 2 (buy back) * 1 * 100 / 35 / 100 = 28
        assert_eq!(buy_back, 28);
    }

    #[test]
    fn test_courthouse_raises_incite_cost() {
        let (mut world, ruleset) = create_test_world();
        let settings = ServerSettings::default();
        let city = world.create_city(1, "Utica", TileCoord::new(5, 5));
        let plain = city_incite_cost(&world, &ruleset, &settings, city, 0).unwrap();
        world
            .city_mut(city)
            .unwrap()
            .buildings
            .insert("Courthouse".to_string());
        let defended = city_incite_cost(&world, &ruleset, &settings, city, 0).unwrap();
        assert!(defended > plain * 3);
    }
}
