//! Ruleset data: unit types, buildings, technologies, veteran levels,
//! actions and effects.
//!
//! A ruleset is plain data. `Ruleset::classic()` builds the default rules in
//! code; servers with custom rules load them with `Ruleset::from_json()`.

use crate::action::{Action, ActionResultKind, ActorConsumption, TargetKind};
use crate::city::Building;
use crate::diplomacy::DiplomaticStatus;
use crate::effects::{AgentFlag, Effect, EffectContext, EffectKind, Requirement};
use crate::technology::{TechTree, Technology};
use crate::unit::{Unit, UnitFlags, UnitType, VeteranLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors from an inconsistent ruleset.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RulesetError {
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("Action {0} cannot have an escape step")]
    EscapeNotAllowed(String),
    #[error("Action {action} cannot target {target:?}")]
    TargetKindMismatch { action: String, target: TargetKind },
    #[error("Action {action} cannot spend its actor by {consumption:?}")]
    ConsumptionNotAllowed {
        action: String,
        consumption: ActorConsumption,
    },
    #[error("Ruleset has no veteran levels")]
    NoVeteranLevels,
    #[error("Invalid ruleset: {0}")]
    Parse(String),
}

/// Game rules consulted while resolving actions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ruleset {
    pub unit_types: Vec<UnitType>,
    pub buildings: Vec<Building>,
    pub techs: TechTree,
    /// Veteran ladder shared by every diplomatic unit; index 0 is green.
    pub veteran_levels: Vec<VeteranLevel>,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Ruleset {
    /// Parse a ruleset from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, RulesetError> {
        let ruleset: Ruleset =
            serde_json::from_str(json).map_err(|e| RulesetError::Parse(e.to_string()))?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    /// Check the load-time contracts the resolution core relies on.
    pub fn validate(&self) -> Result<(), RulesetError> {
        check_unique("unit type", self.unit_types.iter().map(|u| u.id.as_str()))?;
        check_unique("building", self.buildings.iter().map(|b| b.id.as_str()))?;
        check_unique("action", self.actions.iter().map(|a| a.id.as_str()))?;

        if self.veteran_levels.is_empty() {
            return Err(RulesetError::NoVeteranLevels);
        }

        for action in &self.actions {
            if action.escape && !action.result.can_escape() {
                return Err(RulesetError::EscapeNotAllowed(action.id.clone()));
            }
            if !action.result.target_kinds().contains(&action.target_kind) {
                return Err(RulesetError::TargetKindMismatch {
                    action: action.id.clone(),
                    target: action.target_kind,
                });
            }
            if let Some(consumption) = action.consumes_actor {
                if !action.result.allows_consumption(consumption) {
                    return Err(RulesetError::ConsumptionNotAllowed {
                        action: action.id.clone(),
                        consumption,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn unit_type(&self, id: &str) -> Option<&UnitType> {
        self.unit_types.iter().find(|u| u.id == id)
    }

    /// Capability flags of a unit; a unit of unknown type has none.
    pub fn unit_flags(&self, unit: &Unit) -> UnitFlags {
        self.unit_type(&unit.type_id)
            .map(|t| t.flags)
            .unwrap_or_default()
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn veteran_level(&self, level: usize) -> Option<&VeteranLevel> {
        self.veteran_levels.get(level)
    }

    /// Power factor of a veteran level, saturating at the top rung.
    pub fn power_fact(&self, level: usize) -> i32 {
        self.veteran_levels
            .get(level)
            .or_else(|| self.veteran_levels.last())
            .map(|v| v.power_fact)
            .unwrap_or(100)
    }

    /// Sum of the values of every active effect of `kind`.
    pub fn bonus(&self, kind: EffectKind, ctx: &EffectContext) -> i32 {
        self.effects
            .iter()
            .filter(|e| e.kind == kind && e.is_active(ctx))
            .map(|e| e.value)
            .sum()
    }

    /// The default rules.
    pub fn classic() -> Self {
        let diplomat = UnitFlags {
            diplomat: true,
            ..UnitFlags::default()
        };
        let spy = UnitFlags {
            diplomat: true,
            spy: true,
            ..UnitFlags::default()
        };
        let superspy = UnitFlags {
            diplomat: true,
            spy: true,
            superspy: true,
        };

        let unit_types = vec![
            UnitType::new("Diplomat", 10, 2, 30).with_flags(diplomat),
            UnitType::new("Spy", 10, 3, 30).with_flags(spy),
            UnitType::new("Master Spy", 10, 3, 60).with_flags(superspy),
            UnitType::new("Warriors", 10, 1, 10),
            UnitType::new("Phalanx", 10, 1, 20),
            UnitType::new("Horsemen", 10, 2, 20),
        ];

        let buildings = vec![
            Building::new("Palace", 70, 0),
            Building::new("City Walls", 60, 50),
            Building::new("Barracks", 30, 100),
            Building::new("Granary", 40, 100),
            Building::new("Temple", 30, 100),
            Building::new("Library", 60, 100),
            Building::new("Marketplace", 60, 100),
            Building::new("Courthouse", 60, 100),
        ];

        let techs = TechTree::from(vec![
            Technology::new("Alphabet", 20),
            Technology::new("Bronze Working", 20),
            Technology::new("Ceremonial Burial", 20),
            Technology::new("Masonry", 20),
            Technology::new("Writing", 40).with_prerequisites(&["Alphabet"]),
            Technology::new("Code of Laws", 40).with_prerequisites(&["Alphabet"]),
            Technology::new("Currency", 40).with_prerequisites(&["Bronze Working"]),
            Technology::new("Monarchy", 60)
                .with_prerequisites(&["Ceremonial Burial", "Code of Laws"]),
        ]);

        let veteran_levels = vec![
            VeteranLevel::new("green", 100, 0, 50),
            VeteranLevel::new("veteran", 150, 0, 33),
            VeteranLevel::new("hardened", 175, 0, 20),
            VeteranLevel::new("elite", 200, 0, 0),
        ];

        Self {
            unit_types,
            buildings,
            techs,
            veteran_levels,
            actions: classic_actions(),
            effects: classic_effects(),
        }
    }
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), RulesetError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(RulesetError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn classic_actions() -> Vec<Action> {
    use ActionResultKind::*;

    /// A mission that spends the agent, and its escape variant.
    fn pair(id: &str, result: ActionResultKind, dice: bool) -> [Action; 2] {
        let spends = match result {
            SuitcaseNuke => ActorConsumption::Detonate,
            _ => ActorConsumption::Used,
        };
        let mut spent = Action::new(id, result)
            .with_escape()
            .with_consumption(spends);
        let mut escape = Action::new(&format!("{} Escape", id), result).with_escape();
        if dice {
            spent = spent.with_dice_roll();
            escape = escape.with_dice_roll();
        }
        [spent, escape]
    }

    let mut actions = vec![
        Action::new("Establish Embassy", Embassy).with_consumption(ActorConsumption::Used),
        Action::new("Establish Embassy Stay", Embassy)
            .with_ui_name("Establish Embassy (and stay)")
            .with_move_cost(),
        Action::new("Investigate City Spend Unit", Investigate)
            .with_ui_name("Investigate City (spends the unit)")
            .with_consumption(ActorConsumption::Used),
        Action::new("Investigate City", Investigate).with_move_cost(),
        Action::new("Spread Plague", SpreadPlague)
            .with_escape()
            .with_dice_roll(),
        Action::new("Bribe Unit", BribeUnit),
        Action::new("Spy Attack", SpyAttack)
            .with_ui_name("Eliminate Spies")
            .with_target(TargetKind::Tile)
            .with_move_cost(),
    ];
    actions.extend(pair("Poison City", Poison, true));
    actions.extend(pair("Sabotage Unit", SabotageUnit, true));
    actions.extend(pair("Steal Technology", StealTech, false));
    actions.extend(pair("Targeted Steal Technology", StealTechTargeted, false));
    actions.extend(pair("Incite a Revolt", InciteCity, true));
    actions.extend(pair("Sabotage City", SabotageCity, true));
    actions.extend(pair("Targeted Sabotage City", SabotageCityTargeted, true));
    actions.extend(pair("Steal Gold", StealGold, true));
    actions.extend(pair("Steal Maps", StealMaps, true));
    actions.extend(
        pair("Suitcase Nuke", SuitcaseNuke, true)
            .map(|a| a.with_completion_report()),
    );
    actions
}

fn classic_effects() -> Vec<Effect> {
    let foreign_victim = |effect: Effect| {
        effect
            .with_req(Requirement::VictimExists)
            .with_req(Requirement::not(Requirement::VictimIsOffender))
            .with_req(Requirement::not(Requirement::DiplRel {
                status: DiplomaticStatus::War,
            }))
    };

    let mut effects = vec![
        foreign_victim(Effect::new(EffectKind::CasusBelliCaught, 1)),
        foreign_victim(Effect::new(EffectKind::CasusBelliSuccess, 1)),
        foreign_victim(Effect::new(EffectKind::CasusBelliComplete, 1000)),
        Effect::new(EffectKind::SpyResistant, 25).with_req(Requirement::CityHasBuilding {
            building: "Courthouse".to_string(),
        }),
        Effect::new(EffectKind::SaboteurResistant, 50).with_req(Requirement::IsCapital),
        Effect::new(EffectKind::InciteCostPct, 300).with_req(Requirement::CityHasBuilding {
            building: "Courthouse".to_string(),
        }),
        Effect::new(EffectKind::MaxStolenGoldPm, 500),
        Effect::new(EffectKind::ThiefsSharePm, 100).with_req(Requirement::not(
            Requirement::ActorFlag {
                flag: AgentFlag::Spy,
            },
        )),
        Effect::new(EffectKind::MapsStolenPct, 50),
    ];

    // Peaceful missions never give grounds for war.
    for action in [
        "Establish Embassy",
        "Establish Embassy Stay",
        "Investigate City",
        "Investigate City Spend Unit",
    ] {
        effects.push(
            Effect::new(EffectKind::CasusBelliSuccess, -1).with_req(Requirement::Action {
                action: action.to_string(),
            }),
        );
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::City;
    use crate::map::TileCoord;

    #[test]
    fn test_classic_ruleset_is_valid() {
        let ruleset = Ruleset::classic();
        assert!(ruleset.validate().is_ok());
        assert!(ruleset.action("Steal Gold Escape").is_some());
        assert!(ruleset.unit_type("Master Spy").unwrap().flags.superspy);
    }

    #[test]
    fn test_power_fact_saturates() {
        let ruleset = Ruleset::classic();
        assert_eq!(ruleset.power_fact(0), 100);
        assert_eq!(ruleset.power_fact(3), 200);
        assert_eq!(ruleset.power_fact(9), 200);
    }

    #[test]
    fn test_escape_flag_rejected_for_bribe() {
        let mut ruleset = Ruleset::classic();
        ruleset
            .actions
            .push(Action::new("Bribe And Run", ActionResultKind::BribeUnit).with_escape());
        assert_eq!(
            ruleset.validate(),
            Err(RulesetError::EscapeNotAllowed("Bribe And Run".to_string()))
        );
    }

    #[test]
    fn test_target_kind_checked() {
        let mut ruleset = Ruleset::classic();
        ruleset.actions.push(
            Action::new("Odd Bribe", ActionResultKind::BribeUnit).with_target(TargetKind::City),
        );
        assert!(matches!(
            ruleset.validate(),
            Err(RulesetError::TargetKindMismatch { .. })
        ));
    }

    #[test]
    fn test_suitcase_nuke_detonates_its_carrier() {
        let ruleset = Ruleset::classic();
        let nuke = ruleset.action("Suitcase Nuke").unwrap();
        assert_eq!(nuke.consumes_actor, Some(ActorConsumption::Detonate));
        assert!(ruleset.action("Suitcase Nuke Escape").unwrap().consumes_actor.is_none());
        assert_eq!(
            ruleset.action("Poison City").unwrap().consumes_actor,
            Some(ActorConsumption::Used)
        );
    }

    #[test]
    fn test_duplicate_action_rejected() {
        let mut ruleset = Ruleset::classic();
        ruleset
            .actions
            .push(Action::new("Bribe Unit", ActionResultKind::BribeUnit));
        assert!(matches!(
            ruleset.validate(),
            Err(RulesetError::DuplicateId { kind: "action", .. })
        ));
    }

    #[test]
    fn test_casus_belli_bonus() {
        let ruleset = Ruleset::classic();
        let ctx = EffectContext {
            offender: Some(0),
            victim: Some(1),
            action: Some("Steal Gold"),
            ..Default::default()
        };
        assert_eq!(ruleset.bonus(EffectKind::CasusBelliSuccess, &ctx), 1);

        let embassy = EffectContext {
            action: Some("Establish Embassy"),
            ..ctx.clone()
        };
        assert_eq!(ruleset.bonus(EffectKind::CasusBelliSuccess, &embassy), 0);

        let own = EffectContext {
            victim: Some(0),
            ..ctx
        };
        assert_eq!(ruleset.bonus(EffectKind::CasusBelliSuccess, &own), 0);
    }

    #[test]
    fn test_saboteur_resistance_in_capital() {
        let ruleset = Ruleset::classic();
        let mut city = City::new(1, 1, "Carthage", TileCoord::new(0, 0));
        city.is_capital = true;
        let ctx = EffectContext {
            city: Some(&city),
            ..Default::default()
        };
        assert_eq!(ruleset.bonus(EffectKind::SaboteurResistant, &ctx), 50);
    }

    #[test]
    fn test_ruleset_json_roundtrip() {
        let json = serde_json::to_string(&Ruleset::classic()).unwrap();
        let restored = Ruleset::from_json(&json).unwrap();
        assert_eq!(restored.actions.len(), Ruleset::classic().actions.len());
        assert_eq!(restored.techs.len(), 8);
    }
}
