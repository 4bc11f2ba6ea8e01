//! Ruleset effects that tune diplomatic actions.
//!
//! An effect adds its value to a named bonus whenever all of its
//! requirements hold in the situation being evaluated. Percent values are
//! plain percent; `*Pm` kinds are per mille.

use crate::city::City;
use crate::diplomacy::DiplomaticStatus;
use crate::map::TileCoord;
use crate::types::{ActionId, BuildingId, PlayerId};
use crate::unit::UnitFlags;
use serde::{Deserialize, Serialize};

/// Bonus kinds the action core reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Casus belli amount for a caught agent. 1 = victim only, 1000 = outrage.
    CasusBelliCaught,
    CasusBelliSuccess,
    CasusBelliComplete,
    /// Percent reduction of an attacking agent's odds in diplomatic battle.
    SpyResistant,
    /// Percent reduction of a building's vulnerability to sabotage.
    SaboteurResistant,
    /// Percent change to action success odds.
    ActionOddsPct,
    UnitBribeCostPct,
    InciteCostPct,
    /// Share of the victim's treasury a thief can take at most.
    MaxStolenGoldPm,
    /// Share of stolen gold the thief keeps for themselves.
    ThiefsSharePm,
    /// Percent of the victim's map that is *not* stolen.
    MapsStolenPct,
}

/// Agent capability flags a requirement can test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentFlag {
    Diplomat,
    Spy,
    Superspy,
}

impl AgentFlag {
    pub const fn is_set(&self, flags: &UnitFlags) -> bool {
        match self {
            AgentFlag::Diplomat => flags.diplomat,
            AgentFlag::Spy => flags.spy,
            AgentFlag::Superspy => flags.superspy,
        }
    }
}

/// Conditions that must be met for an effect to apply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Requirement {
    Always,

    // Action requirements
    Action { action: ActionId },

    // City requirements
    CityHasBuilding { building: BuildingId },
    CityLacksBuilding { building: BuildingId },
    IsCapital,
    IsNotCapital,

    // Relationship between offender and victim
    DiplRel { status: DiplomaticStatus },
    VictimExists,
    VictimIsOffender,

    // Actor requirements
    ActorFlag { flag: AgentFlag },

    // Tile requirements
    TileOwnedByVictim,

    // Compound
    Not { requirement: Box<Requirement> },
}

impl Requirement {
    pub fn not(requirement: Requirement) -> Self {
        Requirement::Not {
            requirement: Box::new(requirement),
        }
    }
}

/// A ruleset effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub value: i32,
    #[serde(default)]
    pub reqs: Vec<Requirement>,
}

impl Effect {
    pub fn new(kind: EffectKind, value: i32) -> Self {
        Self {
            kind,
            value,
            reqs: Vec::new(),
        }
    }

    pub fn with_req(mut self, req: Requirement) -> Self {
        self.reqs.push(req);
        self
    }

    /// Check if this effect's requirements are met in the given context.
    pub fn is_active(&self, ctx: &EffectContext) -> bool {
        self.reqs.iter().all(|r| ctx.satisfies(r))
    }
}

/// The situation an effect is evaluated in. Unset parts fail positive
/// requirements about them.
#[derive(Clone, Debug, Default)]
pub struct EffectContext<'a> {
    pub offender: Option<PlayerId>,
    pub victim: Option<PlayerId>,
    pub action: Option<&'a str>,
    pub city: Option<&'a City>,
    pub tile: Option<TileCoord>,
    pub tile_owner: Option<PlayerId>,
    pub actor_flags: Option<UnitFlags>,
    /// Offender's treaty status with the victim.
    pub dipl_status: Option<DiplomaticStatus>,
}

impl<'a> EffectContext<'a> {
    pub fn satisfies(&self, req: &Requirement) -> bool {
        match req {
            Requirement::Always => true,

            Requirement::Action { action } => self.action == Some(action.as_str()),

            Requirement::CityHasBuilding { building } => {
                self.city.map_or(false, |c| c.has_building(building))
            }
            Requirement::CityLacksBuilding { building } => {
                self.city.map_or(true, |c| !c.has_building(building))
            }
            Requirement::IsCapital => self.city.map_or(false, |c| c.is_capital),
            Requirement::IsNotCapital => self.city.map_or(true, |c| !c.is_capital),

            Requirement::DiplRel { status } => self.dipl_status == Some(*status),
            Requirement::VictimExists => self.victim.is_some(),
            Requirement::VictimIsOffender => {
                self.victim.is_some() && self.victim == self.offender
            }

            Requirement::ActorFlag { flag } => {
                self.actor_flags.map_or(false, |f| flag.is_set(&f))
            }

            Requirement::TileOwnedByVictim => {
                self.tile_owner.is_some() && self.tile_owner == self.victim
            }

            Requirement::Not { requirement } => !self.satisfies(requirement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_requirements_without_city() {
        let ctx = EffectContext::default();
        assert!(!ctx.satisfies(&Requirement::IsCapital));
        assert!(ctx.satisfies(&Requirement::IsNotCapital));
        assert!(ctx.satisfies(&Requirement::CityLacksBuilding {
            building: "City Walls".to_string()
        }));
    }

    #[test]
    fn test_victim_requirements() {
        let ctx = EffectContext {
            offender: Some(0),
            victim: Some(0),
            ..Default::default()
        };
        assert!(ctx.satisfies(&Requirement::VictimIsOffender));
        assert!(!ctx.satisfies(&Requirement::not(Requirement::VictimExists)));

        let ownerless = EffectContext {
            offender: Some(0),
            ..Default::default()
        };
        assert!(!ownerless.satisfies(&Requirement::VictimIsOffender));
        assert!(!ownerless.satisfies(&Requirement::TileOwnedByVictim));
    }

    #[test]
    fn test_effect_active_requires_all() {
        let capital = {
            let mut city = City::new(1, 1, "Carthage", TileCoord::new(0, 0));
            city.is_capital = true;
            city
        };
        let effect = Effect::new(EffectKind::SaboteurResistant, 50)
            .with_req(Requirement::IsCapital)
            .with_req(Requirement::Action {
                action: "Sabotage City".to_string(),
            });

        let mut ctx = EffectContext {
            city: Some(&capital),
            ..Default::default()
        };
        assert!(!effect.is_active(&ctx));
        ctx.action = Some("Sabotage City");
        assert!(effect.is_active(&ctx));
    }

    #[test]
    fn test_requirement_serde_tagged() {
        let json = r#"{ "type": "ActorFlag", "flag": "Spy" }"#;
        let req: Requirement = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            Requirement::ActorFlag {
                flag: AgentFlag::Spy
            }
        );
    }
}
