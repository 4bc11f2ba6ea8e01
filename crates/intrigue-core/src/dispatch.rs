//! Wire requests for diplomatic actions.
//!
//! The transport layer hands the core one [`ActionRequest`] per unit order.
//! [`execute`] looks the action up in the ruleset and runs the matching
//! mission; the action must resolve the way the request says or the call
//! fails with [`ActionError::WrongHandler`] before anything changes.

use crate::diplomats::{self, ActionContext, SabotageTarget};
use crate::error::ActionError;
use crate::map::TileCoord;
use crate::types::{ActionId, CityId, PlayerId, TechId, UnitId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One diplomatic order from a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionRequest {
    // Peaceful missions
    EstablishEmbassy {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
    },
    InvestigateCity {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
    },

    // Missions against cities
    PoisonCity {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
    },
    SpreadPlague {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
    },
    StealTech {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
        /// Wanted technology, for targeted thefts.
        #[serde(default)]
        tech_id: Option<TechId>,
    },
    InciteCity {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
    },
    SabotageCity {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
        #[serde(default)]
        target: SabotageTarget,
    },
    StealGold {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
    },
    StealMaps {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
    },
    SuitcaseNuke {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        city_id: CityId,
    },

    // Missions against units
    SabotageUnit {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        target_id: UnitId,
    },
    BribeUnit {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        target_id: UnitId,
    },
    SpyAttack {
        player_id: PlayerId,
        agent_id: UnitId,
        action_id: ActionId,
        tile: TileCoord,
    },
}

impl ActionRequest {
    /// The player giving the order.
    pub fn player(&self) -> PlayerId {
        match self {
            ActionRequest::EstablishEmbassy { player_id, .. }
            | ActionRequest::InvestigateCity { player_id, .. }
            | ActionRequest::PoisonCity { player_id, .. }
            | ActionRequest::SpreadPlague { player_id, .. }
            | ActionRequest::StealTech { player_id, .. }
            | ActionRequest::InciteCity { player_id, .. }
            | ActionRequest::SabotageCity { player_id, .. }
            | ActionRequest::StealGold { player_id, .. }
            | ActionRequest::StealMaps { player_id, .. }
            | ActionRequest::SuitcaseNuke { player_id, .. }
            | ActionRequest::SabotageUnit { player_id, .. }
            | ActionRequest::BribeUnit { player_id, .. }
            | ActionRequest::SpyAttack { player_id, .. } => *player_id,
        }
    }

    /// The acting unit.
    pub fn agent(&self) -> UnitId {
        match self {
            ActionRequest::EstablishEmbassy { agent_id, .. }
            | ActionRequest::InvestigateCity { agent_id, .. }
            | ActionRequest::PoisonCity { agent_id, .. }
            | ActionRequest::SpreadPlague { agent_id, .. }
            | ActionRequest::StealTech { agent_id, .. }
            | ActionRequest::InciteCity { agent_id, .. }
            | ActionRequest::SabotageCity { agent_id, .. }
            | ActionRequest::StealGold { agent_id, .. }
            | ActionRequest::StealMaps { agent_id, .. }
            | ActionRequest::SuitcaseNuke { agent_id, .. }
            | ActionRequest::SabotageUnit { agent_id, .. }
            | ActionRequest::BribeUnit { agent_id, .. }
            | ActionRequest::SpyAttack { agent_id, .. } => *agent_id,
        }
    }

    /// Ruleset id of the requested action.
    pub fn action_id(&self) -> &str {
        match self {
            ActionRequest::EstablishEmbassy { action_id, .. }
            | ActionRequest::InvestigateCity { action_id, .. }
            | ActionRequest::PoisonCity { action_id, .. }
            | ActionRequest::SpreadPlague { action_id, .. }
            | ActionRequest::StealTech { action_id, .. }
            | ActionRequest::InciteCity { action_id, .. }
            | ActionRequest::SabotageCity { action_id, .. }
            | ActionRequest::StealGold { action_id, .. }
            | ActionRequest::StealMaps { action_id, .. }
            | ActionRequest::SuitcaseNuke { action_id, .. }
            | ActionRequest::SabotageUnit { action_id, .. }
            | ActionRequest::BribeUnit { action_id, .. }
            | ActionRequest::SpyAttack { action_id, .. } => action_id,
        }
    }
}

/// Resolve one request. See the [`diplomats`] functions for what the
/// boolean means for each mission.
pub fn execute(ctx: &mut ActionContext, request: &ActionRequest) -> Result<bool, ActionError> {
    let ruleset = ctx.ruleset;
    let action = ruleset
        .action(request.action_id())
        .ok_or_else(|| ActionError::UnknownAction(request.action_id().to_string()))?;
    let player = request.player();
    let agent = request.agent();
    debug!(player, agent, action = %action.id, "executing action request");

    match request {
        ActionRequest::EstablishEmbassy { city_id, .. } => {
            diplomats::establish_embassy(ctx, player, agent, *city_id, action)
        }
        ActionRequest::InvestigateCity { city_id, .. } => {
            diplomats::investigate_city(ctx, player, agent, *city_id, action)
        }
        ActionRequest::PoisonCity { city_id, .. } => {
            diplomats::poison_city(ctx, player, agent, *city_id, action)
        }
        ActionRequest::SpreadPlague { city_id, .. } => {
            diplomats::spread_plague(ctx, player, agent, *city_id, action)
        }
        ActionRequest::StealTech {
            city_id, tech_id, ..
        } => diplomats::steal_tech(ctx, player, agent, *city_id, tech_id.as_deref(), action),
        ActionRequest::InciteCity { city_id, .. } => {
            diplomats::incite_city(ctx, player, agent, *city_id, action)
        }
        ActionRequest::SabotageCity {
            city_id, target, ..
        } => diplomats::sabotage_city(ctx, player, agent, *city_id, target.clone(), action),
        ActionRequest::StealGold { city_id, .. } => {
            diplomats::steal_gold(ctx, player, agent, *city_id, action)
        }
        ActionRequest::StealMaps { city_id, .. } => {
            diplomats::steal_maps(ctx, player, agent, *city_id, action)
        }
        ActionRequest::SuitcaseNuke { city_id, .. } => {
            diplomats::suitcase_nuke(ctx, player, agent, *city_id, action)
        }
        ActionRequest::SabotageUnit { target_id, .. } => {
            diplomats::sabotage_unit(ctx, player, agent, *target_id, action)
        }
        ActionRequest::BribeUnit { target_id, .. } => {
            diplomats::bribe_unit(ctx, player, agent, *target_id, action)
        }
        ActionRequest::SpyAttack { tile, .. } => {
            diplomats::spy_attack(ctx, player, agent, *tile, action)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionResultKind;
    use crate::diplomats::testkit::*;

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "type": "SabotageCity",
            "player_id": 0,
            "agent_id": 7,
            "action_id": "Targeted Sabotage City",
            "city_id": 2,
            "target": { "Building": "Temple" }
        }"#;
        let request: ActionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.player(), 0);
        assert_eq!(request.agent(), 7);
        assert_eq!(request.action_id(), "Targeted Sabotage City");
        assert!(matches!(
            request,
            ActionRequest::SabotageCity {
                target: SabotageTarget::Building(ref b),
                ..
            } if b == "Temple"
        ));
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{"type":"StealTech","player_id":0,"agent_id":1,"action_id":"Steal Technology","city_id":2}"#;
        let request: ActionRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(request, ActionRequest::StealTech { tech_id: None, .. }));
    }

    #[test]
    fn test_execute_routes_to_mission() {
        let mut fx = Fixture::new();
        let carthage = fx.carthage();
        let agent = fx.spawn(ROMANS, "Diplomat", BESIDE);
        let request = ActionRequest::EstablishEmbassy {
            player_id: ROMANS,
            agent_id: agent,
            action_id: "Establish Embassy Stay".to_string(),
            city_id: carthage,
        };

        assert_eq!(execute(&mut fx.ctx(), &request), Ok(true));
        assert!(fx
            .world
            .player(ROMANS)
            .unwrap()
            .has_embassy_with(CARTHAGINIANS));
    }

    #[test]
    fn test_unknown_action() {
        let mut fx = Fixture::new();
        let request = ActionRequest::StealGold {
            player_id: ROMANS,
            agent_id: 1,
            action_id: "Steal Everything".to_string(),
            city_id: 1,
        };
        assert_eq!(
            execute(&mut fx.ctx(), &request),
            Err(ActionError::UnknownAction("Steal Everything".to_string()))
        );
    }

    #[test]
    fn test_mismatched_action_changes_nothing() {
        let mut fx = Fixture::new();
        fx.world.player_mut(CARTHAGINIANS).unwrap().gold = 100;
        let carthage = fx.carthage();
        let agent = fx.spawn(ROMANS, "Spy", BESIDE);
        let request = ActionRequest::StealGold {
            player_id: ROMANS,
            agent_id: agent,
            action_id: "Poison City".to_string(),
            city_id: carthage,
        };

        assert_eq!(
            execute(&mut fx.ctx(), &request),
            Err(ActionError::WrongHandler {
                action: "Poison City".to_string(),
                expected: ActionResultKind::StealGold,
            })
        );
        assert_eq!(fx.world.player(CARTHAGINIANS).unwrap().gold, 100);
        assert!(fx.outbox.is_empty());
        assert_eq!(fx.dice.rolls(), 0);
    }
}
