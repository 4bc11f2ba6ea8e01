//! Action descriptors.
//!
//! Actions are loaded with the ruleset and never change while a game runs.
//! The resolution core only reads them: the result kind picks the handler,
//! the remaining fields tune how success is paid for and reported.

use crate::events::WipeReason;
use crate::types::ActionId;
use serde::{Deserialize, Serialize};

/// Which handler resolves an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionResultKind {
    Embassy,
    Investigate,
    Poison,
    SpreadPlague,
    SabotageUnit,
    BribeUnit,
    SpyAttack,
    StealTech,
    StealTechTargeted,
    InciteCity,
    SabotageCity,
    SabotageCityTargeted,
    StealGold,
    StealMaps,
    SuitcaseNuke,
}

impl ActionResultKind {
    /// Target kinds an action with this result may be aimed at.
    pub const fn target_kinds(&self) -> &'static [TargetKind] {
        match self {
            ActionResultKind::SabotageUnit | ActionResultKind::BribeUnit => &[TargetKind::Unit],
            ActionResultKind::SpyAttack => &[TargetKind::Units, TargetKind::Tile],
            _ => &[TargetKind::City],
        }
    }

    /// Can the agent try to slip away after this kind of mission?
    pub const fn can_escape(&self) -> bool {
        !matches!(
            self,
            ActionResultKind::Embassy
                | ActionResultKind::Investigate
                | ActionResultKind::BribeUnit
                | ActionResultKind::SpyAttack
        )
    }

    /// Ways a successful action with this result may spend its actor.
    pub fn allows_consumption(&self, consumption: ActorConsumption) -> bool {
        match consumption {
            ActorConsumption::Disband | ActorConsumption::Used => true,
            ActorConsumption::Detonate | ActorConsumption::MissileExpended => {
                *self == ActionResultKind::SuitcaseNuke
            }
        }
    }
}

/// What an action is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    City,
    Unit,
    /// Every unit on a tile.
    Units,
    Tile,
    SelfTarget,
}

/// Who performs an action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    #[default]
    Unit,
    Player,
}

/// How a successful action spends its actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorConsumption {
    Disband,
    Detonate,
    MissileExpended,
    Used,
}

impl ActorConsumption {
    pub const fn wipe_reason(&self) -> WipeReason {
        match self {
            ActorConsumption::Disband => WipeReason::Disbanded,
            ActorConsumption::Detonate => WipeReason::Detonated,
            ActorConsumption::MissileExpended => WipeReason::Missile,
            ActorConsumption::Used => WipeReason::Used,
        }
    }
}

/// An immutable action descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    /// Name used when the action is mentioned in messages.
    pub ui_name: String,
    pub result: ActionResultKind,
    pub target_kind: TargetKind,
    #[serde(default)]
    pub actor_kind: ActorKind,
    /// Set when success always spends the actor.
    #[serde(default)]
    pub consumes_actor: Option<ActorConsumption>,
    /// Charge a single move on success.
    #[serde(default)]
    pub move_cost_on_success: bool,
    /// The agent tries to escape after the mission.
    #[serde(default)]
    pub escape: bool,
    /// Odds start from the server's `diplchance` instead of certainty.
    #[serde(default)]
    pub dice_roll: bool,
    /// Success is reported as a completed incident.
    #[serde(default)]
    pub reports_completion: bool,
}

impl Action {
    pub fn new(id: &str, result: ActionResultKind) -> Self {
        Self {
            id: id.to_string(),
            ui_name: id.to_string(),
            result,
            target_kind: result.target_kinds()[0],
            actor_kind: ActorKind::Unit,
            consumes_actor: None,
            move_cost_on_success: false,
            escape: false,
            dice_roll: false,
            reports_completion: false,
        }
    }

    pub fn with_ui_name(mut self, name: &str) -> Self {
        self.ui_name = name.to_string();
        self
    }

    pub fn with_target(mut self, target_kind: TargetKind) -> Self {
        self.target_kind = target_kind;
        self
    }

    pub fn with_consumption(mut self, consumption: ActorConsumption) -> Self {
        self.consumes_actor = Some(consumption);
        self
    }

    pub fn with_move_cost(mut self) -> Self {
        self.move_cost_on_success = true;
        self
    }

    pub fn with_escape(mut self) -> Self {
        self.escape = true;
        self
    }

    pub fn with_dice_roll(mut self) -> Self {
        self.dice_roll = true;
        self
    }

    pub fn with_completion_report(mut self) -> Self {
        self.reports_completion = true;
        self
    }

    /// Does success always spend the actor?
    pub fn consumes_actor(&self) -> bool {
        self.consumes_actor.is_some()
    }
}
