//! Errors returned by action entry points.
//!
//! These report misuse of the API. Game outcomes such as a caught agent or
//! a poor player are not errors: they come back as `Ok(false)`.

use crate::action::{ActionResultKind, TargetKind};
use crate::types::{ActionId, CityId, PlayerId, UnitId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),
    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),
    #[error("Unknown city: {0}")]
    UnknownCity(CityId),
    #[error("Unknown action: {0}")]
    UnknownAction(ActionId),
    #[error("Action {action} cannot be resolved as {expected:?}")]
    WrongHandler {
        action: ActionId,
        expected: ActionResultKind,
    },
    #[error("Action {0} has no escape step")]
    NotEscapeAction(ActionId),
    #[error("Action {action} does not target {target:?}")]
    TargetKindMismatch { action: ActionId, target: TargetKind },
    #[error("Unit {unit} is not owned by player {player}")]
    NotOwner { unit: UnitId, player: PlayerId },
}

impl serde::Serialize for ActionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
