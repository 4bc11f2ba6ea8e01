//! Diplomatic state between players.
//!
//! Unlike treaty status, grounds for war are not symmetric: a casus belli is
//! held by one player *against* another. State is therefore stored per
//! ordered pair `(holder, against)`.

use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Treaty status between two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DiplomaticStatus {
    War,
    Ceasefire,
    Armistice,
    #[default]
    Peace,
    Alliance,
    NoContact,
    Team,
}

impl DiplomaticStatus {
    pub const fn is_allied(&self) -> bool {
        matches!(self, DiplomaticStatus::Alliance | DiplomaticStatus::Team)
    }
}

/// One side's view of its relationship with another player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiplState {
    pub status: DiplomaticStatus,
    /// Turns left during which the holder may cancel treaties without
    /// penalty. Non-zero means the holder has a casus belli.
    pub has_reason_to_cancel: u8,
}

/// Diplomatic state for every ordered pair of players.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiplomacyState {
    /// Serialized as a sequence of key-value pairs since JSON requires string keys.
    #[serde(with = "tuple_key_map")]
    states: BTreeMap<(PlayerId, PlayerId), DiplState>,
}

mod tuple_key_map {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(
        map: &BTreeMap<(PlayerId, PlayerId), DiplState>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(map.len()))?;
        for (key, value) in map {
            seq.serialize_element(&(key, value))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<(PlayerId, PlayerId), DiplState>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<((PlayerId, PlayerId), DiplState)> =
            Deserialize::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

impl DiplomacyState {
    /// `holder`'s view of `against`; default peace when never recorded.
    pub fn get(&self, holder: PlayerId, against: PlayerId) -> DiplState {
        self.states
            .get(&(holder, against))
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_mut(&mut self, holder: PlayerId, against: PlayerId) -> &mut DiplState {
        self.states.entry((holder, against)).or_default()
    }

    /// Set the treaty status symmetrically.
    pub fn set_status(&mut self, a: PlayerId, b: PlayerId, status: DiplomaticStatus) {
        self.get_mut(a, b).status = status;
        self.get_mut(b, a).status = status;
    }

    /// Players are allied with themselves.
    pub fn are_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        a == b || self.get(a, b).status.is_allied()
    }

    pub fn are_at_war(&self, a: PlayerId, b: PlayerId) -> bool {
        a != b && self.get(a, b).status == DiplomaticStatus::War
    }

    /// Give `holder` grounds to cancel treaties with `against`.
    pub fn grant_casus_belli(&mut self, holder: PlayerId, against: PlayerId, turns: u8) {
        self.get_mut(holder, against).has_reason_to_cancel = turns;
    }

    pub fn has_casus_belli(&self, holder: PlayerId, against: PlayerId) -> bool {
        self.get(holder, against).has_reason_to_cancel > 0
    }
}
