//! Technology tree, as far as technology theft needs it.

use crate::types::TechId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A technology in the tech tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    pub id: TechId,
    /// Research cost in bulbs.
    pub cost: u32,
    /// Technologies required before this can be researched.
    #[serde(default)]
    pub prerequisites: Vec<TechId>,
}

impl Technology {
    pub fn new(id: &str, cost: u32) -> Self {
        Self {
            id: id.to_string(),
            cost,
            prerequisites: Vec::new(),
        }
    }

    pub fn with_prerequisites(mut self, prereqs: &[&str]) -> Self {
        self.prerequisites = prereqs.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// The complete technology tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Technology>", into = "Vec<Technology>")]
pub struct TechTree {
    techs: BTreeMap<TechId, Technology>,
}

impl From<Vec<Technology>> for TechTree {
    fn from(techs: Vec<Technology>) -> Self {
        Self {
            techs: techs.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }
}

impl From<TechTree> for Vec<Technology> {
    fn from(tree: TechTree) -> Self {
        tree.techs.into_values().collect()
    }
}

impl TechTree {
    pub fn get(&self, id: &str) -> Option<&Technology> {
        self.techs.get(id)
    }

    pub fn len(&self) -> usize {
        self.techs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.techs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.techs.values()
    }

    /// Check if prerequisites are met for a technology.
    pub fn can_research(&self, tech_id: &str, researched: &BTreeSet<TechId>) -> bool {
        self.techs
            .get(tech_id)
            .map(|tech| {
                tech.prerequisites
                    .iter()
                    .all(|prereq| researched.contains(prereq))
            })
            .unwrap_or(false)
    }

    /// Can `thief` obtain `tech_id` by stealing it from someone who knows it?
    ///
    /// With `allow_holes` any unknown technology may be taken; otherwise
    /// the thief must already know its prerequisites.
    pub fn is_gettable(&self, tech_id: &str, thief: &BTreeSet<TechId>, allow_holes: bool) -> bool {
        if thief.contains(tech_id) || self.techs.get(tech_id).is_none() {
            return false;
        }
        allow_holes || self.can_research(tech_id, thief)
    }

    /// Technologies `victim` knows that `thief` could take, in id order.
    pub fn stealable<'a>(
        &'a self,
        victim: &'a BTreeSet<TechId>,
        thief: &'a BTreeSet<TechId>,
        allow_holes: bool,
    ) -> Vec<&'a TechId> {
        victim
            .iter()
            .filter(|id| self.is_gettable(id, thief, allow_holes))
            .collect()
    }
}
