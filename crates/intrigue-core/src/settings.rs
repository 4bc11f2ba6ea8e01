//! Server settings that tune diplomatic action resolution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-wide knobs read by the action core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base chance (percent) for diplomat dice rolls and escapes.
    pub diplchance: u32,
    /// Base gold cost of bribing a unit.
    pub base_bribe_cost: u32,
    /// Base gold cost of inciting a city.
    pub base_incite_cost: u32,
    /// Incite cost weight of city improvements.
    pub incite_improvement_factor: u32,
    /// Incite cost weight of units in and supported by the city.
    pub incite_unit_factor: u32,
    /// Overall incite cost multiplier.
    pub incite_total_factor: u32,
    /// Poisoning also empties the food box.
    pub poison_empties_food_stock: bool,
    /// Plague is enabled; without it spreading plague is impossible.
    pub illness_on: bool,
    /// Allow stealing technologies whose prerequisites the thief lacks.
    pub tech_steal_allow_holes: bool,
    /// Percent of current research lost when stealing a tech.
    pub diplbulbcost: u32,
    /// Radius of a suitcase nuke blast, in tiles.
    pub nuke_radius: u32,
    /// Distance cap used in unit bribe costs.
    pub unit_bribe_dist_max: u32,
    /// Distance cap used in city incite costs.
    pub incite_dist_max: u32,
    /// Turns a casus belli stays valid.
    pub casus_belli_turns: u8,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            diplchance: 80,
            base_bribe_cost: 750,
            base_incite_cost: 1000,
            incite_improvement_factor: 1,
            incite_unit_factor: 2,
            incite_total_factor: 100,
            poison_empties_food_stock: false,
            illness_on: true,
            tech_steal_allow_holes: true,
            diplbulbcost: 0,
            nuke_radius: 1,
            unit_bribe_dist_max: 32,
            incite_dist_max: 32,
            casus_belli_turns: 2,
        }
    }
}

impl ServerSettings {
    /// Parse settings from JSON and validate them. Missing fields take
    /// their default values.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: ServerSettings =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings and return the first error found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.diplchance > 100 {
            return Err(SettingsError::PercentOutOfRange {
                name: "diplchance",
                value: self.diplchance,
            });
        }
        if self.diplbulbcost > 100 {
            return Err(SettingsError::PercentOutOfRange {
                name: "diplbulbcost",
                value: self.diplbulbcost,
            });
        }
        if self.incite_total_factor == 0 {
            return Err(SettingsError::ZeroFactor("incite_total_factor"));
        }
        if self.casus_belli_turns == 0 {
            return Err(SettingsError::ZeroFactor("casus_belli_turns"));
        }
        Ok(())
    }
}

/// Errors from invalid server settings.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{name} must be between 0 and 100, got {value}")]
    PercentOutOfRange { name: &'static str, value: u32 },
    #[error("{0} must be greater than zero")]
    ZeroFactor(&'static str),
    #[error("Invalid settings: {0}")]
    Parse(String),
}
