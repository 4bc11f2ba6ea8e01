//! Intrigue Core Library
//!
//! Resolution of diplomat and spy actions for a turn-based strategy game
//! server: embassies, investigations, poisoning, sabotage, bribery, theft,
//! revolts and suitcase nukes.
//!
//! # Design Principles
//!
//! - **No I/O**: results go into an [`Outbox`] the server drains
//! - **Deterministic**: all chance goes through the [`Dice`] trait
//! - **Serializable**: world, ruleset and settings are plain serde data
//! - **Explicit context**: every call borrows the world through an
//!   [`ActionContext`]; nothing is global

// Core modules
pub mod map;
pub mod types;

// World state
pub mod city;
pub mod diplomacy;
pub mod player;
pub mod technology;
pub mod unit;
pub mod world;

// Rules and configuration
pub mod action;
pub mod effects;
pub mod ruleset;
pub mod settings;

// Resolution
pub mod consequence;
pub mod cost;
pub mod dice;
pub mod diplomats;
pub mod dispatch;
pub mod error;
pub mod events;

// Re-exports for convenience
pub use action::{Action, ActionResultKind, ActorConsumption, ActorKind, TargetKind};
pub use city::{Building, City, ProductionItem};
pub use diplomacy::{DiplState, DiplomacyState, DiplomaticStatus};
pub use dice::{Dice, ScriptedDice, SeededDice};
pub use diplomats::{
    attempt_escape, bribe_unit, establish_embassy, incite_city, infiltrate_tile,
    investigate_city, poison_city, sabotage_city, sabotage_unit, spread_plague, spy_attack,
    steal_gold, steal_maps, steal_tech, success_vs_defender, suitcase_nuke, ActionContext,
    Escape, Infiltration, SabotageTarget,
};
pub use dispatch::{execute, ActionRequest};
pub use effects::{AgentFlag, Effect, EffectContext, EffectKind, Requirement};
pub use error::ActionError;
pub use events::{
    CasusBelliRange, Dispatch, EventKind, Incident, IncidentClass, Message, Notice, Outbox,
    VictimLink, WipeReason,
};
pub use map::{Map, Terrain, Tile, TileCoord};
pub use player::Player;
pub use ruleset::{Ruleset, RulesetError};
pub use settings::{ServerSettings, SettingsError};
pub use technology::{TechTree, Technology};
pub use types::*;
pub use unit::{Unit, UnitFlags, UnitType, VeteranLevel};
pub use world::World;
