//! Core type aliases used throughout the crate.

/// Player index into the world's player list.
pub type PlayerId = u8;

/// Unique identifier for a unit. Never reused within a game.
pub type UnitId = u64;

/// Unique identifier for a city. Never reused within a game.
pub type CityId = u64;

/// Game turn number.
pub type Turn = u32;

/// Ruleset name of a unit type (e.g. "Spy").
pub type UnitTypeId = String;

/// Ruleset name of a city improvement (e.g. "City Walls").
pub type BuildingId = String;

/// Ruleset name of a technology (e.g. "Writing").
pub type TechId = String;

/// Ruleset name of an action (e.g. "Steal Gold Escape").
pub type ActionId = String;

/// Movement fragments per whole move (movement is stored x10 for precision).
pub const SINGLE_MOVE: u32 = 10;
