//! Outbound records produced while resolving actions.
//!
//! The action core never talks to clients directly. Every handler pushes
//! typed [`Dispatch`] records into an [`Outbox`]; the transport layer drains
//! it after the call returns and renders notices through `Display`.

use crate::city::City;
use crate::map::TileCoord;
use crate::types::{ActionId, CityId, PlayerId, UnitId};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a unit left the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WipeReason {
    Disbanded,
    Detonated,
    Missile,
    Used,
    Caught,
    Eliminated,
    Killed,
    Bribed,
    Executed,
    CityLost,
}

/// Event class of a diplomatic incident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentClass {
    Caught,
    Success,
    Complete,
}

/// Who is given grounds for war by an incident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CasusBelliRange {
    None,
    VictimOnly,
    InternationalOutrage,
}

/// Event categories, used by clients to filter and colour notices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    MyDiplomatSuccess,
    MyDiplomatFailed,
    MyDiplomatEmbassy,
    MyDiplomatPoison,
    MyDiplomatSabotage,
    MyDiplomatTheft,
    MyDiplomatBribe,
    MyDiplomatIncite,
    MyDiplomatEscape,
    EnemyDiplomatFailed,
    EnemyDiplomatEmbassy,
    EnemyDiplomatPoison,
    EnemyDiplomatSabotage,
    EnemyDiplomatTheft,
    EnemyDiplomatBribe,
    EnemyDiplomatIncite,
    UnitPromoted,
    UnitLost,
    DiplomaticIncident,
    ActionFailed,
    CityPlague,
    NuclearDetonation,
}

/// Where an incident happened, phrased for messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictimLink {
    City { name: String },
    Unit { unit_type: String, tile: TileCoord },
    Units { tile: TileCoord },
    Tile { tile: TileCoord },
    None,
}

impl VictimLink {
    pub fn is_none(&self) -> bool {
        matches!(self, VictimLink::None)
    }
}

impl fmt::Display for VictimLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VictimLink::City { name } => write!(f, "{}", name),
            VictimLink::Unit { unit_type, tile } => write!(f, "{} {}", unit_type, tile),
            VictimLink::Units { tile } => write!(f, "units at {}", tile),
            VictimLink::Tile { tile } => write!(f, "{}", tile),
            VictimLink::None => Ok(()),
        }
    }
}

/// Whose point of view an incident message is phrased from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    Offender,
    Victim,
    ThirdParty,
}

/// Notice text with its fields kept apart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Incident {
        class: IncidentClass,
        audience: Audience,
        action: String,
        /// Offender nation, plural.
        offender: String,
        /// Victim nation adjective; `None` when the victim has no owner.
        victim: Option<String>,
        link: VictimLink,
    },

    // Diplomatic battles
    DefenderEliminated { defender: String, agent: String },
    LostDefender { defender: String, nation: String, agent: String, link: VictimLink },
    TargetDefended { nation: String, agent: String, link: VictimLink },
    AgentEliminated { agent: String, nation: String, defender: String, link: VictimLink },
    RepelledAgent { defender: String, nation: String, agent: String, link: VictimLink },
    Promoted { unit: String, level: String },

    // Caught after infiltrating
    AgentCaught { agent: String, action: String },
    CaughtEnemyAgent { nation: String, agent: String, action: String, link: VictimLink },

    // Escape
    AgentEscaped { agent: String, city: String },
    AgentCaptured { agent: String, link: VictimLink },

    // Embassy and investigation
    AlreadyHaveEmbassy { nation: String },
    AgentExecuted { agent: String, nation: String },
    EmbassyEstablished { city: String },
    EmbassyEstablishedBy { nation: String, city: String },
    CityInvestigated { agent: String, city: String },

    // Poison and plague
    WaterPoisoned { agent: String, city: String },
    WaterPoisonedBy { nation: String, city: String },
    CityDestroyedByPoison { agent: String, city: String },
    CityDestroyedByPoisonBy { nation: String, city: String },
    PlagueSpread { agent: String, city: String },
    PlagueSpreadBy { nation: String, city: String },

    // Units
    UnitSabotaged { agent: String, unit: String },
    UnitSabotagedBy { nation: String, unit: String },
    TargetTooWeak { unit: String },
    NotEnoughGoldToBribe { unit: String, cost: i32 },
    UnitBribed { agent: String, unit: String },
    UnitBribedBy { nation: String, unit: String },
    NoDefenders { link: VictimLink },
    DefendersEliminated { agent: String, link: VictimLink },
    UnitNuked { unit: String, tile: TileCoord },

    // Technology
    TechStolen { agent: String, tech: String, city: String },
    TechStolenBy { nation: String, tech: String, city: String },
    TechAcquired { tech: String, nation: String },
    NoTechToSteal { agent: String, city: String },
    TechNotStealable { tech: String, city: String },

    // Revolt
    NotEnoughGoldToIncite { city: String, cost: i32 },
    CityIncited { city: String },
    CityRevolted { nation: String, city: String },

    // Sabotage
    NothingToSabotage { agent: String, city: String },
    BuildingNotFound { agent: String, building: String, city: String },
    ProductionDestroyed { agent: String, production: String, city: String },
    ProductionDestroyedBy { nation: String, production: String, city: String },
    BuildingDestroyed { agent: String, building: String, city: String },
    BuildingDestroyedBy { nation: String, building: String, city: String },

    // Gold and maps
    GoldStolen { agent: String, amount: i32, city: String },
    GoldStolenBy { nation: String, amount: i32, city: String },
    MapsStolen { agent: String, city: String },
    MapsStolenBy { nation: String, city: String },

    // Suitcase nuke
    DeviceHidden { agent: String, city: String },
    CityNukedBy { nation: String, city: String },
    NuclearExplosion { tile: TileCoord },
}

impl IncidentClass {
    fn verb(&self) -> &'static str {
        match self {
            IncidentClass::Caught => "getting caught trying to do",
            IncidentClass::Success => "doing",
            IncidentClass::Complete => "completing",
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Incident {
                class,
                audience,
                action,
                offender,
                victim,
                link,
            } => {
                let subject = match audience {
                    Audience::Offender => "You have".to_string(),
                    Audience::Victim | Audience::ThirdParty => format!("The {} have", offender),
                };
                write!(f, "{} caused an incident {} {}", subject, class.verb(), action)?;
                if !link.is_none() {
                    match (audience, victim) {
                        (Audience::Victim, _) => write!(f, " to your {}", link)?,
                        (_, Some(adjective)) => write!(f, " to {} {}", adjective, link)?,
                        (_, None) => write!(f, " to {}", link)?,
                    }
                }
                write!(f, ".")
            }

            Message::DefenderEliminated { defender, agent } => {
                write!(f, "An enemy {} has been eliminated by your {}.", defender, agent)
            }
            Message::LostDefender {
                defender,
                nation,
                agent,
                link,
            } => write!(
                f,
                "Your {} has been eliminated defending {} against a {} {}.",
                defender, link, nation, agent
            ),
            Message::TargetDefended { nation, agent, link } => write!(
                f,
                "A {} {} fought its way past the defenders of {}.",
                nation, agent, link
            ),
            Message::AgentEliminated {
                agent,
                nation,
                defender,
                link,
            } => write!(
                f,
                "Your {} was eliminated by a defending {} {} at {}.",
                agent, nation, defender, link
            ),
            Message::RepelledAgent {
                defender,
                nation,
                agent,
                link,
            } => write!(
                f,
                "Your {} eliminated a {} {} while infiltrating {}.",
                defender, nation, agent, link
            ),
            Message::Promoted { unit, level } => {
                write!(f, "Your {} has become {}.", unit, level)
            }

            Message::AgentCaught { agent, action } => {
                write!(f, "Your {} was caught attempting to do {}!", agent, action)
            }
            Message::CaughtEnemyAgent {
                nation,
                agent,
                action,
                link,
            } => write!(
                f,
                "You caught a {} {} attempting to do {} in {}!",
                nation, agent, action, link
            ),

            Message::AgentEscaped { agent, city } => write!(
                f,
                "Your {} has successfully completed the mission and returned unharmed to {}.",
                agent, city
            ),
            Message::AgentCaptured { agent, link } => {
                if link.is_none() {
                    write!(f, "Your {} was captured after completing the mission.", agent)
                } else {
                    write!(
                        f,
                        "Your {} was captured after completing the mission in {}.",
                        agent, link
                    )
                }
            }

            Message::AlreadyHaveEmbassy { nation } => {
                write!(f, "You already have an embassy with the {}.", nation)
            }
            Message::AgentExecuted { agent, nation } => {
                write!(f, "Your {} was executed by the {}.", agent, nation)
            }
            Message::EmbassyEstablished { city } => {
                write!(f, "You have established an embassy in {}.", city)
            }
            Message::EmbassyEstablishedBy { nation, city } => {
                write!(f, "The {} have established an embassy in {}.", nation, city)
            }
            Message::CityInvestigated { agent, city } => {
                write!(f, "Your {} has investigated {}.", agent, city)
            }

            Message::WaterPoisoned { agent, city } => {
                write!(f, "Your {} poisoned the water supply of {}.", agent, city)
            }
            Message::WaterPoisonedBy { nation, city } => write!(
                f,
                "The {} are suspected of poisoning the water supply of {}.",
                nation, city
            ),
            Message::CityDestroyedByPoison { agent, city } => write!(
                f,
                "Your {} destroyed {} by poisoning its water supply.",
                agent, city
            ),
            Message::CityDestroyedByPoisonBy { nation, city } => write!(
                f,
                "{} is destroyed by poisoned water. The {} are suspected.",
                city, nation
            ),
            Message::PlagueSpread { agent, city } => {
                write!(f, "Your {} spread the plague in {}.", agent, city)
            }
            Message::PlagueSpreadBy { nation, city } => write!(
                f,
                "Illness strikes {}. The {} are suspected of spreading it.",
                city, nation
            ),

            Message::UnitSabotaged { agent, unit } => {
                write!(f, "Your {} succeeded in sabotaging the {}.", agent, unit)
            }
            Message::UnitSabotagedBy { nation, unit } => {
                write!(f, "Your {} was sabotaged by the {}.", unit, nation)
            }
            Message::TargetTooWeak { unit } => {
                write!(f, "The {} is too weak to be sabotaged.", unit)
            }
            Message::NotEnoughGoldToBribe { unit, cost } => write!(
                f,
                "You don't have enough gold to bribe the {} ({} gold).",
                unit, cost
            ),
            Message::UnitBribed { agent, unit } => {
                write!(f, "Your {} succeeded in bribing the {}.", agent, unit)
            }
            Message::UnitBribedBy { nation, unit } => {
                write!(f, "Your {} was bribed by the {}.", unit, nation)
            }
            Message::NoDefenders { link } => {
                write!(f, "There are no diplomatic defenders at {}.", link)
            }
            Message::DefendersEliminated { agent, link } => write!(
                f,
                "Your {} eliminated every diplomatic defender at {}.",
                agent, link
            ),
            Message::UnitNuked { unit, tile } => {
                write!(f, "Your {} was destroyed by the blast at {}.", unit, tile)
            }

            Message::TechStolen { agent, tech, city } => {
                write!(f, "Your {} stole {} from {}.", agent, tech, city)
            }
            Message::TechStolenBy { nation, tech, city } => {
                write!(f, "The {} stole {} from {}.", nation, tech, city)
            }
            Message::TechAcquired { tech, nation } => {
                write!(f, "You acquire {} from the {}.", tech, nation)
            }
            Message::NoTechToSteal { agent, city } => write!(
                f,
                "Your {} could not find any new technology to steal in {}.",
                agent, city
            ),
            Message::TechNotStealable { tech, city } => {
                write!(f, "{} cannot be stolen from {}.", tech, city)
            }

            Message::NotEnoughGoldToIncite { city, cost } => write!(
                f,
                "You don't have enough gold to subvert {} ({} gold).",
                city, cost
            ),
            Message::CityIncited { city } => {
                write!(f, "Revolt incited in {}, you now rule the city!", city)
            }
            Message::CityRevolted { nation, city } => {
                write!(f, "{} has revolted, {} influence suspected.", city, nation)
            }

            Message::NothingToSabotage { agent, city } => write!(
                f,
                "Your {} could not find anything to sabotage in {}.",
                agent, city
            ),
            Message::BuildingNotFound {
                agent,
                building,
                city,
            } => write!(
                f,
                "Your {} could not find the {} to sabotage in {}.",
                agent, building, city
            ),
            Message::ProductionDestroyed {
                agent,
                production,
                city,
            } => write!(
                f,
                "Your {} succeeded in destroying the production of {} in {}.",
                agent, production, city
            ),
            Message::ProductionDestroyedBy {
                nation,
                production,
                city,
            } => write!(
                f,
                "The production of {} was destroyed in {}, the {} are suspected.",
                production, city, nation
            ),
            Message::BuildingDestroyed {
                agent,
                building,
                city,
            } => write!(f, "Your {} destroyed the {} in {}.", agent, building, city),
            Message::BuildingDestroyedBy {
                nation,
                building,
                city,
            } => write!(
                f,
                "The {} destroyed the {} in {}.",
                nation, building, city
            ),

            Message::GoldStolen { agent, amount, city } => {
                write!(f, "Your {} stole {} gold from {}.", agent, amount, city)
            }
            Message::GoldStolenBy {
                nation,
                amount,
                city,
            } => write!(
                f,
                "{} gold was stolen from {}. The {} are suspected.",
                amount, city, nation
            ),
            Message::MapsStolen { agent, city } => {
                write!(f, "Your {} stole parts of the world map in {}.", agent, city)
            }
            Message::MapsStolenBy { nation, city } => {
                write!(f, "The {} are suspected of stealing maps in {}.", nation, city)
            }

            Message::DeviceHidden { agent, city } => {
                write!(f, "Your {} hid a device in {}.", agent, city)
            }
            Message::CityNukedBy { nation, city } => {
                write!(f, "{} was nuked by the {}.", city, nation)
            }
            Message::NuclearExplosion { tile } => {
                write!(f, "Nuclear detonation at {}.", tile)
            }
        }
    }
}

/// A message addressed to one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub recipient: PlayerId,
    pub tile: Option<TileCoord>,
    pub event: EventKind,
    pub message: Message,
}

/// One diplomatic incident, as reported to the AI hook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub class: IncidentClass,
    pub range: CasusBelliRange,
    pub action: ActionId,
    pub offender: PlayerId,
    pub victim: Option<PlayerId>,
}

/// Something the transport layer must deliver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dispatch {
    Notice(Notice),
    Incident(Incident),
    /// Player state changed; resend it to everyone.
    PlayerInfo { player: PlayerId },
    UnitInfo { unit: UnitId },
    CityInfo { city: CityId },
    UnitRemoved {
        unit: UnitId,
        owner: PlayerId,
        reason: WipeReason,
    },
    CityRemoved { city: CityId, owner: PlayerId },
    /// Full city dump for an investigating player.
    CityReport {
        recipient: PlayerId,
        city: Box<City>,
        units: Vec<Unit>,
    },
    NukeDetonated { tile: TileCoord, radius: u32 },
}

/// Collected dispatches for one or more action calls.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    dispatches: Vec<Dispatch>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dispatch: Dispatch) {
        self.dispatches.push(dispatch);
    }

    /// Queue a notice for one player.
    pub fn notify(
        &mut self,
        recipient: PlayerId,
        tile: Option<TileCoord>,
        event: EventKind,
        message: Message,
    ) {
        self.dispatches.push(Dispatch::Notice(Notice {
            recipient,
            tile,
            event,
            message,
        }));
    }

    pub fn dispatches(&self) -> &[Dispatch] {
        &self.dispatches
    }

    /// Take everything queued so far.
    pub fn drain(&mut self) -> Vec<Dispatch> {
        std::mem::take(&mut self.dispatches)
    }

    pub fn len(&self) -> usize {
        self.dispatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dispatches.is_empty()
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.dispatches.iter().filter_map(|d| match d {
            Dispatch::Notice(notice) => Some(notice),
            _ => None,
        })
    }

    pub fn notices_for(&self, player: PlayerId) -> Vec<&Notice> {
        self.notices().filter(|n| n.recipient == player).collect()
    }

    pub fn incidents(&self) -> Vec<&Incident> {
        self.dispatches
            .iter()
            .filter_map(|d| match d {
                Dispatch::Incident(incident) => Some(incident),
                _ => None,
            })
            .collect()
    }

    /// Removal records for a unit, normally at most one.
    pub fn removals_of(&self, unit: UnitId) -> Vec<WipeReason> {
        self.dispatches
            .iter()
            .filter_map(|d| match d {
                Dispatch::UnitRemoved {
                    unit: id, reason, ..
                } if *id == unit => Some(*reason),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(audience: Audience, victim: Option<&str>, link: VictimLink) -> Message {
        Message::Incident {
            class: IncidentClass::Caught,
            audience,
            action: "Steal Gold".to_string(),
            offender: "Romans".to_string(),
            victim: victim.map(str::to_string),
            link,
        }
    }

    #[test]
    fn test_incident_phrasing_per_audience() {
        let city = VictimLink::City {
            name: "Carthage".to_string(),
        };
        assert_eq!(
            incident(Audience::Offender, Some("Carthaginian"), city.clone()).to_string(),
            "You have caused an incident getting caught trying to do Steal Gold to Carthaginian Carthage."
        );
        assert_eq!(
            incident(Audience::Victim, Some("Carthaginian"), city.clone()).to_string(),
            "The Romans have caused an incident getting caught trying to do Steal Gold to your Carthage."
        );
        assert_eq!(
            incident(Audience::ThirdParty, None, city).to_string(),
            "The Romans have caused an incident getting caught trying to do Steal Gold to Carthage."
        );
    }

    #[test]
    fn test_incident_without_link() {
        let msg = incident(Audience::ThirdParty, None, VictimLink::None);
        assert_eq!(
            msg.to_string(),
            "The Romans have caused an incident getting caught trying to do Steal Gold."
        );
    }

    #[test]
    fn test_outbox_filters() {
        let mut outbox = Outbox::new();
        outbox.notify(
            1,
            None,
            EventKind::ActionFailed,
            Message::NoDefenders {
                link: VictimLink::Tile {
                    tile: TileCoord::new(1, 2),
                },
            },
        );
        outbox.push(Dispatch::UnitRemoved {
            unit: 9,
            owner: 1,
            reason: WipeReason::Caught,
        });
        assert_eq!(outbox.notices_for(1).len(), 1);
        assert!(outbox.notices_for(0).is_empty());
        assert_eq!(outbox.removals_of(9), vec![WipeReason::Caught]);
        assert_eq!(outbox.drain().len(), 2);
        assert!(outbox.is_empty());
    }
}
