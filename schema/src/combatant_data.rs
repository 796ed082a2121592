use crate::Element;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaseStats {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub accuracy: u32,
}

/// Who picks actions for a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Controller {
    #[default]
    Player,
    Policy,
}

/// One row of a drop table, rolled when the combatant is defeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    #[serde(default = "default_chance")]
    pub chance: f64,
    /// Inclusive gold range.
    #[serde(default)]
    pub gold: Option<(u32, u32)>,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_chance() -> f64 {
    1.0
}

fn default_count() -> u32 {
    1
}

/// Content-layer definition of a combatant, as handed to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantData {
    pub id: String,
    pub name: String,
    pub max_health: u32,
    /// Starting health; full health when absent.
    #[serde(default)]
    pub health: Option<u32>,
    #[serde(default)]
    pub max_resource: u32,
    #[serde(default)]
    pub resource: Option<u32>,
    pub stats: BaseStats,
    /// The combatant's own element, used for elemental reactions.
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub resistances: HashMap<Element, f64>,
    #[serde(default)]
    pub immunities: HashSet<Element>,
    #[serde(default)]
    pub vulnerabilities: HashSet<Element>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub regeneration: u32,
    #[serde(default)]
    pub resource_regeneration: u32,
    #[serde(default)]
    pub items: HashMap<String, u32>,
    #[serde(default)]
    pub drops: Vec<DropEntry>,
    /// Experience awarded to the winners when this combatant is defeated.
    #[serde(default)]
    pub xp: u32,
    /// Bosses make fleeing harder for the opposing roster.
    #[serde(default)]
    pub boss: bool,
    #[serde(default)]
    pub controller: Controller,
}

impl CombatantData {
    pub fn new(id: &str, max_health: u32, stats: BaseStats) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            max_health,
            health: None,
            max_resource: 0,
            resource: None,
            stats,
            element: None,
            resistances: HashMap::new(),
            immunities: HashSet::new(),
            vulnerabilities: HashSet::new(),
            actions: Vec::new(),
            regeneration: 0,
            resource_regeneration: 0,
            items: HashMap::new(),
            drops: Vec::new(),
            xp: 0,
            boss: false,
            controller: Controller::Player,
        }
    }
}
