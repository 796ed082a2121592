use crate::battle::conditions::StatusLedger;
use schema::{BaseStats, CombatantData, Controller, DropEntry, Element};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type CombatantId = String;

/// An action a combatant knows, with its own cooldown counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownAction {
    pub id: String,
    pub cooldown_remaining: u32,
}

impl KnownAction {
    pub fn new(id: &str) -> Self {
        KnownAction {
            id: id.to_string(),
            cooldown_remaining: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0
    }
}

/// Runtime state of one participant for the lifetime of an encounter.
///
/// Health and resource are private so that they stay within `[0, max]`; all
/// changes go through the clamping methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    health: u32,
    max_health: u32,
    resource: u32,
    max_resource: u32,
    pub stats: BaseStats,
    pub element: Option<Element>,
    pub resistances: HashMap<Element, f64>,
    pub immunities: HashSet<Element>,
    pub vulnerabilities: HashSet<Element>,
    pub actions: Vec<KnownAction>,
    pub effects: StatusLedger,
    pub regeneration: u32,
    pub resource_regeneration: u32,
    pub items: HashMap<String, u32>,
    pub drops: Vec<DropEntry>,
    pub xp: u32,
    pub boss: bool,
    pub controller: Controller,
}

impl Combatant {
    /// Build a fresh combatant from its content definition.
    pub fn from_data(data: &CombatantData) -> Self {
        let max_health = data.max_health;
        let max_resource = data.max_resource;

        Combatant {
            id: data.id.clone(),
            name: data.name.clone(),
            health: data.health.unwrap_or(max_health).min(max_health),
            max_health,
            resource: data.resource.unwrap_or(max_resource).min(max_resource),
            max_resource,
            stats: data.stats,
            element: data.element,
            resistances: data.resistances.clone(),
            immunities: data.immunities.clone(),
            vulnerabilities: data.vulnerabilities.clone(),
            actions: data.actions.iter().map(|id| KnownAction::new(id)).collect(),
            effects: StatusLedger::new(),
            regeneration: data.regeneration,
            resource_regeneration: data.resource_regeneration,
            items: data.items.clone(),
            drops: data.drops.clone(),
            xp: data.xp,
            boss: data.boss,
            controller: data.controller,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn resource(&self) -> u32 {
        self.resource
    }

    pub fn max_resource(&self) -> u32 {
        self.max_resource
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Set health directly, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }

    /// Reduce health, stopping at 0. Returns true if this blow defeated the combatant.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_alive = self.is_alive();
        self.health = self.health.saturating_sub(amount);
        was_alive && !self.is_alive()
    }

    /// Restore health up to the maximum. Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    pub fn spend_resource(&mut self, amount: u32) {
        self.resource = self.resource.saturating_sub(amount);
    }

    /// Restore resource up to the maximum. Returns the amount actually restored.
    pub fn restore_resource(&mut self, amount: u32) -> u32 {
        let before = self.resource;
        self.resource = self.resource.saturating_add(amount).min(self.max_resource);
        self.resource - before
    }

    pub fn known_action(&self, action_id: &str) -> Option<&KnownAction> {
        self.actions.iter().find(|known| known.id == action_id)
    }

    /// Remaining cooldown of a known action; `None` if the action is unknown.
    pub fn cooldown_remaining(&self, action_id: &str) -> Option<u32> {
        self.known_action(action_id).map(|known| known.cooldown_remaining)
    }

    pub fn set_cooldown(&mut self, action_id: &str, rounds: u32) {
        if let Some(known) = self.actions.iter_mut().find(|known| known.id == action_id) {
            known.cooldown_remaining = rounds;
        }
    }

    /// Count every cooldown down by one round, stopping at 0.
    pub fn tick_cooldowns(&mut self) {
        for known in &mut self.actions {
            known.cooldown_remaining = known.cooldown_remaining.saturating_sub(1);
        }
    }

    pub fn item_count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Use up one unit of an item. Returns false if none were held.
    pub fn consume_item(&mut self, item: &str) -> bool {
        match self.items.get_mut(item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Apply passive per-round regeneration. Returns (health restored, resource restored).
    pub fn regenerate(&mut self) -> (u32, u32) {
        if !self.is_alive() {
            return (0, 0);
        }
        let healed = self.heal(self.regeneration);
        let restored = self.restore_resource(self.resource_regeneration);
        (healed, restored)
    }

    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            health: self.health,
            max_health: self.max_health,
            resource: self.resource,
            max_resource: self.max_resource,
            is_alive: self.is_alive(),
            actions: self.actions.iter().map(|known| known.id.clone()).collect(),
            effects: self
                .effects
                .iter()
                .map(|effect| (effect.kind, effect.remaining_duration))
                .collect(),
            cooldowns: self
                .actions
                .iter()
                .filter(|known| !known.is_ready())
                .map(|known| (known.id.clone(), known.cooldown_remaining))
                .collect(),
        }
    }
}

/// Read-only view of a combatant for status queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    pub resource: u32,
    pub max_resource: u32,
    pub is_alive: bool,
    /// Known action ids in the order they were learned.
    pub actions: Vec<String>,
    /// Active effects in the order they were attached, with rounds remaining.
    pub effects: Vec<(schema::EffectKind, u32)>,
    /// Actions still cooling down, with rounds remaining.
    pub cooldowns: Vec<(String, u32)>,
}
