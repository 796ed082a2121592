use crate::{Element, StatType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionCategory {
    DirectDamage,
    Heal,
    /// Buffs and debuffs alike: attaches the action's effect template.
    Buff,
    ItemUse,
    Defend,
    Flee,
}

/// Which combatants an action may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRule {
    Enemy,
    /// Any living member of the actor's own roster, including the actor.
    Ally,
    SelfOnly,
}

/// Identity of a status effect. Two effects with the same kind never coexist
/// on one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Poison,
    Burn,
    Bleed,
    Stun,
    Guard,
    Strengthen,
    Weaken,
    Haste,
    Slow,
    Fortify,
    Expose,
    Blind,
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            EffectKind::Poison => "poison",
            EffectKind::Burn => "burn",
            EffectKind::Bleed => "bleeding",
            EffectKind::Stun => "stun",
            EffectKind::Guard => "guard",
            EffectKind::Strengthen => "strength",
            EffectKind::Weaken => "weakness",
            EffectKind::Haste => "haste",
            EffectKind::Slow => "slow",
            EffectKind::Fortify => "fortification",
            EffectKind::Expose => "exposure",
            EffectKind::Blind => "blindness",
        };
        write!(f, "{}", display_name)
    }
}

/// Blueprint for a status effect instance, attached when an action lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectTemplate {
    pub kind: EffectKind,
    pub duration: u32,
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub damage_per_round: Option<u32>,
    /// Damage-over-time is typeless unless an element is recorded here.
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub stat_multipliers: HashMap<StatType, f64>,
    /// Multiplier on damage the bearer takes from actions (Guard, Expose).
    #[serde(default)]
    pub damage_taken_multiplier: Option<f64>,
    #[serde(default)]
    pub skips_turn: bool,
}

impl EffectTemplate {
    pub fn new(kind: EffectKind, duration: u32) -> Self {
        Self {
            kind,
            duration,
            magnitude: 0.0,
            damage_per_round: None,
            element: None,
            stat_multipliers: HashMap::new(),
            damage_taken_multiplier: None,
            skips_turn: false,
        }
    }

    pub fn with_damage_per_round(mut self, damage: u32) -> Self {
        self.damage_per_round = Some(damage);
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_stat_multiplier(mut self, stat: StatType, multiplier: f64) -> Self {
        self.stat_multipliers.insert(stat, multiplier);
        self
    }

    pub fn with_damage_taken_multiplier(mut self, multiplier: f64) -> Self {
        self.damage_taken_multiplier = Some(multiplier);
        self
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    pub fn skipping_turn(mut self) -> Self {
        self.skips_turn = true;
        self
    }
}

/// Immutable definition of a combat move, looked up by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionData {
    pub id: String,
    pub name: String,
    pub category: ActionCategory,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub power: u32,
    #[serde(default)]
    pub cost: u32,
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,
    #[serde(default)]
    pub cooldown: u32,
    pub target: TargetRule,
    #[serde(default)]
    pub effect: Option<EffectTemplate>,
    /// Share of the target's max health added to heals.
    #[serde(default)]
    pub heal_ratio: f64,
    /// Inventory item consumed by `ItemUse` actions.
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub resource_restore: u32,
}

fn default_accuracy() -> f64 {
    1.0
}

impl ActionData {
    pub fn new(id: &str, category: ActionCategory, target: TargetRule) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            category,
            element: None,
            power: 0,
            cost: 0,
            accuracy: 1.0,
            cooldown: 0,
            target,
            effect: None,
            heal_ratio: 0.0,
            item: None,
            resource_restore: 0,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_power(mut self, power: u32) -> Self {
        self.power = power;
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_effect(mut self, effect: EffectTemplate) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn with_heal_ratio(mut self, ratio: f64) -> Self {
        self.heal_ratio = ratio;
        self
    }

    pub fn consuming_item(mut self, item: &str) -> Self {
        self.item = Some(item.to_string());
        self
    }

    pub fn with_resource_restore(mut self, amount: u32) -> Self {
        self.resource_restore = amount;
        self
    }

    pub fn is_offensive(&self) -> bool {
        matches!(self.target, TargetRule::Enemy)
    }
}
