use crate::battle::engine::{ActionPolicy, CombatSession, PolicyChoice, SessionStatus};
use crate::battle::rng::ScriptedRolls;
use crate::combatant::{Combatant, CombatantId};
use crate::config::CombatConfig;
use crate::errors::CombatResult;
use crate::registry::ActionRegistry;
use schema::{
    ActionCategory, ActionData, BaseStats, CombatantData, Controller, DropEntry, EffectKind,
    EffectTemplate, Element, StatType, TargetRule,
};
use std::collections::VecDeque;
use std::sync::Arc;

/// A builder for test combatants with neutral defaults: 100 health, no
/// resource, all stats 0, no affinities.
///
/// # Example
/// ```ignore
/// let golem = TestCombatantBuilder::new("golem")
///     .health(80)
///     .immune_to(Element::Poison)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    data: CombatantData,
}

impl TestCombatantBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            data: CombatantData::new(id, 100, BaseStats::default()),
        }
    }

    /// Sets maximum health; the combatant starts at full health.
    pub fn health(mut self, max_health: u32) -> Self {
        self.data.max_health = max_health;
        self
    }

    /// Sets maximum resource; the combatant starts full.
    pub fn resource(mut self, max_resource: u32) -> Self {
        self.data.max_resource = max_resource;
        self
    }

    pub fn attack(mut self, attack: u32) -> Self {
        self.data.stats.attack = attack;
        self
    }

    pub fn defense(mut self, defense: u32) -> Self {
        self.data.stats.defense = defense;
        self
    }

    pub fn speed(mut self, speed: u32) -> Self {
        self.data.stats.speed = speed;
        self
    }

    pub fn accuracy(mut self, accuracy: u32) -> Self {
        self.data.stats.accuracy = accuracy;
        self
    }

    pub fn element(mut self, element: Element) -> Self {
        self.data.element = Some(element);
        self
    }

    pub fn immune_to(mut self, element: Element) -> Self {
        self.data.immunities.insert(element);
        self
    }

    pub fn vulnerable_to(mut self, element: Element) -> Self {
        self.data.vulnerabilities.insert(element);
        self
    }

    pub fn resisting(mut self, element: Element, multiplier: f64) -> Self {
        self.data.resistances.insert(element, multiplier);
        self
    }

    pub fn actions(mut self, actions: &[&str]) -> Self {
        self.data.actions = actions.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn items(mut self, items: &[(&str, u32)]) -> Self {
        self.data.items = items
            .iter()
            .map(|(item, count)| (item.to_string(), *count))
            .collect();
        self
    }

    pub fn regeneration(mut self, per_round: u32) -> Self {
        self.data.regeneration = per_round;
        self
    }

    pub fn resource_regeneration(mut self, per_round: u32) -> Self {
        self.data.resource_regeneration = per_round;
        self
    }

    pub fn drops(mut self, drops: Vec<DropEntry>) -> Self {
        self.data.drops = drops;
        self
    }

    /// Marks the combatant as driven by an [`ActionPolicy`].
    pub fn xp(mut self, xp: u32) -> Self {
        self.data.xp = xp;
        self
    }

    pub fn boss(mut self) -> Self {
        self.data.boss = true;
        self
    }

    pub fn policy_controlled(mut self) -> Self {
        self.data.controller = Controller::Policy;
        self
    }

    /// The content-layer record, for building sessions.
    pub fn data(self) -> CombatantData {
        self.data
    }

    pub fn build(self) -> Combatant {
        Combatant::from_data(&self.data)
    }
}

/// A small action set covering every category.
pub fn test_registry() -> ActionRegistry {
    ActionRegistry::from_actions([
        ActionData::new("strike", ActionCategory::DirectDamage, TargetRule::Enemy)
            .with_power(10)
            .with_cost(3)
            .with_cooldown(1),
        ActionData::new("bite", ActionCategory::DirectDamage, TargetRule::Enemy).with_power(12),
        ActionData::new("howl", ActionCategory::Buff, TargetRule::SelfOnly).with_effect(
            EffectTemplate::new(EffectKind::Strengthen, 2).with_stat_multiplier(StatType::Attack, 1.2),
        ),
        ActionData::new("fireball", ActionCategory::DirectDamage, TargetRule::Enemy)
            .with_element(Element::Fire)
            .with_power(40)
            .with_cost(15)
            .with_cooldown(2),
        ActionData::new("mend", ActionCategory::Heal, TargetRule::Ally).with_power(25),
        ActionData::new("potion", ActionCategory::ItemUse, TargetRule::Ally)
            .with_power(30)
            .consuming_item("potion"),
        ActionData::new("guard", ActionCategory::Defend, TargetRule::SelfOnly),
        ActionData::new("rally", ActionCategory::Buff, TargetRule::Ally).with_effect(
            EffectTemplate::new(EffectKind::Strengthen, 3).with_stat_multiplier(StatType::Attack, 1.5),
        ),
        ActionData::new("flee", ActionCategory::Flee, TargetRule::SelfOnly),
        ActionData::new("venom_fang", ActionCategory::DirectDamage, TargetRule::Enemy)
            .with_power(5)
            .with_element(Element::Poison)
            .with_effect(EffectTemplate::new(EffectKind::Poison, 3).with_damage_per_round(4)),
        ActionData::new("stun_bolt", ActionCategory::DirectDamage, TargetRule::Enemy)
            .with_power(1)
            .with_effect(EffectTemplate::new(EffectKind::Stun, 2).skipping_turn()),
    ])
}

/// Rolls that always hit, never crit and leave variance at exactly 1.0.
pub fn predictable_rolls() -> ScriptedRolls {
    ScriptedRolls::new(vec![0.5; 200])
}

/// Creates and starts a session over the test registry with default config.
pub fn start_test_session(
    roster_a: Vec<CombatantData>,
    roster_b: Vec<CombatantData>,
    rolls: ScriptedRolls,
) -> CombatSession<ScriptedRolls> {
    let mut session = CombatSession::new(
        &roster_a,
        &roster_b,
        Arc::new(test_registry()),
        CombatConfig::default(),
        rolls,
    )
    .expect("test rosters are valid");
    session.start().expect("test session starts");
    session
}

/// A policy that replays fixed choices, then passes.
pub struct ScriptedPolicy {
    choices: VecDeque<PolicyChoice>,
    pub seen: Vec<CombatantId>,
}

impl ScriptedPolicy {
    pub fn new(choices: Vec<PolicyChoice>) -> Self {
        Self {
            choices: choices.into(),
            seen: Vec::new(),
        }
    }
}

impl ActionPolicy for ScriptedPolicy {
    fn choose(&mut self, _view: &SessionStatus, actor: &CombatantId) -> Option<PolicyChoice> {
        self.seen.push(actor.clone());
        self.choices.pop_front()
    }
}

/// Helper function to assert that a Result is Ok and return the value.
pub fn assert_ok<T>(result: CombatResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
