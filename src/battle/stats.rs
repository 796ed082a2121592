use crate::combatant::Combatant;
use crate::config::CombatConfig;
use schema::StatType;

/// Base value of a stat before any status effect is applied.
pub fn base_stat(combatant: &Combatant, stat: StatType) -> u32 {
    match stat {
        StatType::Attack => combatant.stats.attack,
        StatType::Defense => combatant.stats.defense,
        StatType::Speed => combatant.stats.speed,
        StatType::Accuracy => combatant.stats.accuracy,
    }
}

/// Stat value with every live effect's multiplier applied.
///
/// Effects never rewrite base stats; they are consulted here each time a
/// derived value is needed, so an expired effect stops mattering at once.
pub fn effective_stat(combatant: &Combatant, stat: StatType) -> f64 {
    base_stat(combatant, stat) as f64 * combatant.effects.stat_multiplier(stat)
}

pub fn effective_attack(combatant: &Combatant) -> f64 {
    effective_stat(combatant, StatType::Attack)
}

pub fn effective_defense(combatant: &Combatant) -> f64 {
    effective_stat(combatant, StatType::Defense)
}

pub fn effective_speed(combatant: &Combatant) -> f64 {
    effective_stat(combatant, StatType::Speed)
}

/// Chance of a critical hit: a flat floor plus a gentle speed bonus,
/// `base + speed / divisor`, capped at 1.0.
pub fn critical_chance(attacker: &Combatant, config: &CombatConfig) -> f64 {
    let bonus = effective_speed(attacker) / config.critical_speed_divisor;
    (config.base_critical_chance + bonus).clamp(0.0, 1.0)
}

/// Hit probability of an action: `action_accuracy + accuracy_weight * accuracy`,
/// clamped to [0, 1]. With the default weight of 0.0 this is the action's own
/// accuracy.
pub fn hit_chance(attacker: &Combatant, action_accuracy: f64, config: &CombatConfig) -> f64 {
    let bonus = config.accuracy_weight * effective_stat(attacker, StatType::Accuracy);
    (action_accuracy + bonus).clamp(0.0, 1.0)
}

/// Multiplier on damage the combatant takes from actions (guarding, exposure).
pub fn incoming_damage_multiplier(combatant: &Combatant) -> f64 {
    combatant.effects.damage_taken_multiplier()
}
