use crate::battle::resistance;
use crate::battle::rng::{scale_roll, RollSource};
use crate::battle::stats::{critical_chance, effective_attack, effective_defense, hit_chance};
use crate::combatant::Combatant;
use crate::config::CombatConfig;
use schema::ActionData;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Breakdown of one damage calculation. Pure output; the resolver applies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    pub missed: bool,
    /// Attack plus power, less any defense weighting.
    pub raw_amount: f64,
    pub resistance_multiplier: f64,
    /// Raw amount after resistance and any elemental reaction.
    pub post_resistance: f64,
    pub reaction: Option<String>,
    pub critical: bool,
    pub variance: f64,
    pub final_amount: u32,
}

impl DamageResult {
    fn miss() -> Self {
        DamageResult {
            missed: true,
            raw_amount: 0.0,
            resistance_multiplier: 0.0,
            post_resistance: 0.0,
            reaction: None,
            critical: false,
            variance: 1.0,
            final_amount: 0,
        }
    }
}

/// Calculate the damage `action` would deal from `attacker` to `defender`.
///
/// The steps run in a fixed order and draw from `rng` in that order:
/// accuracy, then critical, then variance. A zero post-resistance amount
/// returns 0 without drawing critical or variance.
pub fn calculate_damage(
    attacker: &Combatant,
    defender: &Combatant,
    action: &ActionData,
    config: &CombatConfig,
    rng: &mut impl RollSource,
) -> DamageResult {
    // 1. Accuracy
    let accuracy_roll = rng.roll("accuracy");
    if accuracy_roll >= hit_chance(attacker, action.accuracy, config) {
        debug!(attacker = %attacker.id, action = %action.id, "missed");
        return DamageResult::miss();
    }

    // 2. Base amount
    let defense = config.defense_weight * effective_defense(defender);
    let raw_amount = (effective_attack(attacker) + action.power as f64 - defense).max(0.0);

    // 3-4. Resistance, then any reaction with the defender's own element
    let resistance_multiplier = resistance::resolve(defender, action.element);
    let mut post_resistance = raw_amount * resistance_multiplier;
    let mut reaction = None;
    if post_resistance > 0.0 {
        if let (Some(attack), Some(own)) = (action.element, defender.element) {
            if let Some(found) = config.reaction_for(attack, own) {
                post_resistance *= found.modifier;
                reaction = Some(found.name.clone());
            }
        }
    }

    if post_resistance <= 0.0 {
        return DamageResult {
            missed: false,
            raw_amount,
            resistance_multiplier,
            post_resistance: 0.0,
            reaction,
            critical: false,
            variance: 1.0,
            final_amount: 0,
        };
    }

    // 5. Critical
    let critical = rng.roll("critical") < critical_chance(attacker, config);
    let mut amount = post_resistance;
    if critical {
        amount *= config.critical_multiplier;
    }

    // 6. Variance
    let variance = scale_roll(rng.roll("variance"), config.variance_min, config.variance_max);
    amount *= variance;

    // 7. Final
    let final_amount = amount.round().max(0.0) as u32;

    debug!(
        attacker = %attacker.id,
        defender = %defender.id,
        action = %action.id,
        raw_amount,
        resistance_multiplier,
        critical,
        variance,
        final_amount,
        "damage calculated"
    );

    DamageResult {
        missed: false,
        raw_amount,
        resistance_multiplier,
        post_resistance,
        reaction,
        critical,
        variance,
        final_amount,
    }
}
