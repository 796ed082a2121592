//! Status effect ledger: timed modifiers attached to a combatant.

use crate::battle::resistance;
use crate::combatant::Combatant;
use schema::{EffectKind, EffectTemplate, Element, StatType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A live status effect on one combatant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub remaining_duration: u32,
    pub magnitude: f64,
    pub damage_per_round: Option<u32>,
    pub element: Option<Element>,
    pub stat_multipliers: HashMap<StatType, f64>,
    pub damage_taken_multiplier: Option<f64>,
    pub skips_turn: bool,
    /// Held until the bearer's next turn starts instead of counting down at round end.
    #[serde(default)]
    pub until_next_turn: bool,
}

impl StatusEffect {
    pub fn from_template(template: &EffectTemplate) -> Self {
        StatusEffect {
            kind: template.kind,
            remaining_duration: template.duration,
            magnitude: template.magnitude,
            damage_per_round: template.damage_per_round,
            element: template.element,
            stat_multipliers: template.stat_multipliers.clone(),
            damage_taken_multiplier: template.damage_taken_multiplier,
            skips_turn: template.skips_turn,
            until_next_turn: false,
        }
    }

    /// Guard stance taken by the Defend action; it lasts until the
    /// defender's next turn, across a round boundary if need be.
    pub fn guard(multiplier: f64) -> Self {
        StatusEffect {
            until_next_turn: true,
            ..StatusEffect::from_template(
                &EffectTemplate::new(EffectKind::Guard, 1).with_damage_taken_multiplier(multiplier),
            )
        }
    }
}

/// Active effects of one combatant, in the order they were attached.
///
/// At most one effect per [`EffectKind`] is held: attaching a kind that is
/// already present replaces the old instance (refresh, never stack).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StatusLedger {
    effects: Vec<StatusEffect>,
}

impl StatusLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an effect, returning the instance of the same kind it replaced.
    /// The new instance goes to the back of the processing order.
    pub fn attach(&mut self, effect: StatusEffect) -> Option<StatusEffect> {
        let replaced = self.remove(effect.kind);
        self.effects.push(effect);
        replaced
    }

    pub fn remove(&mut self, kind: EffectKind) -> Option<StatusEffect> {
        let position = self.effects.iter().position(|e| e.kind == kind)?;
        Some(self.effects.remove(position))
    }

    pub fn get(&self, kind: EffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Product of every live multiplier for `stat`.
    pub fn stat_multiplier(&self, stat: StatType) -> f64 {
        self.effects
            .iter()
            .filter_map(|e| e.stat_multipliers.get(&stat))
            .product()
    }

    pub fn damage_taken_multiplier(&self) -> f64 {
        self.effects
            .iter()
            .filter_map(|e| e.damage_taken_multiplier)
            .product()
    }

    pub fn skips_turn(&self) -> bool {
        self.effects.iter().any(|e| e.skips_turn)
    }

    /// Drop the effects held only until the bearer's turn comes round again.
    pub fn expire_at_turn_start(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        self.effects.retain(|effect| {
            if effect.until_next_turn {
                expired.push(effect.kind);
            }
            !effect.until_next_turn
        });
        expired
    }

    /// Count every round-based effect down one round and drop the ones that ran out.
    fn decay(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        self.effects.retain_mut(|effect| {
            if effect.until_next_turn {
                return true;
            }
            effect.remaining_duration = effect.remaining_duration.saturating_sub(1);
            if effect.remaining_duration == 0 {
                expired.push(effect.kind);
                false
            } else {
                true
            }
        });
        expired
    }
}

/// What one end-of-round pass did to a combatant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoundTick {
    /// Health lost to each damaging effect, in processing order.
    pub damage: Vec<(EffectKind, u32)>,
    pub expired: Vec<EffectKind>,
    /// True if effect damage brought the combatant to 0 this round.
    pub defeated: bool,
}

/// Run one round of the ledger for `combatant`: per-round damage in FIFO
/// order, then duration decay.
///
/// Effect damage bypasses the damage calculator. It is typeless unless the
/// effect recorded an element, in which case the bearer's resistances apply.
pub fn apply_round_effects(combatant: &mut Combatant) -> RoundTick {
    let mut tick = RoundTick::default();

    let pending: Vec<(EffectKind, u32)> = combatant
        .effects
        .iter()
        .filter_map(|effect| {
            let raw = effect.damage_per_round?;
            let amount = match effect.element {
                Some(element) => {
                    let multiplier = resistance::resolve(combatant, Some(element));
                    (raw as f64 * multiplier).round().max(0.0) as u32
                }
                None => raw,
            };
            Some((effect.kind, amount))
        })
        .collect();

    for (kind, amount) in pending {
        let before = combatant.health();
        if combatant.take_damage(amount) {
            tick.defeated = true;
        }
        let dealt = before - combatant.health();
        debug!(combatant = %combatant.id, effect = %kind, dealt, "status damage");
        tick.damage.push((kind, dealt));
    }

    tick.expired = combatant.effects.decay();
    for kind in &tick.expired {
        debug!(combatant = %combatant.id, effect = %kind, "effect expired");
    }

    tick
}
