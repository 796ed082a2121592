//! Action Resolver: validates a requested action, then turns it into
//! commands.
//!
//! Validation only reads the encounter. Nothing is mutated until every check
//! has passed, so a rejected action leaves the session exactly as it was.

use crate::battle::calculators::{calculate_damage, DamageResult};
use crate::battle::commands::{execute_command_batch, CombatCommand};
use crate::battle::conditions::StatusEffect;
use crate::battle::rng::RollSource;
use crate::battle::state::{
    CombatEvent, CombatantRef, EncounterState, EventLog, SessionPhase, Side,
};
use crate::battle::stats::incoming_damage_multiplier;
use crate::combatant::CombatantId;
use crate::config::CombatConfig;
use crate::errors::{
    CombatError, CombatResult, InvalidActionReason, InvalidStateReason, InvalidTargetReason,
};
use crate::registry::ActionLookup;
use schema::{ActionCategory, ActionData, EffectKind, TargetRule};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a resolved action did, for the caller to present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub actor: CombatantId,
    pub action: String,
    pub category: ActionCategory,
    pub target: CombatantId,
    /// Calculator breakdown for direct-damage actions.
    pub damage: Option<DamageResult>,
    /// Health the target actually lost, after guarding and clamping.
    pub damage_dealt: u32,
    pub healed: u32,
    pub resource_restored: u32,
    pub effect_applied: Option<EffectKind>,
    /// Whether a flee attempt succeeded; `None` for other categories.
    pub fled: Option<bool>,
    pub target_defeated: bool,
}

impl ActionOutcome {
    fn new(actor: &str, action: &ActionData, target: &str) -> Self {
        ActionOutcome {
            actor: actor.to_string(),
            action: action.id.clone(),
            category: action.category,
            target: target.to_string(),
            damage: None,
            damage_dealt: 0,
            healed: 0,
            resource_restored: 0,
            effect_applied: None,
            fled: None,
            target_defeated: false,
        }
    }
}

/// Check that `actor` may use `action_id` on `target_id` right now.
///
/// Checks run in a fixed order: actor alive, action defined and known,
/// cooldown, item stock, resource, then target legality.
pub fn validate_action<'a, L: ActionLookup>(
    state: &EncounterState,
    actions: &'a L,
    actor: CombatantRef,
    action_id: &str,
    target_id: &str,
) -> CombatResult<(&'a ActionData, CombatantRef)> {
    let user = state.combatant(actor).ok_or_else(|| {
        CombatError::InvalidCombatState(InvalidStateReason::UnknownActor(format!(
            "{:?}#{}",
            actor.side, actor.index
        )))
    })?;

    if !user.is_alive() {
        return Err(CombatError::InvalidAction(
            InvalidActionReason::ActorDefeated(user.id.clone()),
        ));
    }

    let action = actions.action(action_id).ok_or_else(|| {
        CombatError::InvalidAction(InvalidActionReason::UnknownAction(action_id.to_string()))
    })?;

    let Some(remaining) = user.cooldown_remaining(action_id) else {
        return Err(CombatError::InvalidAction(
            InvalidActionReason::NotKnownByActor {
                actor: user.id.clone(),
                action: action_id.to_string(),
            },
        ));
    };
    if remaining > 0 {
        return Err(CombatError::InvalidAction(InvalidActionReason::OnCooldown {
            action: action_id.to_string(),
            remaining,
        }));
    }

    match action.category {
        ActionCategory::ItemUse => {
            let item = action.item.as_deref().ok_or_else(|| {
                CombatError::InvalidAction(InvalidActionReason::MissingItem(action.id.clone()))
            })?;
            if user.item_count(item) == 0 {
                return Err(CombatError::InvalidAction(
                    InvalidActionReason::NoItemsLeft {
                        actor: user.id.clone(),
                        item: item.to_string(),
                    },
                ));
            }
        }
        ActionCategory::Buff if action.effect.is_none() => {
            return Err(CombatError::InvalidAction(
                InvalidActionReason::MissingEffect(action.id.clone()),
            ));
        }
        _ => {}
    }

    if user.resource() < action.cost {
        return Err(CombatError::InsufficientResource {
            actor: user.id.clone(),
            required: action.cost,
            available: user.resource(),
        });
    }

    let target = validate_target(state, actor, action, target_id)?;
    Ok((action, target))
}

fn validate_target(
    state: &EncounterState,
    actor: CombatantRef,
    action: &ActionData,
    target_id: &str,
) -> CombatResult<CombatantRef> {
    let target = state.find(target_id).ok_or_else(|| {
        CombatError::InvalidTarget(InvalidTargetReason::UnknownTarget(target_id.to_string()))
    })?;

    let legal = match action.target {
        TargetRule::Enemy => target.side != actor.side,
        TargetRule::Ally => target.side == actor.side,
        TargetRule::SelfOnly => target == actor,
    };
    if !legal {
        let reason = match action.target {
            TargetRule::SelfOnly => InvalidTargetReason::NotSelf(action.id.clone()),
            _ => InvalidTargetReason::WrongRoster {
                action: action.id.clone(),
                target: target_id.to_string(),
            },
        };
        return Err(CombatError::InvalidTarget(reason));
    }

    let alive = state.combatant(target).is_some_and(|c| c.is_alive());
    if !alive {
        return Err(CombatError::InvalidTarget(
            InvalidTargetReason::TargetDefeated(target_id.to_string()),
        ));
    }

    Ok(target)
}

/// Decide what a validated action does. Draws from `rng` but does not mutate
/// the encounter.
pub fn plan_action(
    state: &EncounterState,
    config: &CombatConfig,
    actor: CombatantRef,
    action: &ActionData,
    target: CombatantRef,
    rng: &mut impl RollSource,
) -> (Vec<CombatCommand>, ActionOutcome) {
    let (Some(user), Some(receiver)) = (state.combatant(actor), state.combatant(target)) else {
        // Refs come from validate_action.
        return (Vec::new(), ActionOutcome::new("", action, ""));
    };

    let mut outcome = ActionOutcome::new(&user.id, action, &receiver.id);
    let mut commands = vec![CombatCommand::EmitEvent(CombatEvent::ActionUsed {
        actor: user.id.clone(),
        action: action.id.clone(),
        target: receiver.id.clone(),
    })];

    if action.cost > 0 {
        commands.push(CombatCommand::SpendResource {
            target: actor,
            amount: action.cost,
        });
    }
    commands.push(CombatCommand::SetCooldown {
        target: actor,
        action: action.id.clone(),
        rounds: action.cooldown,
    });

    match action.category {
        ActionCategory::DirectDamage => {
            let result = calculate_damage(user, receiver, action, config, rng);
            if result.missed {
                commands.push(CombatCommand::EmitEvent(CombatEvent::ActionMissed {
                    actor: user.id.clone(),
                    action: action.id.clone(),
                    target: receiver.id.clone(),
                }));
            } else {
                if result.critical {
                    commands.push(CombatCommand::EmitEvent(CombatEvent::CriticalHit {
                        actor: user.id.clone(),
                        target: receiver.id.clone(),
                    }));
                }
                if let Some(reaction) = &result.reaction {
                    commands.push(CombatCommand::EmitEvent(CombatEvent::ReactionTriggered {
                        target: receiver.id.clone(),
                        reaction: reaction.clone(),
                    }));
                }

                let guarded = result.final_amount as f64 * incoming_damage_multiplier(receiver);
                let amount = guarded.round().max(0.0) as u32;
                outcome.damage_dealt = amount.min(receiver.health());
                outcome.target_defeated = outcome.damage_dealt >= receiver.health();
                commands.push(CombatCommand::DealDamage { target, amount });

                if let Some(template) = &action.effect {
                    outcome.effect_applied = Some(template.kind);
                    commands.push(CombatCommand::AttachEffect {
                        target,
                        effect: StatusEffect::from_template(template),
                    });
                }
            }
            outcome.damage = Some(result);
        }
        ActionCategory::Heal => {
            let scaled = (action.heal_ratio * receiver.max_health() as f64).round().max(0.0);
            let amount = action.power.saturating_add(scaled as u32);
            outcome.healed = amount.min(receiver.max_health() - receiver.health());
            commands.push(CombatCommand::Heal { target, amount });
            push_effect(&mut commands, &mut outcome, action, target);
        }
        ActionCategory::Buff => {
            push_effect(&mut commands, &mut outcome, action, target);
        }
        ActionCategory::ItemUse => {
            if let Some(item) = &action.item {
                commands.push(CombatCommand::ConsumeItem {
                    target: actor,
                    item: item.clone(),
                });
            }
            if action.power > 0 {
                outcome.healed = action.power.min(receiver.max_health() - receiver.health());
                commands.push(CombatCommand::Heal {
                    target,
                    amount: action.power,
                });
            }
            if action.resource_restore > 0 {
                outcome.resource_restored = action
                    .resource_restore
                    .min(receiver.max_resource() - receiver.resource());
                commands.push(CombatCommand::RestoreResource {
                    target,
                    amount: action.resource_restore,
                });
            }
            push_effect(&mut commands, &mut outcome, action, target);
        }
        ActionCategory::Defend => {
            outcome.effect_applied = Some(EffectKind::Guard);
            commands.push(CombatCommand::EmitEvent(CombatEvent::Defending {
                actor: user.id.clone(),
            }));
            commands.push(CombatCommand::AttachEffect {
                target: actor,
                effect: StatusEffect::guard(config.guard_multiplier),
            });
        }
        ActionCategory::Flee => {
            let escaped = rng.roll("flee") < flee_chance(state, actor.side, config);
            outcome.fled = Some(escaped);
            if escaped {
                commands.push(CombatCommand::EmitEvent(CombatEvent::Fled {
                    actor: user.id.clone(),
                    side: actor.side,
                }));
                commands.push(CombatCommand::SetPhase(SessionPhase::Fled(actor.side)));
            } else {
                commands.push(CombatCommand::EmitEvent(CombatEvent::FleeFailed {
                    actor: user.id.clone(),
                }));
            }
        }
    }

    (commands, outcome)
}

/// Chance for `side` to escape: the configured flee chance, reduced while a
/// living boss stands on the other side.
fn flee_chance(state: &EncounterState, side: Side, config: &CombatConfig) -> f64 {
    let facing_boss = state
        .roster(side.opponent())
        .iter()
        .any(|c| c.is_alive() && c.boss);
    if facing_boss {
        (config.flee_chance * config.boss_flee_multiplier).clamp(0.0, 1.0)
    } else {
        config.flee_chance
    }
}

fn push_effect(
    commands: &mut Vec<CombatCommand>,
    outcome: &mut ActionOutcome,
    action: &ActionData,
    target: CombatantRef,
) {
    if let Some(template) = &action.effect {
        outcome.effect_applied = Some(template.kind);
        commands.push(CombatCommand::AttachEffect {
            target,
            effect: StatusEffect::from_template(template),
        });
    }
}

/// Validate, plan and apply one action.
#[allow(clippy::too_many_arguments)]
pub fn resolve_action<L: ActionLookup>(
    state: &mut EncounterState,
    actions: &L,
    config: &CombatConfig,
    actor: CombatantRef,
    action_id: &str,
    target_id: &str,
    rng: &mut impl RollSource,
    log: &mut EventLog,
) -> CombatResult<ActionOutcome> {
    let (action, target) = validate_action(state, actions, actor, action_id, target_id)?;
    let (commands, outcome) = plan_action(state, config, actor, action, target, rng);
    execute_command_batch(commands, state, log)?;

    debug!(
        actor = %outcome.actor,
        action = %outcome.action,
        target = %outcome.target,
        damage = outcome.damage_dealt,
        healed = outcome.healed,
        "action resolved"
    );
    Ok(outcome)
}
