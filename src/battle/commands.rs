use crate::battle::conditions::StatusEffect;
use crate::battle::state::{CombatEvent, CombatantRef, EncounterState, EventLog, SessionPhase};
use crate::combatant::Combatant;
use crate::errors::{CombatError, CombatResult, InvalidTargetReason};
use tracing::info;

/// Atomic state changes. The resolver decides what should happen as a list of
/// these, and only the executor below mutates the encounter.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatCommand {
    // Session
    SetPhase(SessionPhase),

    // Combatant modifications
    DealDamage {
        target: CombatantRef,
        amount: u32,
    },
    Heal {
        target: CombatantRef,
        amount: u32,
    },
    SpendResource {
        target: CombatantRef,
        amount: u32,
    },
    RestoreResource {
        target: CombatantRef,
        amount: u32,
    },
    SetCooldown {
        target: CombatantRef,
        action: String,
        rounds: u32,
    },
    ConsumeItem {
        target: CombatantRef,
        item: String,
    },
    AttachEffect {
        target: CombatantRef,
        effect: StatusEffect,
    },

    EmitEvent(CombatEvent),
}

/// Execute a batch of commands in order.
pub fn execute_command_batch(
    commands: Vec<CombatCommand>,
    state: &mut EncounterState,
    log: &mut EventLog,
) -> CombatResult<()> {
    for command in commands {
        execute_command(command, state, log)?;
    }
    Ok(())
}

fn with_combatant<F>(target: CombatantRef, state: &mut EncounterState, operation: F) -> CombatResult<()>
where
    F: FnOnce(&mut Combatant),
{
    let combatant = state.combatant_mut(target).ok_or_else(|| {
        CombatError::InvalidTarget(InvalidTargetReason::UnknownTarget(format!(
            "{:?}#{}",
            target.side, target.index
        )))
    })?;
    operation(combatant);
    Ok(())
}

fn execute_deal_damage_command(
    target: CombatantRef,
    amount: u32,
    state: &mut EncounterState,
    log: &mut EventLog,
) -> CombatResult<()> {
    with_combatant(target, state, |combatant| {
        let before = combatant.health();
        let defeated = combatant.take_damage(amount);
        log.push(CombatEvent::DamageDealt {
            target: combatant.id.clone(),
            amount: before - combatant.health(),
            remaining_health: combatant.health(),
        });
        if defeated {
            info!(combatant = %combatant.id, "defeated");
            log.push(CombatEvent::CombatantDefeated {
                target: combatant.id.clone(),
                side: target.side,
            });
        }
    })
}

fn execute_command(
    command: CombatCommand,
    state: &mut EncounterState,
    log: &mut EventLog,
) -> CombatResult<()> {
    match command {
        CombatCommand::EmitEvent(event) => {
            log.push(event);
            Ok(())
        }
        CombatCommand::SetPhase(phase) => {
            state.phase = phase;
            Ok(())
        }
        CombatCommand::DealDamage { target, amount } => {
            execute_deal_damage_command(target, amount, state, log)
        }
        CombatCommand::Heal { target, amount } => with_combatant(target, state, |combatant| {
            let restored = combatant.heal(amount);
            log.push(CombatEvent::Healed {
                target: combatant.id.clone(),
                amount: restored,
                new_health: combatant.health(),
            });
        }),
        CombatCommand::SpendResource { target, amount } => {
            with_combatant(target, state, |combatant| combatant.spend_resource(amount))
        }
        CombatCommand::RestoreResource { target, amount } => {
            with_combatant(target, state, |combatant| {
                let restored = combatant.restore_resource(amount);
                log.push(CombatEvent::ResourceRestored {
                    target: combatant.id.clone(),
                    amount: restored,
                });
            })
        }
        CombatCommand::SetCooldown {
            target,
            action,
            rounds,
        } => with_combatant(target, state, |combatant| {
            combatant.set_cooldown(&action, rounds)
        }),
        CombatCommand::ConsumeItem { target, item } => with_combatant(target, state, |combatant| {
            if combatant.consume_item(&item) {
                log.push(CombatEvent::ItemUsed {
                    actor: combatant.id.clone(),
                    item,
                });
            }
        }),
        CombatCommand::AttachEffect { target, effect } => {
            with_combatant(target, state, |combatant| {
                let kind = effect.kind;
                let duration = effect.remaining_duration;
                let refreshed = combatant.effects.attach(effect).is_some();
                log.push(CombatEvent::EffectApplied {
                    target: combatant.id.clone(),
                    kind,
                    duration,
                    refreshed,
                });
            })
        }
    }
}
