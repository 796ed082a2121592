//! Turn Scheduler: acting order, the turn queue, round-end processing and
//! termination checks.

use crate::battle::conditions::apply_round_effects;
use crate::battle::state::{
    CombatEvent, CombatantRef, EncounterState, EventLog, Outcome, SessionPhase, Side,
};
use crate::battle::stats::effective_speed;
use crate::combatant::Combatant;
use ordered_float::OrderedFloat;
use schema::EffectKind;
use std::cmp::Reverse;
use tracing::{debug, info};

/// Living combatants ordered by effective speed, fastest first.
///
/// The sort is stable over roster A then roster B in insertion order, so ties
/// always resolve the same way.
pub fn acting_order(state: &EncounterState) -> Vec<CombatantRef> {
    let mut order: Vec<(CombatantRef, f64)> = state
        .all_refs()
        .into_iter()
        .filter_map(|at| {
            state
                .combatant(at)
                .filter(|c| c.is_alive())
                .map(|c| (at, effective_speed(c)))
        })
        .collect();
    order.sort_by_key(|&(_, speed)| Reverse(OrderedFloat(speed)));
    order.into_iter().map(|(at, _)| at).collect()
}

/// Fix this round's acting order and queue everyone up.
pub fn begin_round(state: &mut EncounterState, log: &mut EventLog) {
    state.round_order = acting_order(state);
    state.turn_queue = state.round_order.iter().copied().collect();
    info!(round = state.round, "round started");
    log.push(CombatEvent::RoundStarted { round: state.round });
}

/// The effect that makes a combatant lose its turn, if any.
fn skip_cause(combatant: &Combatant) -> Option<EffectKind> {
    combatant
        .effects
        .iter()
        .find(|effect| effect.skips_turn)
        .map(|effect| effect.kind)
}

/// Move to the next combatant able to act, running round ends as the queue
/// empties. Leaves `state.current` as `None` once the encounter is over.
pub fn advance_turn(state: &mut EncounterState, log: &mut EventLog) {
    state.current = None;

    while state.phase == SessionPhase::Active {
        let Some(next) = state.turn_queue.pop_front() else {
            end_round(state, log);
            if state.phase == SessionPhase::Active {
                begin_round(state, log);
            }
            continue;
        };

        let Some(combatant) = state.combatant_mut(next) else {
            continue;
        };
        if !combatant.is_alive() {
            continue;
        }
        for kind in combatant.effects.expire_at_turn_start() {
            debug!(combatant = %combatant.id, effect = %kind, "effect expired");
            log.push(CombatEvent::EffectExpired {
                target: combatant.id.clone(),
                kind,
            });
        }
        if let Some(cause) = skip_cause(combatant) {
            info!(combatant = %combatant.id, effect = %cause, "turn skipped");
            log.push(CombatEvent::TurnSkipped {
                actor: combatant.id.clone(),
                cause,
            });
            continue;
        }

        state.current = Some(next);
        return;
    }
}

/// Round end: each living combatant, in this round's acting order, takes its
/// status effects and then regenerates. Termination is checked after every
/// combatant so a wiped roster loses immediately. If the encounter survives,
/// the round counter advances and every cooldown ticks down.
pub fn end_round(state: &mut EncounterState, log: &mut EventLog) {
    let order = state.round_order.clone();

    for at in order {
        let Some(combatant) = state.combatant_mut(at) else {
            continue;
        };
        if !combatant.is_alive() {
            continue;
        }

        let tick = apply_round_effects(combatant);
        for (kind, amount) in tick.damage {
            log.push(CombatEvent::StatusDamage {
                target: combatant.id.clone(),
                kind,
                amount,
                remaining_health: combatant.health(),
            });
        }
        for kind in tick.expired {
            log.push(CombatEvent::EffectExpired {
                target: combatant.id.clone(),
                kind,
            });
        }

        if tick.defeated {
            info!(combatant = %combatant.id, "defeated by status damage");
            log.push(CombatEvent::CombatantDefeated {
                target: combatant.id.clone(),
                side: at.side,
            });
            if check_termination(state, log) {
                return;
            }
            continue;
        }

        let (health, resource) = combatant.regenerate();
        if health > 0 || resource > 0 {
            log.push(CombatEvent::Regenerated {
                target: combatant.id.clone(),
                health,
                resource,
            });
        }
    }

    state.round += 1;
    for roster in state.rosters.iter_mut() {
        for combatant in roster.iter_mut() {
            combatant.tick_cooldowns();
        }
    }
}

/// Settle the outcome if the encounter is over. Returns true once it is.
///
/// An active encounter ends the instant either roster has no living member;
/// the other roster wins. A phase already made terminal by an action (a
/// successful flee) is concluded here as well.
pub fn check_termination(state: &mut EncounterState, log: &mut EventLog) -> bool {
    match state.phase {
        SessionPhase::Active => {
            let Some(loser) = [Side::A, Side::B]
                .into_iter()
                .find(|&side| state.is_roster_defeated(side))
            else {
                return false;
            };
            state.phase = SessionPhase::victory_for(loser.opponent());
            conclude(state, log);
            true
        }
        phase if phase.is_terminal() => {
            if state.current.is_some() {
                conclude(state, log);
            }
            true
        }
        _ => false,
    }
}

fn conclude(state: &mut EncounterState, log: &mut EventLog) {
    state.current = None;
    state.turn_queue.clear();
    let outcome = Outcome::from(state.phase);
    info!(?outcome, round = state.round, "combat ended");
    log.push(CombatEvent::CombatEnded { outcome });
}
