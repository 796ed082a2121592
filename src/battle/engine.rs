use crate::battle::loot::{self, Loot};
use crate::battle::resolver::{resolve_action, ActionOutcome};
use crate::battle::rng::RollSource;
use crate::battle::state::{
    CombatEvent, CombatantRef, EncounterState, EventLog, Outcome, SessionPhase, Side,
};
use crate::battle::turn_orchestrator::{advance_turn, begin_round, check_termination};
use crate::combatant::{Combatant, CombatantId, CombatantSnapshot};
use crate::config::CombatConfig;
use crate::errors::{CombatError, CombatResult, InvalidStateReason};
use crate::registry::ActionRegistry;
use schema::{CombatantData, Controller};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// An action picked by a policy for the combatant whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyChoice {
    pub action: String,
    pub target: CombatantId,
}

impl PolicyChoice {
    pub fn new(action: &str, target: &str) -> Self {
        Self {
            action: action.to_string(),
            target: target.to_string(),
        }
    }
}

/// Chooses actions for combatants with [`Controller::Policy`].
/// Returning `None` passes the turn.
pub trait ActionPolicy {
    fn choose(&mut self, view: &SessionStatus, actor: &CombatantId) -> Option<PolicyChoice>;
}

/// Read-only view of a session for callers and policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub roster_a: Vec<CombatantSnapshot>,
    pub roster_b: Vec<CombatantSnapshot>,
    pub round: u32,
    pub phase: SessionPhase,
    pub outcome: Outcome,
    pub current_actor: Option<CombatantId>,
}

impl SessionStatus {
    pub fn roster(&self, side: Side) -> &[CombatantSnapshot] {
        match side {
            Side::A => &self.roster_a,
            Side::B => &self.roster_b,
        }
    }

    pub fn side_of(&self, id: &str) -> Option<Side> {
        [Side::A, Side::B]
            .into_iter()
            .find(|&side| self.roster(side).iter().any(|c| c.id == id))
    }

    pub fn combatant(&self, id: &str) -> Option<&CombatantSnapshot> {
        self.roster_a.iter().chain(&self.roster_b).find(|c| c.id == id)
    }
}

/// One encounter between two rosters.
///
/// The session owns its combatants for its whole lifetime; callers change them
/// only through [`CombatSession::submit_action`] and friends, and read them
/// back with [`CombatSession::into_rosters`] once the encounter is over.
pub struct CombatSession<R: RollSource> {
    state: EncounterState,
    registry: Arc<ActionRegistry>,
    config: CombatConfig,
    rng: R,
    log: EventLog,
}

impl<R: RollSource> CombatSession<R> {
    /// Build a session in the `NotStarted` phase. Combatant ids must be unique
    /// across both rosters.
    pub fn new(
        roster_a: &[CombatantData],
        roster_b: &[CombatantData],
        registry: Arc<ActionRegistry>,
        config: CombatConfig,
        rng: R,
    ) -> CombatResult<Self> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = roster_a
            .iter()
            .chain(roster_b)
            .find(|data| !seen.insert(data.id.as_str()))
        {
            return Err(CombatError::InvalidCombatState(
                InvalidStateReason::DuplicateCombatant(duplicate.id.clone()),
            ));
        }

        let state = EncounterState::new(
            roster_a.iter().map(Combatant::from_data).collect(),
            roster_b.iter().map(Combatant::from_data).collect(),
        );

        Ok(Self {
            state,
            registry,
            config,
            rng,
            log: EventLog::new(),
        })
    }

    /// `NotStarted -> Active`. Fails if either roster is empty or already wiped out.
    pub fn start(&mut self) -> CombatResult<()> {
        match self.state.phase {
            SessionPhase::NotStarted => {}
            SessionPhase::Active => {
                return Err(CombatError::InvalidCombatState(
                    InvalidStateReason::AlreadyStarted,
                ))
            }
            _ => return Err(CombatError::InvalidCombatState(InvalidStateReason::Finished)),
        }

        for side in [Side::A, Side::B] {
            if self.state.roster(side).is_empty() {
                return Err(CombatError::InvalidCombatState(
                    InvalidStateReason::EmptyRoster(side.label()),
                ));
            }
            if self.state.is_roster_defeated(side) {
                return Err(CombatError::InvalidCombatState(
                    InvalidStateReason::RosterAlreadyDefeated(side.label()),
                ));
            }
        }

        self.state.phase = SessionPhase::Active;
        self.state.round = 1;
        info!(
            roster_a = self.state.roster(Side::A).len(),
            roster_b = self.state.roster(Side::B).len(),
            "combat started"
        );
        self.log.push(CombatEvent::CombatStarted);
        begin_round(&mut self.state, &mut self.log);
        advance_turn(&mut self.state, &mut self.log);
        Ok(())
    }

    fn ensure_active(&self) -> CombatResult<()> {
        match self.state.phase {
            SessionPhase::Active => Ok(()),
            SessionPhase::NotStarted => Err(CombatError::InvalidCombatState(
                InvalidStateReason::NotStarted,
            )),
            _ => Err(CombatError::InvalidCombatState(InvalidStateReason::Finished)),
        }
    }

    /// Resolve `actor_id` to its slot and check that it is that combatant's turn.
    fn ensure_turn(&self, actor_id: &str) -> CombatResult<CombatantRef> {
        self.ensure_active()?;
        let actor = self.state.find(actor_id).ok_or_else(|| {
            CombatError::InvalidCombatState(InvalidStateReason::UnknownActor(actor_id.to_string()))
        })?;
        match self.state.current {
            Some(current) if current == actor => Ok(actor),
            current => Err(CombatError::InvalidCombatState(
                InvalidStateReason::NotActorsTurn {
                    expected: current.map(|at| self.state.id_of(at)).unwrap_or_default(),
                    submitted: actor_id.to_string(),
                },
            )),
        }
    }

    fn finish_turn(&mut self) {
        if !check_termination(&mut self.state, &mut self.log) {
            advance_turn(&mut self.state, &mut self.log);
        }
    }

    /// Resolve one action for the combatant whose turn it is.
    ///
    /// Every error is raised before anything changes, so the caller can
    /// simply ask for a different action.
    pub fn submit_action(
        &mut self,
        actor_id: &str,
        action_id: &str,
        target_id: &str,
    ) -> CombatResult<ActionOutcome> {
        let actor = self.ensure_turn(actor_id)?;
        let outcome = resolve_action(
            &mut self.state,
            self.registry.as_ref(),
            &self.config,
            actor,
            action_id,
            target_id,
            &mut self.rng,
            &mut self.log,
        )?;
        self.finish_turn();
        Ok(outcome)
    }

    /// Let the current actor do nothing this turn.
    pub fn pass_turn(&mut self, actor_id: &str) -> CombatResult<()> {
        self.ensure_turn(actor_id)?;
        self.log.push(CombatEvent::TurnPassed {
            actor: actor_id.to_string(),
        });
        self.finish_turn();
        Ok(())
    }

    /// Take turns for policy-controlled combatants until a player-controlled
    /// combatant is up, the round ends, or the encounter ends.
    ///
    /// Returning at the round boundary lets the caller bound an encounter in
    /// which no side can win. A choice the engine rejects is logged and the
    /// turn is passed.
    pub fn play_policy_turns(
        &mut self,
        policy: &mut impl ActionPolicy,
    ) -> CombatResult<Vec<ActionOutcome>> {
        let mut outcomes = Vec::new();
        let round = self.state.round;

        while let Some(current) = self.state.current {
            if self.state.round != round {
                break;
            }
            let Some(actor) = self.state.combatant(current) else {
                break;
            };
            if actor.controller != Controller::Policy {
                break;
            }
            let actor_id = actor.id.clone();

            let view = self.status();
            match policy.choose(&view, &actor_id) {
                Some(choice) => match self.submit_action(&actor_id, &choice.action, &choice.target) {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(err) => {
                        warn!(actor = %actor_id, action = %choice.action, %err, "policy choice rejected");
                        self.pass_turn(&actor_id)?;
                    }
                },
                None => self.pass_turn(&actor_id)?,
            }
        }

        Ok(outcomes)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            roster_a: self.state.roster(Side::A).iter().map(Combatant::snapshot).collect(),
            roster_b: self.state.roster(Side::B).iter().map(Combatant::snapshot).collect(),
            round: self.state.round,
            phase: self.state.phase,
            outcome: self.outcome(),
            current_actor: self.current_actor().map(str::to_string),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.phase == SessionPhase::Active
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from(self.state.phase)
    }

    /// Id of the combatant expected to act next.
    pub fn current_actor(&self) -> Option<&str> {
        self.state
            .current
            .and_then(|at| self.state.combatant(at))
            .map(|c| c.id.as_str())
    }

    pub fn combatant(&self, id: &str) -> Option<&Combatant> {
        self.state.find(id).and_then(|at| self.state.combatant(at))
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn events(&self) -> &[CombatEvent] {
        self.log.events()
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.log.drain()
    }

    /// Roll drops for the losing roster. Only valid after a victory.
    pub fn roll_loot(&self, rng: &mut impl RollSource) -> CombatResult<Loot> {
        loot::roll_loot(&self.state, rng)
    }

    /// End the session and hand back both rosters in their final state.
    pub fn into_rosters(self) -> (Vec<Combatant>, Vec<Combatant>) {
        let [roster_a, roster_b] = self.state.rosters;
        (roster_a, roster_b)
    }
}

/// Build and start a session in one step.
pub fn start_combat<R: RollSource>(
    roster_a: &[CombatantData],
    roster_b: &[CombatantData],
    registry: Arc<ActionRegistry>,
    config: CombatConfig,
    rng: R,
) -> CombatResult<CombatSession<R>> {
    let mut session = CombatSession::new(roster_a, roster_b, registry, config, rng)?;
    session.start()?;
    Ok(session)
}

pub fn submit_action<R: RollSource>(
    session: &mut CombatSession<R>,
    actor_id: &str,
    action_id: &str,
    target_id: &str,
) -> CombatResult<ActionOutcome> {
    session.submit_action(actor_id, action_id, target_id)
}

pub fn get_status<R: RollSource>(session: &CombatSession<R>) -> SessionStatus {
    session.status()
}

pub fn is_active<R: RollSource>(session: &CombatSession<R>) -> bool {
    session.is_active()
}
