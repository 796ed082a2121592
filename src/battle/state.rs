use crate::combatant::{Combatant, CombatantId};
use schema::EffectKind;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// One of the two rosters of an encounter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn to_index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn label(self) -> char {
        match self {
            Side::A => 'A',
            Side::B => 'B',
        }
    }
}

/// Position of a combatant inside the encounter: its roster and slot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CombatantRef {
    pub side: Side,
    pub index: usize,
}

impl CombatantRef {
    pub fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    Active,
    VictoryA,
    VictoryB,
    /// The given side left the field.
    Fled(Side),
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionPhase::VictoryA | SessionPhase::VictoryB | SessionPhase::Fled(_)
        )
    }

    pub fn victory_for(side: Side) -> SessionPhase {
        match side {
            Side::A => SessionPhase::VictoryA,
            Side::B => SessionPhase::VictoryB,
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            SessionPhase::VictoryA => Some(Side::A),
            SessionPhase::VictoryB => Some(Side::B),
            _ => None,
        }
    }
}

/// Result of the encounter as reported to callers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    VictoryA,
    VictoryB,
    Fled(Side),
}

impl From<SessionPhase> for Outcome {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::NotStarted | SessionPhase::Active => Outcome::Ongoing,
            SessionPhase::VictoryA => Outcome::VictoryA,
            SessionPhase::VictoryB => Outcome::VictoryB,
            SessionPhase::Fled(side) => Outcome::Fled(side),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum CombatEvent {
    // Flow
    CombatStarted,
    RoundStarted {
        round: u32,
    },
    TurnSkipped {
        actor: CombatantId,
        cause: EffectKind,
    },
    TurnPassed {
        actor: CombatantId,
    },
    CombatEnded {
        outcome: Outcome,
    },

    // Actions
    ActionUsed {
        actor: CombatantId,
        action: String,
        target: CombatantId,
    },
    ActionMissed {
        actor: CombatantId,
        action: String,
        target: CombatantId,
    },
    CriticalHit {
        actor: CombatantId,
        target: CombatantId,
    },
    ReactionTriggered {
        target: CombatantId,
        reaction: String,
    },
    ItemUsed {
        actor: CombatantId,
        item: String,
    },
    Defending {
        actor: CombatantId,
    },
    FleeFailed {
        actor: CombatantId,
    },
    Fled {
        actor: CombatantId,
        side: Side,
    },

    // Combatant changes
    DamageDealt {
        target: CombatantId,
        amount: u32,
        remaining_health: u32,
    },
    Healed {
        target: CombatantId,
        amount: u32,
        new_health: u32,
    },
    ResourceRestored {
        target: CombatantId,
        amount: u32,
    },
    EffectApplied {
        target: CombatantId,
        kind: EffectKind,
        duration: u32,
        refreshed: bool,
    },
    StatusDamage {
        target: CombatantId,
        kind: EffectKind,
        amount: u32,
        remaining_health: u32,
    },
    EffectExpired {
        target: CombatantId,
        kind: EffectKind,
    },
    Regenerated {
        target: CombatantId,
        health: u32,
        resource: u32,
    },
    CombatantDefeated {
        target: CombatantId,
        side: Side,
    },
}

/// Ordered record of everything that happened in an encounter.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Hand every recorded event to the caller, leaving the log empty.
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl fmt::Display for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Everything a session mutates: both rosters, the round counter, the phase
/// and this round's remaining turns.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EncounterState {
    pub rosters: [Vec<Combatant>; 2],
    pub round: u32,
    pub phase: SessionPhase,
    /// Acting order fixed at the start of the current round.
    pub round_order: Vec<CombatantRef>,
    /// Turns still to be taken this round, front is next.
    pub turn_queue: VecDeque<CombatantRef>,
    /// Whose turn it is; `None` outside of an active round.
    pub current: Option<CombatantRef>,
}

impl EncounterState {
    pub fn new(roster_a: Vec<Combatant>, roster_b: Vec<Combatant>) -> Self {
        Self {
            rosters: [roster_a, roster_b],
            round: 0,
            phase: SessionPhase::NotStarted,
            round_order: Vec::new(),
            turn_queue: VecDeque::new(),
            current: None,
        }
    }

    pub fn roster(&self, side: Side) -> &[Combatant] {
        &self.rosters[side.to_index()]
    }

    pub fn combatant(&self, at: CombatantRef) -> Option<&Combatant> {
        self.rosters[at.side.to_index()].get(at.index)
    }

    pub fn combatant_mut(&mut self, at: CombatantRef) -> Option<&mut Combatant> {
        self.rosters[at.side.to_index()].get_mut(at.index)
    }

    /// Locate a combatant by id. Ids are unique across both rosters.
    pub fn find(&self, id: &str) -> Option<CombatantRef> {
        [Side::A, Side::B].into_iter().find_map(|side| {
            self.roster(side)
                .iter()
                .position(|c| c.id == id)
                .map(|index| CombatantRef::new(side, index))
        })
    }

    /// Every slot, roster A first, each roster in insertion order.
    pub fn all_refs(&self) -> Vec<CombatantRef> {
        [Side::A, Side::B]
            .into_iter()
            .flat_map(|side| {
                (0..self.roster(side).len()).map(move |index| CombatantRef::new(side, index))
            })
            .collect()
    }

    pub fn is_roster_defeated(&self, side: Side) -> bool {
        self.roster(side).iter().all(|c| !c.is_alive())
    }

    pub fn id_of(&self, at: CombatantRef) -> CombatantId {
        self.combatant(at).map(|c| c.id.clone()).unwrap_or_default()
    }
}
