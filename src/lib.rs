// In: src/lib.rs

//! Turn-Based Combat Engine
//!
//! Resolves encounters between two rosters of combatants: acting order by
//! speed, damage with resistances, criticals and variance, timed status
//! effects, resource and cooldown bookkeeping, and victory detection. All
//! randomness is injected so every outcome can be replayed.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod combatant;
pub mod config;
pub mod errors;
pub mod registry;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Plain data records supplied by the content layer.
pub use schema::{
    ActionCategory, ActionData, BaseStats, CombatantData, Controller, DropEntry, EffectKind,
    EffectTemplate, Element, StatType, TargetRule,
};

// --- From this crate's modules (`src/`) ---

// Session surface.
pub use battle::engine::{
    get_status, is_active, start_combat, submit_action, ActionPolicy, CombatSession,
    PolicyChoice, SessionStatus,
};
pub use battle::loot::Loot;
pub use battle::resolver::ActionOutcome;
pub use battle::state::{CombatEvent, Outcome, SessionPhase, Side};

// Pure building blocks.
pub use battle::calculators::{calculate_damage, DamageResult};
pub use battle::resistance::resolve as resolve_resistance;
pub use battle::rng::{RollSource, ScriptedRolls, SeededRolls};

// Runtime types.
pub use combatant::{Combatant, CombatantId, CombatantSnapshot};
pub use config::{CombatConfig, Reaction};
pub use registry::{ActionLookup, ActionRegistry};

// Crate-specific error and result types.
pub use errors::{
    CombatError, CombatResult, ConfigError, ConfigResult, InvalidActionReason,
    InvalidStateReason, InvalidTargetReason,
};
