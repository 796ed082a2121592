use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the combat engine.
///
/// Every variant is raised during validation, before the session is touched,
/// so a caller can always recover by re-prompting for a different action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// The action is unknown, not usable by this actor, or cooling down
    #[error("invalid action: {0}")]
    InvalidAction(InvalidActionReason),
    /// The actor cannot pay the action's resource cost
    #[error("{actor} needs {required} resource but has {available}")]
    InsufficientResource {
        actor: String,
        required: u32,
        available: u32,
    },
    /// The target is defeated or on the wrong side for the action's rule
    #[error("invalid target: {0}")]
    InvalidTarget(InvalidTargetReason),
    /// The session is not in a state that accepts the request
    #[error("invalid combat state: {0}")]
    InvalidCombatState(InvalidStateReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidActionReason {
    #[error("action '{0}' is not defined")]
    UnknownAction(String),
    #[error("{actor} does not know '{action}'")]
    NotKnownByActor { actor: String, action: String },
    #[error("'{action}' is on cooldown for {remaining} more round(s)")]
    OnCooldown { action: String, remaining: u32 },
    #[error("{actor} has no '{item}' left")]
    NoItemsLeft { actor: String, item: String },
    #[error("'{0}' does not name an item to use")]
    MissingItem(String),
    #[error("'{0}' has no status effect to apply")]
    MissingEffect(String),
    #[error("{0} is defeated and cannot act")]
    ActorDefeated(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTargetReason {
    #[error("no combatant with id '{0}'")]
    UnknownTarget(String),
    #[error("{0} is defeated")]
    TargetDefeated(String),
    #[error("{target} is on the wrong side for '{action}'")]
    WrongRoster { action: String, target: String },
    #[error("'{0}' can only target its user")]
    NotSelf(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateReason {
    #[error("combat has not started")]
    NotStarted,
    #[error("combat has already started")]
    AlreadyStarted,
    #[error("combat is over")]
    Finished,
    #[error("roster {0} is empty")]
    EmptyRoster(char),
    #[error("roster {0} is already defeated")]
    RosterAlreadyDefeated(char),
    #[error("two combatants share the id '{0}'")]
    DuplicateCombatant(String),
    #[error("it is {expected}'s turn, not {submitted}'s")]
    NotActorsTurn { expected: String, submitted: String },
    #[error("no combatant with id '{0}'")]
    UnknownActor(String),
    #[error("loot can only be rolled after a victory")]
    NoVictory,
}

/// Errors raised while loading a [`crate::config::CombatConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed combat config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid combat config: {0}")]
    Invalid(String),
}

/// Type alias for Results using CombatError
pub type CombatResult<T> = Result<T, CombatError>;

/// Type alias for Results using ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
