// Combat Schema - Shared content record definitions
// This crate contains the plain data records that the content layer hands to
// the combat engine: elements, action definitions and combatant definitions.
// Nothing in here mutates; runtime state lives in the engine crate.

// Re-export the main types
pub use action_data::*;
pub use combatant_data::*;
pub use elements::*;

pub mod action_data;
pub mod combatant_data;
pub mod elements;
