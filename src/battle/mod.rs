pub mod calculators;
pub mod commands;
pub mod conditions;
pub mod engine;
pub mod loot;
pub mod resistance;
pub mod resolver;
pub mod rng;
pub mod state;
pub mod stats;
pub mod turn_orchestrator;

#[cfg(test)]
mod tests;
