use crate::battle::rng::{roll_in_range, RollSource};
use crate::battle::state::EncounterState;
use crate::errors::{CombatError, CombatResult, InvalidStateReason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Spoils of a won encounter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loot {
    pub gold: u32,
    pub xp: u32,
    pub items: BTreeMap<String, u32>,
}

impl Loot {
    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.xp == 0 && self.items.is_empty()
    }
}

/// Roll the drop tables of every defeated member of the losing roster.
///
/// Experience is awarded in full for every defeated loser. Each drop entry
/// draws once against its chance and, if it drops with a gold range, once
/// more for the amount. Only valid after a victory.
pub fn roll_loot(state: &EncounterState, rng: &mut impl RollSource) -> CombatResult<Loot> {
    let winner = state
        .phase
        .winner()
        .ok_or(CombatError::InvalidCombatState(InvalidStateReason::NoVictory))?;

    let mut loot = Loot::default();
    for fallen in state
        .roster(winner.opponent())
        .iter()
        .filter(|c| !c.is_alive())
    {
        loot.xp = loot.xp.saturating_add(fallen.xp);
        for entry in &fallen.drops {
            if rng.roll("drop chance") >= entry.chance {
                continue;
            }
            if let Some((low, high)) = entry.gold {
                let amount = roll_in_range(rng.roll("gold amount"), low, high);
                loot.gold = loot.gold.saturating_add(amount);
            }
            if let Some(item) = &entry.item {
                let count = loot.items.entry(item.clone()).or_insert(0);
                *count = count.saturating_add(entry.count);
            }
        }
    }

    debug!(gold = loot.gold, xp = loot.xp, items = loot.items.len(), "loot rolled");
    Ok(loot)
}
