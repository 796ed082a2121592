//! Scripted simulation harness: runs one encounter from RON data with a
//! simple "first usable action" policy on both sides and logs what happens.

use combat_engine::{
    ActionCategory, ActionData, ActionLookup, ActionPolicy, ActionRegistry, CombatConfig,
    CombatSession, CombatantData, CombatantId, Controller, PolicyChoice, SeededRolls,
    SessionStatus, Side, TargetRule,
};
use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Stop a stalled simulation after this many rounds.
const MAX_ROUNDS: u32 = 100;

/// Everything needed to stage one fight.
#[derive(Debug, Deserialize)]
struct Encounter {
    actions: Vec<ActionData>,
    party: Vec<CombatantData>,
    enemies: Vec<CombatantData>,
    #[serde(default)]
    seed: Option<u64>,
}

/// Uses the first known action that is ready and affordable, aimed at the
/// first living enemy or the most wounded ally.
struct FirstUsablePolicy {
    registry: Arc<ActionRegistry>,
}

impl FirstUsablePolicy {
    fn target_for(
        &self,
        view: &SessionStatus,
        actor: &str,
        side: Side,
        action: &ActionData,
    ) -> Option<CombatantId> {
        match action.target {
            TargetRule::SelfOnly => Some(actor.to_string()),
            TargetRule::Enemy => view
                .roster(side.opponent())
                .iter()
                .find(|c| c.is_alive)
                .map(|c| c.id.clone()),
            TargetRule::Ally => view
                .roster(side)
                .iter()
                .filter(|c| c.is_alive && c.health < c.max_health)
                .min_by_key(|c| c.health)
                .map(|c| c.id.clone()),
        }
    }
}

impl ActionPolicy for FirstUsablePolicy {
    fn choose(&mut self, view: &SessionStatus, actor: &CombatantId) -> Option<PolicyChoice> {
        let side = view.side_of(actor)?;
        let me = view.combatant(actor)?;

        me.actions.iter().find_map(|action_id| {
            let action = self.registry.action(action_id)?;
            let cooling = me.cooldowns.iter().any(|(id, _)| id == action_id);
            let skip = matches!(action.category, ActionCategory::Flee | ActionCategory::ItemUse);
            if cooling || skip || action.cost > me.resource {
                return None;
            }
            let target = self.target_for(view, actor, side, action)?;
            Some(PolicyChoice::new(action_id, &target))
        })
    }
}

fn load_encounter(path: &Path) -> Result<Encounter, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    Ok(ron::from_str(&content)?)
}

fn run(data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let encounter = load_encounter(&data_dir.join("encounter.ron"))?;
    let config_path = data_dir.join("combat.ron");
    let config = if config_path.exists() {
        CombatConfig::load(&config_path)?
    } else {
        CombatConfig::default()
    };

    let registry = Arc::new(ActionRegistry::from_actions(encounter.actions));
    let rng = match encounter.seed {
        Some(seed) => SeededRolls::new(seed),
        None => SeededRolls::from_os_rng(),
    };

    let mut session = CombatSession::new(
        &encounter.party,
        &encounter.enemies,
        Arc::clone(&registry),
        config,
        rng,
    )?;
    session.start()?;

    let mut policy = FirstUsablePolicy { registry };
    while session.is_active() {
        if session.round() > MAX_ROUNDS {
            warn!(rounds = MAX_ROUNDS, "no winner, stopping");
            break;
        }
        session.play_policy_turns(&mut policy)?;
        for event in session.drain_events() {
            info!(?event);
        }

        let Some(actor) = session.current_actor().map(str::to_string) else {
            break;
        };
        let player_up = session
            .combatant(&actor)
            .is_some_and(|c| c.controller == Controller::Player);
        if !player_up {
            // A new round with a policy-controlled combatant first.
            continue;
        }

        // Player-controlled combatants are driven by the same policy here.
        match policy.choose(&session.status(), &actor) {
            Some(choice) => {
                if let Err(err) = session.submit_action(&actor, &choice.action, &choice.target) {
                    warn!(%actor, %err, "choice rejected, passing");
                    session.pass_turn(&actor)?;
                }
            }
            None => session.pass_turn(&actor)?,
        }
    }

    for event in session.drain_events() {
        info!(?event);
    }

    let status = session.status();
    println!("{}", serde_json::to_string_pretty(&status)?);

    if status.phase.winner() == Some(Side::A) {
        let loot = session.roll_loot(&mut SeededRolls::from_os_rng())?;
        info!(gold = loot.gold, xp = loot.xp, items = ?loot.items, "loot");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("combat_engine=info,combat_sim=info")),
        )
        .init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    if let Err(e) = run(&data_dir) {
        eprintln!("Error running encounter: {}", e);
        std::process::exit(1);
    }
}
