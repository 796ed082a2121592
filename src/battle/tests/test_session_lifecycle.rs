#[cfg(test)]
mod tests {
    use crate::battle::engine::{get_status, is_active, start_combat, submit_action, CombatSession};
    use crate::battle::rng::{ScriptedRolls, SeededRolls};
    use crate::battle::state::{CombatEvent, Outcome, SessionPhase, Side};
    use crate::battle::tests::common::{
        assert_ok, predictable_rolls, start_test_session, test_registry, TestCombatantBuilder,
    };
    use crate::config::CombatConfig;
    use crate::errors::{CombatError, InvalidStateReason};
    use pretty_assertions::assert_eq;
    use schema::DropEntry;
    use std::sync::Arc;

    fn hero() -> TestCombatantBuilder {
        TestCombatantBuilder::new("hero")
            .attack(30)
            .speed(50)
            .actions(&["bite", "flee", "guard"])
    }

    fn wolf(health: u32) -> TestCombatantBuilder {
        TestCombatantBuilder::new("wolf")
            .health(health)
            .speed(20)
            .actions(&["bite"])
    }

    fn state_error(reason: InvalidStateReason) -> CombatError {
        CombatError::InvalidCombatState(reason)
    }

    #[test]
    fn test_start_rejects_empty_roster() {
        let mut session = CombatSession::new(
            &[hero().data()],
            &[],
            Arc::new(test_registry()),
            CombatConfig::default(),
            predictable_rolls(),
        )
        .unwrap();

        assert_eq!(session.start(), Err(state_error(InvalidStateReason::EmptyRoster('B'))));
        assert_eq!(session.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn test_start_rejects_defeated_roster() {
        let mut fallen = wolf(50).data();
        fallen.health = Some(0);
        let mut session = CombatSession::new(
            &[hero().data()],
            &[fallen],
            Arc::new(test_registry()),
            CombatConfig::default(),
            predictable_rolls(),
        )
        .unwrap();

        assert_eq!(
            session.start(),
            Err(state_error(InvalidStateReason::RosterAlreadyDefeated('B')))
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = CombatSession::new(
            &[hero().data()],
            &[TestCombatantBuilder::new("hero").data()],
            Arc::new(test_registry()),
            CombatConfig::default(),
            predictable_rolls(),
        );
        assert!(matches!(
            result,
            Err(CombatError::InvalidCombatState(InvalidStateReason::DuplicateCombatant(id))) if id == "hero"
        ));
    }

    #[test]
    fn test_actions_before_start_and_double_start() {
        let mut session = CombatSession::new(
            &[hero().data()],
            &[wolf(50).data()],
            Arc::new(test_registry()),
            CombatConfig::default(),
            predictable_rolls(),
        )
        .unwrap();

        assert_eq!(
            session.submit_action("hero", "bite", "wolf"),
            Err(state_error(InvalidStateReason::NotStarted))
        );
        assert!(!session.is_active());

        assert_ok(session.start());
        assert_eq!(session.round(), 1);
        assert_eq!(session.current_actor(), Some("hero"));
        assert_eq!(session.start(), Err(state_error(InvalidStateReason::AlreadyStarted)));
    }

    #[test]
    fn test_out_of_turn_submission_changes_nothing() {
        let mut session = start_test_session(vec![hero().data()], vec![wolf(50).data()], predictable_rolls());

        let result = session.submit_action("wolf", "bite", "hero");

        assert_eq!(
            result,
            Err(state_error(InvalidStateReason::NotActorsTurn {
                expected: "hero".to_string(),
                submitted: "wolf".to_string(),
            }))
        );
        assert_eq!(session.combatant("hero").unwrap().health(), 100);
        assert_eq!(session.current_actor(), Some("hero"));
    }

    #[test]
    fn test_victory_in_the_round_the_last_enemy_falls() {
        let mut session = start_test_session(vec![hero().data()], vec![wolf(80).data()], predictable_rolls());

        // Round 1: 42 damage, then the wolf answers for 12.
        let first = assert_ok(session.submit_action("hero", "bite", "wolf"));
        assert_eq!(first.damage_dealt, 42);
        assert!(!first.target_defeated);
        assert_ok(session.submit_action("wolf", "bite", "hero"));
        assert_eq!(session.round(), 2);
        assert_eq!(session.combatant("hero").unwrap().health(), 88);

        // Round 2: the wolf falls before it can act.
        let second = assert_ok(session.submit_action("hero", "bite", "wolf"));
        assert!(second.target_defeated);

        assert_eq!(session.phase(), SessionPhase::VictoryA);
        assert_eq!(session.outcome(), Outcome::VictoryA);
        assert_eq!(session.round(), 2);
        assert!(!session.is_active());
        assert_eq!(session.current_actor(), None);
        assert_eq!(
            session.events().last(),
            Some(&CombatEvent::CombatEnded {
                outcome: Outcome::VictoryA
            })
        );
        assert_eq!(
            session.submit_action("wolf", "bite", "hero"),
            Err(state_error(InvalidStateReason::Finished))
        );
    }

    #[test]
    fn test_status_reports_both_rosters() {
        let mut session = start_test_session(
            vec![hero().data(), TestCombatantBuilder::new("cleric").health(60).data()],
            vec![wolf(50).data()],
            predictable_rolls(),
        );
        assert_ok(session.submit_action("hero", "bite", "wolf"));

        let status = session.status();
        assert_eq!(status.roster_a.len(), 2);
        assert_eq!(status.roster_b[0].health, 8);
        assert_eq!(status.round, 1);
        assert_eq!(status.outcome, Outcome::Ongoing);
        assert_eq!(status.side_of("cleric"), Some(Side::A));
        assert_eq!(status.current_actor.as_deref(), Some("wolf"));
    }

    #[test]
    fn test_successful_flee_ends_without_loot() {
        let config = CombatConfig {
            flee_chance: 1.0,
            ..CombatConfig::default()
        };
        let mut session = start_combat(
            &[hero().data()],
            &[wolf(50).data()],
            Arc::new(test_registry()),
            config,
            ScriptedRolls::new(vec![0.3]),
        )
        .unwrap();

        let outcome = assert_ok(session.submit_action("hero", "flee", "hero"));

        assert_eq!(outcome.fled, Some(true));
        assert_eq!(session.outcome(), Outcome::Fled(Side::A));
        assert!(!is_active(&session));
        assert_eq!(
            session.roll_loot(&mut ScriptedRolls::new(vec![])),
            Err(state_error(InvalidStateReason::NoVictory))
        );
        let ended = session
            .events()
            .iter()
            .filter(|e| matches!(e, CombatEvent::CombatEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_failed_flee_uses_the_turn() {
        let mut session = start_test_session(
            vec![hero().data()],
            vec![wolf(50).data()],
            ScriptedRolls::new(vec![0.9]),
        );

        let outcome = assert_ok(session.submit_action("hero", "flee", "hero"));

        assert_eq!(outcome.fled, Some(false));
        assert!(session.is_active());
        assert_eq!(session.current_actor(), Some("wolf"));
    }

    #[test]
    fn test_boss_holds_the_party_in_place() {
        let mut session = start_test_session(
            vec![hero().data()],
            vec![wolf(50).boss().data()],
            ScriptedRolls::new(vec![0.3]),
        );

        // 0.3 would escape a common foe; a boss cuts the chance to 0.2.
        let outcome = assert_ok(session.submit_action("hero", "flee", "hero"));

        assert_eq!(outcome.fled, Some(false));
        assert!(session.is_active());
        assert!(session.events().contains(&CombatEvent::FleeFailed {
            actor: "hero".to_string()
        }));
    }

    #[test]
    fn test_loot_and_post_session_state() {
        let pelt = DropEntry {
            chance: 1.0,
            gold: Some((5, 5)),
            item: Some("wolf_pelt".to_string()),
            count: 1,
        };
        let mut session = start_test_session(
            vec![hero().data()],
            vec![wolf(40).drops(vec![pelt]).xp(25).data()],
            predictable_rolls(),
        );
        assert_ok(session.submit_action("hero", "bite", "wolf"));
        assert_eq!(session.phase(), SessionPhase::VictoryA);

        let loot = assert_ok(session.roll_loot(&mut SeededRolls::new(7)));
        assert_eq!(loot.gold, 5);
        assert_eq!(loot.xp, 25);
        assert_eq!(loot.items.get("wolf_pelt"), Some(&1));

        let (heroes, wolves) = session.into_rosters();
        assert_eq!(heroes[0].health(), 100);
        assert!(!wolves[0].is_alive());
    }

    #[test]
    fn test_free_function_surface() {
        let mut session = start_combat(
            &[hero().data()],
            &[wolf(50).data()],
            Arc::new(test_registry()),
            CombatConfig::default(),
            predictable_rolls(),
        )
        .unwrap();
        assert!(is_active(&session));

        let outcome = assert_ok(submit_action(&mut session, "hero", "bite", "wolf"));
        assert_eq!(outcome.damage_dealt, 42);

        let status = get_status(&session);
        assert_eq!(status.roster_b[0].health, 8);
        assert_eq!(status.phase, SessionPhase::Active);
    }

    #[test]
    fn test_drain_events_empties_the_log() {
        let mut session = start_test_session(vec![hero().data()], vec![wolf(50).data()], predictable_rolls());
        let drained = session.drain_events();
        assert_eq!(
            drained,
            vec![CombatEvent::CombatStarted, CombatEvent::RoundStarted { round: 1 }]
        );
        assert!(session.events().is_empty());
    }
}
