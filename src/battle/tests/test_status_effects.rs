#[cfg(test)]
mod tests {
    use crate::battle::rng::SeededRolls;
    use crate::battle::state::{CombatEvent, Outcome, SessionPhase};
    use crate::battle::engine::CombatSession;
    use crate::battle::tests::common::{
        assert_ok, predictable_rolls, start_test_session, test_registry, TestCombatantBuilder,
    };
    use crate::config::CombatConfig;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use schema::{EffectKind, Element};
    use std::sync::Arc;

    fn adder() -> TestCombatantBuilder {
        TestCombatantBuilder::new("adder")
            .speed(60)
            .actions(&["venom_fang", "guard"])
    }

    #[test]
    fn test_poison_ticks_at_round_end() {
        let mut session = start_test_session(
            vec![adder().data()],
            vec![TestCombatantBuilder::new("rabbit").health(40).actions(&["guard"]).data()],
            predictable_rolls(),
        );

        assert_ok(session.submit_action("adder", "venom_fang", "rabbit"));
        assert_eq!(session.combatant("rabbit").unwrap().health(), 35);
        assert_ok(session.submit_action("rabbit", "guard", "rabbit"));

        let rabbit = session.combatant("rabbit").unwrap();
        assert_eq!(rabbit.health(), 31);
        assert_eq!(rabbit.effects.get(EffectKind::Poison).unwrap().remaining_duration, 2);
        assert!(session.events().contains(&CombatEvent::StatusDamage {
            target: "rabbit".to_string(),
            kind: EffectKind::Poison,
            amount: 4,
            remaining_health: 31,
        }));
    }

    #[test]
    fn test_reapplying_refreshes_duration_without_stacking() {
        let mut session = start_test_session(
            vec![adder().data()],
            vec![TestCombatantBuilder::new("rabbit").health(200).actions(&["guard"]).data()],
            predictable_rolls(),
        );

        assert_ok(session.submit_action("adder", "venom_fang", "rabbit"));
        assert_ok(session.submit_action("rabbit", "guard", "rabbit"));
        assert_ok(session.submit_action("adder", "venom_fang", "rabbit"));

        let rabbit = session.combatant("rabbit").unwrap();
        assert_eq!(rabbit.effects.len(), 1);
        assert_eq!(rabbit.effects.get(EffectKind::Poison).unwrap().remaining_duration, 3);

        assert_ok(session.submit_action("rabbit", "guard", "rabbit"));
        // 200 - 5 (hit) - 4 (tick) - 5 (hit) - 4 (tick), one poison only
        assert_eq!(session.combatant("rabbit").unwrap().health(), 182);
    }

    #[test]
    fn test_poison_immune_target_takes_no_hit_damage() {
        let mut session = start_test_session(
            vec![adder().data()],
            vec![TestCombatantBuilder::new("golem")
                .immune_to(Element::Poison)
                .actions(&["guard"])
                .data()],
            predictable_rolls(),
        );

        let outcome = assert_ok(session.submit_action("adder", "venom_fang", "golem"));
        let damage = outcome.damage.unwrap();

        assert!(!damage.missed);
        assert_eq!(damage.final_amount, 0);
        assert_eq!(session.combatant("golem").unwrap().health(), 100);
    }

    #[test]
    fn test_status_damage_can_win_the_round() {
        let mut session = start_test_session(
            vec![adder().data()],
            vec![TestCombatantBuilder::new("rabbit").health(8).actions(&["guard"]).data()],
            predictable_rolls(),
        );

        assert_ok(session.submit_action("adder", "venom_fang", "rabbit"));
        assert_ok(session.submit_action("rabbit", "guard", "rabbit"));

        assert_eq!(session.phase(), SessionPhase::VictoryA);
        assert_eq!(session.round(), 1);
        assert_eq!(session.outcome(), Outcome::VictoryA);
    }

    #[test]
    fn test_guard_lasts_until_defenders_next_turn() {
        let mut session = start_test_session(
            vec![TestCombatantBuilder::new("knight").speed(60).actions(&["guard", "bite"]).data()],
            vec![TestCombatantBuilder::new("wolf").attack(28).actions(&["bite"]).data()],
            predictable_rolls(),
        );

        assert_ok(session.submit_action("knight", "guard", "knight"));
        let guarded = assert_ok(session.submit_action("wolf", "bite", "knight"));
        assert_eq!(guarded.damage_dealt, 20);
        assert!(!session.combatant("knight").unwrap().effects.has(EffectKind::Guard));

        assert_ok(session.submit_action("knight", "bite", "wolf"));
        let open = assert_ok(session.submit_action("wolf", "bite", "knight"));
        assert_eq!(open.damage_dealt, 40);
    }

    #[test]
    fn test_slowest_defender_stays_guarded_into_next_round() {
        let mut session = start_test_session(
            vec![TestCombatantBuilder::new("hero").attack(30).speed(90).actions(&["bite"]).data()],
            vec![TestCombatantBuilder::new("wolf").health(200).speed(10).actions(&["guard"]).data()],
            predictable_rolls(),
        );

        let first = assert_ok(session.submit_action("hero", "bite", "wolf"));
        assert_eq!(first.damage_dealt, 42);
        assert_ok(session.submit_action("wolf", "guard", "wolf"));

        // Round 2: the hero strikes before the wolf's turn comes round.
        assert_eq!(session.round(), 2);
        assert!(session.combatant("wolf").unwrap().effects.has(EffectKind::Guard));
        let guarded = assert_ok(session.submit_action("hero", "bite", "wolf"));
        assert_eq!(guarded.damage_dealt, 21);

        assert_eq!(session.current_actor(), Some("wolf"));
        assert!(!session.combatant("wolf").unwrap().effects.has(EffectKind::Guard));
        assert!(session.events().iter().any(|event| matches!(
            event,
            CombatEvent::EffectExpired { target, kind: EffectKind::Guard } if target == "wolf"
        )));
        assert_ok(session.pass_turn("wolf"));

        let open = assert_ok(session.submit_action("hero", "bite", "wolf"));
        assert_eq!(open.damage_dealt, 42);
    }

    #[test]
    fn test_rally_boosts_live_attack_then_expires() {
        let mut session = start_test_session(
            vec![
                TestCombatantBuilder::new("bard").speed(80).actions(&["rally", "guard"]).data(),
                TestCombatantBuilder::new("fighter").attack(20).speed(50).actions(&["bite"]).data(),
            ],
            vec![TestCombatantBuilder::new("dummy").health(1000).actions(&["guard"]).data()],
            predictable_rolls(),
        );

        assert_ok(session.submit_action("bard", "rally", "fighter"));
        let boosted = assert_ok(session.submit_action("fighter", "bite", "dummy"));
        // (20 * 1.5) + 12
        assert_eq!(boosted.damage_dealt, 42);

        assert_ok(session.submit_action("dummy", "guard", "dummy"));
        for _ in 0..2 {
            assert_ok(session.pass_turn("bard"));
            assert_ok(session.pass_turn("fighter"));
            assert_ok(session.pass_turn("dummy"));
        }
        assert!(session.combatant("fighter").unwrap().effects.is_empty());

        assert_ok(session.pass_turn("bard"));
        let plain = assert_ok(session.submit_action("fighter", "bite", "dummy"));
        assert_eq!(plain.damage_dealt, 32);
    }

    proptest! {
        #[test]
        fn prop_immune_target_never_loses_health_to_hits(seed in any::<u64>()) {
            let mut session = CombatSession::new(
                &[adder().data()],
                &[TestCombatantBuilder::new("golem")
                    .immune_to(Element::Poison)
                    .actions(&["guard"])
                    .data()],
                Arc::new(test_registry()),
                CombatConfig::default(),
                SeededRolls::new(seed),
            )
            .unwrap();
            session.start().unwrap();

            let outcome = session.submit_action("adder", "venom_fang", "golem").unwrap();
            prop_assert_eq!(outcome.damage_dealt, 0);
            prop_assert_eq!(session.combatant("golem").unwrap().health(), 100);
        }
    }
}
