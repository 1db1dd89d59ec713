//! Engine lifecycle tests: scheduling, player submissions, items, flee, and
//! terminal outcomes.

mod common;

use battle_core::{
    AbilityId, BaseStats, BattleConfig, BattleEngine, BattleError, BattleEvent, BattleOutcome,
    BattleStatus, ItemEffect, ResolveError, Side, TargetScope, TargetRef,
};

use common::{
    AlwaysDrop, Catalog, FixedRng, NoLoot, RecordingLeveler, defend, enemy, env, hero, physical,
    strike,
};

fn roster(names: &[&str]) -> Vec<String> {
    names.iter().map(|&n| n.to_string()).collect()
}

#[test]
fn killing_the_last_enemy_wins_with_rewards() {
    let catalog = Catalog::new(vec![
        strike(),
        physical("bite", 10, TargetScope::SingleEnemy),
    ]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    let rng = FixedRng(0);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 10), 50, 10, &["strike"])];
    let enemies = vec![enemy(10, "slime", BaseStats::new(5, 5, 5), 20, &["bite"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    let status = engine.advance(&env).unwrap();
    assert_eq!(
        status,
        BattleStatus::AwaitingPlayer {
            combatant: battle_core::CombatantId(0)
        }
    );

    // floor(20 * (10/5) * 0.8 * 0.9) = 28, enough to finish a 20 hp slime.
    let status = engine
        .submit_player_action(
            &AbilityId::from("strike"),
            Some(TargetRef::new(Side::Enemy, 0)),
            &env,
        )
        .unwrap();

    let BattleStatus::Finished(BattleOutcome::Victory(rewards)) = status else {
        panic!("expected victory, got {status:?}");
    };
    assert_eq!(rewards.xp_per_member, 10);
    assert_eq!(rewards.gold, 5);
    assert!(rewards.loot.is_empty());
    assert!(rewards.level_ups.is_empty());

    let events = engine.drain_events();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, BattleEvent::CombatantDied { combatant } if combatant.0 == 10))
    );
    assert!(
        events
            .iter()
            .any(|e| matches!(e, BattleEvent::BattleEnded { .. }))
    );
}

#[test]
fn mp_is_spent_even_when_the_attack_misses() {
    let mut gust = physical("gust", 10, TargetScope::SingleEnemy);
    gust.accuracy = 50;
    gust.mp_cost = 3;
    let catalog = Catalog::new(vec![gust, physical("bite", 10, TargetScope::SingleEnemy)]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    // d100 always rolls 96: a 50-accuracy attack always misses.
    let rng = FixedRng(u32::MAX);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 10), 50, 10, &["gust"])];
    let enemies = vec![enemy(10, "slime", BaseStats::new(5, 5, 5), 20, &["bite"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    engine.advance(&env).unwrap();
    let status = engine
        .submit_player_action(
            &AbilityId::from("gust"),
            Some(TargetRef::new(Side::Enemy, 0)),
            &env,
        )
        .unwrap();

    // The cost stuck, the enemy is unscathed, and the battle moved on.
    assert_eq!(engine.party()[0].mp, 7);
    assert_eq!(engine.enemies()[0].hp, 20);
    assert!(matches!(status, BattleStatus::AwaitingPlayer { .. }));
}

#[test]
fn insufficient_mp_rejects_with_no_state_change() {
    let mut nova = physical("nova", 30, TargetScope::SingleEnemy);
    nova.mp_cost = 5;
    let catalog = Catalog::new(vec![nova, physical("bite", 10, TargetScope::SingleEnemy)]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    let rng = FixedRng(0);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 10), 50, 3, &["nova"])];
    let enemies = vec![enemy(10, "slime", BaseStats::new(5, 5, 5), 20, &["bite"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    engine.advance(&env).unwrap();
    let err = engine
        .submit_player_action(
            &AbilityId::from("nova"),
            Some(TargetRef::new(Side::Enemy, 0)),
            &env,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        BattleError::Resolve(ResolveError::InsufficientMp {
            needed: 5,
            available: 3
        })
    ));
    assert_eq!(engine.party()[0].mp, 3);
    assert_eq!(engine.enemies()[0].hp, 20);
    // The same decision is still pending.
    assert!(matches!(
        engine.advance(&env).unwrap(),
        BattleStatus::AwaitingPlayer { combatant } if combatant.0 == 0
    ));
}

#[test]
fn successful_flee_ends_the_battle_with_enemies_unharmed() {
    let catalog = Catalog::new(vec![
        strike(),
        physical("bite", 10, TargetScope::SingleEnemy),
    ]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    let rng = FixedRng(0);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 10), 50, 10, &["strike"])];
    let enemies = vec![enemy(10, "slime", BaseStats::new(5, 5, 5), 20, &["bite"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    engine.advance(&env).unwrap();
    let status = engine.attempt_flee(&env).unwrap();

    assert_eq!(status, BattleStatus::Finished(BattleOutcome::Fled));
    assert_eq!(engine.enemies()[0].hp, 20);
    assert!(
        engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, BattleEvent::FleeAttempted { success: true }))
    );
}

#[test]
fn failed_flee_costs_the_turn() {
    let catalog = Catalog::new(vec![
        strike(),
        physical("bite", 10, TargetScope::SingleEnemy),
    ]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    // Fraction just under 1.0 beats even the 0.85 flee cap.
    let rng = FixedRng(u32::MAX);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 10), 50, 10, &["strike"])];
    let enemies = vec![enemy(10, "slime", BaseStats::new(5, 5, 5), 20, &["bite"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    engine.advance(&env).unwrap();
    let status = engine.attempt_flee(&env).unwrap();

    // The enemy got its turn before control came back.
    assert!(matches!(status, BattleStatus::AwaitingPlayer { .. }));
    assert!(engine.party()[0].hp < 50);
    assert!(
        engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, BattleEvent::FleeAttempted { success: false }))
    );
}

#[test]
fn flee_is_rejected_when_the_encounter_forbids_it() {
    let catalog = Catalog::new(vec![
        strike(),
        physical("bite", 10, TargetScope::SingleEnemy),
    ]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    let rng = FixedRng(0);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 10), 50, 10, &["strike"])];
    let enemies = vec![enemy(10, "slime", BaseStats::new(5, 5, 5), 20, &["bite"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla"]),
        BattleConfig::with_seed(7).without_flee(),
        &env,
    )
    .unwrap();

    engine.advance(&env).unwrap();
    assert!(matches!(
        engine.attempt_flee(&env),
        Err(BattleError::FleeDisabled)
    ));
    // Still the player's turn.
    assert!(matches!(
        engine.advance(&env).unwrap(),
        BattleStatus::AwaitingPlayer { .. }
    ));
}

#[test]
fn party_wipe_is_a_defeat_without_player_input() {
    let catalog = Catalog::new(vec![
        strike(),
        physical("maul", 20, TargetScope::SingleEnemy),
    ]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    let rng = FixedRng(0);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 1), 1, 10, &["strike"])];
    let enemies = vec![enemy(10, "ogre", BaseStats::new(10, 5, 10), 80, &["maul"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    let status = engine.advance(&env).unwrap();
    assert_eq!(status, BattleStatus::Finished(BattleOutcome::Defeat));
}

#[test]
fn items_enforce_target_state_and_cost_the_turn() {
    let catalog = Catalog::new(vec![
        strike(),
        physical("bite", 2, TargetScope::SingleEnemy),
    ]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    let rng = FixedRng(0);
    let env = env(&catalog, &loot, &leveler, &rng);

    let mut fallen = hero(1, "borin", BaseStats::new(8, 5, 8), 40, 5, &["strike"]);
    fallen.hp = 0;
    let party = vec![
        hero(0, "ayla", BaseStats::new(10, 5, 10), 50, 10, &["strike"]),
        fallen,
    ];
    let enemies = vec![enemy(10, "slime", BaseStats::new(5, 5, 1), 200, &["bite"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla", "borin"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    engine.advance(&env).unwrap();

    // Healing the dead is illegal and leaves the turn pending.
    assert!(matches!(
        engine.submit_item_use(ItemEffect::RestoreHp(5), TargetRef::new(Side::Party, 1), &env),
        Err(BattleError::InvalidItemTarget { .. })
    ));

    // Reviving the dead works and consumes the turn.
    let status = engine
        .submit_item_use(ItemEffect::Revive(10), TargetRef::new(Side::Party, 1), &env)
        .unwrap();
    assert_eq!(engine.party()[1].hp, 10);
    assert!(matches!(status, BattleStatus::AwaitingPlayer { .. }));

    // Reviving the living is illegal.
    assert!(matches!(
        engine.submit_item_use(ItemEffect::Revive(10), TargetRef::new(Side::Party, 0), &env),
        Err(BattleError::InvalidItemTarget { .. })
    ));

    assert!(
        engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, BattleEvent::ItemUsed { .. }))
    );
}

#[test]
fn joining_member_acts_from_the_next_round() {
    let catalog = Catalog::new(vec![
        strike(),
        defend(),
        physical("bite", 2, TargetScope::SingleEnemy),
    ]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    let rng = FixedRng(0);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 5), 50, 10, &["defend"])];
    let enemies = vec![enemy(10, "slime", BaseStats::new(5, 5, 1), 200, &["bite"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    engine.advance(&env).unwrap();

    let joined = engine
        .add_party_member(
            &battle_core::RosterCharacter {
                name: "kira".to_string(),
                base: BaseStats::new(9, 4, 20),
                equip_bonus: BaseStats::default(),
                max_hp: 35,
                max_mp: 5,
                abilities: vec![AbilityId::from("strike")],
                off_hand_occupied: false,
            },
            &env,
        )
        .unwrap();
    assert_eq!(engine.party().len(), 2);

    // Finish the current round; the fastest unit of the rebuilt queue is the
    // newcomer.
    let status = engine
        .submit_player_action(&AbilityId::from("defend"), None, &env)
        .unwrap();
    assert_eq!(status, BattleStatus::AwaitingPlayer { combatant: joined });
    assert!(
        engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, BattleEvent::PartyMemberJoined { combatant } if *combatant == joined))
    );
}

#[test]
fn finished_battles_reject_further_submissions() {
    let catalog = Catalog::new(vec![
        strike(),
        physical("bite", 10, TargetScope::SingleEnemy),
    ]);
    let loot = NoLoot;
    let leveler = RecordingLeveler::new(false);
    let rng = FixedRng(0);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 10), 50, 10, &["strike"])];
    let enemies = vec![enemy(10, "slime", BaseStats::new(5, 5, 5), 20, &["bite"])];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    engine.advance(&env).unwrap();
    engine
        .submit_player_action(
            &AbilityId::from("strike"),
            Some(TargetRef::new(Side::Enemy, 0)),
            &env,
        )
        .unwrap();
    assert!(engine.is_finished());

    assert!(matches!(
        engine.submit_player_action(
            &AbilityId::from("strike"),
            Some(TargetRef::new(Side::Enemy, 0)),
            &env,
        ),
        Err(BattleError::Finished)
    ));
    assert!(matches!(
        engine.attempt_flee(&env),
        Err(BattleError::Finished)
    ));
    assert!(matches!(
        engine.advance(&env).unwrap(),
        BattleStatus::Finished(_)
    ));
}

#[test]
fn area_victory_collects_loot_and_shared_level_ups() {
    let catalog = Catalog::new(vec![
        physical("quake", 40, TargetScope::AllEnemies),
        physical("bite", 10, TargetScope::SingleEnemy),
    ]);
    let loot = AlwaysDrop("herb");
    let leveler = RecordingLeveler::new(true);
    let rng = FixedRng(0);
    let env = env(&catalog, &loot, &leveler, &rng);

    let party = vec![hero(0, "ayla", BaseStats::new(10, 5, 10), 50, 10, &["quake"])];
    let enemies = vec![
        enemy(10, "slime", BaseStats::new(5, 5, 5), 20, &["bite"]),
        enemy(11, "slime", BaseStats::new(5, 5, 4), 20, &["bite"]),
    ];

    let mut engine = BattleEngine::new(
        party,
        enemies,
        roster(&["ayla", "borin"]),
        BattleConfig::with_seed(7),
        &env,
    )
    .unwrap();

    engine.advance(&env).unwrap();
    let status = engine
        .submit_player_action(&AbilityId::from("quake"), None, &env)
        .unwrap();

    let BattleStatus::Finished(BattleOutcome::Victory(rewards)) = status else {
        panic!("expected victory, got {status:?}");
    };
    assert_eq!(rewards.xp_per_member, 20);
    assert_eq!(rewards.gold, 10);
    assert_eq!(rewards.loot, vec!["herb".to_string(), "herb".to_string()]);
    // XP is shared: the benched roster member levels too.
    assert_eq!(rewards.level_ups.len(), 2);
    let awards = leveler.awards.lock().unwrap();
    assert_eq!(awards.len(), 2);
    assert!(awards.iter().all(|(_, amount)| *amount == 20));
}
