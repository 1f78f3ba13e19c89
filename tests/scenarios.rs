//! End-to-end run scenarios: hand-built rooms driven tick by tick.

use std::collections::{BTreeMap, BTreeSet};

use bevy::math::{IVec2, Vec2};

use dungeon_core::combat::projectile::ExpiryReason;
use dungeon_core::combat::Element;
use dungeon_core::config::GameConstants;
use dungeon_core::constants::{DOOR_CROSSING_COOLDOWN_TICKS, PLAYER_ENTITY_ID, ROOM_TRANSITION_TICKS};
use dungeon_core::dungeon::door::{DoorDirection, DoorSet};
use dungeon_core::dungeon::{LevelMap, Room, RoomKey, RoomRole};
use dungeon_core::monster::{spawn_enemy, EnemyKind};
use dungeon_core::player::{spawn_player, Sword};
use dungeon_core::{CoreError, DungeonRun, PlayerIntent, RunEvent, RunOutcome, SessionState};

fn room(key: RoomKey, role: RoomRole, doors: &[DoorDirection]) -> Room {
    let constants = GameConstants::default();
    Room {
        key,
        role,
        doors: DoorSet::new(&constants.bounds, &constants.doors).with_existing(doors),
        enemies: Vec::new(),
    }
}

fn level(rooms: Vec<Room>, entry: RoomKey, exit: RoomKey, dim: i32) -> LevelMap {
    let count = rooms.len();
    LevelMap {
        rooms: rooms.into_iter().map(|r| (r.key, r)).collect::<BTreeMap<_, _>>(),
        entry,
        exit,
        dim,
        target_rooms: count,
        attempts: 1,
        visited: BTreeSet::from([entry]),
    }
}

/// Entry on the left, exit on the right, one door between them
fn corridor() -> LevelMap {
    let (a, b) = (RoomKey::new(0, 0), RoomKey::new(1, 0));
    level(
        vec![
            room(a, RoomRole::Entry, &[DoorDirection::Right]),
            room(b, RoomRole::Exit, &[DoorDirection::Left]),
        ],
        a,
        b,
        2,
    )
}

/// A single room that is both entry and exit
fn arena() -> LevelMap {
    let key = RoomKey::new(0, 0);
    level(vec![room(key, RoomRole::Exit, &[])], key, key, 1)
}

fn start(level: LevelMap) -> DungeonRun {
    let constants = GameConstants::default();
    let player = spawn_player(&Sword::default(), &constants).unwrap();
    DungeonRun::from_level(constants, level, player)
}

fn add_enemy(run: &mut DungeonRun, id: u32, kind: EnemyKind, pos: Vec2) {
    let constants = run.constants().clone();
    let enemy = spawn_enemy(id, kind, pos, Element::Water, &constants).unwrap();
    run.enemies_mut().unwrap().push(enemy);
}

#[test]
fn test_charger_melee_hits_player_once() {
    let mut run = start(corridor());
    let pos = run.player().pos;
    add_enemy(&mut run, 1, EnemyKind::Conejo, pos);
    let max_hp = run.player().health.max;

    // first tick only drains the spawn cooldown
    let first = run.tick(PlayerIntent::idle()).unwrap();
    assert!(first.events.is_empty());

    let second = run.tick(PlayerIntent::idle()).unwrap();
    assert_eq!(
        second.events,
        vec![RunEvent::ProjectileSpawned {
            id: 1,
            owner: 1,
            element: None
        }]
    );
    assert_eq!(run.player().health.current, max_hp);

    let third = run.tick(PlayerIntent::idle()).unwrap();
    assert_eq!(
        third.events,
        vec![RunEvent::ProjectileExpired {
            id: 1,
            reason: ExpiryReason::Hit {
                target: PLAYER_ENTITY_ID
            }
        }]
    );
    let damage = run.constants().enemy(EnemyKind::Conejo).unwrap().damage;
    assert_eq!(run.player().health.current, max_hp - damage);
    assert!(run.projectiles().is_empty());
}

#[test]
fn test_player_projectile_defeats_enemy_then_victory() {
    let mut run = start(arena());
    add_enemy(&mut run, 1, EnemyKind::Moco, Vec2::new(200.0, 148.0));
    run.enemies_mut().unwrap()[0].health.current = 5;

    let report = run.tick(PlayerIntent::attack()).unwrap();
    assert!(report.events.contains(&RunEvent::ProjectileSpawned {
        id: 1,
        owner: PLAYER_ENTITY_ID,
        element: Some(Element::Air),
    }));

    let mut defeated_at = None;
    for _ in 0..30 {
        let report = run.tick(PlayerIntent::idle()).unwrap();
        if report.events.contains(&RunEvent::EntityDefeated {
            id: 1,
            kind: EnemyKind::Moco,
        }) {
            defeated_at = Some(report.tick);
            break;
        }
    }
    let defeated_at = defeated_at.expect("the moco should fall to the first bolt");
    assert!(run.enemies().is_empty());

    let report = run.tick(PlayerIntent::idle()).unwrap();
    assert_eq!(report.tick, defeated_at + 1);
    assert_eq!(
        report.events,
        vec![RunEvent::Terminal {
            outcome: RunOutcome::Victory
        }]
    );
    assert_eq!(run.outcome(), Some(RunOutcome::Victory));
}

#[test]
fn test_defeat_is_terminal_and_sticky() {
    let mut run = start(corridor());
    run.player_mut().health.current = 0;

    let report = run.tick(PlayerIntent::walk(IVec2::X)).unwrap();
    assert_eq!(report.outcome, Some(RunOutcome::Defeat));
    assert_eq!(
        report.events,
        vec![RunEvent::Terminal {
            outcome: RunOutcome::Defeat
        }]
    );

    let pos = run.player().pos;
    let again = run.tick(PlayerIntent::walk(IVec2::X)).unwrap();
    assert_eq!(again.tick, report.tick);
    assert!(again.events.is_empty());
    assert_eq!(again.outcome, Some(RunOutcome::Defeat));
    assert_eq!(run.player().pos, pos);
}

#[test]
fn test_door_crossing_after_cooldown() {
    // keep the exit room occupied so the run does not end on arrival
    let exit = RoomKey::new(1, 0);
    let constants = GameConstants::default();
    let moco = spawn_enemy(9, EnemyKind::Moco, Vec2::new(200.0, 30.0), Element::Fire, &constants)
        .unwrap();
    let mut level = corridor();
    level.room_mut(exit).unwrap().enemies.push(moco);
    let mut run = start(level);

    // stand against the right wall, in front of the door
    let player = run.player_mut();
    player.pos = Vec2::new(240.0, 110.0);
    let (center, size) = (player.center(), player.size);
    player.hitboxes.recenter_all(center, size);

    let mut crossed_at = None;
    for _ in 0..=DOOR_CROSSING_COOLDOWN_TICKS {
        let report = run.tick(PlayerIntent::idle()).unwrap();
        if report.events.contains(&RunEvent::RoomTransition {
            from: RoomKey::new(0, 0),
            to: exit,
        }) {
            crossed_at = Some(report.tick);
        }
    }
    assert_eq!(crossed_at, Some(u64::from(DOOR_CROSSING_COOLDOWN_TICKS) + 1));
    assert_eq!(run.current_key(), exit);
    assert!(run.level().visited.contains(&exit));
    assert_eq!(run.player().pos, Vec2::new(16.0, 109.0));

    // input is ignored while the screen transition runs
    for _ in 0..ROOM_TRANSITION_TICKS {
        run.tick(PlayerIntent::walk(IVec2::X)).unwrap();
        assert_eq!(run.player().pos.x, 16.0);
    }
    run.tick(PlayerIntent::walk(IVec2::X)).unwrap();
    assert_eq!(run.player().pos.x, 19.0);
    assert_eq!(run.outcome(), None);
}

#[test]
fn test_leaving_a_room_clears_projectiles() {
    let mut run = start(corridor());
    let player = run.player_mut();
    player.pos = Vec2::new(240.0, 110.0);
    let (center, size) = (player.center(), player.size);
    player.hitboxes.recenter_all(center, size);

    for _ in 0..DOOR_CROSSING_COOLDOWN_TICKS {
        run.tick(PlayerIntent::idle()).unwrap();
    }
    // a bolt fired straight down is still in flight when the attack ends
    // and the player walks out
    run.player_mut().mov_axis = IVec2::Y;
    let fired = run.tick(PlayerIntent::attack()).unwrap();
    assert_eq!(run.projectiles().len(), 1);
    assert!(fired
        .events
        .iter()
        .all(|e| !matches!(e, RunEvent::RoomTransition { .. })));

    let mut cleared = false;
    for _ in 0..20 {
        let report = run.tick(PlayerIntent::idle()).unwrap();
        if report.events.iter().any(|e| {
            matches!(
                e,
                RunEvent::ProjectileExpired {
                    reason: ExpiryReason::RoomLeft,
                    ..
                }
            )
        }) {
            cleared = true;
        }
        if run.current_key() != RoomKey::new(0, 0) {
            break;
        }
    }
    assert_eq!(run.current_key(), RoomKey::new(1, 0));
    assert!(run.projectiles().is_empty());
    assert!(cleared);
}

#[test]
fn test_full_run_on_generated_floor() {
    let mut session = SessionState::default();
    session.dungeon.floor = 3;
    session.sword.runes_names = vec!["fire".to_string()];
    let mut run = DungeonRun::new(GameConstants::default(), &session).unwrap();
    assert_eq!(run.level().dim, 5);
    assert!(run.level().is_connected());
    assert_eq!(run.current_key(), run.level().entry);
    assert_eq!(run.player().element, Element::Fire);

    let mut spawned = BTreeSet::new();
    let axes = [IVec2::X, IVec2::Y, IVec2::NEG_X, IVec2::NEG_Y, IVec2::new(1, 1)];
    for step in 0..600u64 {
        let intent = PlayerIntent {
            axis: axes[(step / 25) as usize % axes.len()],
            attack: step % 7 == 0,
        };
        let report = run.tick(intent).unwrap();
        for event in &report.events {
            match event {
                RunEvent::ProjectileSpawned { id, .. } => {
                    assert!(spawned.insert(*id), "projectile id {id} reused");
                }
                RunEvent::ProjectileExpired { id, .. } => {
                    assert!(spawned.contains(id), "unknown projectile {id} expired");
                }
                RunEvent::RoomTransition { to, .. } => {
                    assert!(run.level().room(*to).is_some());
                }
                _ => {}
            }
        }
        let player = run.player();
        assert!(player.health.current >= 0);
        assert!(player.mov_axis.x.abs() + player.mov_axis.y.abs() == 1);
        if run.is_finished() {
            break;
        }
    }
    assert!(run.level().visited.contains(&run.current_key()));
}

#[test]
fn test_turret_bolt_outlives_its_owner() {
    let mut run = start(corridor());
    let player_center = run.player().center();
    // in sight of the player, straight to its left
    let moco_center = player_center - Vec2::new(60.0, 0.0);
    add_enemy(&mut run, 1, EnemyKind::Moco, moco_center - Vec2::splat(8.0));
    let max_hp = run.player().health.max;

    run.tick(PlayerIntent::idle()).unwrap();
    let fired = run.tick(PlayerIntent::idle()).unwrap();
    assert_eq!(
        fired.events,
        vec![RunEvent::ProjectileSpawned {
            id: 1,
            owner: 1,
            element: Some(Element::Water)
        }]
    );

    run.enemies_mut().unwrap()[0].health.current = 0;
    let swept = run.tick(PlayerIntent::idle()).unwrap();
    assert_eq!(
        swept.events,
        vec![RunEvent::EntityDefeated {
            id: 1,
            kind: EnemyKind::Moco
        }]
    );
    assert!(run.enemies().is_empty());
    assert_eq!(run.projectiles().len(), 1);

    let speed = run.constants().projectile(Element::Water).unwrap().speed;
    let mut hit_at = None;
    for _ in 0..30 {
        let before = run.projectiles()[0].pos;
        let report = run.tick(PlayerIntent::idle()).unwrap();
        if report.events.contains(&RunEvent::ProjectileExpired {
            id: 1,
            reason: ExpiryReason::Hit {
                target: PLAYER_ENTITY_ID,
            },
        }) {
            hit_at = Some(report.tick);
            break;
        }
        assert!(report.events.is_empty());
        assert_eq!(run.projectiles()[0].pos, before + Vec2::new(speed, 0.0));
    }

    // the bolt starts on the moco center and needs ten steps to reach the
    // player's defense box
    assert_eq!(hit_at, Some(12));
    let damage = run.constants().enemy(EnemyKind::Moco).unwrap().damage;
    assert_eq!(run.player().health.current, max_hp - damage);
    assert!(run.projectiles().is_empty());
}

#[test]
fn test_enemy_defeated_mid_tick_leaves_later_turns_intact() {
    let mut run = start(corridor());
    add_enemy(&mut run, 1, EnemyKind::Moco, Vec2::new(200.0, 148.0));
    add_enemy(&mut run, 2, EnemyKind::Conejo, Vec2::new(30.0, 200.0));
    run.enemies_mut().unwrap()[0].health.current = 5;

    run.tick(PlayerIntent::attack()).unwrap();

    let mut defeat = None;
    for _ in 0..30 {
        let conejo_before = run.enemies().last().unwrap().pos;
        let report = run.tick(PlayerIntent::idle()).unwrap();
        let defeated = RunEvent::EntityDefeated {
            id: 1,
            kind: EnemyKind::Moco,
        };
        if report.events.contains(&defeated) {
            defeat = Some((report, conejo_before));
            break;
        }
    }
    let (report, conejo_before) = defeat.expect("the first bolt should take the moco down");

    // the bolt resolves first, the defeat is reported by the sweep at the end
    let hit = report
        .events
        .iter()
        .position(|e| {
            matches!(
                e,
                RunEvent::ProjectileExpired {
                    reason: ExpiryReason::Hit { target: 1 },
                    ..
                }
            )
        })
        .expect("the bolt hit is reported in the same tick");
    assert_eq!(
        report.events.last(),
        Some(&RunEvent::EntityDefeated {
            id: 1,
            kind: EnemyKind::Moco
        })
    );
    assert!(hit < report.events.len() - 1);

    // the conejo behind the fallen moco still took its turn
    assert_eq!(run.enemies().len(), 1);
    let conejo = &run.enemies()[0];
    assert_eq!(conejo.id, 2);
    assert_ne!(conejo.pos, conejo_before);
    assert!(conejo.pos.x > conejo_before.x);
}

#[test]
fn test_player_bolt_spawns_at_the_far_reach() {
    let mut run = start(arena());
    add_enemy(&mut run, 1, EnemyKind::Moco, Vec2::new(30.0, 30.0));
    let pos = run.player().pos;
    assert!(!run.player().first_attack);

    run.tick(PlayerIntent::attack()).unwrap();

    // the shot leaves on the tick the attack starts, so the anchor sees the
    // previous tick's first_attack
    let air = *run.constants().projectile(Element::Air).unwrap();
    let defense = run.player().hitboxes.defense.size();
    let bolt = &run.projectiles()[0];
    assert_eq!(
        bolt.pos,
        Vec2::new(
            pos.x + defense.x - 2.0 * air.width,
            pos.y + 0.75 * defense.y - air.height
        )
    );
    assert!(run.player().first_attack);
}

#[test]
fn test_generated_five_by_five_floor() {
    let constants = GameConstants::default();
    for seed in 0..64 {
        let mut session = SessionState::default();
        session.dungeon.floor = 3;
        session.dungeon.seed = seed;
        let run = DungeonRun::new(constants.clone(), &session).unwrap();
        let level = run.level();
        assert_eq!(level.dim, 5);
        assert!(
            (5..=5 + 25 / 5 + 1).contains(&level.room_count()),
            "seed {seed}: {} rooms",
            level.room_count()
        );
        assert!(level.doors_are_reciprocal(), "seed {seed}");
        assert!(level.is_connected(), "seed {seed}");
        assert_ne!(level.entry, level.exit);
    }
}

#[test]
fn test_bad_sword_rejects_the_run() {
    let mut session = SessionState::default();
    session.sword.runes_names = vec!["fire".to_string(), "water".to_string()];
    assert!(matches!(
        DungeonRun::new(GameConstants::default(), &session),
        Err(CoreError::InvalidArgument(_))
    ));
}

#[test]
fn test_session_file_roundtrip_feeds_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut session = SessionState::default();
    session.dungeon.floor = 2;
    session.dungeon.seed = 77;
    session.save(&path).unwrap();

    let loaded = SessionState::load_or_default(&path).unwrap();
    assert_eq!(loaded, session);
    let a = DungeonRun::new(GameConstants::default(), &loaded).unwrap();
    let b = DungeonRun::new(GameConstants::default(), &session).unwrap();
    assert_eq!(a.level(), b.level());
}
