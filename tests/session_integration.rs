use std::path::Path;

use maskhunt::{
    AbilityKind, BacklogPolicy, Clock, Direction, Event, GameConfig, GridPos, Level, Outcome,
    Session,
};

fn clock() -> Clock {
    Clock::new(0.5, BacklogPolicy::Single).unwrap()
}

#[test]
fn straight_mask_vaults_a_wall() {
    let level = Level::parse(
        "#######\n\
         #@H#..#\n\
         #######",
        GridPos::origin(),
    )
    .unwrap();
    let mut session = Session::builder()
        .clock(clock())
        .target_survival_ticks(2)
        .level(level)
        .build()
        .unwrap();
    let player = session.player().unwrap();

    session.press(Direction::Right).unwrap();
    let first = session.advance(0.5);
    assert_eq!(first.len(), 1);
    assert!(first[0].events.contains(&Event::AbilityChanged {
        actor: player,
        from: AbilityKind::None,
        to: AbilityKind::Straight,
        position: GridPos::new(2, 1)
    }));

    session.press(Direction::Right).unwrap();
    assert_eq!(
        session.engine().predicted_pattern(player).unwrap().net(),
        GridPos::new(2, 0)
    );
    session.advance(0.5);

    let actor = session.engine().actor(player).unwrap();
    assert_eq!(actor.position, GridPos::new(4, 1));
    assert_eq!(actor.ability, AbilityKind::Straight);
    assert_eq!(session.outcome(), Outcome::Victory { tick: 2 });
}

#[test]
fn boxed_in_turtle_still_hunts() {
    let level = Level::parse("####\n#@t#\n####", GridPos::origin()).unwrap();
    let mut session = Session::builder()
        .clock(clock())
        .level(level)
        .build()
        .unwrap();

    let fired = session.advance(0.5);
    assert_eq!(fired.len(), 1);
    assert!(matches!(
        session.outcome(),
        Outcome::Caught {
            tick: 1,
            by: AbilityKind::Rest,
            ..
        }
    ));
    assert_eq!(session.outcome().to_string(), "HUNTED BY TURTLE");
}

#[test]
fn matching_mask_walks_past_pursuer() {
    let level = Level::parse("####\n#@t#\n####", GridPos::origin()).unwrap();
    let mut session = Session::builder()
        .clock(clock())
        .player_ability(AbilityKind::Rest)
        .target_survival_ticks(4)
        .level(level)
        .build()
        .unwrap();
    for _ in 0..8 {
        session.advance(0.5);
    }
    assert_eq!(session.outcome(), Outcome::Victory { tick: 4 });
}

#[test]
fn config_drives_clock_and_spawns() {
    let config = GameConfig::parse(
        r#"
        [clock]
        backlog = "drain"

        [session]
        seed = 5
        target_survival_ticks = 10

        [[spawns]]
        tick = 2
        warning_ticks = 1
        position = { x = 3.5, y = 1.5 }
        prefab = { kind = "collectible", ability = "diagonal" }
        "#,
        Path::new("inline.toml"),
    )
    .unwrap();
    let level = Level::parse("######\n#@...#\n######", GridPos::origin()).unwrap();
    let mut session = config.session_builder().unwrap().level(level).build().unwrap();

    let fired = session.advance(1.0);
    assert_eq!(fired.len(), 2);
    assert!(fired[0].events.contains(&Event::SpawnWarning {
        position: GridPos::new(3, 1),
        spawn_tick: 2
    }));
    assert!(fired[1].events.contains(&Event::CollectiblePlaced {
        ability: AbilityKind::Diagonal,
        position: GridPos::new(3, 1)
    }));
    let snapshot = session.engine().snapshot();
    assert_eq!(snapshot.tick, 2);
    assert_eq!(
        snapshot.collectibles,
        vec![(GridPos::new(3, 1), AbilityKind::Diagonal)]
    );
}

#[test]
fn sample_level_loads() {
    let level = Level::load(Path::new("levels/arena.txt"), GridPos::origin()).unwrap();
    assert!(level.player.is_some());
    assert!(!level.pursuers.is_empty());
    let session = Session::builder()
        .clock(clock())
        .level(level)
        .build()
        .unwrap();
    assert_eq!(session.outcome(), Outcome::Running);
}
