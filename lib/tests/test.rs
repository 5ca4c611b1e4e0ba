use drifter_lib::{
    history_hash, CellFlags, Config, Coord, Error, Flag, OutcomeKind, Region, RegionOp, State,
    Status, Symmetry, World,
};
use std::{collections::HashSet, error::Error as StdError};

type TestResult = Result<(), Box<dyn StdError>>;

/// A blinker on a dead background, with no size bounds.
fn blinker() -> Config {
    Config::new(9, 9)
        .set_max_change_count(None)
        .set_max_width(None)
        .set_max_height(None)
        .add_pattern(2, 2, ".....\n.....\n.111.\n.....\n.....")
}

/// A block appearing on a dead background.
fn block() -> Config {
    Config::new(8, 8).add_pattern(2, 2, "....\n.11.\n.11.\n....")
}

/// A spark at the center of an unknown background.
fn spark() -> Config {
    Config::new(9, 9)
        .set_symmetry(Symmetry::D8)
        .set_max_gen(20)
        .add_pattern(2, 2, "?????\n?????\n??1??\n?????\n?????")
}

/// The blinker, with one cell left out of the statistics.
fn blinker_uncounting(at: Coord) -> Config {
    blinker().add_region(RegionOp::Flag {
        region: Region::Point { at },
        flag: Flag::Uncounted,
    })
}

/// Whether the search of the configured world finds an outcome.
fn finds(config: Config) -> Result<bool, Error> {
    Ok(config.world()?.search(None)? == Status::Found)
}

fn cells(world: &World) -> Vec<Coord> {
    (0..world.height())
        .flat_map(|row| (0..world.width()).map(move |col| (row, col)))
        .collect()
}

fn check_sums(world: &World) {
    for coord in cells(world) {
        let expected: u8 = (-1..=1)
            .flat_map(|dr| (-1..=1).map(move |dc| (dr, dc)))
            .filter(|&d| d != (0, 0))
            .map(|(dr, dc)| world.background((coord.0 + dr, coord.1 + dc)).weight())
            .sum();
        assert_eq!(world.neighbor_sum(coord), expected, "sum at {:?}", coord);
    }
}

#[test]
fn empty_world() -> TestResult {
    let mut world = Config::default().world()?;
    assert_eq!(world.search(None)?, Status::Found);
    let outcome = world.outcome().ok_or("no outcome")?;
    assert_eq!(outcome.kind, OutcomeKind::Quiescent);
    assert_eq!(outcome.gen, 1);
    assert_eq!(world.search(None)?, Status::None);
    Ok(())
}

#[test]
fn neighbor_sums() -> TestResult {
    let mut world = Config::new(10, 10).world()?;
    check_sums(&world);
    world.assign((3, 3), State::On, true)?;
    world.assign((3, 4), State::Off, false)?;
    world.assign((4, 4), State::On, true)?;
    check_sums(&world);
    world.revert_last();
    check_sums(&world);
    assert_eq!(world.background((4, 4)), State::Unknown);
    assert_eq!(world.background((3, 3)), State::On);
    Ok(())
}

#[test]
fn assign_and_revert() -> TestResult {
    let mut world = Config::new(9, 9).set_symmetry(Symmetry::C2).world()?;
    let snapshot = |world: &World| {
        cells(world)
            .into_iter()
            .map(|coord| {
                (
                    world.background(coord),
                    world.current(coord),
                    world.neighbor_sum(coord),
                )
            })
            .collect::<Vec<_>>()
    };
    let before = snapshot(&world);
    let log = world.decisions().len();

    world.assign((2, 3), State::On, true)?;
    assert_eq!(world.background((6, 5)), State::On);
    assert_eq!(world.decisions().len(), log + 2);
    world.revert_last();
    world.revert_last();

    assert_eq!(snapshot(&world), before);
    assert_eq!(world.decisions().len(), log);
    Ok(())
}

#[test]
fn border_is_immutable() -> TestResult {
    let mut world = Config::new(9, 9).world()?;
    assert!(world.assign((1, 4), State::On, true).is_err());
    assert!(world.assign((4, 4), State::Unknown, true).is_err());
    world.assign((4, 4), State::On, true)?;
    assert!(world.assign((4, 4), State::Off, true).is_err());
    Ok(())
}

#[test]
fn d2_row_symmetry() -> TestResult {
    let mut world = Config::new(10, 10)
        .set_symmetry(Symmetry::D2Row)
        .world()?;
    world.assign((3, 4), State::On, true)?;
    assert_eq!(world.background((6, 4)), State::On);
    assert_eq!(world.background((3, 5)), State::Unknown);
    Ok(())
}

#[test]
fn day_night_symmetry() -> TestResult {
    let mut world = Config::new(10, 10)
        .set_symmetry(Symmetry::D2Row)
        .set_day_night(true)
        .world()?;
    world.assign((3, 4), State::On, true)?;
    assert_eq!(world.background((6, 4)), State::Off);
    Ok(())
}

#[test]
fn fixed_block() -> TestResult {
    let config = Config::new(8, 8).add_pattern(2, 2, "::::\n:OO:\n:OO:\n::::");
    let mut world = config.world()?;
    assert_eq!(world.search(None)?, Status::Found);
    let outcome = world.outcome().ok_or("no outcome")?;
    assert_eq!(outcome.kind, OutcomeKind::Quiescent);
    assert_eq!(outcome.gen, 1);
    assert_eq!(world.background((3, 3)), State::On);
    assert_eq!(world.search(None)?, Status::None);
    Ok(())
}

#[test]
fn blinker_is_periodic() -> TestResult {
    let mut world = blinker().world()?;
    assert_eq!(world.search(None)?, Status::Found);
    let outcome = world.outcome().ok_or("no outcome")?;
    assert_eq!(
        outcome.kind,
        OutcomeKind::Periodic {
            period: 2,
            semi_quiescent: false
        }
    );
    assert_eq!(outcome.gen, 2);
    assert_eq!(outcome.history.len(), 3);

    let mut vertical = outcome.history[1].clone();
    vertical.sort_unstable();
    assert_eq!(vertical, vec![(3, 4), (4, 4), (5, 4)]);

    let stats = &outcome.stats;
    assert_eq!(stats.len(), 3);
    assert_eq!((stats[1].change_count, stats[1].width, stats[1].height), (3, 1, 3));
    assert_eq!(world.search(None)?, Status::None);
    Ok(())
}

#[test]
fn block_is_stable() -> TestResult {
    let mut world = block().world()?;
    assert_eq!(world.search(None)?, Status::Found);
    let outcome = world.outcome().ok_or("no outcome")?;
    assert_eq!(
        outcome.kind,
        OutcomeKind::Periodic {
            period: 1,
            semi_quiescent: false
        }
    );
    assert_eq!(outcome.gen, 1);
    Ok(())
}

#[test]
fn skip_stable() -> TestResult {
    let mut world = block().set_skip_stable(true).world()?;
    assert_eq!(world.search(None)?, Status::None);
    Ok(())
}

#[test]
fn skip_fizzle() -> TestResult {
    let mut world = Config::new(9, 9).set_skip_fizzle(true).world()?;
    assert_eq!(world.search(None)?, Status::None);
    Ok(())
}

#[test]
fn uncount_known() -> TestResult {
    let mut world = block()
        .set_uncount_known(true)
        .set_skip_stable(true)
        .world()?;
    assert_eq!(world.search(None)?, Status::Found);
    let outcome = world.outcome().ok_or("no outcome")?;
    assert_eq!(
        outcome.kind,
        OutcomeKind::Periodic {
            period: 1,
            semi_quiescent: true
        }
    );
    assert_eq!(outcome.stats[1].change_count, 0);
    assert_eq!(outcome.stats[1].full_count, 4);
    Ok(())
}

#[test]
fn too_many_changes() -> TestResult {
    let mut world = blinker().set_max_change_count(2).world()?;
    assert_eq!(world.search(None)?, Status::None);
    assert!(world.conflicts() > 0);
    Ok(())
}

#[test]
fn too_tall() -> TestResult {
    let mut world = blinker().set_max_height(2).world()?;
    assert_eq!(world.search(None)?, Status::None);
    Ok(())
}

#[test]
fn too_few_changes() -> TestResult {
    let mut world = blinker().set_var(120, 4)?.world()?;
    assert_eq!(world.search(None)?, Status::None);
    Ok(())
}

#[test]
fn required_counts() -> TestResult {
    let mut world = blinker().set_required_counts(vec![3, 3, 3]).world()?;
    assert_eq!(world.search(None)?, Status::Found);

    let mut world = blinker().set_required_counts(vec![3, 2]).world()?;
    assert_eq!(world.search(None)?, Status::None);

    let mut world = blinker().set_required_counts(vec![3, -3]).world()?;
    assert_eq!(world.search(None)?, Status::None);
    Ok(())
}

#[test]
fn max_generation() -> TestResult {
    let mut world = blinker().set_max_gen(1).world()?;
    assert_eq!(world.search(None)?, Status::Found);
    let outcome = world.outcome().ok_or("no outcome")?;
    assert_eq!(outcome.kind, OutcomeKind::MaxGeneration);
    assert_eq!(outcome.gen, 1);
    Ok(())
}

#[test]
fn step_bounded() -> TestResult {
    let mut world = spark().world()?;
    assert_eq!(world.search(Some(1))?, Status::Searching);
    Ok(())
}

#[test]
fn deduplicated() -> TestResult {
    let mut world = spark().world()?;
    let mut hashes = HashSet::new();
    let mut lone_deaths = 0;
    let lone_death: Vec<Vec<Coord>> = vec![vec![(4, 4)], vec![]];
    while world.search(None)? == Status::Found {
        let outcome = world.outcome().ok_or("no outcome")?;
        let hash = history_hash(outcome.history.iter().map(Vec::as_slice));
        assert!(hashes.insert(hash), "{:?} reported twice", outcome.history);
        if outcome.history == lone_death {
            assert_eq!(outcome.kind, OutcomeKind::Quiescent);
            lone_deaths += 1;
        }
    }
    // The spark dies at once in many backgrounds, but only the first
    // is reported.
    assert_eq!(lone_deaths, 1);
    Ok(())
}

#[test]
fn deterministic() -> TestResult {
    let mut first = spark().world()?;
    let mut second = spark().world()?;
    for _ in 0..50 {
        let status = first.search(Some(100))?;
        assert_eq!(second.search(Some(100))?, status);
        assert_eq!(first.outcome(), second.outcome());
        assert_eq!(first.decisions(), second.decisions());
        if status == Status::None {
            break;
        }
    }
    Ok(())
}

#[test]
fn config_errors() -> TestResult {
    assert_eq!(
        Config::new(4, 9).world().err(),
        Some(Error::Dimensions(4, 9))
    );
    assert_eq!(
        Config::new(9, 10).set_symmetry(Symmetry::C4).world().err(),
        Some(Error::SquareWorld(Symmetry::C4))
    );
    assert_eq!(
        Config::new(9, 9).set_day_night(true).world().err(),
        Some(Error::DayNight(Symmetry::C1))
    );
    assert_eq!(
        Config::new(9, 9).set_rule_string("B03/S23").world().err(),
        Some(Error::B0Rule)
    );
    assert_eq!(
        Config::new(9, 9).set_probability(101).world().err(),
        Some(Error::Probability(101))
    );
    assert_eq!(
        Config::new(9, 9).add_pattern(2, 2, "..x").world().err(),
        Some(Error::PatternChar('x', (2, 4)))
    );
    assert_eq!(
        Config::new(9, 9).add_pattern(0, 0, "o").world().err(),
        Some(Error::SetCell((0, 0)))
    );
    assert_eq!(
        Config::new(9, 9).add_pattern(1, 4, "1").world().err(),
        Some(Error::SetCell((1, 4)))
    );
    Ok(())
}

#[test]
fn deserialize_config() -> TestResult {
    let config: Config = serde_json::from_str(
        r#"{
            "height": 9,
            "rule_string": "B36/S23",
            "symmetry": "D2-",
            "max_change_count": null,
            "bounds": { "max_new_changes": 2 }
        }"#,
    )?;
    assert_eq!(config.height, 9);
    assert_eq!(config.width, 81);
    assert_eq!(config.symmetry, Symmetry::D2Row);
    assert_eq!(config.max_change_count, None);
    assert_eq!(config.max_width, Some(3));
    assert_eq!(config.bounds.max_new_changes, 2);
    assert_eq!(config.bounds.new_changes_lag, 1);
    assert_eq!(config.rule()?.to_string(), "B36/S23");
    Ok(())
}

#[test]
fn partial_mirror() -> TestResult {
    let mut world = Config::new(10, 10)
        .set_symmetry(Symmetry::D2Row)
        .set_var(114, 5)?
        .world()?;
    world.assign((3, 4), State::On, true)?;
    assert_eq!(world.background((6, 4)), State::Unknown);
    world.assign((3, 5), State::On, true)?;
    assert_eq!(world.background((6, 5)), State::On);

    let mut world = Config::new(10, 10)
        .set_symmetry(Symmetry::D2Col)
        .set_symmetry_from_row(5)
        .world()?;
    world.assign((4, 3), State::On, true)?;
    assert_eq!(world.background((4, 6)), State::Unknown);
    world.assign((5, 3), State::On, true)?;
    assert_eq!(world.background((5, 6)), State::On);
    Ok(())
}

#[test]
fn uncount_unknown_cells() -> TestResult {
    let world = Config::new(9, 9)
        .set_uncount_known(true)
        .add_pattern(3, 3, ".?,:")
        .world()?;
    assert!(world.flags((3, 3)).contains(CellFlags::UNCOUNTED));
    assert!(world.flags((3, 4)).contains(CellFlags::UNCOUNTED));
    assert!(!world.flags((3, 5)).contains(CellFlags::UNCOUNTED));
    assert_eq!(world.flags((3, 6)), CellFlags::FIXED);
    Ok(())
}

#[test]
fn fixed_cell() -> TestResult {
    // The fixed cell is born in generation 1.
    let fixed = || blinker().add_pattern(3, 4, ":");
    assert!(!finds(fixed())?);
    assert!(finds(fixed().set_var(106, 3)?)?);
    assert!(!finds(fixed().set_var(106, 1)?)?);
    assert!(finds(blinker().add_pattern(2, 4, ":"))?);
    Ok(())
}

#[test]
fn diagonal_extents() -> TestResult {
    assert!(!finds(blinker().set_var(102, 2)?)?);
    assert!(finds(blinker().set_var(102, 3)?)?);
    assert!(!finds(blinker().set_var(103, 2)?)?);
    assert!(finds(blinker().set_var(103, 3)?)?);
    Ok(())
}

#[test]
fn no_rechange() -> TestResult {
    // Generation 2 changes the cells of generation 0 again.
    assert!(!finds(blinker().set_var(107, 2)?.set_var(108, 2)?)?);
    assert!(finds(blinker().set_var(107, 3)?.set_var(108, 4)?)?);
    Ok(())
}

#[test]
fn new_changes() -> TestResult {
    assert!(!finds(blinker().set_var(101, 1)?)?);
    assert!(finds(blinker().set_var(101, 2)?)?);
    assert!(!finds(blinker().set_var(117, 1)?)?);
    assert!(finds(blinker().set_var(117, 1)?.set_var(118, 2)?)?);
    Ok(())
}

#[test]
fn age_sum() -> TestResult {
    // Every change of generation 2 first changed in generation 0.
    assert!(!finds(blinker().set_var(129, 8)?)?);
    assert!(finds(blinker().set_var(129, 9)?)?);
    Ok(())
}

#[test]
fn streak_sum() -> TestResult {
    assert!(!finds(blinker().set_var(137, 4)?)?);
    assert!(finds(blinker().set_var(137, 5)?)?);
    // With a gap of one generation, the ends of the blinker changed
    // for three generations.
    assert!(!finds(blinker().set_var(137, 5)?.set_var(138, 1)?)?);
    assert!(finds(blinker().set_var(137, 9)?.set_var(138, 1)?)?);
    Ok(())
}

#[test]
fn drifts() -> TestResult {
    assert!(finds(blinker().set_var(104, 5)?)?);
    assert!(!finds(blinker().set_var(104, 6)?)?);
    assert!(finds(blinker().set_var(105, 7)?)?);
    assert!(!finds(blinker().set_var(105, 8)?)?);
    assert!(finds(blinker().set_var(109, 5)?)?);
    assert!(!finds(blinker().set_var(109, 6)?)?);
    Ok(())
}

#[test]
fn twos_streak() -> TestResult {
    // Two counted changes in every generation.
    let twos = || blinker_uncounting((4, 4));
    assert!(!finds(twos().set_var(110, 2)?)?);
    assert!(finds(twos().set_var(110, 3)?)?);
    assert!(finds(blinker().set_var(110, 1)?)?);
    Ok(())
}

#[test]
fn forbidden_count() -> TestResult {
    assert!(!finds(blinker().set_var(121, 1)?.set_var(122, 3)?)?);
    assert!(finds(blinker().set_var(121, 1)?.set_var(122, 2)?)?);
    Ok(())
}

#[test]
fn required_count() -> TestResult {
    assert!(finds(blinker().set_var(123, 3)?.set_var(124, 3)?)?);
    assert!(!finds(blinker().set_var(123, 2)?.set_var(124, 3)?)?);
    assert!(!finds(blinker().set_var(123, 3)?.set_var(124, 2)?)?);
    Ok(())
}

#[test]
fn repeat() -> TestResult {
    assert!(finds(blinker().set_var(128, 1)?)?);
    // Counts 2, 3, 2.
    let uneven = || blinker_uncounting((4, 3));
    assert!(!finds(uneven().set_var(128, 1)?)?);
    assert!(finds(uneven().set_var(128, 2)?)?);
    Ok(())
}

#[test]
fn excluded_signature() -> TestResult {
    let mut config = blinker();
    config.bounds.excluded_signature = vec![3, 3];
    assert!(!finds(config)?);

    let mut config = blinker();
    config.bounds.excluded_signature = vec![3, 2];
    assert!(finds(config)?);
    assert!(finds(blinker().set_var(116, 1)?)?);
    Ok(())
}

#[test]
fn persistence() -> TestResult {
    let persist = |min_col| -> Result<Config, Error> {
        blinker()
            .set_var(111, 1)?
            .set_var(132, 4)?
            .set_var(133, min_col)?
            .set_var(134, 4)?
            .set_var(135, 4)
    };
    // The center of the blinker always changes; its ends do not.
    assert!(finds(persist(4)?)?);
    assert!(!finds(persist(3)?)?);
    Ok(())
}

#[test]
fn split_size() -> TestResult {
    assert!(finds(blinker().set_max_height(2).set_var(112, 1)?)?);
    assert!(!finds(blinker().set_max_height(1).set_var(112, 1)?)?);
    assert!(!finds(blinker().set_max_width(2))?);
    assert!(finds(blinker().set_max_width(2).set_var(113, 1)?)?);
    assert!(!finds(blinker().set_max_width(1).set_var(113, 1)?)?);
    Ok(())
}

#[test]
fn sustained_size() -> TestResult {
    assert!(!finds(blinker().set_max_height(2))?);
    assert!(finds(blinker().set_max_height(2).set_var(125, 2)?)?);
    assert!(finds(blinker().set_max_width(2).set_var(126, 2)?)?);

    // Counts 2, 3, 2.
    let uneven = || blinker_uncounting((4, 3)).set_max_change_count(2);
    assert!(!finds(uneven())?);
    assert!(finds(uneven().set_var(100, 2)?)?);
    assert!(!finds(blinker().set_max_change_count(2).set_var(100, 2)?)?);
    Ok(())
}

#[test]
fn frontier_bound() -> TestResult {
    // The cells around a blinker fill a 3 x 5 box.
    assert!(!finds(blinker().set_var(139, 14)?)?);
    assert!(finds(blinker().set_var(139, 15)?)?);
    Ok(())
}
