#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use flappy_evo::simulation::human::{HumanGame, Phase};
use flappy_evo::simulation::params::Config;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn bird_waits_for_the_first_flap() {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(1);
    let mut game = HumanGame::new(&config, 0);

    for _ in 0..30 {
        game.update(5_000, &mut rng);
    }
    assert_eq!(game.phase(), Phase::Ready);
    assert_eq!(game.bird().y, 418.0);
    assert!(game.pipes().is_empty());

    game.input(true);
    assert_eq!(game.phase(), Phase::Flying);
    game.update(0, &mut rng);

    // -10 + 0.5 gravity, moved by the truncated velocity
    assert_eq!(game.bird().velocity, -9.5);
    assert_eq!(game.bird().y, 409.0);
    assert_eq!(game.bird().tilt, 19.0);
}

#[test]
fn flapping_is_edge_triggered() {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(2);
    let mut game = HumanGame::new(&config, 0);

    game.input(true);
    game.update(0, &mut rng);
    game.input(true);
    game.update(0, &mut rng);
    assert_eq!(game.bird().velocity, -9.0);

    game.input(false);
    game.input(true);
    game.update(0, &mut rng);
    assert_eq!(game.bird().velocity, -9.5);
}

#[test]
fn pipes_spawn_on_the_interval() {
    let mut config = Config::default();
    config.human.gap_offset = 0;
    let mut rng = StdRng::seed_from_u64(3);
    let mut game = HumanGame::new(&config, 5_000);

    // nothing spawns while waiting for the first flap
    game.update(9_000, &mut rng);
    assert!(game.pipes().is_empty());

    // the first flying tick spawns right away
    game.input(true);
    game.update(9_000, &mut rng);
    assert_eq!(game.pipes().len(), 1);
    let pipe = &game.pipes()[0];
    assert_eq!(pipe.x, 764.0 - 4.0);
    assert_eq!(pipe.height, 418.0 - 75.0);
    assert_eq!(pipe.bottom(), 418.0 + 75.0);

    game.update(10_200, &mut rng);
    assert_eq!(game.pipes().len(), 1);

    game.update(10_201, &mut rng);
    assert_eq!(game.pipes().len(), 2);
    assert_eq!(game.pipes()[1].x, 760.0);
}

#[test]
fn restarted_game_spawns_on_the_first_flying_tick() {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(8);
    let mut game = HumanGame::new(&config, 0);

    game.restart(20_000);
    game.input(true);
    game.update(20_000, &mut rng);
    assert_eq!(game.pipes().len(), 1);
}

#[test]
fn falling_to_the_ground_ends_the_game() {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(4);
    let mut game = HumanGame::new(&config, 0);

    game.input(true);
    game.input(false);
    for _ in 0..200 {
        game.update(0, &mut rng);
    }

    assert_eq!(game.phase(), Phase::GameOver);
    assert_eq!(game.bird().tilt, -90.0);
    assert!(game.bird().y + config.simulation.agent_height >= config.human.ground_y);

    // further flaps are ignored until a restart
    let y = game.bird().y;
    game.input(true);
    game.update(0, &mut rng);
    assert_eq!(game.phase(), Phase::GameOver);
    assert_eq!(game.bird().y, y);
}

#[test]
fn flying_off_the_top_ends_the_game() {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(5);
    let mut game = HumanGame::new(&config, 0);

    for tick in 0..200 {
        game.input(tick % 2 == 0);
        game.update(0, &mut rng);
        if game.phase() == Phase::GameOver {
            break;
        }
    }

    assert_eq!(game.phase(), Phase::GameOver);
    assert!(game.bird().y < 0.0);
}

#[test]
fn passing_a_pipe_scores_once() {
    let mut config = Config::default();
    config.human.gap_offset = 0;
    config.human.pipe_gap = 300.0;
    let mut rng = StdRng::seed_from_u64(6);
    let mut game = HumanGame::new(&config, 0);

    let mut scored_at = None;
    for tick in 0..300 {
        game.input(tick == 0 || game.bird().y > 420.0);
        game.update(1_201, &mut rng);
        assert_eq!(game.phase(), Phase::Flying, "crashed on tick {tick}");
        if scored_at.is_none() && game.score() == 1 {
            scored_at = Some(tick);
        }
    }

    assert_eq!(game.score(), 1);
    // the pipe sits at 764 - 4 * tick when the score is checked; the bird's
    // left edge (100) clears its right edge once 764 - 4 * tick + 52 < 100
    assert_eq!(scored_at, Some(180));
    // culled once it scrolled past -100
    assert!(game.pipes().is_empty());
}

#[test]
fn restart_resets_the_session() {
    let mut config = Config::default();
    config.human.gap_offset = 0;
    let mut rng = StdRng::seed_from_u64(7);
    let mut game = HumanGame::new(&config, 0);

    game.input(true);
    for _ in 0..200 {
        game.update(1_201, &mut rng);
    }
    assert_eq!(game.phase(), Phase::GameOver);

    game.restart(9_000);
    assert_eq!(game.phase(), Phase::Ready);
    assert_eq!(game.score(), 0);
    assert!(game.pipes().is_empty());
    assert_eq!(game.bird().y, 418.0);
    assert_eq!(game.bird().velocity, 0.0);
    assert_eq!(game.ground_scroll(), 0.0);
}
