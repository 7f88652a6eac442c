use gridsnake::{
    Cell, Clock, Direction, Engine, GameConfig, GameEvent, RunResult, Status,
};

fn engine_with(length: usize, head: (i32, i32)) -> Engine {
    let mut engine = Engine::seeded(&GameConfig::default(), 2024).expect("default config is valid");
    engine.reset(24, length, Cell::from(head)).expect("layout fits");
    engine.start();
    engine
}

#[test]
fn eating_in_front_grows_the_snake() {
    let mut engine = engine_with(2, (12, 12));
    assert_eq!(engine.snapshot().snake, &[Cell::new(12, 12), Cell::new(11, 12)]);
    assert_eq!(engine.current_direction(), Direction::Right);
    engine.place_food(Cell::new(13, 12)).unwrap();

    assert_eq!(engine.step(), RunResult::Continuing);

    let snap = engine.snapshot();
    assert_eq!(snap.score, 1);
    assert_eq!(snap.snake.len(), 3);
    assert_eq!(snap.snake[0], Cell::new(13, 12));
    assert_ne!(snap.food, Cell::new(13, 12));
    assert!(!snap.snake.contains(&snap.food));
}

#[test]
fn last_column_then_wall() {
    let mut engine = engine_with(2, (22, 5));
    engine.place_food(Cell::new(0, 0)).unwrap();

    assert_eq!(engine.step(), RunResult::Continuing);
    assert_eq!(engine.snapshot().snake[0], Cell::new(23, 5));
    assert_eq!(engine.step(), RunResult::HitWall);
    assert_eq!(engine.status(), Status::HitWall);
    assert_eq!(engine.snapshot().snake[0], Cell::new(23, 5));

    let events: Vec<_> = engine.drain_events().collect();
    assert_eq!(events, vec![GameEvent::Ended { outcome: RunResult::HitWall, final_score: 0 }]);
}

#[test]
fn chasing_own_tail_around_a_square_is_safe() {
    // After the first two turns fold the body into a 2x2 square, every
    // step moves onto the cell the tail is leaving.
    let mut engine = engine_with(4, (5, 5));
    engine.place_food(Cell::new(20, 20)).unwrap();
    let turns = [Direction::Down, Direction::Left, Direction::Up, Direction::Right];
    for _ in 0..3 {
        for &turn in &turns {
            engine.queue_turn(turn);
            assert_eq!(engine.step(), RunResult::Continuing);
            assert_eq!(engine.snapshot().snake.len(), 4);
        }
    }
    assert_eq!(engine.status(), Status::Running);
}

#[test]
fn reaching_the_win_score_freezes_the_run() {
    let config = GameConfig { win_score: 2, ..GameConfig::default() };
    let mut engine = Engine::seeded(&config, 5).unwrap();
    engine.queue_turn(Direction::Up);
    engine.place_food(Cell::new(12, 11)).unwrap();
    assert_eq!(engine.step(), RunResult::Continuing);
    engine.place_food(Cell::new(12, 10)).unwrap();
    assert_eq!(engine.step(), RunResult::Won);

    let head = engine.snapshot().snake[0];
    assert_eq!(engine.step(), RunResult::Won);
    assert_eq!(engine.snapshot().snake[0], head);

    let events: Vec<_> = engine.drain_events().collect();
    assert_eq!(
        events,
        vec![
            GameEvent::Ate { score: 1 },
            GameEvent::Ate { score: 2 },
            GameEvent::Ended { outcome: RunResult::Won, final_score: 2 },
        ]
    );
}

#[test]
fn clock_drives_engine_at_fixed_rate() {
    let mut engine = engine_with(3, (5, 5));
    engine.place_food(Cell::new(0, 20)).unwrap();
    let mut clock = Clock::new(100.0, 5).unwrap();

    clock.advance(0.0);
    let mut steps = 0;
    // One second of 60 Hz frames.
    for frame in 1..=60 {
        let ticks = clock.advance(f64::from(frame) * 1000.0 / 60.0);
        for _ in 0..ticks {
            engine.step();
            steps += 1;
        }
    }

    assert!((9..=10).contains(&steps), "took {} steps", steps);
    assert_eq!(engine.snapshot().snake[0], Cell::new(5 + steps, 5));
}

#[test]
fn backgrounded_tab_does_not_burst() {
    let mut clock = Clock::new(100.0, 5).unwrap();
    clock.advance(0.0);
    assert_eq!(clock.advance(10_000.0), 5);
}

#[test]
fn reset_after_game_over_starts_fresh() {
    let mut engine = engine_with(2, (23, 1));
    assert_eq!(engine.step(), RunResult::HitWall);

    engine.reset(24, 3, Cell::new(12, 12)).unwrap();
    assert_eq!(engine.status(), Status::Idle);
    assert_eq!(engine.score(), 0);
    assert_eq!(engine.step(), RunResult::Continuing);
    assert_eq!(engine.snapshot().snake[0], Cell::new(12, 12));
}
