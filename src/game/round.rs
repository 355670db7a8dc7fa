use anyhow::Result;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use super::{
    action::Action,
    config::GameConfig,
    motion::MotionInterpolator,
    state::{Grid, MoveResult, Position, Snake},
};
use crate::persistence::HighScoreStore;

/// Rejection-sampling attempts per grid cell before food placement falls back
/// to enumerating the free cells
const FOOD_SAMPLES_PER_CELL: usize = 4;

/// Where a round is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Playing,
    /// The snake hit itself; waiting for a key to start the next round
    GameOver,
}

/// Whether the caller should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// What happened during one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// The discrete state advanced this frame
    pub ticked: bool,
    /// The snake ate food this frame
    pub ate_food: bool,
    /// The round ended this frame
    pub game_over: bool,
    /// The round ended with a new high score, which has been persisted
    pub new_high_score: bool,
}

/// Drives rounds of the game frame by frame.
///
/// Every call to [`RoundController::advance_frame`] is one rendered frame.
/// The snake moves only on every `fps / snake_speed`-th frame, while segment
/// smoothing runs on every frame.
pub struct RoundController<S: HighScoreStore, R: Rng = ThreadRng> {
    config: GameConfig,
    grid: Grid,
    interpolator: MotionInterpolator,
    snake: Snake,
    food: Option<Position>,
    score: u32,
    high_score: u32,
    phase: RoundPhase,
    frame_count: u64,
    store: S,
    rng: R,
}

impl<S: HighScoreStore> RoundController<S, ThreadRng> {
    /// Create a controller using the thread-local random generator
    pub fn new(config: GameConfig, store: S) -> Self {
        Self::with_rng(config, store, rand::thread_rng())
    }
}

impl<S: HighScoreStore, R: Rng> RoundController<S, R> {
    /// Create a controller and start the first round.
    ///
    /// The high score is read from `store` once, here.
    pub fn with_rng(config: GameConfig, mut store: S, rng: R) -> Self {
        let grid = Grid::from_config(&config);
        let high_score = store.load();
        info!(high_score, "loaded high score");

        let mut controller = Self {
            interpolator: MotionInterpolator::new(config.smoothing),
            snake: Snake::centered(grid),
            food: None,
            score: 0,
            high_score,
            phase: RoundPhase::Playing,
            frame_count: 0,
            config,
            grid,
            store,
            rng,
        };
        controller.start_round();
        controller
    }

    /// Reset snake, food and score for a fresh round
    pub fn start_round(&mut self) {
        self.snake = Snake::centered(self.grid);
        self.food = self.spawn_food();
        self.score = 0;
        self.frame_count = 0;
        self.phase = RoundPhase::Playing;
        info!(head = ?self.snake.head(), food = ?self.food, "round started");
    }

    /// Apply one player input
    pub fn handle_action(&mut self, action: Action) -> Control {
        match (action, self.phase) {
            (Action::Quit, _) => return Control::Quit,
            (Action::Turn(direction), RoundPhase::Playing) => {
                self.snake.change_direction(direction);
            }
            (Action::Other, RoundPhase::Playing) => {}
            (_, RoundPhase::GameOver) => self.start_round(),
        }
        Control::Continue
    }

    /// Run one rendered frame.
    ///
    /// On a tick frame the snake moves first; food is eaten and the snake
    /// grows before smoothing runs, so the drawn chain always has the same
    /// length as the logical one. A frame that ends the round does no
    /// smoothing. Nothing happens while the round is over.
    pub fn advance_frame(&mut self) -> Result<FrameOutcome> {
        let mut outcome = FrameOutcome::default();
        if self.phase != RoundPhase::Playing {
            return Ok(outcome);
        }

        if self.frame_count % self.config.ticks_per_move() == 0 {
            outcome.ticked = true;
            match self.snake.move_forward() {
                MoveResult::Collided { at } => {
                    debug!(?at, "snake ran into itself");
                    outcome.game_over = true;
                    outcome.new_high_score = self.finish_round()?;
                    return Ok(outcome);
                }
                MoveResult::Moved { head } => {
                    if Some(head) == self.food {
                        self.snake.grow();
                        self.score = self.score.saturating_add(self.config.food_reward);
                        self.food = self.spawn_food();
                        outcome.ate_food = true;
                        debug!(score = self.score, food = ?self.food, "food eaten");
                    }
                }
            }
        }

        self.interpolator.advance(&mut self.snake);
        self.frame_count += 1;
        Ok(outcome)
    }

    /// End the round, persisting the score if it beats the high score.
    /// Returns whether a new high score was set.
    fn finish_round(&mut self) -> Result<bool> {
        self.phase = RoundPhase::GameOver;

        let beaten = self.score > self.high_score;
        if beaten {
            self.store.save(self.score)?;
            self.high_score = self.score;
        }

        info!(
            score = self.score,
            high_score = self.high_score,
            length = self.snake.len(),
            new_high_score = beaten,
            "round over"
        );
        Ok(beaten)
    }

    /// Pick a uniformly random cell not covered by the snake, or `None` if
    /// the snake covers the whole grid
    fn spawn_food(&mut self) -> Option<Position> {
        let grid = self.grid;

        for _ in 0..grid.area() * FOOD_SAMPLES_PER_CELL {
            let x = self.rng.gen_range(0..grid.width);
            let y = self.rng.gen_range(0..grid.height);
            let pos = Position::new(x, y);

            if !self.snake.occupies(pos) {
                return Some(pos);
            }
        }

        let free: Vec<Position> = (0..grid.height)
            .flat_map(|y| (0..grid.width).map(move |x| Position::new(x, y)))
            .filter(|pos| !self.snake.occupies(*pos))
            .collect();
        free.choose(&mut self.rng).copied()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Frames rendered in the current round
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn place_food(&mut self, food: Option<Position>) {
        self.food = food;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;
    use crate::persistence::{FileHighScoreStore, MemoryHighScoreStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestController = RoundController<MemoryHighScoreStore, StdRng>;

    /// One move per frame
    fn every_frame(width: usize, height: usize) -> GameConfig {
        GameConfig {
            fps: 10,
            snake_speed: 10,
            ..GameConfig::new(width, height)
        }
    }

    fn controller(config: GameConfig, high_score: u32) -> TestController {
        RoundController::with_rng(
            config,
            MemoryHighScoreStore::with_score(high_score),
            StdRng::seed_from_u64(7),
        )
    }

    fn body(c: &TestController) -> Vec<Position> {
        c.snake().body().collect()
    }

    fn feed_at(c: &mut TestController, pos: Position) -> FrameOutcome {
        c.food = Some(pos);
        let outcome = c.advance_frame().unwrap();
        assert!(outcome.ate_food);
        outcome
    }

    /// Grow to length 5 heading right from (5,5), then turn down, left, up
    /// into the body.
    fn crash(c: &mut TestController) -> FrameOutcome {
        for x in 6..10 {
            feed_at(c, Position::new(x, 5));
        }
        c.food = Some(Position::new(0, 9));

        c.handle_action(Action::Turn(Direction::Down));
        assert!(!c.advance_frame().unwrap().game_over);
        c.handle_action(Action::Turn(Direction::Left));
        assert!(!c.advance_frame().unwrap().game_over);
        c.handle_action(Action::Turn(Direction::Up));
        c.advance_frame().unwrap()
    }

    #[test]
    fn test_new_round_state() {
        let c = controller(GameConfig::default(), 0);

        assert_eq!(c.phase(), RoundPhase::Playing);
        assert_eq!(c.score(), 0);
        assert_eq!(body(&c), vec![Position::new(20, 15)]);
        assert_eq!(c.snake().heading(), Direction::Right);
        let food = c.food().unwrap();
        assert!(c.grid().contains(food));
        assert!(!c.snake().occupies(food));
    }

    #[test]
    fn test_high_score_loaded_at_construction() {
        let c = controller(GameConfig::default(), 250);
        assert_eq!(c.high_score(), 250);
    }

    #[test]
    fn test_ticks_are_gated_by_frame_divider() {
        // 60 fps, 10 moves/s: moves on frames 0 and 6 of the first 12
        let mut c = controller(GameConfig::default(), 0);
        c.food = Some(Position::new(0, 0));

        let ticked: Vec<bool> = (0..12).map(|_| c.advance_frame().unwrap().ticked).collect();

        let expected: Vec<bool> = (0..12).map(|f| f % 6 == 0).collect();
        assert_eq!(ticked, expected);
        assert_eq!(c.snake().head(), Position::new(22, 15));
        assert_eq!(c.frame_count(), 12);
    }

    #[test]
    fn test_smoothing_runs_every_frame() {
        let mut c = controller(GameConfig::default(), 0);
        c.food = Some(Position::new(0, 0));

        c.advance_frame().unwrap();
        let after_tick = c.snake().segments()[0].point;
        c.advance_frame().unwrap();
        let after_plain_frame = c.snake().segments()[0].point;

        assert!(after_tick.x > 400.0);
        assert!(after_plain_frame.x > after_tick.x);
        assert!(after_plain_frame.x < 420.0);
    }

    #[test]
    fn test_four_by_three_scenario() {
        let mut c = controller(every_frame(4, 3), 0);
        c.food = Some(Position::new(0, 1));
        assert_eq!(body(&c), vec![Position::new(2, 1)]);

        for dir in [Direction::Right, Direction::Down, Direction::Left, Direction::Left] {
            c.handle_action(Action::Turn(dir));
            let outcome = c.advance_frame().unwrap();
            assert!(outcome.ticked);
            assert!(!outcome.ate_food);
        }

        assert_eq!(body(&c), vec![Position::new(1, 2)]);
        assert_eq!(c.score(), 0);
        assert_eq!(c.food(), Some(Position::new(0, 1)));
    }

    #[test]
    fn test_food_consumption() {
        let mut c = controller(every_frame(10, 10), 0);
        let head = c.snake().head();

        feed_at(&mut c, head.moved_in_direction(Direction::Right));

        assert_eq!(c.score(), 10);
        assert_eq!(c.snake().len(), 2);
        assert_eq!(c.snake().tail(), c.snake().head());
        let food = c.food().unwrap();
        assert!(!c.snake().occupies(food));
    }

    #[test]
    fn test_score_saturates_instead_of_overflowing() {
        let config = GameConfig {
            food_reward: u32::MAX,
            ..every_frame(10, 10)
        };
        assert!(config.validate().is_ok());
        let mut c = controller(config, 0);

        feed_at(&mut c, Position::new(6, 5));
        feed_at(&mut c, Position::new(7, 5));

        assert_eq!(c.score(), u32::MAX);
        assert_eq!(c.snake().len(), 3);
    }

    #[test]
    fn test_collision_ends_round_without_changing_body() {
        let mut c = controller(every_frame(10, 10), 0);
        for x in 6..10 {
            feed_at(&mut c, Position::new(x, 5));
        }
        c.food = Some(Position::new(0, 9));
        c.handle_action(Action::Turn(Direction::Down));
        c.advance_frame().unwrap();
        c.handle_action(Action::Turn(Direction::Left));
        c.advance_frame().unwrap();

        let before = body(&c);
        let frames_before = c.frame_count();
        c.handle_action(Action::Turn(Direction::Up));
        let outcome = c.advance_frame().unwrap();

        assert!(outcome.game_over);
        assert_eq!(c.phase(), RoundPhase::GameOver);
        assert_eq!(body(&c), before);
        assert_eq!(c.score(), 40);
        assert_eq!(c.frame_count(), frames_before);
    }

    #[test]
    fn test_new_high_score_is_persisted() {
        let mut c = controller(every_frame(10, 10), 30);
        let outcome = crash(&mut c);

        assert!(outcome.game_over);
        assert!(outcome.new_high_score);
        assert_eq!(c.high_score(), 40);
        assert_eq!(c.store().saves(), 1);
        assert_eq!(c.store().clone().load(), 40);
    }

    #[test]
    fn test_lower_or_equal_score_is_not_persisted() {
        for previous in [40, 100] {
            let mut c = controller(every_frame(10, 10), previous);
            let outcome = crash(&mut c);

            assert!(outcome.game_over);
            assert!(!outcome.new_high_score);
            assert_eq!(c.high_score(), previous);
            assert_eq!(c.store().saves(), 0);
        }
    }

    #[test]
    fn test_file_store_updated_at_round_end() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("high_score.txt");
        std::fs::write(&path, "20").unwrap();

        let mut c = RoundController::with_rng(
            every_frame(10, 10),
            FileHighScoreStore::new(&path),
            StdRng::seed_from_u64(1),
        );
        assert_eq!(c.high_score(), 20);

        for _ in 0..4 {
            c.food = Some(Position::new(c.snake().head().x + 1, 5));
            assert!(c.advance_frame().unwrap().ate_food);
        }
        c.food = Some(Position::new(0, 9));
        c.handle_action(Action::Turn(Direction::Down));
        c.advance_frame().unwrap();
        c.handle_action(Action::Turn(Direction::Left));
        c.advance_frame().unwrap();
        c.handle_action(Action::Turn(Direction::Up));
        assert!(c.advance_frame().unwrap().game_over);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "40");
    }

    #[test]
    fn test_game_over_ignores_frames_and_restarts_on_any_key() {
        let mut c = controller(every_frame(10, 10), 0);
        crash(&mut c);

        assert_eq!(c.advance_frame().unwrap(), FrameOutcome::default());

        assert_eq!(c.handle_action(Action::Other), Control::Continue);
        assert_eq!(c.phase(), RoundPhase::Playing);
        assert_eq!(c.score(), 0);
        assert_eq!(c.frame_count(), 0);
        assert_eq!(body(&c), vec![Position::new(5, 5)]);
        assert_eq!(c.high_score(), 40);
    }

    #[test]
    fn test_directional_key_restarts_without_steering() {
        let mut c = controller(every_frame(10, 10), 0);
        crash(&mut c);

        c.handle_action(Action::Turn(Direction::Up));
        assert_eq!(c.phase(), RoundPhase::Playing);
        assert_eq!(c.snake().heading(), Direction::Right);
    }

    #[test]
    fn test_restart_resets_smoothing() {
        let mut c = controller(every_frame(10, 10), 0);
        crash(&mut c);
        c.handle_action(Action::Other);

        for segment in c.snake().segments() {
            assert_eq!(segment.point, c.grid().to_point(segment.cell));
        }
    }

    #[test]
    fn test_quit_from_any_phase() {
        let mut c = controller(every_frame(10, 10), 0);
        assert_eq!(c.handle_action(Action::Quit), Control::Quit);

        crash(&mut c);
        assert_eq!(c.handle_action(Action::Quit), Control::Quit);
    }

    #[test]
    fn test_food_never_on_snake() {
        let mut c = controller(every_frame(5, 5), 0);
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..3000 {
            if rng.gen_bool(0.3) {
                let dir = Direction::ALL[rng.gen_range(0..4)];
                c.handle_action(Action::Turn(dir));
            }
            let outcome = c.advance_frame().unwrap();
            if let Some(food) = c.food() {
                assert!(!c.snake().occupies(food));
            }
            if outcome.game_over {
                c.handle_action(Action::Other);
            }
        }
    }

    #[test]
    fn test_filling_the_grid() {
        // 2x1: head at (1,0), the only free cell is (0,0)
        let mut c = controller(every_frame(2, 1), 0);
        assert_eq!(c.food(), Some(Position::new(0, 0)));

        assert!(c.advance_frame().unwrap().ate_food);
        assert_eq!(c.food(), Some(Position::new(1, 0)));

        assert!(c.advance_frame().unwrap().ate_food);
        assert_eq!(c.food(), None);

        let outcome = c.advance_frame().unwrap();
        assert!(outcome.game_over);
        assert_eq!(c.score(), 20);
    }

    #[test]
    fn test_one_cell_grid_plays_forever() {
        let mut c = controller(every_frame(1, 1), 0);
        assert_eq!(c.food(), None);

        for _ in 0..20 {
            assert!(!c.advance_frame().unwrap().game_over);
        }
        assert_eq!(body(&c), vec![Position::new(0, 0)]);
    }
}
