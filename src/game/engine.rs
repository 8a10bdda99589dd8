use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace, warn};

use super::{
    action::Direction,
    config::{ConfigError, GameConfig, Grid},
    state::{Food, GamePhase, GameState, Snake},
};

/// Side effects the outside world cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    FoodEaten,
    GameOver,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused or game over, nothing moved
    Idle,
    /// Snake advanced one cell
    Moved,
    /// Snake advanced onto the food and grew
    Ate,
    /// Snake ran into itself, the game is over
    Collided,
}

impl TickOutcome {
    pub fn event(&self) -> Option<GameEvent> {
        match self {
            TickOutcome::Ate => Some(GameEvent::FoodEaten),
            TickOutcome::Collided => Some(GameEvent::GameOver),
            TickOutcome::Idle | TickOutcome::Moved => None,
        }
    }
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic food placement, for tests and replays
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid();
        Ok(Self { config, grid, rng })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a fresh session
    pub fn reset(&mut self) -> GameState {
        let snake = Snake::new(self.grid.center(), self.config.initial_direction);
        let mut food = Food::new(self.grid.center());
        food.relocate(&self.grid, &snake, &mut self.rng);

        GameState::new(snake, food, self.grid)
    }

    /// Reinitialize an existing session in place
    pub fn restart(&mut self, state: &mut GameState) {
        state.snake.reset(&self.grid, self.config.initial_direction);
        state.food.relocate(&self.grid, &state.snake, &mut self.rng);
        state.score = 0;
        state.ticks = 0;
        state.phase = GamePhase::Running;

        info!(food = ?state.food.position, "game restarted");
    }

    /// Execute one tick of the game.
    ///
    /// `turn` is the buffered direction request since the last tick; a
    /// reversal is dropped silently.
    pub fn tick(&mut self, state: &mut GameState, turn: Option<Direction>) -> TickOutcome {
        if !state.is_running() {
            return TickOutcome::Idle;
        }

        if let Some(direction) = turn {
            if !state.snake.set_direction(direction) {
                trace!(?direction, "ignored reversal");
            }
        }

        // Food never sits on the body, so an eating move cannot collide.
        // Growing before the move keeps the tail on this very tick.
        let eats = state.snake.next_head(&self.grid) == state.food.position;
        if eats {
            state.snake.grow();
        }

        if !state.snake.update(&self.grid) {
            state.phase = GamePhase::GameOver;
            info!(
                score = state.score,
                length = state.snake.len(),
                ticks = state.ticks,
                "game over"
            );
            return TickOutcome::Collided;
        }

        state.ticks += 1;

        if !eats {
            return TickOutcome::Moved;
        }

        state.score = state.score.saturating_add(self.config.food_reward);
        debug!(
            score = state.score,
            length = state.snake.len(),
            at = ?state.snake.head(),
            "food eaten"
        );

        if !state.food.relocate(&self.grid, &state.snake, &mut self.rng) {
            warn!(length = state.snake.len(), "snake fills the grid, no cell left for food");
        }

        TickOutcome::Ate
    }
}
