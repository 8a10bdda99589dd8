use std::collections::VecDeque;

use rand::Rng;

use super::{action::Direction, config::Grid};

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction, without wrapping
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at the front
    body: VecDeque<Position>,
    /// Current direction of movement
    direction: Direction,
    /// When set, the next move keeps the tail
    growing: bool,
}

impl Snake {
    /// A single-segment snake
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: VecDeque::from([head]),
            direction,
            growing: false,
        }
    }

    /// Build a snake from explicit segments, head first.
    ///
    /// Returns `None` if `cells` is empty.
    pub fn from_cells<I, P>(cells: I, direction: Direction) -> Option<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Position>,
    {
        let body: VecDeque<Position> = cells.into_iter().map(Into::into).collect();
        if body.is_empty() {
            return None;
        }
        Some(Self {
            body,
            direction,
            growing: false,
        })
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        // The body is never empty: every constructor seeds it with a head and
        // `update` pushes before it pops.
        self.body[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Segments from head to tail
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    /// Check if position is any segment of the snake, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Check if position collides with snake body (excluding head).
    ///
    /// The tail counts even though it would vacate on a non-growing move.
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body.iter().skip(1).any(|&segment| segment == pos)
    }

    /// Request a new heading. A reversal is ignored and reported as `false`.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.direction.is_opposite(direction) {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Mark the snake to keep its tail on the next move
    pub fn grow(&mut self) {
        self.growing = true;
    }

    /// Where the head goes on the next move
    pub fn next_head(&self, grid: &Grid) -> Position {
        grid.wrap(self.head().moved_in_direction(self.direction))
    }

    /// Advance one cell. Returns `false` on self-collision, in which case the
    /// snake is left untouched.
    pub fn update(&mut self, grid: &Grid) -> bool {
        let new_head = self.next_head(grid);

        if self.collides_with_body(new_head) {
            return false;
        }

        self.body.push_front(new_head);

        if self.growing {
            self.growing = false;
        } else {
            self.body.pop_back();
        }

        true
    }

    /// Back to a single segment at the grid center
    pub fn reset(&mut self, grid: &Grid, direction: Direction) {
        self.body.clear();
        self.body.push_back(grid.center());
        self.direction = direction;
        self.growing = false;
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; kept alongside `len`
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[cfg(test)]
impl Snake {
    /// Get the tail position (last segment)
    pub(crate) fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub(crate) fn is_growing(&self) -> bool {
        self.growing
    }
}

/// The single piece of food on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    pub position: Position,
}

impl Food {
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    /// Jump to a uniformly random cell. Does not look at the snake.
    pub fn randomize_position<R: Rng + ?Sized>(&mut self, grid: &Grid, rng: &mut R) {
        self.position = grid.random_cell(rng);
    }

    /// Rejection-sample a cell the snake does not occupy.
    ///
    /// Returns `false` and leaves the food in place when the snake covers
    /// the whole grid.
    pub fn relocate<R: Rng + ?Sized>(&mut self, grid: &Grid, snake: &Snake, rng: &mut R) -> bool {
        if snake.len() >= grid.area() {
            return false;
        }

        loop {
            self.randomize_position(grid, rng);
            if !snake.occupies(self.position) {
                return true;
            }
        }
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Running,
    Paused,
    GameOver,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Food,
    pub grid: Grid,
    pub score: u32,
    pub ticks: u32,
    pub phase: GamePhase,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, food: Food, grid: Grid) -> Self {
        Self {
            snake,
            food,
            grid,
            score: 0,
            ticks: 0,
            phase: GamePhase::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Running <-> Paused. Has no effect once the game is over.
    ///
    /// Returns the phase after the toggle.
    pub fn toggle_pause(&mut self) -> GamePhase {
        self.phase = match self.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Running,
            GamePhase::GameOver => GamePhase::GameOver,
        };
        self.phase
    }
}

#[cfg(test)]
impl GameState {
    /// Check if a position is occupied by the snake
    pub(crate) fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.occupies(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn grid() -> Grid {
        GameConfig::default().grid()
    }

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_by(0, 1), Position::new(5, 6));
        assert_eq!(pos.moved_by(0, -1), Position::new(5, 4));
    }

    #[test]
    fn test_snake_from_cells() {
        let snake = Snake::from_cells([(5, 5), (4, 5), (3, 5)], Direction::Right).unwrap();
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert_eq!(snake.tail(), Position::new(3, 5));
        assert!(Snake::from_cells(Vec::<Position>::new(), Direction::Right).is_none());
    }

    #[test]
    fn test_single_cell_update() {
        let grid = grid();
        let mut snake = Snake::new(grid.center(), Direction::Right);

        assert!(snake.update(&grid));
        assert_eq!(snake.head(), Position::new(21, 15));
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn test_snake_movement_and_growth() {
        let grid = grid();
        let mut snake = Snake::from_cells([(5, 5), (4, 5), (3, 5)], Direction::Right).unwrap();

        assert!(snake.update(&grid));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(6, 5));
        assert_eq!(snake.tail(), Position::new(4, 5));

        snake.grow();
        assert!(snake.update(&grid));
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Position::new(7, 5));
        assert_eq!(snake.tail(), Position::new(4, 5));
        assert!(!snake.is_growing());

        // Flag is consumed by a single move
        assert!(snake.update(&grid));
        assert_eq!(snake.len(), 4);
    }

    #[test]
    fn test_wraparound_every_edge() {
        let grid = grid();
        let cases = [
            ((39, 10), Direction::Right, (0, 10)),
            ((0, 10), Direction::Left, (39, 10)),
            ((10, 29), Direction::Down, (10, 0)),
            ((10, 0), Direction::Up, (10, 29)),
        ];

        for (start, direction, expected) in cases {
            let mut snake = Snake::new(Position::from(start), direction);
            assert!(snake.update(&grid));
            assert_eq!(snake.head(), Position::from(expected));
            assert!(grid.contains(snake.head()));
        }
    }

    #[test]
    fn test_collision_detection() {
        let snake = Snake::from_cells([(5, 5), (4, 5), (3, 5)], Direction::Right).unwrap();
        assert!(!snake.collides_with_body(Position::new(5, 5))); // head
        assert!(snake.collides_with_body(Position::new(4, 5))); // body
        assert!(snake.collides_with_body(Position::new(3, 5))); // tail
        assert!(!snake.collides_with_body(Position::new(10, 10))); // empty
    }

    #[test]
    fn test_self_collision_leaves_body_untouched() {
        let grid = grid();
        // Head at (1,1) moving left into (0,1), a mid-body segment
        let mut snake =
            Snake::from_cells([(1, 1), (1, 2), (0, 2), (0, 1), (0, 0)], Direction::Up).unwrap();
        snake.set_direction(Direction::Left);
        let before = snake.clone();

        assert!(!snake.update(&grid));
        assert_eq!(snake, before);
    }

    #[test]
    fn test_moving_into_vacating_tail_collides() {
        let grid = grid();
        // A 2x2 loop: the next cell is the tail, which would pop this tick
        let mut snake =
            Snake::from_cells([(1, 1), (2, 1), (2, 2), (1, 2)], Direction::Down).unwrap();
        let before = snake.clone();

        assert_eq!(snake.next_head(&grid), snake.tail());
        assert!(!snake.update(&grid));
        assert_eq!(snake, before);
    }

    #[test]
    fn test_reverse_direction_rejected() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right);

        assert!(!snake.set_direction(Direction::Left));
        assert_eq!(snake.direction(), Direction::Right);

        assert!(snake.set_direction(Direction::Down));
        assert_eq!(snake.direction(), Direction::Down);
    }

    #[test]
    fn test_snake_reset() {
        let grid = grid();
        let mut snake = Snake::from_cells([(5, 5), (4, 5)], Direction::Down).unwrap();
        snake.grow();

        snake.reset(&grid, Direction::Right);

        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Position::new(20, 15));
        assert_eq!(snake.direction(), Direction::Right);
        assert!(!snake.is_growing());
    }

    #[test]
    fn test_food_relocation_avoids_snake() {
        let grid = Grid::new(4, 4);
        // Snake covers every cell but (3, 3)
        let cells: Vec<Position> = grid.cells().filter(|&p| p != Position::new(3, 3)).collect();
        let snake = Snake::from_cells(cells, Direction::Right).unwrap();
        let mut food = Food::new(Position::new(0, 0));
        let mut rng = StdRng::seed_from_u64(42);

        assert!(food.relocate(&grid, &snake, &mut rng));
        assert_eq!(food.position, Position::new(3, 3));
    }

    #[test]
    fn test_food_relocation_on_full_board() {
        let grid = Grid::new(2, 2);
        let snake = Snake::from_cells(grid.cells().collect::<Vec<_>>(), Direction::Right).unwrap();
        let mut food = Food::new(Position::new(1, 1));
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!food.relocate(&grid, &snake, &mut rng));
        assert_eq!(food.position, Position::new(1, 1));
    }

    #[test]
    fn test_pause_toggle() {
        let grid = grid();
        let mut state = GameState::new(
            Snake::new(grid.center(), Direction::Right),
            Food::new(Position::new(0, 0)),
            grid,
        );

        assert_eq!(state.toggle_pause(), GamePhase::Paused);
        assert!(state.is_paused());
        assert_eq!(state.toggle_pause(), GamePhase::Running);
        assert!(state.is_running());

        state.phase = GamePhase::GameOver;
        assert_eq!(state.toggle_pause(), GamePhase::GameOver);
        assert!(state.is_game_over());
    }
}
