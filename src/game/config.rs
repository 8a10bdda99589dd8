use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use super::{action::Direction, state::Position};

/// Smallest accepted grid dimension; a 1-wide axis would let the head wrap onto itself.
pub const MIN_GRID_DIM: usize = 2;
/// Largest accepted grid dimension, keeps cell coordinates well inside `i32`.
pub const MAX_GRID_DIM: usize = 512;
pub const MAX_TICKS_PER_SECOND: u32 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "grid must be between {min}x{min} and {max}x{max} cells, got {width}x{height}",
        min = MIN_GRID_DIM,
        max = MAX_GRID_DIM
    )]
    InvalidGrid { width: usize, height: usize },
    #[error("ticks_per_second must be in 1..={}, got {0}", MAX_TICKS_PER_SECOND)]
    InvalidTickRate(u32),
    #[error("food_reward must be positive")]
    InvalidReward,
    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration for the game
///
/// Immutable once handed to the engine. Every field has a default so a JSON
/// file only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Simulation ticks per second
    pub ticks_per_second: u32,
    /// Score awarded for each piece of food
    pub food_reward: u32,
    /// Direction of a freshly spawned snake
    pub initial_direction: Direction,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 40,
            grid_height: 30,
            ticks_per_second: 10,
            food_reward: 10,
            initial_direction: Direction::Right,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = MIN_GRID_DIM..=MAX_GRID_DIM;
        if !dims.contains(&self.grid_width) || !dims.contains(&self.grid_height) {
            return Err(ConfigError::InvalidGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }

        if !(1..=MAX_TICKS_PER_SECOND).contains(&self.ticks_per_second) {
            return Err(ConfigError::InvalidTickRate(self.ticks_per_second));
        }

        if self.food_reward == 0 {
            return Err(ConfigError::InvalidReward);
        }

        Ok(())
    }

    /// Time between two simulation ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.ticks_per_second.max(1)))
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height)
    }
}

/// The playing field. Coordinates wrap around on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
}

impl Grid {
    /// Dimensions are clamped to the range accepted by [`GameConfig::validate`].
    /// [`GameEngine`](super::GameEngine) validates its config first, so the clamp
    /// only matters for grids built directly from unchecked values.
    pub fn new(width: usize, height: usize) -> Self {
        let clamp = |dim: usize| dim.clamp(MIN_GRID_DIM, MAX_GRID_DIM) as i32;
        Self {
            width: clamp(width),
            height: clamp(height),
        }
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub fn contains(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    /// Map any position back onto the grid, leaving one edge re-enters on the opposite one
    pub fn wrap(&self, pos: Position) -> Position {
        Position::new(pos.x.rem_euclid(self.width), pos.y.rem_euclid(self.height))
    }

    /// Uniformly random cell anywhere on the grid
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(rng.gen_range(0..self.width), rng.gen_range(0..self.height))
    }
}

#[cfg(test)]
impl Grid {
    /// All cells in row-major order
    pub(crate) fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 40);
        assert_eq!(config.grid_height, 30);
        assert_eq!(config.ticks_per_second, 10);
        assert_eq!(config.food_reward, 10);
        assert_eq!(config.initial_direction, Direction::Right);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 12);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 12);
        assert_eq!(config.food_reward, 10);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(matches!(
            GameConfig::new(1, 10).validate(),
            Err(ConfigError::InvalidGrid { width: 1, height: 10 })
        ));
        assert!(GameConfig::new(10, MAX_GRID_DIM + 1).validate().is_err());

        let mut config = GameConfig::default();
        config.ticks_per_second = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTickRate(0))));

        let mut config = GameConfig::default();
        config.food_reward = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidReward)));
    }

    #[test]
    fn test_tick_interval() {
        let config = GameConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(100));

        let mut config = GameConfig::default();
        config.ticks_per_second = 8;
        assert_eq!(config.tick_interval(), Duration::from_millis(125));
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"grid_width": 20, "initial_direction": "up"}}"#).unwrap();

        let config = GameConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 30);
        assert_eq!(config.initial_direction, Direction::Up);
    }

    #[test]
    fn test_load_errors() {
        let missing = GameConfig::from_json_file(Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let broken = GameConfig::from_json_file(file.path());
        assert!(matches!(broken, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_grid_wrap() {
        let grid = Grid::new(40, 30);
        assert_eq!(grid.wrap(Position::new(40, 5)), Position::new(0, 5));
        assert_eq!(grid.wrap(Position::new(-1, 5)), Position::new(39, 5));
        assert_eq!(grid.wrap(Position::new(5, 30)), Position::new(5, 0));
        assert_eq!(grid.wrap(Position::new(5, -1)), Position::new(5, 29));
        assert_eq!(grid.wrap(Position::new(7, 7)), Position::new(7, 7));
    }

    #[test]
    fn test_grid_center_and_area() {
        let grid = GameConfig::default().grid();
        assert_eq!(grid.center(), Position::new(20, 15));
        assert_eq!(grid.area(), 1200);
        assert_eq!(grid.cells().count(), 1200);
    }

    #[test]
    fn test_random_cell_in_bounds() {
        let grid = Grid::new(7, 3);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(grid.contains(grid.random_cell(&mut rng)));
        }
    }
}
