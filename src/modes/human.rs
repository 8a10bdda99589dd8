use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::audio::Audio;
use crate::game::{Direction, GameConfig, GameEngine, GameEvent, GamePhase, GameState};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Render at ~30 FPS, independent of the simulation tick rate
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Text printed before the terminal switches to the game screen
pub fn banner(config: &GameConfig) -> String {
    format!(
        "Snake Bite Game\n\
         Controls:\n\
         - Arrow keys or WASD to move\n\
         - P to pause/resume\n\
         - SPACE to restart (when game over)\n\
         - ESC to quit\n\
         \n\
         Grid {}x{}, {} ticks per second\n\
         \n\
         Starting game...",
        config.grid_width, config.grid_height, config.ticks_per_second
    )
}

pub struct HumanMode {
    engine: GameEngine,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    audio: Audio,
    should_quit: bool,
    pending_direction: Option<Direction>,
}

impl HumanMode {
    pub fn new(mut engine: GameEngine, audio: Audio) -> Self {
        let state = engine.reset();

        Self {
            engine,
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            audio,
            should_quit: false,
            pending_direction: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        info!(
            width = self.engine.config().grid_width,
            height = self.engine.config().grid_height,
            ticks_per_second = self.engine.config().ticks_per_second,
            sound = self.audio.is_enabled(),
            "session started"
        );

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal, even if the loop failed
        let cleanup = cleanup_terminal(&mut terminal);

        info!(
            games_played = self.metrics.games_played,
            high_score = self.metrics.high_score,
            "session ended"
        );

        // A loop error is more telling than a teardown error
        result.and(cleanup)
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer = interval(self.engine.config().tick_interval());
        let mut render_timer = interval(RENDER_INTERVAL);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    self.update_game();
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Turn(direction) => {
                // Steering only counts while the snake is moving
                if self.state.is_running() {
                    self.pending_direction = Some(direction);
                }
            }
            KeyAction::TogglePause => self.toggle_pause(),
            KeyAction::Restart => {
                if self.state.is_game_over() {
                    self.reset_game();
                }
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn toggle_pause(&mut self) {
        if self.state.is_game_over() {
            return;
        }

        match self.state.toggle_pause() {
            GamePhase::Paused => {
                self.metrics.on_pause();
                debug!(score = self.state.score, "paused");
            }
            GamePhase::Running => {
                self.metrics.on_resume();
                debug!("resumed");
            }
            GamePhase::GameOver => {}
        }
    }

    fn update_game(&mut self) {
        if !self.state.is_running() {
            return;
        }

        let turn = self.pending_direction.take();
        let outcome = self.engine.tick(&mut self.state, turn);

        if let Some(event) = outcome.event() {
            match event {
                GameEvent::FoodEaten => self.metrics.on_food_eaten(),
                GameEvent::GameOver => self.metrics.on_game_over(self.state.score),
            }
            self.audio.play(event);
        }
    }

    fn reset_game(&mut self) {
        self.engine.restart(&mut self.state);
        self.metrics.on_game_start();
        self.pending_direction = None;
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
    // Every step is attempted; the array is evaluated in order
    let steps = [
        ("Failed to disable raw mode", disable_raw_mode()),
        (
            "Failed to leave alternate screen",
            execute!(terminal.backend_mut(), LeaveAlternateScreen),
        ),
        ("Failed to show cursor", terminal.show_cursor()),
    ];
    first_teardown_error(steps)
}

/// Log every failed teardown step and return the first failure
fn first_teardown_error<I>(steps: I) -> Result<()>
where
    I: IntoIterator<Item = (&'static str, io::Result<()>)>,
{
    let mut first = None;

    for (what, result) in steps {
        if let Err(err) = result {
            error!(?err, "{}", what);
            if first.is_none() {
                first = Some(anyhow::Error::new(err).context(what));
            }
        }
    }

    first.map_or(Ok(()), Err)
}
