use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{stderr, Stderr};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::game::{Action, Control, GameConfig, RoundController, RoundPhase};
use crate::input::InputHandler;
use crate::metrics::SessionMetrics;
use crate::persistence::HighScoreStore;
use crate::render::Renderer;

/// What woke the game loop
enum Wake {
    Input(Option<std::io::Result<Event>>),
    Frame,
}

/// Play snake with the keyboard in the terminal
pub struct HumanMode {
    round: RoundController<Box<dyn HighScoreStore>>,
    metrics: SessionMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    /// Actions received since the last frame, oldest first
    pending: Vec<Action>,
}

impl HumanMode {
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        Self {
            round: RoundController::new(config, store),
            metrics: SessionMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            pending: Vec::new(),
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

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        info!(
            rounds = self.metrics.rounds_played,
            best = self.metrics.best_session_score,
            "session ended"
        );
        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let fps = self.round.config().fps.max(1);
        let mut frame_clock = interval(Duration::from_secs_f64(1.0 / f64::from(fps)));
        frame_clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let wake = tokio::select! {
                maybe_event = event_stream.next() => Wake::Input(maybe_event),
                _ = frame_clock.tick() => Wake::Frame,
            };

            match wake {
                Wake::Input(Some(Ok(event))) => self.queue_event(event),
                Wake::Input(Some(Err(err))) => {
                    return Err(err).context("Failed to read terminal event");
                }
                // Input closed: nothing can ever end the game again
                Wake::Input(None) => return Ok(()),
                Wake::Frame => {
                    if self.run_frame(terminal)? == Control::Quit {
                        return Ok(());
                    }

                    if self.round.phase() == RoundPhase::GameOver {
                        if self.wait_for_restart(terminal, &mut event_stream).await?
                            == Control::Quit
                        {
                            return Ok(());
                        }
                        frame_clock.reset();
                    }
                }
            }
        }
    }

    fn queue_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if let Some(action) = self.input_handler.handle_key_event(key) {
                self.pending.push(action);
            }
        }
    }

    /// One frame: apply queued input, advance the round, draw
    fn run_frame<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<Control> {
        for action in self.pending.drain(..) {
            if self.round.handle_action(action) == Control::Quit {
                return Ok(Control::Quit);
            }
        }

        let outcome = self.round.advance_frame()?;
        if outcome.game_over {
            self.metrics.on_round_over(self.round.score());
        }
        self.metrics.update();

        self.draw(terminal)?;
        Ok(Control::Continue)
    }

    fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal
            .draw(|frame| {
                self.renderer.render(frame, &self.round, &self.metrics);
            })
            .context("Failed to draw frame")?;
        Ok(())
    }

    /// Block until a key press either starts a new round or quits
    async fn wait_for_restart<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        event_stream: &mut EventStream,
    ) -> Result<Control> {
        loop {
            match event_stream.next().await {
                Some(Ok(Event::Key(key))) => {
                    if let Some(action) = self.input_handler.handle_key_event(key) {
                        return Ok(self.restart_with(action));
                    }
                }
                Some(Ok(Event::Resize(_, _))) => self.draw(terminal)?,
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                None => return Ok(Control::Quit),
            }
        }
    }

    fn restart_with(&mut self, action: Action) -> Control {
        let control = self.round.handle_action(action);
        if control == Control::Continue {
            self.pending.clear();
            self.metrics.on_round_start();
        }
        control
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
