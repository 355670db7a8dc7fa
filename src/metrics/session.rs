use std::time::{Duration, Instant};

/// Per-process statistics shown alongside the game
#[derive(Debug, Clone)]
pub struct SessionMetrics {
    pub round_started: Instant,
    /// Time spent in the current round, frozen once it ends
    pub elapsed_time: Duration,
    pub rounds_played: u32,
    pub best_session_score: u32,
    round_running: bool,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            round_started: Instant::now(),
            elapsed_time: Duration::ZERO,
            rounds_played: 0,
            best_session_score: 0,
            round_running: true,
        }
    }

    /// Refresh the round clock; called once per rendered frame
    pub fn update(&mut self) {
        if self.round_running {
            self.elapsed_time = self.round_started.elapsed();
        }
    }

    pub fn on_round_start(&mut self) {
        self.round_started = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.round_running = true;
    }

    pub fn on_round_over(&mut self, final_score: u32) {
        self.update();
        self.round_running = false;
        self.rounds_played += 1;
        self.best_session_score = self.best_session_score.max(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
