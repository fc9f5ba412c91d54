//! The game loop controller: bird physics, pipe scrolling, scoring and the
//! start/over state machine.

use crate::config::Tuning;
use crate::schedule::{Activity, Schedule};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    Ceiling,
    Floor,
    Pipe,
}

/// Which panel covers the play area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Start,
    GameOver { score: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    /// Top edge, px below the ceiling.
    pub y: f64,
    /// px per tick, positive is downward.
    pub vy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipePair {
    /// Left edge shared by both segments.
    pub x: f64,
    /// Bottom of the top segment.
    pub gap_top: f64,
    pub passed: bool,
}

/// Axis-aligned box in play-area pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    fn spans_x(&self, other: &Rect) -> bool {
        self.right > other.left && self.left < other.right
    }
}

pub struct Game {
    tuning: Tuning,
    bird: Bird,
    pipes: Vec<PipePair>,
    score: u32,
    phase: Phase,
    final_score: Option<u32>,
    cause: Option<GameOverCause>,
    schedule: Schedule,
    rng: ChaCha8Rng,
    ticks: u64,
}

impl Game {
    pub fn new(tuning: Tuning, rng: ChaCha8Rng) -> Self {
        let schedule = Schedule::new(tuning.tick_interval(), tuning.spawn_interval());
        let mut g = Game {
            bird: Bird { y: 0.0, vy: 0.0 },
            pipes: Vec::new(),
            score: 0,
            phase: Phase::NotStarted,
            final_score: None,
            cause: None,
            schedule,
            rng,
            ticks: 0,
            tuning,
        };
        g.reset_bird();
        g
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn bird(&self) -> Bird {
        self.bird
    }

    pub fn pipes(&self) -> &[PipePair] {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Physics ticks run in the current session.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn cause(&self) -> Option<GameOverCause> {
        self.cause
    }

    pub fn overlay(&self) -> Option<Overlay> {
        match self.phase {
            Phase::NotStarted => Some(Overlay::Start),
            Phase::Running => None,
            Phase::GameOver => Some(Overlay::GameOver {
                score: self.final_score.unwrap_or(self.score),
            }),
        }
    }

    pub fn bird_rect(&self) -> Rect {
        let t = &self.tuning;
        Rect {
            left: t.bird_x,
            top: self.bird.y,
            right: t.bird_x + t.bird_width,
            bottom: self.bird.y + t.bird_height,
        }
    }

    /// Boxes of the top and bottom segment of a pipe pair.
    pub fn pipe_rects(&self, pipe: &PipePair) -> (Rect, Rect) {
        let t = &self.tuning;
        let right = pipe.x + t.pipe_width;
        let top = Rect {
            left: pipe.x,
            top: 0.0,
            right,
            bottom: pipe.gap_top,
        };
        let bottom = Rect {
            left: pipe.x,
            top: pipe.gap_top + t.gap_size,
            right,
            bottom: t.arena_height,
        };
        (top, bottom)
    }

    fn reset_bird(&mut self) {
        self.bird = Bird {
            y: self.tuning.arena_height / 2.0,
            vy: 0.0,
        };
    }

    pub fn start_game(&mut self) {
        self.score = 0;
        self.final_score = None;
        self.cause = None;
        self.pipes.clear();
        self.reset_bird();
        self.ticks = 0;
        self.phase = Phase::Running;
        self.schedule.arm_all();
        tracing::info!("run started");
    }

    /// Pointer click or spacebar.
    pub fn jump(&mut self) {
        match self.phase {
            Phase::GameOver => {}
            Phase::NotStarted => self.start_game(),
            Phase::Running => self.bird.vy = self.tuning.jump_velocity,
        }
    }

    /// The restart control only exists on the game-over panel.
    pub fn restart(&mut self) {
        if self.phase == Phase::GameOver {
            self.start_game();
        } else {
            tracing::debug!(phase = ?self.phase, "restart ignored");
        }
    }

    /// Runs every tick and spawn that falls due within `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) {
        let mut budget = elapsed;
        while self.phase == Phase::Running {
            match self.schedule.next_due(&mut budget) {
                Some(Activity::Tick) => self.tick(),
                Some(Activity::Spawn) => self.spawn_pipe(),
                None => break,
            }
        }
    }

    fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.ticks += 1;

        self.bird.vy += self.tuning.gravity;
        self.bird.y += self.bird.vy;

        if self.bird.y <= 0.0 {
            self.end_game(GameOverCause::Ceiling);
            return;
        }
        if self.bird.y >= self.tuning.floor() {
            self.end_game(GameOverCause::Floor);
            return;
        }

        self.advance_pipes();
    }

    fn advance_pipes(&mut self) {
        let speed = self.tuning.pipe_speed;
        let width = self.tuning.pipe_width;
        let bird_x = self.tuning.bird_x;
        let bird = self.bird_rect();

        let mut i = 0;
        while i < self.pipes.len() {
            let pipe = &mut self.pipes[i];
            pipe.x -= speed;

            if !pipe.passed && pipe.x + width < bird_x {
                pipe.passed = true;
                self.score += 1;
                tracing::debug!(score = self.score, "pipe passed");
            }

            if self.collides(&bird, &self.pipes[i]) {
                self.end_game(GameOverCause::Pipe);
                return;
            }

            if self.pipes[i].x < -width {
                let gone = self.pipes.remove(i);
                tracing::debug!(x = gone.x, "pipe scrolled off");
            } else {
                i += 1;
            }
        }
    }

    /// Inside the pipe's columns and outside its gap.
    fn collides(&self, bird: &Rect, pipe: &PipePair) -> bool {
        let (top, bottom) = self.pipe_rects(pipe);
        bird.spans_x(&top) && (bird.top < top.bottom || bird.bottom > bottom.top)
    }

    fn spawn_pipe(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let t = &self.tuning;
        let offset = (self.rng.gen_range(0.0..1.0) * t.spawn_range()).floor();
        let gap_top = offset + t.gap_margin;
        self.pipes.push(PipePair {
            x: t.arena_width,
            gap_top,
            passed: false,
        });
        tracing::debug!(gap_top, live = self.pipes.len(), "pipe spawned");
    }

    fn end_game(&mut self, cause: GameOverCause) {
        self.phase = Phase::GameOver;
        self.schedule.cancel_all();
        self.cause = Some(cause);
        self.final_score = Some(self.score);
        tracing::info!(score = self.score, ?cause, ticks = self.ticks, "run over");
    }
}
