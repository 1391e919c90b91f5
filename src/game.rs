use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::Result;
use rand::rngs::StdRng;

use crate::render::Renderer;
use crate::state::{Direction, GameState, Phase};
use crate::term::TermManager;

/// What a key press means to the game.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    StartKey,
    Quit,
}

pub fn command_for(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }
    match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Command::Turn(Direction::Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Command::Turn(Direction::Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Command::Turn(Direction::Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Command::Turn(Direction::Right)),
        KeyCode::Char(' ') => Some(Command::StartKey),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

/// The loop/scheduler: owns the simulation, the terminal and the tick
/// interval, and sequences input -> tick -> render on a single thread.
pub struct Game {
    term: TermManager,
    renderer: Renderer,
    state: GameState,
    rng: StdRng,
    tick_interval: Duration,
}

impl Game {
    pub fn new(
        state: GameState,
        term: TermManager,
        rng: StdRng,
        tick_interval: Duration,
    ) -> Result<Self> {
        let renderer = Renderer::new(*state.board());
        let (need_w, need_h) = renderer.required_size();
        let (w, h) = term.size();
        if w < need_w || h < need_h {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("terminal is {}x{}, the playfield needs at least {}x{}", w, h, need_w, need_h),
            )
            .into());
        }
        Ok(Game { term, renderer, state, rng, tick_interval })
    }

    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;
        let outcome = self.run_loop();
        // Leave the terminal usable even when a draw call failed
        let restored = self.term.restore();
        outcome.and(restored)
    }

    fn run_loop(&mut self) -> Result<()> {
        loop {
            let keep_going = match self.state.snapshot().phase {
                Phase::NotStarted => self.start_screen()?,
                Phase::Running => self.play()?,
                Phase::GameOver => self.game_over_screen()?,
            };
            if !keep_going {
                return Ok(());
            }
        }
    }

    fn start_screen(&mut self) -> Result<bool> {
        self.renderer.draw_start_screen(&mut self.term)?;

        loop {
            let ev = self.term.read_key_blocking()?;
            match command_for(&ev) {
                Some(Command::StartKey) => {
                    self.state.request_start(&mut self.rng);
                    self.begin_run()?;
                    return Ok(true);
                }
                Some(Command::Quit) => return Ok(false),
                _ => {}
            }
        }
    }

    fn play(&mut self) -> Result<bool> {
        let mut next_tick = Instant::now() + self.tick_interval;

        loop {
            let now = Instant::now();
            if now >= next_tick {
                let out = self.state.tick(&mut self.rng);
                if out.phase == Phase::GameOver {
                    self.renderer.enter_game_over(&mut self.term, &self.state.snapshot())?;
                    return Ok(true);
                }
                self.renderer.draw_frame(&mut self.term, &self.state.snapshot())?;
                next_tick += self.tick_interval;
                continue;
            }

            if let Some(ev) = self.term.poll_key(next_tick - now)? {
                match command_for(&ev) {
                    Some(Command::Turn(d)) => self.state.set_direction(d),
                    Some(Command::Quit) => return Ok(false),
                    _ => {}
                }
            }
        }
    }

    fn game_over_screen(&mut self) -> Result<bool> {
        let mut next_step = Instant::now() + self.tick_interval;

        loop {
            let now = Instant::now();
            if now >= next_step {
                self.renderer.step_game_over(&mut self.term, &self.state.snapshot())?;
                next_step += self.tick_interval;
                continue;
            }

            if let Some(ev) = self.term.poll_key(next_step - now)? {
                match command_for(&ev) {
                    Some(Command::StartKey) => {
                        self.state.request_restart(&mut self.rng);
                        self.begin_run()?;
                        return Ok(true);
                    }
                    Some(Command::Quit) => return Ok(false),
                    _ => {}
                }
            }
        }
    }

    fn begin_run(&mut self) -> Result<()> {
        self.renderer.begin_run(&mut self.term, &self.state.snapshot())
    }
}
